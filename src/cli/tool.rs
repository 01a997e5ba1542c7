use {
    crate::{
        cli::GlobalArgs,
        logger::Logger,
        utils::errorfmt::ErrorFmt,
        wire_xcon::{
            Extension,
            shape::{SHAPE_MAJOR_VERSION, SHAPE_MINOR_VERSION, ShapeQueryVersion},
            xproto::GetInputFocus,
        },
        xcon::{Cookie, Request, Xcon, XconError, parse_display, registry::Registry},
    },
};

/// A connection used by a single command.
pub struct Tool {
    pub registry: Registry,
    pub xcon: Xcon,
}

/// Connects to the display and runs `f`.
///
/// Errors are fatal.
pub fn with_tool<F>(global: GlobalArgs, f: F)
where
    F: FnOnce(&Tool) -> Result<(), XconError>,
{
    Logger::install_stderr(global.log_level.into());
    let tool = match Tool::new(&global) {
        Ok(t) => t,
        Err(e) => fatal!("Could not connect to the X server: {}", ErrorFmt(e)),
    };
    if let Err(e) = f(&tool) {
        fatal!("{}", ErrorFmt(e));
    }
    if let Err(e) = tool.round_trip() {
        fatal!("{}", ErrorFmt(e));
    }
}

impl Tool {
    fn new(global: &GlobalArgs) -> Result<Self, XconError> {
        let registry = Registry::with_default_extensions()?;
        let xcon = match &global.display {
            Some(d) => Xcon::connect_to_display(parse_display(d)?, &registry)?,
            _ => Xcon::connect(&registry)?,
        };
        Self::with_xcon(registry, xcon)
    }

    /// Checks the SHAPE version if the server supports the extension.
    ///
    /// Commands that do not use SHAPE keep working without it.
    pub fn with_xcon(registry: Registry, xcon: Xcon) -> Result<Self, XconError> {
        if !xcon.extensions().is_present(Extension::Shape) {
            log::warn!("The server does not support the SHAPE extension");
            return Ok(Self { registry, xcon });
        }
        let version = xcon.call(&ShapeQueryVersion {}).reply()?;
        log::debug!(
            "The server supports SHAPE {}.{}",
            version.major_version,
            version.minor_version
        );
        if (version.major_version, version.minor_version)
            < (SHAPE_MAJOR_VERSION, SHAPE_MINOR_VERSION)
        {
            log::warn!(
                "The server only supports SHAPE {}.{}",
                version.major_version,
                version.minor_version
            );
        }
        Ok(Self { registry, xcon })
    }

    pub fn call<T: Request>(&self, t: &T) -> Cookie<T::Reply> {
        self.xcon.call(t)
    }

    /// Sends a request and waits until the server has processed it.
    pub fn checked<T: Request>(&self, t: &T) -> Result<(), XconError> {
        self.xcon.call(t).reply().map(drop)
    }

    /// Waits until the server has processed all requests.
    pub fn round_trip(&self) -> Result<(), XconError> {
        self.xcon.call(&GetInputFocus {}).reply()?;
        while let Some(e) = self.xcon.next_error() {
            log::error!("{}", ErrorFmt(e));
        }
        Ok(())
    }
}
