use {
    crate::{
        wire_xcon::{ExtEvent, Extension, shape::SHAPE},
        xcon::{Event, EventOrigin, Parser, Request, XEvent, XconError},
    },
    ahash::{AHashMap, AHashSet},
    std::fmt::{Debug, Formatter},
    thiserror::Error,
};

pub type EventDecoder = fn(&[u8]) -> Result<ExtEvent, XconError>;

/// Decodes the frame of an event into the event type `E`.
pub fn decode<E: XEvent + Into<ExtEvent>>(buf: &[u8]) -> Result<ExtEvent, XconError> {
    let mut parser = Parser::new(buf);
    let event = E::deserialize(&mut parser)?;
    parser.finish()?;
    Ok(event.into())
}

#[derive(Debug)]
pub struct RequestInfo {
    pub name: &'static str,
    pub opcode: u8,
    pub is_void: bool,
}

impl RequestInfo {
    pub const fn new<T: Request>(name: &'static str) -> Self {
        Self {
            name,
            opcode: T::OPCODE,
            is_void: T::IS_VOID,
        }
    }
}

pub struct EventInfo {
    pub name: &'static str,
    pub code: u16,
    pub decode: EventDecoder,
}

impl Debug for EventInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventInfo")
            .field("name", &self.name)
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ErrorInfo {
    pub name: &'static str,
    pub code: u8,
}

/// The opcode, event, and error tables of an extension.
#[derive(Debug)]
pub struct ExtensionInfo {
    pub extension: Extension,
    /// The name under which the server advertises the extension.
    pub name: &'static str,
    pub major_version: u16,
    pub minor_version: u16,
    pub requests: &'static [RequestInfo],
    pub events: &'static [EventInfo],
    pub errors: &'static [ErrorInfo],
}

impl ExtensionInfo {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn request(&self, opcode: u8) -> Option<&RequestInfo> {
        self.requests.iter().find(|r| r.opcode == opcode)
    }

    pub fn request_by_name(&self, name: &str) -> Option<&RequestInfo> {
        self.requests.iter().find(|r| r.name == name)
    }

    pub fn event(&self, code: u16) -> Option<&EventInfo> {
        self.events.iter().find(|e| e.code == code)
    }

    pub fn error(&self, code: u8) -> Option<&ErrorInfo> {
        self.errors.iter().find(|e| e.code == code)
    }

    /// The number of event codes the extension reserves.
    pub fn num_events(&self) -> u16 {
        self.events.iter().map(|e| e.code + 1).max().unwrap_or(0)
    }

    /// The number of error codes the extension reserves.
    pub fn num_errors(&self) -> u16 {
        self.errors
            .iter()
            .map(|e| e.code as u16 + 1)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("An extension named `{0}` has already been registered")]
    DuplicateName(&'static str),
    #[error("The extension {0:?} has already been registered")]
    DuplicateExtension(Extension),
    #[error("The extension `{0}` uses request opcode {1} more than once")]
    DuplicateRequest(&'static str, u8),
    #[error("The extension `{0}` uses event code {1} more than once")]
    DuplicateEvent(&'static str, u16),
    #[error("The extension `{0}` uses error code {1} more than once")]
    DuplicateError(&'static str, u8),
}

/// The extensions known to a connection.
///
/// The registry is built before the connection is established and is
/// immutable afterwards.
#[derive(Default, Debug)]
pub struct Registry {
    extensions: Vec<&'static ExtensionInfo>,
    by_name: AHashMap<&'static str, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_extensions() -> Result<Self, RegistryError> {
        let mut slf = Self::new();
        slf.register(&SHAPE)?;
        Ok(slf)
    }

    pub fn register(&mut self, info: &'static ExtensionInfo) -> Result<(), RegistryError> {
        let name = info.name();
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateName(name));
        }
        if self.info(info.extension).is_some() {
            return Err(RegistryError::DuplicateExtension(info.extension));
        }
        let mut opcodes = AHashSet::new();
        for request in info.requests {
            if !opcodes.insert(request.opcode) {
                return Err(RegistryError::DuplicateRequest(name, request.opcode));
            }
        }
        let mut events = AHashSet::new();
        for event in info.events {
            if !events.insert(event.code) {
                return Err(RegistryError::DuplicateEvent(name, event.code));
            }
        }
        let mut errors = AHashSet::new();
        for error in info.errors {
            if !errors.insert(error.code) {
                return Err(RegistryError::DuplicateError(name, error.code));
            }
        }
        self.by_name.insert(name, self.extensions.len());
        self.extensions.push(info);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&'static ExtensionInfo> {
        self.by_name.get(name).map(|&idx| self.extensions[idx])
    }

    pub fn info(&self, extension: Extension) -> Option<&'static ExtensionInfo> {
        self.iter().find(|info| info.extension == extension)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ExtensionInfo> + '_ {
        self.extensions.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn decode_event(&self, event: &Event) -> Result<ExtEvent, XconError> {
        let unrecognized = || XconError::UnrecognizedEvent(event.response_type());
        let EventOrigin::Extension(ext) = event.origin() else {
            return Err(unrecognized());
        };
        let decoder = self
            .info(ext)
            .and_then(|info| info.event(event.code()))
            .ok_or_else(unrecognized)?;
        (decoder.decode)(&event[..])
    }
}
