mod extensions;
mod generate;
mod modify;
mod query;
mod tool;
mod watch;

use {
    crate::wire_xcon::{
        shape::{ClipOrdering, ShapeKind, ShapeOperation},
        xproto::Rectangle,
    },
    ::log::Level,
    clap::{Args, Parser, Subcommand, ValueEnum},
    clap_complete::Shell,
    std::str::FromStr,
    thiserror::Error,
};

/// Inspect and modify the shapes of X11 windows.
#[derive(Parser, Debug)]
pub struct Xshape {
    #[clap(flatten)]
    global: GlobalArgs,
    #[clap(subcommand)]
    command: Cmd,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// The log level.
    #[arg(value_enum, long, default_value_t)]
    pub log_level: CliLogLevel,
    /// The display to connect to, e.g. `:0`.
    ///
    /// Defaults to the value of the DISPLAY environment variable.
    #[arg(long)]
    pub display: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print the version of the SHAPE extension supported by the server.
    Version,
    /// Print the extents of the bounding and clip shapes of a window.
    Extents(WindowArgs),
    /// Print the rectangles that make up a shape of a window.
    Rectangles(RectanglesArgs),
    /// Print whether shape events are selected on a window.
    InputSelected(WindowArgs),
    /// Enable or disable shape events for a window.
    SelectInput(SelectInputArgs),
    /// Modify a shape of a window with a list of rectangles.
    SetRectangles(SetRectanglesArgs),
    /// Move a shape of a window.
    Offset(OffsetArgs),
    /// Combine a shape of one window into a shape of another window.
    Combine(CombineArgs),
    /// Print the shape events of a window.
    Watch(WindowArgs),
    /// Print the registered extensions and the codes assigned by the server.
    Extensions,
    /// Generate shell completion scripts for xshape.
    GenerateCompletion(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct WindowArgs {
    /// The window, either decimal or hexadecimal with a `0x` prefix.
    #[arg(value_parser = parse_window)]
    pub window: u32,
}

#[derive(Args, Debug)]
pub struct RectanglesArgs {
    /// The window, either decimal or hexadecimal with a `0x` prefix.
    #[arg(value_parser = parse_window)]
    pub window: u32,
    /// The shape to print.
    #[arg(value_enum, long, default_value_t)]
    pub kind: CliShapeKind,
}

#[derive(Args, Debug)]
pub struct SelectInputArgs {
    /// The window, either decimal or hexadecimal with a `0x` prefix.
    #[arg(value_parser = parse_window)]
    pub window: u32,
    /// Whether events should be delivered.
    #[arg(value_enum)]
    pub state: CliSwitch,
}

#[derive(Args, Debug)]
pub struct SetRectanglesArgs {
    /// The window, either decimal or hexadecimal with a `0x` prefix.
    #[arg(value_parser = parse_window)]
    pub window: u32,
    /// How the rectangles are combined with the existing shape.
    #[arg(value_enum, long, default_value_t)]
    pub operation: CliShapeOperation,
    /// The shape to modify.
    #[arg(value_enum, long, default_value_t)]
    pub kind: CliShapeKind,
    /// The ordering of the rectangles.
    #[arg(value_enum, long, default_value_t)]
    pub ordering: CliClipOrdering,
    /// The x offset applied to all rectangles.
    #[arg(long, default_value_t, allow_negative_numbers = true)]
    pub x: i16,
    /// The y offset applied to all rectangles.
    #[arg(long, default_value_t, allow_negative_numbers = true)]
    pub y: i16,
    /// The rectangles in the form `x,y,width,height`.
    ///
    /// Without rectangles the shape becomes empty when the operation is `set`.
    #[arg(allow_hyphen_values = true)]
    pub rectangles: Vec<CliRectangle>,
}

#[derive(Args, Debug)]
pub struct OffsetArgs {
    /// The window, either decimal or hexadecimal with a `0x` prefix.
    #[arg(value_parser = parse_window)]
    pub window: u32,
    /// The horizontal distance.
    #[arg(allow_negative_numbers = true)]
    pub dx: i16,
    /// The vertical distance.
    #[arg(allow_negative_numbers = true)]
    pub dy: i16,
    /// The shape to move.
    #[arg(value_enum, long, default_value_t)]
    pub kind: CliShapeKind,
}

#[derive(Args, Debug)]
pub struct CombineArgs {
    /// The destination window.
    #[arg(value_parser = parse_window)]
    pub destination: u32,
    /// The source window.
    #[arg(value_parser = parse_window)]
    pub source: u32,
    /// How the source shape is combined with the destination shape.
    #[arg(value_enum, long, default_value_t)]
    pub operation: CliShapeOperation,
    /// The destination shape.
    #[arg(value_enum, long, default_value_t)]
    pub kind: CliShapeKind,
    /// The source shape.
    #[arg(value_enum, long, default_value_t)]
    pub source_kind: CliShapeKind,
    /// The x offset of the source shape.
    #[arg(long, default_value_t, allow_negative_numbers = true)]
    pub x: i16,
    /// The y offset of the source shape.
    #[arg(long, default_value_t, allow_negative_numbers = true)]
    pub y: i16,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Copy, Clone, Hash, Default)]
pub enum CliLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<CliLogLevel> for Level {
    fn from(value: CliLogLevel) -> Self {
        match value {
            CliLogLevel::Trace => Level::Trace,
            CliLogLevel::Debug => Level::Debug,
            CliLogLevel::Info => Level::Info,
            CliLogLevel::Warn => Level::Warn,
            CliLogLevel::Error => Level::Error,
        }
    }
}

#[derive(ValueEnum, Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum CliShapeKind {
    #[default]
    Bounding,
    Clip,
    Input,
}

impl From<CliShapeKind> for ShapeKind {
    fn from(value: CliShapeKind) -> Self {
        match value {
            CliShapeKind::Bounding => ShapeKind::Bounding,
            CliShapeKind::Clip => ShapeKind::Clip,
            CliShapeKind::Input => ShapeKind::Input,
        }
    }
}

#[derive(ValueEnum, Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum CliShapeOperation {
    #[default]
    Set,
    Union,
    Intersect,
    Subtract,
    Invert,
}

impl From<CliShapeOperation> for ShapeOperation {
    fn from(value: CliShapeOperation) -> Self {
        match value {
            CliShapeOperation::Set => ShapeOperation::Set,
            CliShapeOperation::Union => ShapeOperation::Union,
            CliShapeOperation::Intersect => ShapeOperation::Intersect,
            CliShapeOperation::Subtract => ShapeOperation::Subtract,
            CliShapeOperation::Invert => ShapeOperation::Invert,
        }
    }
}

#[derive(ValueEnum, Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum CliClipOrdering {
    #[default]
    Unsorted,
    YSorted,
    YxSorted,
    YxBanded,
}

impl From<CliClipOrdering> for ClipOrdering {
    fn from(value: CliClipOrdering) -> Self {
        match value {
            CliClipOrdering::Unsorted => ClipOrdering::Unsorted,
            CliClipOrdering::YSorted => ClipOrdering::YSorted,
            CliClipOrdering::YxSorted => ClipOrdering::YXSorted,
            CliClipOrdering::YxBanded => ClipOrdering::YXBanded,
        }
    }
}

#[derive(ValueEnum, Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum CliSwitch {
    On,
    Off,
}

#[derive(Debug, Clone)]
pub struct CliRectangle(pub Rectangle);

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("Expected four comma-separated numbers")]
    RectangleFormat,
    #[error("`{0}` is not a valid number")]
    Number(String),
    #[error("`{0}` is not a valid window")]
    Window(String),
}

impl FromStr for CliRectangle {
    type Err = CliParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.split(',').map(|p| p.trim()).collect();
        let [x, y, width, height] = parts[..] else {
            return Err(CliParseError::RectangleFormat);
        };
        fn num<T: FromStr>(s: &str) -> Result<T, CliParseError> {
            s.parse().map_err(|_| CliParseError::Number(s.to_string()))
        }
        Ok(Self(Rectangle {
            x: num(x)?,
            y: num(y)?,
            width: num(width)?,
            height: num(height)?,
        }))
    }
}

fn parse_window(s: &str) -> Result<u32, CliParseError> {
    let res = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        _ => s.parse(),
    };
    res.map_err(|_| CliParseError::Window(s.to_string()))
}

pub fn main() {
    let cli = Xshape::parse();
    match cli.command {
        Cmd::Version => query::version(cli.global),
        Cmd::Extents(a) => query::extents(cli.global, a),
        Cmd::Rectangles(a) => query::rectangles(cli.global, a),
        Cmd::InputSelected(a) => query::input_selected(cli.global, a),
        Cmd::SelectInput(a) => modify::select_input(cli.global, a),
        Cmd::SetRectangles(a) => modify::set_rectangles(cli.global, a),
        Cmd::Offset(a) => modify::offset(cli.global, a),
        Cmd::Combine(a) => modify::combine(cli.global, a),
        Cmd::Watch(a) => watch::main(cli.global, a),
        Cmd::Extensions => extensions::main(cli.global),
        Cmd::GenerateCompletion(g) => generate::main(g),
    }
}
