use std::fmt::{Display, Formatter};

pub mod shape;
pub mod xproto;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Extension {
    Shape,
}

impl Extension {
    /// The name under which the server advertises the extension.
    pub fn name(self) -> &'static str {
        match self {
            Extension::Shape => "SHAPE",
        }
    }
}

impl Display for Extension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded event of an extension.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExtEvent {
    ShapeNotify(shape::ShapeNotify),
}

impl ExtEvent {
    pub fn extension(&self) -> Extension {
        match self {
            ExtEvent::ShapeNotify(_) => Extension::Shape,
        }
    }
}
