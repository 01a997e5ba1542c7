use crate::{
    wire_xcon::Extension,
    xcon::{XconError, formatter::Formatter, parser::Parser},
};

pub trait Message: Sized {
    fn serialize(&self, formatter: &mut Formatter);

    fn deserialize(parser: &mut Parser<'_>) -> Result<Self, XconError>;
}

/// A message whose encoding has the same size for every value.
pub trait FixedSize: Message {
    const SIZE: usize;
}

pub trait Request: Message {
    type Reply: Message + 'static;
    /// `None` for requests of the core protocol.
    const EXTENSION: Option<Extension>;
    /// The major opcode of a core request or the minor opcode of an extension request.
    const OPCODE: u8;
    const IS_VOID: bool;
}

pub trait XEvent: Message {
    const EXTENSION: Option<Extension>;
    const OPCODE: u16;
}

macro_rules! simple {
    ($ty:ty) => {
        impl Message for $ty {
            fn serialize(&self, formatter: &mut Formatter) {
                formatter.write_packed(self);
            }

            fn deserialize(parser: &mut Parser<'_>) -> Result<Self, XconError> {
                parser.read_pod()
            }
        }

        impl FixedSize for $ty {
            const SIZE: usize = size_of::<$ty>();
        }
    };
}

simple!(u8);
simple!(i8);
simple!(u16);
simple!(i16);
simple!(u32);
simple!(i32);
simple!(u64);
simple!(i64);

impl Message for () {
    fn serialize(&self, _formatter: &mut Formatter) {}

    fn deserialize(_parser: &mut Parser<'_>) -> Result<Self, XconError> {
        Ok(())
    }
}
