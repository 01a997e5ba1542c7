//! The X11 SHAPE extension, version 1.1.

use {
    crate::{
        wire_xcon::{ExtEvent, Extension, xproto::Rectangle},
        xcon::{
            XEvent, XconError,
            registry::{EventInfo, ExtensionInfo, RequestInfo, decode},
        },
    },
    std::fmt::{Display, Formatter},
};

pub const SHAPE_MAJOR_VERSION: u16 = 1;
pub const SHAPE_MINOR_VERSION: u16 = 1;

macro_rules! wire_enum {
    ($(#[$attr:meta])* $name:ident { $($variant:ident = $value:literal => $text:literal,)* }) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $value,)*
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            pub fn raw(self) -> u8 {
                self as u8
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = XconError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)*
                    _ => Err(XconError::UnknownEnumVariant),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

wire_enum! {
    /// How a source region is combined with the destination region.
    ShapeOperation {
        Set = 0 => "set",
        Union = 1 => "union",
        Intersect = 2 => "intersect",
        Subtract = 3 => "subtract",
        Invert = 4 => "invert",
    }
}

wire_enum! {
    ShapeKind {
        Bounding = 0 => "bounding",
        Clip = 1 => "clip",
        Input = 2 => "input",
    }
}

wire_enum! {
    ClipOrdering {
        Unsorted = 0 => "unsorted",
        YSorted = 1 => "y-sorted",
        YXSorted = 2 => "yx-sorted",
        YXBanded = 3 => "yx-banded",
    }
}

wire! {
    pub struct ShapeNotify {
        pad 1;
        pub shape_kind: u8;
        pad 2;
        pub affected_window: u32;
        pub extents_x: i16;
        pub extents_y: i16;
        pub extents_width: u16;
        pub extents_height: u16;
        pub server_time: u32;
        pub shaped: u8;
        pad 11;
    }
}

fixed_size!(ShapeNotify, 32);

impl XEvent for ShapeNotify {
    const EXTENSION: Option<Extension> = Some(Extension::Shape);
    const OPCODE: u16 = 0;
}

impl From<ShapeNotify> for ExtEvent {
    fn from(value: ShapeNotify) -> Self {
        Self::ShapeNotify(value)
    }
}

wire! {
    pub struct ShapeQueryVersion {
    }
}

request!(ShapeQueryVersion, Some(Extension::Shape), 0, ShapeQueryVersionReply);

wire! {
    pub struct ShapeQueryVersionReply {
        pad 8;
        pub major_version: u16;
        pub minor_version: u16;
        pad 20;
    }
}

const _: () = assert!(ShapeQueryVersionReply::FIXED_SIZE == 32);

wire! {
    pub struct ShapeRectangles {
        pub operation: u8;
        pub destination_kind: u8;
        pub ordering: u8;
        pad 1;
        pub destination_window: u32;
        pub x_offset: i16;
        pub y_offset: i16;
        pub rectangles: list<Rectangle>;
    }
}

request!(ShapeRectangles, Some(Extension::Shape), 1, ());

wire! {
    pub struct ShapeMask {
        pub operation: u8;
        pub destination_kind: u8;
        pad 2;
        pub destination_window: u32;
        pub x_offset: i16;
        pub y_offset: i16;
        pub source_bitmap: u32;
    }
}

request!(ShapeMask, Some(Extension::Shape), 2, ());

wire! {
    pub struct ShapeCombine {
        pub operation: u8;
        pub destination_kind: u8;
        pub source_kind: u8;
        pad 1;
        pub destination_window: u32;
        pub x_offset: i16;
        pub y_offset: i16;
        pub source_window: u32;
    }
}

request!(ShapeCombine, Some(Extension::Shape), 3, ());

wire! {
    pub struct ShapeOffset {
        pub destination_kind: u8;
        pad 3;
        pub destination_window: u32;
        pub x_offset: i16;
        pub y_offset: i16;
    }
}

request!(ShapeOffset, Some(Extension::Shape), 4, ());

wire! {
    pub struct ShapeQueryExtents {
        pub destination_window: u32;
    }
}

request!(ShapeQueryExtents, Some(Extension::Shape), 5, ShapeQueryExtentsReply);

wire! {
    pub struct ShapeQueryExtentsReply {
        pad 8;
        pub bounding_shaped: u8;
        pub clip_shaped: u8;
        pad 2;
        pub bounding_shape_extents_x: i16;
        pub bounding_shape_extents_y: i16;
        pub bounding_shape_extents_width: u16;
        pub bounding_shape_extents_height: u16;
        pub clip_shape_extents_x: i16;
        pub clip_shape_extents_y: i16;
        pub clip_shape_extents_width: u16;
        pub clip_shape_extents_height: u16;
        pad 4;
    }
}

const _: () = assert!(ShapeQueryExtentsReply::FIXED_SIZE == 32);

wire! {
    pub struct ShapeSelectInput {
        pub destination_window: u32;
        pub enable: u8;
        pad 3;
    }
}

request!(ShapeSelectInput, Some(Extension::Shape), 6, ());

wire! {
    pub struct ShapeInputSelected {
        pub destination_window: u32;
    }
}

request!(ShapeInputSelected, Some(Extension::Shape), 7, ShapeInputSelectedReply);

wire! {
    pub struct ShapeInputSelectedReply {
        pad 1;
        pub enabled: u8;
        pad 30;
    }
}

const _: () = assert!(ShapeInputSelectedReply::FIXED_SIZE == 32);

wire! {
    pub struct ShapeGetRectangles {
        pub window: u32;
        pub source_kind: u8;
        pad 3;
    }
}

request!(ShapeGetRectangles, Some(Extension::Shape), 8, ShapeGetRectanglesReply);

wire! {
    pub struct ShapeGetRectanglesReply {
        pad 1;
        pub ordering: u8;
        pad 6;
        pub rectangles_len: u32;
        pad 20;
        pub rectangles: list<Rectangle>[rectangles_len];
    }
}

const _: () = assert!(ShapeGetRectanglesReply::FIXED_SIZE == 32);

pub static SHAPE: ExtensionInfo = ExtensionInfo {
    extension: Extension::Shape,
    name: "SHAPE",
    major_version: SHAPE_MAJOR_VERSION,
    minor_version: SHAPE_MINOR_VERSION,
    requests: &[
        RequestInfo::new::<ShapeQueryVersion>("QueryVersion"),
        RequestInfo::new::<ShapeRectangles>("Rectangles"),
        RequestInfo::new::<ShapeMask>("Mask"),
        RequestInfo::new::<ShapeCombine>("Combine"),
        RequestInfo::new::<ShapeOffset>("Offset"),
        RequestInfo::new::<ShapeQueryExtents>("QueryExtents"),
        RequestInfo::new::<ShapeSelectInput>("SelectInput"),
        RequestInfo::new::<ShapeInputSelected>("InputSelected"),
        RequestInfo::new::<ShapeGetRectangles>("GetRectangles"),
    ],
    events: &[EventInfo {
        name: "Notify",
        code: ShapeNotify::OPCODE,
        decode: decode::<ShapeNotify>,
    }],
    errors: &[],
};

#[cfg(test)]
mod tests;
