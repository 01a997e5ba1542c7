use {
    crate::xcon::{Formatter, Message, Parser, XconError},
    bstr::{BString, ByteSlice},
    std::fmt::{self, Display},
};

wire! {
    pub struct Rectangle {
        pub x: i16;
        pub y: i16;
        pub width: u16;
        pub height: u16;
    }
}

fixed_size!(Rectangle, 8);

wire! {
    pub struct Format {
        pub depth: u8;
        pub bits_per_pixel: u8;
        pub scanline_pad: u8;
        pad 5;
    }
}

fixed_size!(Format, 8);

wire! {
    pub struct VisualType {
        pub visual_id: u32;
        pub class: u8;
        pub bits_per_rgb_value: u8;
        pub colormap_entries: u16;
        pub red_mask: u32;
        pub green_mask: u32;
        pub blue_mask: u32;
        pad 4;
    }
}

fixed_size!(VisualType, 24);

wire! {
    pub struct Depth {
        pub depth: u8;
        pad 1;
        pub visuals_len: u16;
        pad 4;
        pub visuals: list<VisualType>[visuals_len];
    }
}

const _: () = assert!(Depth::FIXED_SIZE == 8);

wire! {
    pub struct Screen {
        pub root: u32;
        pub default_colormap: u32;
        pub white_pixel: u32;
        pub black_pixel: u32;
        pub current_input_masks: u32;
        pub width_in_pixels: u16;
        pub height_in_pixels: u16;
        pub width_in_millimeters: u16;
        pub height_in_millimeters: u16;
        pub min_installed_maps: u16;
        pub max_installed_maps: u16;
        pub root_visual: u32;
        pub backing_stores: u8;
        pub save_unders: u8;
        pub root_depth: u8;
        pub allowed_depths_len: u8;
        pub allowed_depths: vec<Depth>[allowed_depths_len];
    }
}

const _: () = assert!(Screen::FIXED_SIZE == 40);

/// The server's answer to a successful connection attempt.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Setup {
    pub protocol_major_version: u16,
    pub protocol_minor_version: u16,
    pub release_number: u32,
    pub resource_id_base: u32,
    pub resource_id_mask: u32,
    pub motion_buffer_size: u32,
    pub maximum_request_length: u16,
    pub image_byte_order: u8,
    pub bitmap_format_bit_order: u8,
    pub bitmap_format_scanline_unit: u8,
    pub bitmap_format_scanline_pad: u8,
    pub min_keycode: u8,
    pub max_keycode: u8,
    pub vendor: BString,
    pub pixmap_formats: Vec<Format>,
    pub roots: Vec<Screen>,
}

impl Message for Setup {
    fn serialize(&self, formatter: &mut Formatter) {
        let mut body = vec![];
        {
            let mut f = Formatter::new(&mut body);
            f.write_packed(&self.release_number);
            f.write_packed(&self.resource_id_base);
            f.write_packed(&self.resource_id_mask);
            f.write_packed(&self.motion_buffer_size);
            f.write_packed(&(self.vendor.len() as u16));
            f.write_packed(&self.maximum_request_length);
            f.write_packed(&(self.roots.len() as u8));
            f.write_packed(&(self.pixmap_formats.len() as u8));
            f.write_packed(&self.image_byte_order);
            f.write_packed(&self.bitmap_format_bit_order);
            f.write_packed(&self.bitmap_format_scanline_unit);
            f.write_packed(&self.bitmap_format_scanline_pad);
            f.write_packed(&self.min_keycode);
            f.write_packed(&self.max_keycode);
            f.pad(4);
            f.write_bytes(self.vendor.as_bytes());
            f.align(4);
            for format in &self.pixmap_formats {
                format.serialize(&mut f);
            }
            for screen in &self.roots {
                screen.serialize(&mut f);
            }
        }
        formatter.write_packed(&1u8);
        formatter.pad(1);
        formatter.write_packed(&self.protocol_major_version);
        formatter.write_packed(&self.protocol_minor_version);
        formatter.write_packed(&((body.len() / 4) as u16));
        formatter.write_bytes(&body);
    }

    fn deserialize(parser: &mut Parser<'_>) -> Result<Self, XconError> {
        parser.pad(2)?;
        let protocol_major_version = parser.read_pod()?;
        let protocol_minor_version = parser.read_pod()?;
        parser.pad(2)?;
        let release_number = parser.read_pod()?;
        let resource_id_base = parser.read_pod()?;
        let resource_id_mask = parser.read_pod()?;
        let motion_buffer_size = parser.read_pod()?;
        let vendor_len: u16 = parser.read_pod()?;
        let maximum_request_length = parser.read_pod()?;
        let roots_len: u8 = parser.read_pod()?;
        let pixmap_formats_len: u8 = parser.read_pod()?;
        let image_byte_order = parser.read_pod()?;
        let bitmap_format_bit_order = parser.read_pod()?;
        let bitmap_format_scanline_unit = parser.read_pod()?;
        let bitmap_format_scanline_pad = parser.read_pod()?;
        let min_keycode = parser.read_pod()?;
        let max_keycode = parser.read_pod()?;
        parser.pad(4)?;
        let vendor = parser.read_string(vendor_len as usize)?.to_owned();
        parser.align(4)?;
        let pixmap_formats = parser.read_vec(Some(pixmap_formats_len as usize))?;
        let roots = parser.read_vec(Some(roots_len as usize))?;
        Ok(Self {
            protocol_major_version,
            protocol_minor_version,
            release_number,
            resource_id_base,
            resource_id_mask,
            motion_buffer_size,
            maximum_request_length,
            image_byte_order,
            bitmap_format_bit_order,
            bitmap_format_scanline_unit,
            bitmap_format_scanline_pad,
            min_keycode,
            max_keycode,
            vendor,
            pixmap_formats,
            roots,
        })
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryExtension {
    pub name: BString,
}

impl Message for QueryExtension {
    fn serialize(&self, formatter: &mut Formatter) {
        formatter.write_packed(&(self.name.len() as u16));
        formatter.pad(2);
        formatter.write_bytes(self.name.as_bytes());
    }

    fn deserialize(parser: &mut Parser<'_>) -> Result<Self, XconError> {
        let name_len: u16 = parser.read_pod()?;
        parser.pad(2)?;
        let name = parser.read_string(name_len as usize)?.to_owned();
        Ok(Self { name })
    }
}

request!(QueryExtension, None, 98, QueryExtensionReply);

wire! {
    pub struct QueryExtensionReply {
        pad 8;
        pub present: u8;
        pub major_opcode: u8;
        pub first_event: u8;
        pub first_error: u8;
        pad 20;
    }
}

const _: () = assert!(QueryExtensionReply::FIXED_SIZE == 32);

wire! {
    pub struct GetInputFocus {
    }
}

request!(GetInputFocus, None, 43, GetInputFocusReply);

wire! {
    pub struct GetInputFocusReply {
        pad 1;
        pub revert_to: u8;
        pad 6;
        pub focus: u32;
        pad 20;
    }
}

const _: () = assert!(GetInputFocusReply::FIXED_SIZE == 32);

wire! {
    /// The frame of an error sent by the server.
    ///
    /// `error_code` is the code on the wire. Errors of extensions are rebased
    /// to the extension's first error before they are reported.
    pub struct ProtocolError {
        pad 1;
        pub error_code: u8;
        pad 2;
        pub bad_value: u32;
        pub minor_opcode: u16;
        pub major_opcode: u8;
        pad 21;
    }
}

const _: () = assert!(ProtocolError::FIXED_SIZE == 32);

static CORE_ERROR_NAMES: [&str; 18] = [
    "Success",
    "Request",
    "Value",
    "Window",
    "Pixmap",
    "Atom",
    "Cursor",
    "Font",
    "Match",
    "Drawable",
    "Access",
    "Alloc",
    "Colormap",
    "GContext",
    "IDChoice",
    "Name",
    "Length",
    "Implementation",
];

impl ProtocolError {
    pub fn core_name(&self) -> Option<&'static str> {
        CORE_ERROR_NAMES.get(self.error_code as usize).copied()
    }
}

impl Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.core_name() {
            Some(name) => write!(f, "{} ({})", self.error_code, name),
            _ => write!(f, "{}", self.error_code),
        }
    }
}
