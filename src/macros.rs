/// Declares a message type from its wire layout.
///
/// Entries are written in wire order and terminated by `;`:
///
/// * `pad N;` skips `N` bytes when parsing and writes `N` zero bytes.
/// * `name: T;` a field with a [`Message`](crate::xcon::Message) type.
/// * `name: list<T>[count];` a list of fixed-size elements whose length is
///   given by the earlier field `count`.
/// * `name: list<T>;` a list of fixed-size elements that extends to the end
///   of the message.
/// * `name: vec<T>[count];` a list of variable-size elements.
///
/// The generated `FIXED_SIZE` constant is the size of the encoding without
/// lists.
macro_rules! wire {
    (
        $(#[$attr:meta])*
        pub struct $name:ident {
            $($body:tt)*
        }
    ) => {
        wire! {
            @munch
            meta: [$(#[$attr])*],
            name: $name,
            fields: [],
            ser: [],
            de: [],
            names: [],
            size: [0],
            slf: slf,
            fmt: formatter,
            parser: parser,
            rest: [$($body)*]
        }
    };
    (
        @munch
        meta: $meta:tt,
        name: $name:ident,
        fields: [$($fields:tt)*],
        ser: [$($ser:tt)*],
        de: [$($de:tt)*],
        names: [$($names:ident)*],
        size: [$($size:tt)*],
        slf: $slf:ident,
        fmt: $f:ident,
        parser: $p:ident,
        rest: [pad $n:literal; $($rest:tt)*]
    ) => {
        wire! {
            @munch
            meta: $meta,
            name: $name,
            fields: [$($fields)*],
            ser: [$($ser)* $f.pad($n);],
            de: [$($de)* $p.pad($n)?;],
            names: [$($names)*],
            size: [$($size)* + $n],
            slf: $slf,
            fmt: $f,
            parser: $p,
            rest: [$($rest)*]
        }
    };
    (
        @munch
        meta: $meta:tt,
        name: $name:ident,
        fields: [$($fields:tt)*],
        ser: [$($ser:tt)*],
        de: [$($de:tt)*],
        names: [$($names:ident)*],
        size: [$($size:tt)*],
        slf: $slf:ident,
        fmt: $f:ident,
        parser: $p:ident,
        rest: [$(#[$fm:meta])* $fvis:vis $field:ident: list<$t:ty>[$count:ident]; $($rest:tt)*]
    ) => {
        wire! {
            @munch
            meta: $meta,
            name: $name,
            fields: [$($fields)* $(#[$fm])* $fvis $field: $crate::xcon::List<$t>,],
            ser: [$($ser)* $crate::xcon::Message::serialize(&$slf.$field, $f);],
            de: [$($de)* let $field = $p.read_list::<$t>(Some($count as usize))?;],
            names: [$($names)* $field],
            size: [$($size)*],
            slf: $slf,
            fmt: $f,
            parser: $p,
            rest: [$($rest)*]
        }
    };
    (
        @munch
        meta: $meta:tt,
        name: $name:ident,
        fields: [$($fields:tt)*],
        ser: [$($ser:tt)*],
        de: [$($de:tt)*],
        names: [$($names:ident)*],
        size: [$($size:tt)*],
        slf: $slf:ident,
        fmt: $f:ident,
        parser: $p:ident,
        rest: [$(#[$fm:meta])* $fvis:vis $field:ident: list<$t:ty>; $($rest:tt)*]
    ) => {
        wire! {
            @munch
            meta: $meta,
            name: $name,
            fields: [$($fields)* $(#[$fm])* $fvis $field: $crate::xcon::List<$t>,],
            ser: [$($ser)* $crate::xcon::Message::serialize(&$slf.$field, $f);],
            de: [$($de)* let $field = $p.read_list::<$t>(None)?;],
            names: [$($names)* $field],
            size: [$($size)*],
            slf: $slf,
            fmt: $f,
            parser: $p,
            rest: [$($rest)*]
        }
    };
    (
        @munch
        meta: $meta:tt,
        name: $name:ident,
        fields: [$($fields:tt)*],
        ser: [$($ser:tt)*],
        de: [$($de:tt)*],
        names: [$($names:ident)*],
        size: [$($size:tt)*],
        slf: $slf:ident,
        fmt: $f:ident,
        parser: $p:ident,
        rest: [$(#[$fm:meta])* $fvis:vis $field:ident: vec<$t:ty>[$count:ident]; $($rest:tt)*]
    ) => {
        wire! {
            @munch
            meta: $meta,
            name: $name,
            fields: [$($fields)* $(#[$fm])* $fvis $field: Vec<$t>,],
            ser: [
                $($ser)*
                for element in &$slf.$field {
                    $crate::xcon::Message::serialize(element, $f);
                }
            ],
            de: [$($de)* let $field = $p.read_vec::<$t>(Some($count as usize))?;],
            names: [$($names)* $field],
            size: [$($size)*],
            slf: $slf,
            fmt: $f,
            parser: $p,
            rest: [$($rest)*]
        }
    };
    (
        @munch
        meta: $meta:tt,
        name: $name:ident,
        fields: [$($fields:tt)*],
        ser: [$($ser:tt)*],
        de: [$($de:tt)*],
        names: [$($names:ident)*],
        size: [$($size:tt)*],
        slf: $slf:ident,
        fmt: $f:ident,
        parser: $p:ident,
        rest: [$(#[$fm:meta])* $fvis:vis $field:ident: $ty:ty; $($rest:tt)*]
    ) => {
        wire! {
            @munch
            meta: $meta,
            name: $name,
            fields: [$($fields)* $(#[$fm])* $fvis $field: $ty,],
            ser: [$($ser)* $crate::xcon::Message::serialize(&$slf.$field, $f);],
            de: [$($de)* let $field = <$ty as $crate::xcon::Message>::deserialize($p)?;],
            names: [$($names)* $field],
            size: [$($size)* + <$ty as $crate::xcon::FixedSize>::SIZE],
            slf: $slf,
            fmt: $f,
            parser: $p,
            rest: [$($rest)*]
        }
    };
    (
        @munch
        meta: [$($meta:tt)*],
        name: $name:ident,
        fields: [$($fields:tt)*],
        ser: [$($ser:tt)*],
        de: [$($de:tt)*],
        names: [$($names:ident)*],
        size: [$($size:tt)*],
        slf: $slf:ident,
        fmt: $f:ident,
        parser: $p:ident,
        rest: []
    ) => {
        $($meta)*
        #[derive(Clone, Debug, Default, Eq, PartialEq)]
        pub struct $name {
            $($fields)*
        }

        impl $name {
            /// The size of the encoding without variable-length lists.
            pub const FIXED_SIZE: usize = $($size)*;
        }

        impl $crate::xcon::Message for $name {
            #[allow(unused_variables)]
            fn serialize(&self, $f: &mut $crate::xcon::Formatter) {
                let $slf = self;
                $($ser)*
            }

            #[allow(unused_variables)]
            fn deserialize(
                $p: &mut $crate::xcon::Parser<'_>,
            ) -> Result<Self, $crate::xcon::XconError> {
                $($de)*
                Ok(Self { $($names),* })
            }
        }
    };
}

/// Implements `FixedSize` for a `wire!` type and checks its size at compile time.
macro_rules! fixed_size {
    ($name:ident, $size:expr) => {
        const _: () = assert!($name::FIXED_SIZE == $size);

        impl $crate::xcon::FixedSize for $name {
            const SIZE: usize = $size;
        }
    };
}

/// Implements `Request` for a `wire!` type.
macro_rules! request {
    ($name:ident, $ext:expr, $opcode:expr, ()) => {
        impl $crate::xcon::Request for $name {
            type Reply = ();
            const EXTENSION: Option<$crate::wire_xcon::Extension> = $ext;
            const OPCODE: u8 = $opcode;
            const IS_VOID: bool = true;
        }
    };
    ($name:ident, $ext:expr, $opcode:expr, $reply:ty) => {
        impl $crate::xcon::Request for $name {
            type Reply = $reply;
            const EXTENSION: Option<$crate::wire_xcon::Extension> = $ext;
            const OPCODE: u8 = $opcode;
            const IS_VOID: bool = false;
        }
    };
}

macro_rules! fatal {
    ($($tt:tt)*) => {{
        log::error!($($tt)*);
        std::process::exit(1);
    }};
}
