use {
    crate::{
        wire_xcon::{
            Extension,
            shape::{
                ClipOrdering, SHAPE, ShapeCombine, ShapeGetRectangles, ShapeGetRectanglesReply,
                ShapeInputSelected, ShapeInputSelectedReply, ShapeKind, ShapeMask, ShapeNotify,
                ShapeOffset, ShapeOperation, ShapeQueryExtents, ShapeQueryExtentsReply,
                ShapeQueryVersion, ShapeQueryVersionReply, ShapeRectangles, ShapeSelectInput,
            },
            xproto::Rectangle,
        },
        xcon::{FixedSize, Formatter, List, Message, Parser, Request, XEvent, XconError},
    },
    proptest::prelude::*,
};

fn encode<M: Message>(msg: &M) -> Vec<u8> {
    let mut buf = vec![];
    msg.serialize(&mut Formatter::new(&mut buf));
    buf
}

fn decode<M: Message>(buf: &[u8]) -> Result<M, XconError> {
    let mut parser = Parser::new(buf);
    let msg = M::deserialize(&mut parser)?;
    parser.finish()?;
    Ok(msg)
}

fn notify() -> ShapeNotify {
    ShapeNotify {
        shape_kind: 0,
        affected_window: 12345,
        extents_x: -1,
        extents_y: 2,
        extents_width: 100,
        extents_height: 200,
        server_time: 999,
        shaped: 1,
    }
}

#[test]
fn notify_layout() {
    let buf = encode(&notify());
    assert_eq!(buf.len(), 32);
    assert_eq!(buf[0], 0);
    assert_eq!(buf[1], 0);
    assert_eq!(&buf[2..4], &[0, 0]);
    assert_eq!(&buf[4..8], &12345u32.to_ne_bytes());
    assert_eq!(&buf[8..10], &(-1i16).to_ne_bytes());
    assert_eq!(&buf[10..12], &2i16.to_ne_bytes());
    assert_eq!(&buf[12..14], &100u16.to_ne_bytes());
    assert_eq!(&buf[14..16], &200u16.to_ne_bytes());
    assert_eq!(&buf[16..20], &999u32.to_ne_bytes());
    assert_eq!(buf[20], 1);
    assert_eq!(&buf[21..], &[0; 11]);
    assert_eq!(decode::<ShapeNotify>(&buf).unwrap(), notify());
}

#[test]
fn notify_ignores_header() {
    let mut buf = encode(&notify());
    buf[0] = 70 | 0x80;
    buf[2] = 0x12;
    buf[3] = 0x34;
    assert_eq!(decode::<ShapeNotify>(&buf).unwrap(), notify());
}

#[test]
fn notify_truncated() {
    let buf = encode(&notify());
    assert!(matches!(
        decode::<ShapeNotify>(&buf[..31]),
        Err(XconError::UnexpectedEof)
    ));
}

#[test]
fn fixed_sizes() {
    assert_eq!(ShapeNotify::SIZE, 32);
    assert_eq!(ShapeQueryVersionReply::FIXED_SIZE, 32);
    assert_eq!(ShapeQueryExtentsReply::FIXED_SIZE, 32);
    assert_eq!(ShapeInputSelectedReply::FIXED_SIZE, 32);
    assert_eq!(ShapeGetRectanglesReply::FIXED_SIZE, 32);
    assert_eq!(ShapeQueryVersion::FIXED_SIZE, 0);
    assert_eq!(ShapeRectangles::FIXED_SIZE, 12);
    assert_eq!(ShapeMask::FIXED_SIZE, 16);
    assert_eq!(ShapeCombine::FIXED_SIZE, 16);
    assert_eq!(ShapeOffset::FIXED_SIZE, 12);
    assert_eq!(ShapeQueryExtents::FIXED_SIZE, 4);
    assert_eq!(ShapeSelectInput::FIXED_SIZE, 8);
    assert_eq!(ShapeInputSelected::FIXED_SIZE, 4);
    assert_eq!(ShapeGetRectangles::FIXED_SIZE, 8);
}

#[test]
fn request_sizes() {
    assert_eq!(encode(&ShapeMask::default()).len(), 16);
    assert_eq!(encode(&ShapeCombine::default()).len(), 16);
    assert_eq!(encode(&ShapeOffset::default()).len(), 12);
    assert_eq!(encode(&ShapeSelectInput::default()).len(), 8);
    assert_eq!(encode(&ShapeGetRectangles::default()).len(), 8);
    let rectangles = ShapeRectangles {
        rectangles: vec![Rectangle::default(); 5].into(),
        ..Default::default()
    };
    assert_eq!(encode(&rectangles).len(), 12 + 5 * 8);
}

#[test]
fn pad_bytes_are_zero() {
    let buf = encode(&ShapeCombine {
        operation: 0xff,
        destination_kind: 0xff,
        source_kind: 0xff,
        destination_window: u32::MAX,
        x_offset: -1,
        y_offset: -1,
        source_window: u32::MAX,
    });
    assert_eq!(buf[3], 0);
    assert!(buf.iter().enumerate().all(|(i, b)| i == 3 || *b == 0xff));
    let buf = encode(&ShapeOffset {
        destination_kind: 0xff,
        destination_window: u32::MAX,
        x_offset: -1,
        y_offset: -1,
    });
    assert_eq!(&buf[1..4], &[0, 0, 0]);
    let buf = encode(&ShapeSelectInput {
        destination_window: u32::MAX,
        enable: 0xff,
    });
    assert_eq!(&buf[5..8], &[0, 0, 0]);
    let buf = encode(&ShapeInputSelectedReply { enabled: 0xff });
    assert_eq!(buf[1], 0xff);
    assert!(buf.iter().enumerate().all(|(i, b)| i == 1 || *b == 0));
}

#[test]
fn rectangles_request_layout() {
    let req = ShapeRectangles {
        operation: ShapeOperation::Subtract.raw(),
        destination_kind: ShapeKind::Input.raw(),
        ordering: ClipOrdering::YXBanded.raw(),
        destination_window: 0x0020_0001,
        x_offset: -10,
        y_offset: 10,
        rectangles: vec![
            Rectangle {
                x: 1,
                y: 2,
                width: 3,
                height: 4,
            },
            Rectangle {
                x: -1,
                y: -2,
                width: 30,
                height: 40,
            },
        ]
        .into(),
    };
    let buf = encode(&req);
    assert_eq!(&buf[..4], &[3, 2, 3, 0]);
    assert_eq!(&buf[4..8], &0x0020_0001u32.to_ne_bytes());
    assert_eq!(&buf[12..14], &1i16.to_ne_bytes());
    assert_eq!(&buf[20..22], &(-1i16).to_ne_bytes());
    assert_eq!(buf.len(), 12 + 2 * 8);
    let decoded: ShapeRectangles = decode(&buf).unwrap();
    assert_eq!(decoded.rectangles.len(), 2);
    assert_eq!(decoded, req);
}

fn rectangles_reply(rects: &[Rectangle]) -> ShapeGetRectanglesReply {
    ShapeGetRectanglesReply {
        ordering: ClipOrdering::YXSorted.raw(),
        rectangles_len: rects.len() as u32,
        rectangles: rects.into(),
    }
}

#[test]
fn get_rectangles_reply() {
    let rects = [
        Rectangle {
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        },
        Rectangle {
            x: 10,
            y: 0,
            width: 5,
            height: 1,
        },
        Rectangle {
            x: 0,
            y: 1,
            width: 15,
            height: 9,
        },
    ];
    let buf = encode(&rectangles_reply(&rects));
    assert_eq!(buf.len(), 32 + 3 * 8);
    assert_eq!(buf[1], 2);
    assert_eq!(&buf[8..12], &3u32.to_ne_bytes());
    let reply: ShapeGetRectanglesReply = decode(&buf).unwrap();
    assert_eq!(reply.rectangles.len(), 3);
    assert_eq!(reply.rectangles.get(1), Some(rects[1].clone()));
    assert_eq!(reply.rectangles.get(3), None);
    assert_eq!(reply.rectangles.to_vec(), rects);
}

#[test]
fn get_rectangles_count_mismatch() {
    let rects = vec![Rectangle::default(); 3];
    let mut reply = rectangles_reply(&rects);
    reply.rectangles_len = 4;
    let buf = encode(&reply);
    assert!(matches!(
        decode::<ShapeGetRectanglesReply>(&buf),
        Err(XconError::UnexpectedEof)
    ));
    reply.rectangles_len = 2;
    let buf = encode(&reply);
    assert!(matches!(
        decode::<ShapeGetRectanglesReply>(&buf),
        Err(XconError::TrailingBytes(8))
    ));
}

#[test]
fn empty_rectangles() {
    let buf = encode(&rectangles_reply(&[]));
    assert_eq!(buf.len(), 32);
    let reply: ShapeGetRectanglesReply = decode(&buf).unwrap();
    assert!(reply.rectangles.is_empty());
    assert_eq!(reply.rectangles, List::default());
}

#[test]
fn opcodes() {
    assert_eq!(ShapeQueryVersion::OPCODE, 0);
    assert_eq!(ShapeRectangles::OPCODE, 1);
    assert_eq!(ShapeMask::OPCODE, 2);
    assert_eq!(ShapeCombine::OPCODE, 3);
    assert_eq!(ShapeOffset::OPCODE, 4);
    assert_eq!(ShapeQueryExtents::OPCODE, 5);
    assert_eq!(ShapeSelectInput::OPCODE, 6);
    assert_eq!(ShapeInputSelected::OPCODE, 7);
    assert_eq!(ShapeGetRectangles::OPCODE, 8);
    assert_eq!(ShapeNotify::OPCODE, 0);
    assert_eq!(ShapeNotify::EXTENSION, Some(Extension::Shape));
    assert!(ShapeRectangles::IS_VOID);
    assert!(!ShapeGetRectangles::IS_VOID);
    for (idx, request) in SHAPE.requests.iter().enumerate() {
        assert_eq!(request.opcode as usize, idx);
    }
    assert!(SHAPE.errors.is_empty());
}

#[test]
fn enums() {
    assert_eq!(ShapeOperation::ALL.len(), 5);
    assert_eq!(ShapeKind::ALL.len(), 3);
    assert_eq!(ClipOrdering::ALL.len(), 4);
    for (idx, op) in ShapeOperation::ALL.iter().enumerate() {
        assert_eq!(op.raw() as usize, idx);
        assert_eq!(ShapeOperation::try_from(op.raw()).unwrap(), *op);
    }
    assert_eq!(ShapeKind::try_from(2u8).unwrap(), ShapeKind::Input);
    assert_eq!(ClipOrdering::try_from(3u8).unwrap(), ClipOrdering::YXBanded);
    assert!(matches!(
        ShapeOperation::try_from(5u8),
        Err(XconError::UnknownEnumVariant)
    ));
    assert!(ShapeKind::try_from(3u8).is_err());
    assert!(ClipOrdering::try_from(4u8).is_err());
    assert_eq!(ShapeKind::Clip.to_string(), "clip");
    assert_eq!(ClipOrdering::YXSorted.to_string(), "yx-sorted");
}

fn rectangle() -> impl Strategy<Value = Rectangle> {
    (any::<i16>(), any::<i16>(), any::<u16>(), any::<u16>()).prop_map(|(x, y, width, height)| {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    })
}

fn round_trip<M: Message + PartialEq + std::fmt::Debug>(msg: &M) -> Vec<u8> {
    let buf = encode(msg);
    assert_eq!(buf.len() % 4, 0);
    assert_eq!(&decode::<M>(&buf).unwrap(), msg);
    buf
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn notify_round_trip(
        shape_kind in any::<u8>(),
        affected_window in any::<u32>(),
        rect in rectangle(),
        server_time in any::<u32>(),
        shaped in any::<u8>(),
    ) {
        let buf = round_trip(&ShapeNotify {
            shape_kind,
            affected_window,
            extents_x: rect.x,
            extents_y: rect.y,
            extents_width: rect.width,
            extents_height: rect.height,
            server_time,
            shaped,
        });
        prop_assert_eq!(buf.len(), 32);
    }

    #[test]
    fn query_replies_round_trip(
        major in any::<u16>(),
        minor in any::<u16>(),
        bounding in rectangle(),
        clip in rectangle(),
        shaped in (any::<u8>(), any::<u8>()),
    ) {
        round_trip(&ShapeQueryVersionReply {
            major_version: major,
            minor_version: minor,
        });
        round_trip(&ShapeQueryExtentsReply {
            bounding_shaped: shaped.0,
            clip_shaped: shaped.1,
            bounding_shape_extents_x: bounding.x,
            bounding_shape_extents_y: bounding.y,
            bounding_shape_extents_width: bounding.width,
            bounding_shape_extents_height: bounding.height,
            clip_shape_extents_x: clip.x,
            clip_shape_extents_y: clip.y,
            clip_shape_extents_width: clip.width,
            clip_shape_extents_height: clip.height,
        });
        round_trip(&ShapeInputSelectedReply { enabled: shaped.0 });
    }

    #[test]
    fn requests_round_trip(
        codes in (0u8..5, 0u8..3, 0u8..3),
        windows in (any::<u32>(), any::<u32>()),
        offset in (any::<i16>(), any::<i16>()),
    ) {
        let (operation, destination_kind, source_kind) = codes;
        round_trip(&ShapeMask {
            operation,
            destination_kind,
            destination_window: windows.0,
            x_offset: offset.0,
            y_offset: offset.1,
            source_bitmap: windows.1,
        });
        round_trip(&ShapeCombine {
            operation,
            destination_kind,
            source_kind,
            destination_window: windows.0,
            x_offset: offset.0,
            y_offset: offset.1,
            source_window: windows.1,
        });
        round_trip(&ShapeOffset {
            destination_kind,
            destination_window: windows.0,
            x_offset: offset.0,
            y_offset: offset.1,
        });
        round_trip(&ShapeSelectInput {
            destination_window: windows.0,
            enable: operation,
        });
        round_trip(&ShapeGetRectangles {
            window: windows.1,
            source_kind,
        });
    }

    #[test]
    fn rectangles_round_trip(
        rects in prop::collection::vec(rectangle(), 0..32),
        ordering in 0u8..4,
    ) {
        let buf = round_trip(&ShapeRectangles {
            ordering,
            rectangles: rects.clone().into(),
            ..Default::default()
        });
        prop_assert_eq!(buf.len(), 12 + rects.len() * 8);
        let buf = round_trip(&ShapeGetRectanglesReply {
            ordering,
            rectangles_len: rects.len() as u32,
            rectangles: rects.clone().into(),
        });
        prop_assert_eq!(buf.len(), 32 + rects.len() * 8);
        let reply: ShapeGetRectanglesReply = decode(&buf).unwrap();
        prop_assert_eq!(reply.rectangles.to_vec(), rects);
    }
}
