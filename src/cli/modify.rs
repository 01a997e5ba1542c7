use crate::{
    cli::{
        CliSwitch, CombineArgs, GlobalArgs, OffsetArgs, SelectInputArgs, SetRectanglesArgs,
        tool::with_tool,
    },
    wire_xcon::shape::{
        ClipOrdering, ShapeCombine, ShapeKind, ShapeOffset, ShapeOperation, ShapeRectangles,
        ShapeSelectInput,
    },
};

pub fn select_input(global: GlobalArgs, args: SelectInputArgs) {
    with_tool(global, |tool| {
        tool.checked(&ShapeSelectInput {
            destination_window: args.window,
            enable: (args.state == CliSwitch::On) as u8,
        })
    });
}

pub fn set_rectangles(global: GlobalArgs, args: SetRectanglesArgs) {
    with_tool(global, |tool| {
        tool.checked(&ShapeRectangles {
            operation: ShapeOperation::from(args.operation).raw(),
            destination_kind: ShapeKind::from(args.kind).raw(),
            ordering: ClipOrdering::from(args.ordering).raw(),
            destination_window: args.window,
            x_offset: args.x,
            y_offset: args.y,
            rectangles: args.rectangles.iter().map(|r| r.0.clone()).collect(),
        })
    });
}

pub fn offset(global: GlobalArgs, args: OffsetArgs) {
    with_tool(global, |tool| {
        tool.checked(&ShapeOffset {
            destination_kind: ShapeKind::from(args.kind).raw(),
            destination_window: args.window,
            x_offset: args.dx,
            y_offset: args.dy,
        })
    });
}

pub fn combine(global: GlobalArgs, args: CombineArgs) {
    with_tool(global, |tool| {
        tool.checked(&ShapeCombine {
            operation: ShapeOperation::from(args.operation).raw(),
            destination_kind: ShapeKind::from(args.kind).raw(),
            source_kind: ShapeKind::from(args.source_kind).raw(),
            destination_window: args.destination,
            x_offset: args.x,
            y_offset: args.y,
            source_window: args.source,
        })
    });
}
