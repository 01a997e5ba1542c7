use crate::{
    cli::{GlobalArgs, RectanglesArgs, WindowArgs, tool::with_tool},
    wire_xcon::shape::{
        ClipOrdering, ShapeGetRectangles, ShapeInputSelected, ShapeKind, ShapeQueryExtents,
        ShapeQueryVersion,
    },
};

pub fn version(global: GlobalArgs) {
    with_tool(global, |tool| {
        let reply = tool.call(&ShapeQueryVersion {}).reply()?;
        println!("{}.{}", reply.major_version, reply.minor_version);
        Ok(())
    });
}

pub fn extents(global: GlobalArgs, args: WindowArgs) {
    with_tool(global, |tool| {
        let reply = tool
            .call(&ShapeQueryExtents {
                destination_window: args.window,
            })
            .reply()?;
        println!(
            "bounding: shaped = {}, extents = {}x{}+{}+{}",
            reply.bounding_shaped != 0,
            reply.bounding_shape_extents_width,
            reply.bounding_shape_extents_height,
            reply.bounding_shape_extents_x,
            reply.bounding_shape_extents_y,
        );
        println!(
            "clip: shaped = {}, extents = {}x{}+{}+{}",
            reply.clip_shaped != 0,
            reply.clip_shape_extents_width,
            reply.clip_shape_extents_height,
            reply.clip_shape_extents_x,
            reply.clip_shape_extents_y,
        );
        Ok(())
    });
}

pub fn rectangles(global: GlobalArgs, args: RectanglesArgs) {
    with_tool(global, |tool| {
        let kind = ShapeKind::from(args.kind);
        let reply = tool
            .call(&ShapeGetRectangles {
                window: args.window,
                source_kind: kind.raw(),
            })
            .reply()?;
        let ordering = ClipOrdering::try_from(reply.ordering)?;
        println!("{} shape, {} ({} rectangles)", kind, ordering, reply.rectangles.len());
        for rect in reply.rectangles.iter() {
            println!("  {}x{}+{}+{}", rect.width, rect.height, rect.x, rect.y);
        }
        Ok(())
    });
}

pub fn input_selected(global: GlobalArgs, args: WindowArgs) {
    with_tool(global, |tool| {
        let reply = tool
            .call(&ShapeInputSelected {
                destination_window: args.window,
            })
            .reply()?;
        println!("{}", reply.enabled != 0);
        Ok(())
    });
}
