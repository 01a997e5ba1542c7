use crate::{
    cli::{GlobalArgs, WindowArgs, tool::with_tool},
    utils::errorfmt::ErrorFmt,
    wire_xcon::{
        ExtEvent,
        shape::{ShapeKind, ShapeSelectInput},
    },
    xcon::EventOrigin,
};

pub fn main(global: GlobalArgs, args: WindowArgs) {
    with_tool(global, |tool| {
        tool.checked(&ShapeSelectInput {
            destination_window: args.window,
            enable: 1,
        })?;
        loop {
            let event = tool.xcon.wait_event()?;
            if event.origin() == EventOrigin::Core {
                log::trace!("Ignoring core event {}", event.code());
                continue;
            }
            match tool.registry.decode_event(&event) {
                Ok(ExtEvent::ShapeNotify(n)) => {
                    let kind = match ShapeKind::try_from(n.shape_kind) {
                        Ok(k) => k.name(),
                        _ => "unknown",
                    };
                    println!(
                        "{:#x}: {} shape {}, extents = {}x{}+{}+{}, time = {}",
                        n.affected_window,
                        kind,
                        if n.shaped != 0 { "set" } else { "removed" },
                        n.extents_width,
                        n.extents_height,
                        n.extents_x,
                        n.extents_y,
                        n.server_time,
                    );
                }
                Err(e) => log::warn!("Could not decode an event: {}", ErrorFmt(e)),
            }
        }
    });
}
