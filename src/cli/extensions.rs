use {
    crate::cli::{
        GlobalArgs,
        tool::{Tool, with_tool},
    },
    std::fmt::Write,
};

pub fn main(global: GlobalArgs) {
    with_tool(global, |tool| {
        print!("{}", describe(tool));
        Ok(())
    });
}

/// Lists the registered extensions with the codes the server assigned.
pub fn describe(tool: &Tool) -> String {
    let mut out = String::new();
    for info in tool.registry.iter() {
        let _ = write!(
            out,
            "{} {}.{}: ",
            info.name(),
            info.major_version,
            info.minor_version
        );
        let _ = match tool.xcon.extensions().codes(info.extension) {
            Some(codes) => writeln!(
                out,
                "opcode = {}, first event = {}, first error = {}",
                codes.major_opcode, codes.first_event, codes.first_error
            ),
            _ => writeln!(out, "not supported by the server"),
        };
        for request in info.requests {
            let kind = if request.is_void { "void" } else { "reply" };
            let _ = writeln!(out, "    request {:2} {} ({})", request.opcode, request.name, kind);
        }
        for event in info.events {
            let _ = writeln!(out, "    event   {:2} {}", event.code, event.name);
        }
        for error in info.errors {
            let _ = writeln!(out, "    error   {:2} {}", error.code, error.name);
        }
    }
    out
}
