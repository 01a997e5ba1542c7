use {
    crate::cli::{GenerateArgs, Xshape},
    clap::CommandFactory,
    std::io::stdout,
};

pub fn main(args: GenerateArgs) {
    let stdout = stdout();
    let mut stdout = stdout.lock();
    clap_complete::generate(args.shell, &mut Xshape::command(), "xshape", &mut stdout);
}
