fn main() {
    jay_xcon::cli::main();
}
