#![allow(
    clippy::len_zero,
    clippy::needless_lifetimes,
    clippy::enum_variant_names,
    clippy::new_without_default
)]

#[macro_use]
mod macros;
pub mod cli;
pub mod logger;
pub mod utils;
pub mod wire_xcon;
pub mod xcon;
