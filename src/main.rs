//! Recovers TypeScript declarations from corrupted Adobe ExtendScript API XML.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

mod cli;

fn main() {
    cli::run();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
