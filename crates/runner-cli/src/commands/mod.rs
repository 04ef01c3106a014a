//! Command implementations for runner-cli

pub mod assign;
pub mod example;

pub use assign::{Selection, run_assign};
pub use example::{Example, run_print_example};
