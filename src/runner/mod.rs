mod runner;

pub use runner::{load_program, run_interactive, run_queries, Program};
