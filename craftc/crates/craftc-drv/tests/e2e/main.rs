//! End-to-end tests: drive the `craftc` binary over fixture sources and
//! check the produced datapack trees.

mod cli_tests;
mod compile_tests;
