//! CLI subcommands.

pub mod health;
