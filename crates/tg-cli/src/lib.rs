//! tunnelgist: Command-line interface
//!
//! Provides the `tunnelgist` binary with its `server`, `client` and
//! `config` subcommands.

pub mod commands;
pub mod output;
