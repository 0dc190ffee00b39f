//! folioctl: read and edit a Folio portfolio from the command line
//!
//! Settings come from `folio.toml`, then `FOLIO_*` environment variables,
//! then command line flags.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
