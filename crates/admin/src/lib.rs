//! Command-line administration for the catalog service.

pub mod cli;
pub mod commands;
