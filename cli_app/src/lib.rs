// cli_app/src/lib.rs

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Логика `resnext-cli`: разбор аргументов, выбор бэкенда и подкоманды.

pub mod backend;
pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
