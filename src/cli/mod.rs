pub mod commands;
pub mod flags;
