pub mod cli;
pub mod commands;
pub mod mhgt;
pub mod utils;
