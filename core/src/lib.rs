pub mod action;
pub mod config;
pub mod error;
pub mod render;
pub mod report;
pub mod str_interp;
pub mod style;
pub mod testing;

pub use crate::config::Config;
