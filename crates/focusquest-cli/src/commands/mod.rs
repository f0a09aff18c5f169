pub mod common;
pub mod config;
pub mod session;
pub mod settings;
pub mod timer;
