pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod transport;
pub mod ui;
