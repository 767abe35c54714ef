pub mod app;
pub mod config;
pub mod widget;

#[cfg(test)]
mod config_test;

pub use app::*;
pub use config::*;
pub use widget::*;
