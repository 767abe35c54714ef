pub mod client;
pub mod transport;

pub use client::*;
pub use transport::*;
