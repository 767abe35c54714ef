pub mod decode;
pub mod gif;
pub mod source;

#[cfg(test)]
mod gif_test;

pub use decode::*;
pub use gif::*;
pub use source::*;
