pub mod controller;
pub mod error;
pub mod state;


pub use controller::*;
pub use error::*;
pub use state::*;
