pub mod lead;
pub mod agent;

pub use lead::*;
pub use agent::*;
