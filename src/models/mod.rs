// Core data models for leadpipe
// These structs represent the domain entities

pub mod lead;
pub mod agent;

pub use lead::*;
pub use agent::*;
