//! Detection components

pub mod agent;


pub use agent::*;
