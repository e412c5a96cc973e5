//! Detection systems (FixedUpdate)

pub mod adapters;
pub mod index;
pub mod reactions;
pub mod tick;

pub use adapters::*;
pub use index::*;
pub use reactions::*;
pub use tick::*;
