pub mod context;
pub mod events;
pub mod execution;
pub mod step;
pub mod strategy;
pub mod tools;

pub use context::*;
pub use events::*;
pub use execution::*;
pub use step::*;
pub use strategy::*;
pub use tools::*;
