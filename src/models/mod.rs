//! Space API model types.

mod item;
mod snapshot;

pub use item::*;
pub use snapshot::*;
