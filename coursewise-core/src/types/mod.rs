//! Core types for the recommendation engine

mod candidate;
mod course;
mod interaction;
mod preferences;

pub use candidate::*;
pub use course::*;
pub use interaction::*;
pub use preferences::*;

#[cfg(test)]
pub(crate) use course::fixtures;
