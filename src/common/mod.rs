//! Common, shared types.

pub mod layers;
pub mod rng;
pub mod routine;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
