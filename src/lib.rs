//! Pooled launchables for a vertical shoot-em-up: guns, spawners, minions and
//! power-ups all draw from fixed pools that are recycled, never grown.
//!
//! The library exists so the integration tests in `tests/` can build the same app
//! headlessly; `game::run` is the windowed entry point.

pub mod common;
pub mod game;
pub mod plugins;
