//! # Skyline Sim
//!
//! Deterministic gameplay simulation for a side-scrolling rooftop
//! brawler.
//!
//! This crate provides the full fixed-tick game layer:
//! - Kinematic bodies with gravity, velocity clamps and a one-way ground
//! - Web-swing rope constraint with pump and release boost
//! - Player state machine (movement, strikes, dive kick, web attacks)
//! - Enemy archetypes, the AI decision ladder, and boss abilities
//! - Combat resolution (hitboxes, combo scaling, hitstop, grabs, pulls)
//! - Combo meter with milestone signaling
//! - Distance-triggered wave director with infinite stat scaling
//! - Event bus for scoring/audio/effects consumers
//!
//! Everything is driven by [`Simulation::update`]; no rendering, no
//! device polling, no wall-clock reads. The same seed and input
//! sequence always produces the same run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod attack;
pub mod combat;
pub mod combo;
pub mod config;
pub mod enemy;
pub mod events;
pub mod input;
pub mod physics;
pub mod player;
pub mod rng;
pub mod rope;
pub mod simulation;
pub mod spawn;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::attack::*;
    pub use crate::combat::*;
    pub use crate::combo::*;
    pub use crate::config::*;
    pub use crate::enemy::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::physics::*;
    pub use crate::player::*;
    pub use crate::rng::*;
    pub use crate::rope::*;
    pub use crate::simulation::*;
    pub use crate::spawn::*;
}

pub use prelude::*;
