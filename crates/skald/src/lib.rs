//! # Skald: 2D Entity-Component Runtime
//!
//! The runtime core of an editor-embedded 2D engine: a scene graph of
//! entities with pluggable components, AABB physics, sandboxed Rhai behavior
//! scripts, a surface-agnostic renderer, and a frame scheduler that switches
//! between editing and simulation.
//!
//! Start with `use skald::prelude::*` and drive a [`GameLoop`](game_loop::GameLoop).

pub mod color;
pub mod component;
pub mod config;
pub mod entity;
pub mod game_loop;
pub mod input;
pub mod math;
pub mod physics;
pub mod prelude;
pub mod render;
pub mod scene;
pub mod script;
pub mod serializer;
pub mod time;
