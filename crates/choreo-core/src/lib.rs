//! # choreo-core
//!
//! Core types and primitives for the Choreo scene choreography engine.
//! This crate contains foundational types shared across all Choreo crates:
//! points, rectangles, durations, colors, configuration, and error types.

pub mod color;
pub mod config;
pub mod error;
pub mod hash;
pub mod math;
pub mod time;

pub use config::*;

pub use color::Color;
pub use error::{ChoreoError, ChoreoResult};
pub use hash::ContentHash;
pub use math::{Point2D, Rect, Size2D, Vector2D};
pub use time::{Duration, Timestamp};
