//! Heart Burst - A press-to-fill celebration with a particle explosion
//!
//! Core modules:
//! - `sim`: Particle store (spawn + per-tick kinematics)
//! - `engine`: Render loop driver (surface sizing, frame scheduling, teardown)
//! - `surface`: 2D drawing surface abstraction with scoped transforms
//! - `tuning`: Data-driven burst physics and palettes
//! - `settings`: Persisted display preferences
//! - `app`: Setup → explosion → reveal phase machine
//! - `headless`: In-memory host for native runs and tests
//! - `web`: Canvas/requestAnimationFrame host (wasm32 only)

pub mod app;
pub mod engine;
pub mod headless;
pub mod settings;
pub mod sim;
pub mod surface;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{Celebration, Phase, PressOutcome};
pub use engine::{EngineError, FrameLoop, Host, ParticleEngine};
pub use settings::{Density, Settings};
pub use sim::{Particle, ParticleStore};
pub use surface::{Surface2d, TransformScope};
pub use tuning::{BurstTuning, Span, TuningError};

use glam::Vec2;

/// Celebration configuration constants
pub mod consts {
    /// Presses needed to fill the meter
    pub const TARGET_PRESSES: u32 = 30;
    /// How long the burst stays mounted before the card is revealed
    pub const EXPLOSION_DURATION_MS: i32 = 4000;
    /// Length of the shake feedback after each press
    pub const SHAKE_DURATION_MS: i32 = 200;

    /// Particles per burst at standard density
    pub const DEFAULT_PARTICLE_COUNT: usize = 300;
    /// Upper bound for a configured burst, before density scaling
    pub const MAX_PARTICLE_COUNT: usize = 5000;
    /// Base glyph size before per-particle scale (pixels)
    pub const DEFAULT_GLYPH_PX: f32 = 30.0;

    /// Accent colours
    pub const CRUSHED_BERRY: &str = "#8c2a45";
    pub const RASPBERRY: &str = "#d1245f";
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
