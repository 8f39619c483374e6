//! A single burst particle and its per-tick kinematics

use glam::Vec2;

/// One decorative glyph sprite.
///
/// Particles have no identity beyond their slot in the store; every
/// attribute except position, velocity and rotation is fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Surface-pixel position
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    /// Added to vel.y every tick (positive is down)
    pub gravity: f32,
    /// Velocity damping per tick, inside (0, 1)
    pub friction: f32,
    /// Glyph size multiplier
    pub scale: f32,
    /// Current orientation (radians, unwrapped)
    pub rotation: f32,
    /// Radians per tick, signed
    pub rotation_speed: f32,
    /// Index into the glyph palette
    pub glyph: usize,
    /// Index into the accent palette
    pub accent: usize,
}

impl Particle {
    /// Advance by one tick: damp, fall, move, spin
    #[inline]
    pub fn step(&mut self) {
        self.vel *= self.friction;
        self.vel.y += self.gravity;
        self.pos += self.vel;
        self.rotation += self.rotation_speed;
    }

    /// Current speed in pixels per tick
    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}
