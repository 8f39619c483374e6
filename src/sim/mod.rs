//! Particle simulation module
//!
//! Pure and deterministic given the RNG handed to `spawn`:
//! - One tick per rendered frame, no wall-clock dependence
//! - No rendering or platform dependencies

pub mod particle;
pub mod store;

pub use particle::Particle;
pub use store::ParticleStore;
