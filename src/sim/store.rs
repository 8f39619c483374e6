//! Particle store: owns the burst collection
//!
//! The collection is filled once per mount by `spawn` and then mutated in
//! place by `advance`, once per rendered frame. It never grows or shrinks
//! between spawns and nothing is culled, so particles keep drifting off
//! surface until the owning engine is torn down.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use super::particle::Particle;
use crate::polar_to_cartesian;
use crate::tuning::BurstTuning;

/// Fixed-cardinality particle collection
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection with `count` particles bursting from `origin`.
    ///
    /// Every attribute is drawn independently per particle. A count of zero
    /// leaves the store empty. Palettes are assumed non-empty (see
    /// `BurstTuning::validate`); an empty palette maps to index 0.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        origin: Vec2,
        count: usize,
        tuning: &BurstTuning,
        rng: &mut R,
    ) {
        self.particles.clear();
        self.particles.reserve(count);

        let physics = &tuning.physics;
        let glyphs = tuning.look.glyphs.len();
        let accents = tuning.look.accents.len();

        for _ in 0..count {
            let angle = rng.random_range(0.0..TAU);
            let speed = physics.speed.sample(rng);

            self.particles.push(Particle {
                pos: origin,
                vel: polar_to_cartesian(speed, angle),
                gravity: physics.gravity.sample(rng),
                friction: physics.friction.sample(rng),
                scale: physics.scale.sample(rng),
                rotation: rng.random_range(0.0..TAU),
                rotation_speed: physics.rotation_speed.sample(rng),
                glyph: pick(rng, glyphs),
                accent: pick(rng, accents),
            });
        }
    }

    /// Advance every particle by one tick
    pub fn advance(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.step();
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Mean distance of all particles from `point` (0 when empty)
    pub fn mean_distance_from(&self, point: Vec2) -> f32 {
        if self.particles.is_empty() {
            return 0.0;
        }
        let total: f32 = self.particles.iter().map(|p| p.pos.distance(point)).sum();
        total / self.particles.len() as f32
    }
}

#[inline]
fn pick<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    if len > 1 { rng.random_range(0..len) } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Span;
    use crate::{cartesian_to_polar, wrap_angle};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawned(seed: u64, origin: Vec2, count: usize) -> ParticleStore {
        let mut store = ParticleStore::new();
        let mut rng = Pcg32::seed_from_u64(seed);
        store.spawn(origin, count, &BurstTuning::default(), &mut rng);
        store
    }

    #[test]
    fn test_spawn_count_and_origin() {
        let origin = Vec2::new(400.0, 300.0);
        for count in [0, 1, 7, 300] {
            let store = spawned(12345, origin, count);
            assert_eq!(store.len(), count);
            assert!(store.particles().iter().all(|p| p.pos == origin));
        }
    }

    #[test]
    fn test_respawn_discards_previous_burst() {
        let mut store = spawned(1, Vec2::ZERO, 50);
        let mut rng = Pcg32::seed_from_u64(2);
        store.spawn(Vec2::new(5.0, 5.0), 10, &BurstTuning::default(), &mut rng);
        assert_eq!(store.len(), 10);
        assert!(store.particles().iter().all(|p| p.pos == Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_zero_count_is_empty_and_advance_is_noop() {
        let mut store = spawned(7, Vec2::ZERO, 0);
        assert!(store.is_empty());
        store.advance();
        assert!(store.is_empty());
        assert_eq!(store.mean_distance_from(Vec2::ZERO), 0.0);
    }

    #[test]
    fn test_spawned_attributes_within_ranges() {
        let tuning = BurstTuning::default();
        let store = spawned(99, Vec2::new(10.0, 20.0), 2000);
        let physics = &tuning.physics;
        for p in store.particles() {
            let speed = p.speed();
            assert!(
                speed >= physics.speed.min - 1e-3 && speed <= physics.speed.max + 1e-3,
                "speed {speed} out of range"
            );
            assert!(physics.gravity.contains(p.gravity));
            assert!(physics.friction.contains(p.friction));
            assert!(p.friction > 0.0 && p.friction < 1.0);
            assert!(physics.scale.contains(p.scale));
            assert!(physics.rotation_speed.contains(p.rotation_speed));
            assert!((0.0..TAU).contains(&p.rotation));
            assert!(p.glyph < tuning.look.glyphs.len());
            assert!(p.accent < tuning.look.accents.len());
        }
    }

    #[test]
    fn test_spin_directions_and_palette_both_used() {
        let store = spawned(4242, Vec2::ZERO, 300);
        let particles = store.particles();
        assert!(particles.iter().any(|p| p.rotation_speed > 0.0));
        assert!(particles.iter().any(|p| p.rotation_speed < 0.0));
        for glyph in 0..4 {
            assert!(particles.iter().any(|p| p.glyph == glyph));
        }
        assert!(particles.iter().any(|p| p.accent == 0));
        assert!(particles.iter().any(|p| p.accent == 1));
    }

    #[test]
    fn test_burst_angles_are_uniform() {
        // Chi-square over 16 bins; 15 degrees of freedom, p = 0.001 cutoff is ~37.7
        const BINS: usize = 16;
        let store = spawned(2024, Vec2::ZERO, 32_000);
        let mut histogram = [0u32; BINS];
        for p in store.particles() {
            let (_, theta) = cartesian_to_polar(p.vel);
            let bin = ((wrap_angle(theta) / TAU) * BINS as f32) as usize;
            histogram[bin.min(BINS - 1)] += 1;
        }
        let expected = store.len() as f64 / BINS as f64;
        let chi2: f64 = histogram
            .iter()
            .map(|&observed| {
                let d = observed as f64 - expected;
                d * d / expected
            })
            .sum();
        assert!(chi2 < 37.7, "angle histogram not uniform: chi2 = {chi2}");
    }

    #[test]
    fn test_same_seed_same_burst() {
        let a = spawned(77, Vec2::ZERO, 64);
        let b = spawned(77, Vec2::ZERO, 64);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_gravity_accumulates_without_friction() {
        let mut store = spawned(8, Vec2::ZERO, 20);
        for p in store.particles.iter_mut() {
            p.friction = 1.0;
        }
        let before: Vec<Particle> = store.particles().to_vec();
        let n = 50;
        for _ in 0..n {
            store.advance();
        }
        for (p0, p) in before.iter().zip(store.particles()) {
            let expected = p0.vel.y + n as f32 * p0.gravity;
            assert!((p.vel.y - expected).abs() < 1e-3);
            assert!((p.vel.x - p0.vel.x).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sixty_tick_scenario() {
        let origin = Vec2::new(400.0, 300.0);
        let mut store = spawned(314159, origin, 300);
        let before: Vec<Particle> = store.particles().to_vec();
        for _ in 0..60 {
            store.advance();
        }
        assert_eq!(store.len(), 300);
        for (p0, p) in before.iter().zip(store.particles()) {
            let expected = wrap_angle(p0.rotation + 60.0 * p0.rotation_speed);
            let actual = wrap_angle(p.rotation);
            let diff = (expected - actual).abs();
            assert!(diff < 1e-3 || (TAU - diff) < 1e-3, "rotation drifted by {diff}");
            assert!(p.pos.distance(origin) > 1.0);
        }
        assert!(store.mean_distance_from(origin) > 50.0);
    }

    proptest! {
        #[test]
        fn damping_never_speeds_up(seed: u64, ticks in 1usize..40) {
            let mut store = spawned(seed, Vec2::ZERO, 16);
            for p in store.particles.iter_mut() {
                p.gravity = 0.0;
            }
            for _ in 0..ticks {
                let before: Vec<f32> = store.particles().iter().map(Particle::speed).collect();
                store.advance();
                for (speed0, p) in before.iter().zip(store.particles()) {
                    prop_assert!(p.speed() <= *speed0);
                }
            }
        }

        #[test]
        fn spawn_speed_tracks_custom_span(seed: u64, min in 0.0f32..10.0, width in 0.01f32..10.0) {
            let mut tuning = BurstTuning::default();
            tuning.physics.speed = Span::new(min, min + width);
            let mut store = ParticleStore::new();
            let mut rng = Pcg32::seed_from_u64(seed);
            store.spawn(Vec2::ZERO, 32, &tuning, &mut rng);
            for p in store.particles() {
                prop_assert!(p.speed() >= min - 1e-3 && p.speed() <= min + width + 1e-3);
            }
        }
    }
}
