//! Data-driven burst tuning
//!
//! Every randomized particle attribute is drawn from a `Span` so the physics
//! constants stay configuration rather than code. Loaded once per page from
//! LocalStorage (JSON), falling back to the built-in defaults.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Reasons a tuning table is rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("{name} span is invalid: min {min} / max {max}")]
    InvalidSpan { name: &'static str, min: f32, max: f32 },
    #[error("friction must stay inside (0, 1), got [{min}, {max})")]
    FrictionOutOfRange { min: f32, max: f32 },
    #[error("{0} palette is empty")]
    EmptyPalette(&'static str),
    #[error("particle count {count} exceeds the limit of {max}")]
    TooManyParticles { count: usize, max: usize },
    #[error("glyph size must be positive, got {0}")]
    InvalidGlyphSize(f32),
    #[error("malformed tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Half-open sampling range [min, max)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draw a value uniformly from the span. A collapsed span yields `min`.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }

    /// Whether `value` lies in [min, max] (closed, for float tolerance checks)
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, name: &'static str) -> Result<(), TuningError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(TuningError::InvalidSpan {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Per-particle physics ranges, sampled independently at spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsRanges {
    /// Initial speed (pixels/tick)
    pub speed: Span,
    /// Downward acceleration added to vy each tick
    pub gravity: Span,
    /// Multiplicative velocity damping per tick, inside (0, 1)
    pub friction: Span,
    /// Glyph scale multiplier
    pub scale: Span,
    /// Spin (radians/tick), usually symmetric around zero
    pub rotation_speed: Span,
}

impl Default for PhysicsRanges {
    fn default() -> Self {
        Self {
            speed: Span::new(5.0, 20.0),
            // Mixed gravity: some fall fast, some float like petals
            gravity: Span::new(0.03, 0.10),
            friction: Span::new(0.94, 0.98),
            scale: Span::new(0.7, 1.5),
            rotation_speed: Span::new(-0.075, 0.075),
        }
    }
}

/// How particles look on the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Look {
    /// Base glyph size in pixels (before per-particle scale)
    pub glyph_px: f32,
    pub font_family: String,
    pub glyphs: Vec<String>,
    /// CSS colours
    pub accents: Vec<String>,
}

impl Default for Look {
    fn default() -> Self {
        Self {
            glyph_px: DEFAULT_GLYPH_PX,
            font_family: "serif".to_string(),
            glyphs: ["🌹", "❤️", "💖", "✨"].iter().map(|g| g.to_string()).collect(),
            accents: vec![CRUSHED_BERRY.to_string(), RASPBERRY.to_string()],
        }
    }
}

impl Look {
    /// CSS font shorthand, e.g. "30px serif"
    pub fn font(&self) -> String {
        format!("{}px {}", self.glyph_px, self.font_family)
    }
}

/// Complete burst configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstTuning {
    /// Particles per burst (before density preferences)
    pub count: usize,
    pub physics: PhysicsRanges,
    pub look: Look,
}

impl Default for BurstTuning {
    fn default() -> Self {
        Self {
            count: DEFAULT_PARTICLE_COUNT,
            physics: PhysicsRanges::default(),
            look: Look::default(),
        }
    }
}

impl BurstTuning {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "heart_burst_tuning";

    /// Check the invariants the particle store relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.count > MAX_PARTICLE_COUNT {
            return Err(TuningError::TooManyParticles {
                count: self.count,
                max: MAX_PARTICLE_COUNT,
            });
        }

        let p = &self.physics;
        p.speed.check("speed")?;
        p.gravity.check("gravity")?;
        p.friction.check("friction")?;
        p.scale.check("scale")?;
        p.rotation_speed.check("rotation_speed")?;

        if p.speed.min < 0.0 {
            return Err(TuningError::InvalidSpan {
                name: "speed",
                min: p.speed.min,
                max: p.speed.max,
            });
        }

        // Samples land in [min, max), so max == 1.0 is fine unless the span is collapsed
        let f = p.friction;
        if f.min <= 0.0 || f.max > 1.0 || f.min >= 1.0 {
            return Err(TuningError::FrictionOutOfRange {
                min: f.min,
                max: f.max,
            });
        }

        if !(self.look.glyph_px.is_finite() && self.look.glyph_px > 0.0) {
            return Err(TuningError::InvalidGlyphSize(self.look.glyph_px));
        }
        if self.look.glyphs.is_empty() {
            return Err(TuningError::EmptyPalette("glyph"));
        }
        if self.look.accents.is_empty() {
            return Err(TuningError::EmptyPalette("accent"));
        }
        Ok(())
    }

    /// Parse and validate a JSON tuning table. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Copy of this tuning with a different particle count
    pub fn with_count(&self, count: usize) -> Self {
        Self {
            count,
            ..self.clone()
        }
    }

    /// Load tuning overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded burst tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = BurstTuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.count, 300);
        assert_eq!(tuning.look.font(), "30px serif");
        assert_eq!(tuning.look.accents.len(), 2);
    }

    #[test]
    fn test_friction_outside_unit_interval_rejected() {
        let mut tuning = BurstTuning::default();
        tuning.physics.friction = Span::new(0.9, 1.2);
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::FrictionOutOfRange { .. })
        ));

        tuning.physics.friction = Span::new(0.0, 0.5);
        assert!(tuning.validate().is_err());

        tuning.physics.friction = Span::new(1.0, 1.0);
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_inverted_span_rejected() {
        let mut tuning = BurstTuning::default();
        tuning.physics.scale = Span::new(2.0, 1.0);
        let err = tuning.validate().unwrap_err();
        assert!(err.to_string().contains("scale"));
    }

    #[test]
    fn test_empty_palette_rejected() {
        let mut tuning = BurstTuning::default();
        tuning.look.glyphs.clear();
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::EmptyPalette("glyph"))
        ));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning =
            BurstTuning::from_json(r#"{ "count": 42, "physics": { "speed": { "min": 1.0, "max": 2.0 } } }"#)
                .unwrap();
        assert_eq!(tuning.count, 42);
        assert_eq!(tuning.physics.speed, Span::new(1.0, 2.0));
        assert_eq!(tuning.physics.gravity, PhysicsRanges::default().gravity);
        assert_eq!(tuning.look, Look::default());
    }

    #[test]
    fn test_bad_json_reports_parse_error() {
        assert!(matches!(
            BurstTuning::from_json("{ count: "),
            Err(TuningError::Json(_))
        ));
        assert!(BurstTuning::from_json(r#"{ "count": -3 }"#).is_err());
    }

    #[test]
    fn test_oversized_count_rejected() {
        assert!(matches!(
            BurstTuning::from_json(r#"{ "count": 18446744073709551615 }"#),
            Err(TuningError::TooManyParticles { .. })
        ));
        assert!(BurstTuning::default().with_count(MAX_PARTICLE_COUNT + 1).validate().is_err());
        assert!(BurstTuning::default().with_count(MAX_PARTICLE_COUNT).validate().is_ok());
    }

    #[test]
    fn test_collapsed_span_yields_min() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(Span::new(0.5, 0.5).sample(&mut rng), 0.5);
    }

    proptest! {
        #[test]
        fn span_samples_stay_in_range(min in -100.0f32..100.0, width in 0.001f32..50.0, seed: u64) {
            let span = Span::new(min, min + width);
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..32 {
                let v = span.sample(&mut rng);
                prop_assert!(span.contains(v));
            }
        }
    }
}
