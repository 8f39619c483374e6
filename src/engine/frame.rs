//! One frame step: clear, paint, advance
//!
//! Free functions of (store, surface, style) so a single cycle can be run
//! and inspected without a display or a scheduler.

use crate::sim::{Particle, ParticleStore};
use crate::surface::{Surface2d, TransformScope};
use crate::tuning::Look;

/// Per-frame paint parameters, borrowed from the engine's tuning
#[derive(Debug, Clone, Copy)]
pub struct FrameStyle<'a> {
    /// CSS font shorthand, set once per frame
    pub font: &'a str,
    pub glyphs: &'a [String],
    pub accents: &'a [String],
}

impl<'a> FrameStyle<'a> {
    pub fn new(font: &'a str, look: &'a Look) -> Self {
        Self {
            font,
            glyphs: &look.glyphs,
            accents: &look.accents,
        }
    }
}

/// Paint every particle at its current state. Returns the glyphs drawn.
///
/// Each particle gets its own save/restore scope, so a failed draw still
/// leaves the transform stack balanced for the next one.
pub fn paint_particles<S: Surface2d + ?Sized>(
    surface: &mut S,
    particles: &[Particle],
    style: &FrameStyle<'_>,
) -> usize {
    let mut drawn = 0;
    for particle in particles {
        let (Some(glyph), Some(accent)) = (
            style.glyphs.get(particle.glyph),
            style.accents.get(particle.accent),
        ) else {
            continue;
        };

        match paint_particle(surface, particle, glyph, accent) {
            Ok(()) => drawn += 1,
            Err(e) => log::trace!("Glyph draw failed: {:?}", e),
        }
    }
    drawn
}

fn paint_particle<S: Surface2d + ?Sized>(
    surface: &mut S,
    particle: &Particle,
    glyph: &str,
    accent: &str,
) -> Result<(), S::Error> {
    let mut scope = TransformScope::new(surface);
    scope.translate(particle.pos.x as f64, particle.pos.y as f64);
    scope.rotate(particle.rotation as f64);
    scope.scale(particle.scale as f64, particle.scale as f64);
    scope.set_fill_style(accent);
    scope.fill_text_at_origin(glyph)
}

/// Run one full frame step. Painting always sees the pre-advance state.
pub fn frame_step<S: Surface2d + ?Sized>(
    store: &mut ParticleStore,
    surface: &mut S,
    style: &FrameStyle<'_>,
) -> usize {
    surface.clear();
    surface.set_font_params(style.font);
    let drawn = paint_particles(surface, store.particles(), style);
    store.advance();
    drawn
}
