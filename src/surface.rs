//! 2D drawing surface abstraction
//!
//! Mirrors the subset of a canvas 2D context the burst needs. Transform
//! state is only ever pushed through `TransformScope`, which guarantees the
//! matching restore even when a draw call fails part way.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// A 2D drawing surface with a save/restore transform stack
pub trait Surface2d {
    /// Error reported by a failed glyph draw
    type Error: fmt::Debug;

    /// Current backing size in pixels
    fn size(&self) -> (u32, u32);
    /// Resize the backing store. Clears whatever was painted.
    fn set_size(&mut self, width: u32, height: u32);

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, x: f64, y: f64);

    /// Set the font and centre the text on the local origin (both axes)
    fn set_font_params(&mut self, font: &str);
    fn set_fill_style(&mut self, color: &str);
    /// Draw `text` centred on the current origin
    fn fill_text_at_origin(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Clear the whole surface
    fn clear(&mut self) {
        let (w, h) = self.size();
        self.clear_rect(0.0, 0.0, w as f64, h as f64);
    }
}

/// Scoped transform: `save` on creation, `restore` on drop
pub struct TransformScope<'a, S: Surface2d + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface2d + ?Sized> TransformScope<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: Surface2d + ?Sized> Deref for TransformScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface2d + ?Sized> DerefMut for TransformScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface2d + ?Sized> Drop for TransformScope<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{DrawOp, RecordingSurface};

    #[test]
    fn test_scope_restores_on_drop() {
        let mut surface = RecordingSurface::new(10, 10);
        {
            let mut scope = TransformScope::new(&mut surface);
            scope.translate(1.0, 2.0);
            assert_eq!(scope.depth(), 1);
        }
        assert_eq!(surface.depth(), 0);
        assert_eq!(
            surface.ops(),
            &[DrawOp::Save, DrawOp::Translate(1.0, 2.0), DrawOp::Restore]
        );
    }

    #[test]
    fn test_scope_restores_on_early_return() {
        fn draw(surface: &mut RecordingSurface) -> Result<(), crate::headless::HeadlessError> {
            let mut scope = TransformScope::new(surface);
            scope.rotate(0.5);
            scope.fill_text_at_origin("x")?;
            scope.scale(2.0, 2.0);
            Ok(())
        }

        let mut surface = RecordingSurface::new(10, 10);
        surface.fail_text(true);
        assert!(draw(&mut surface).is_err());
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.ops().last(), Some(&DrawOp::Restore));
        assert!(!surface.ops().contains(&DrawOp::Scale(2.0, 2.0)));
    }

    #[test]
    fn test_default_clear_covers_surface() {
        let mut surface = RecordingSurface::new(640, 480);
        surface.clear();
        assert_eq!(surface.ops(), &[DrawOp::ClearRect(0.0, 0.0, 640.0, 480.0)]);
    }
}
