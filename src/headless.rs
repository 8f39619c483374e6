//! In-memory host for native runs and tests
//!
//! `RecordingSurface` logs every draw call instead of rasterizing, and
//! `HeadlessHost` hands out frame handles and resize tokens from a shared
//! ledger so callers can see exactly what a mounted engine left behind.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::engine::Host;
use crate::surface::Surface2d;

/// Simulated draw failure
#[derive(Debug, Error, PartialEq, Eq)]
#[error("glyph draw rejected by headless surface")]
pub struct HeadlessError;

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    ClearRect(f64, f64, f64, f64),
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
    Font(String),
    FillStyle(String),
    FillText(String),
}

/// Surface that records draw calls since the last full clear
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
    depth: usize,
    max_depth: usize,
    full_clears: u64,
    resizes: u64,
    fail_text: bool,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            depth: 0,
            max_depth: 0,
            full_clears: 0,
            resizes: 0,
            fail_text: false,
        }
    }

    /// Draw calls since the last full-surface clear
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Current save/restore nesting
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest nesting seen so far
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn full_clears(&self) -> u64 {
        self.full_clears
    }

    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    /// Make every subsequent `fill_text_at_origin` fail
    pub fn fail_text(&mut self, fail: bool) {
        self.fail_text = fail;
    }

    /// Number of recorded ops matching `pred`
    pub fn count_ops(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Surface2d for RecordingSurface {
    type Error = HeadlessError;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        // Same as a canvas: resizing wipes pixels and transform state
        self.width = width;
        self.height = height;
        self.ops.clear();
        self.depth = 0;
        self.resizes += 1;
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let full = x <= 0.0 && y <= 0.0 && width >= self.width as f64 && height >= self.height as f64;
        if full {
            self.ops.clear();
            self.full_clears += 1;
        }
        self.ops.push(DrawOp::ClearRect(x, y, width, height));
    }

    fn save(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::Translate(x, y));
    }

    fn rotate(&mut self, radians: f64) {
        self.ops.push(DrawOp::Rotate(radians));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::Scale(x, y));
    }

    fn set_font_params(&mut self, font: &str) {
        self.ops.push(DrawOp::Font(font.to_string()));
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ops.push(DrawOp::FillStyle(color.to_string()));
    }

    fn fill_text_at_origin(&mut self, text: &str) -> Result<(), HeadlessError> {
        if self.fail_text {
            return Err(HeadlessError);
        }
        self.ops.push(DrawOp::FillText(text.to_string()));
        Ok(())
    }
}

/// Host-side bookkeeping shared between a `HeadlessHost` and its creator
#[derive(Debug, Default)]
pub struct HostLedger {
    /// Viewport reported to the engine; change it then call `on_resize`
    pub viewport: (u32, u32),
    /// Frame requests neither fired nor cancelled
    pub pending_frames: Vec<u32>,
    /// Registered resize listeners
    pub resize_listeners: Vec<u32>,
    pub frames_requested: u64,
    pub frames_cancelled: u64,
    next_id: u32,
}

impl HostLedger {
    fn issue(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Pop the oldest pending frame request, as a display refresh would
    pub fn fire_next(&mut self) -> Option<u32> {
        if self.pending_frames.is_empty() {
            None
        } else {
            Some(self.pending_frames.remove(0))
        }
    }
}

/// Host with no display; frames fire only when the caller says so
pub struct HeadlessHost {
    ledger: Rc<RefCell<HostLedger>>,
    surface: Option<RecordingSurface>,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ledger: Rc::new(RefCell::new(HostLedger {
                viewport: (width, height),
                ..Default::default()
            })),
            surface: Some(RecordingSurface::new(0, 0)),
        }
    }

    /// A host that cannot provide a drawing context
    pub fn without_surface(width: u32, height: u32) -> Self {
        Self {
            surface: None,
            ..Self::new(width, height)
        }
    }

    pub fn ledger(&self) -> Rc<RefCell<HostLedger>> {
        Rc::clone(&self.ledger)
    }

    pub fn recording(&self) -> Option<&RecordingSurface> {
        self.surface.as_ref()
    }
}

impl Host for HeadlessHost {
    type Surface = RecordingSurface;
    type FrameHandle = u32;
    type ResizeToken = u32;

    fn viewport_size(&self) -> (u32, u32) {
        self.ledger.borrow().viewport
    }

    fn surface(&mut self) -> Option<&mut RecordingSurface> {
        self.surface.as_mut()
    }

    fn request_frame(&mut self) -> Option<u32> {
        let mut ledger = self.ledger.borrow_mut();
        let id = ledger.issue();
        ledger.pending_frames.push(id);
        ledger.frames_requested += 1;
        Some(id)
    }

    fn cancel_frame(&mut self, handle: u32) {
        let mut ledger = self.ledger.borrow_mut();
        let before = ledger.pending_frames.len();
        ledger.pending_frames.retain(|&id| id != handle);
        if ledger.pending_frames.len() != before {
            ledger.frames_cancelled += 1;
        }
    }

    fn listen_resize(&mut self) -> Option<u32> {
        let mut ledger = self.ledger.borrow_mut();
        let id = ledger.issue();
        ledger.resize_listeners.push(id);
        Some(id)
    }

    fn unlisten_resize(&mut self, token: u32) {
        self.ledger
            .borrow_mut()
            .resize_listeners
            .retain(|&id| id != token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_tracks_requests_and_cancels() {
        let mut host = HeadlessHost::new(100, 100);
        let ledger = host.ledger();
        let a = host.request_frame().unwrap();
        let b = host.request_frame().unwrap();
        assert_ne!(a, b);
        host.cancel_frame(a);
        // Cancelling twice is harmless
        host.cancel_frame(a);
        assert_eq!(ledger.borrow().pending_frames, vec![b]);
        assert_eq!(ledger.borrow().frames_cancelled, 1);
        assert_eq!(ledger.borrow_mut().fire_next(), Some(b));
        assert_eq!(ledger.borrow_mut().fire_next(), None);
    }

    #[test]
    fn test_resize_wipes_recording() {
        let mut surface = RecordingSurface::new(10, 10);
        surface.save();
        surface.translate(1.0, 1.0);
        surface.set_size(20, 30);
        assert_eq!(surface.size(), (20, 30));
        assert!(surface.ops().is_empty());
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.resizes(), 1);
    }

    #[test]
    fn test_partial_clear_keeps_history() {
        let mut surface = RecordingSurface::new(10, 10);
        surface.save();
        surface.clear_rect(0.0, 0.0, 5.0, 5.0);
        assert_eq!(surface.ops().len(), 2);
        assert_eq!(surface.full_clears(), 0);
    }

    #[test]
    fn test_without_surface() {
        let mut host = HeadlessHost::without_surface(800, 600);
        assert!(host.surface().is_none());
        assert_eq!(host.viewport_size(), (800, 600));
    }
}
