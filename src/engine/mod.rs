//! Render loop driver
//!
//! Owns the host (drawing surface, viewport, frame scheduler, resize
//! events), spawns the burst once per mount and keeps a single display
//! refresh callback armed until teardown.

pub mod frame;

use std::fmt;

use glam::Vec2;
use rand::Rng;
use thiserror::Error;

use crate::sim::ParticleStore;
use crate::surface::Surface2d;
use crate::tuning::{BurstTuning, Look};

pub use frame::{FrameStyle, frame_step, paint_particles};

/// Engine failures surfaced to the embedder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("host could not provide a 2D drawing context")]
    NoDrawingContext,
}

/// Everything the driver needs from its environment
pub trait Host {
    type Surface: Surface2d;
    /// Handle of one scheduled display-refresh callback
    type FrameHandle: Copy + fmt::Debug;
    /// Registration of the viewport resize listener
    type ResizeToken: fmt::Debug;

    /// Current viewport in pixels, read straight from the environment
    fn viewport_size(&self) -> (u32, u32);
    /// The drawing surface, if a 2D context could be obtained
    fn surface(&mut self) -> Option<&mut Self::Surface>;

    /// Schedule one callback for the next display refresh
    fn request_frame(&mut self) -> Option<Self::FrameHandle>;
    fn cancel_frame(&mut self, handle: Self::FrameHandle);

    fn listen_resize(&mut self) -> Option<Self::ResizeToken>;
    fn unlisten_resize(&mut self, token: Self::ResizeToken);
}

/// Owner of the fire-once frame callback.
///
/// At most one request is outstanding; its handle is held here until the
/// callback fires or the loop is cancelled.
#[derive(Debug)]
pub struct FrameLoop<T> {
    pending: Option<T>,
    fired: u64,
}

impl<T: Copy + fmt::Debug> FrameLoop<T> {
    pub fn new() -> Self {
        Self {
            pending: None,
            fired: 0,
        }
    }

    /// Request the next frame, replacing any outstanding request
    pub fn arm<H: Host<FrameHandle = T>>(&mut self, host: &mut H) -> bool {
        if let Some(old) = self.pending.take() {
            host.cancel_frame(old);
        }
        self.pending = host.request_frame();
        if self.pending.is_none() {
            log::warn!("Host refused to schedule a frame; burst loop stopped");
        }
        self.pending.is_some()
    }

    /// Consume the outstanding request because its callback is running.
    /// Returns false for a callback the loop no longer owns.
    pub fn fire(&mut self) -> bool {
        match self.pending.take() {
            Some(_) => {
                self.fired += 1;
                true
            }
            None => false,
        }
    }

    pub fn cancel<H: Host<FrameHandle = T>>(&mut self, host: &mut H) {
        if let Some(handle) = self.pending.take() {
            log::trace!("Cancelling frame {:?}", handle);
            host.cancel_frame(handle);
        }
    }

    pub fn pending(&self) -> Option<T> {
        self.pending
    }

    /// Callbacks that have run so far
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

impl<T: Copy + fmt::Debug> Default for FrameLoop<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A mounted particle burst.
///
/// Mounting sizes the surface, spawns the burst at its centre, registers the
/// resize listener and arms the first frame. Unmounting (or dropping)
/// cancels the pending frame and removes the listener.
pub struct ParticleEngine<H: Host> {
    host: H,
    store: ParticleStore,
    look: Look,
    font: String,
    origin: Vec2,
    frame_loop: FrameLoop<H::FrameHandle>,
    resize_token: Option<H::ResizeToken>,
    mounted: bool,
}

impl<H: Host> ParticleEngine<H> {
    /// Mount a burst of `tuning.count` particles on `host`.
    ///
    /// Fails without registering anything when the host has no drawing
    /// context.
    pub fn mount<R: Rng + ?Sized>(
        mut host: H,
        tuning: &BurstTuning,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        if host.surface().is_none() {
            log::warn!("No 2D drawing context; skipping burst");
            return Err(EngineError::NoDrawingContext);
        }

        let resize_token = host.listen_resize();
        if resize_token.is_none() {
            log::warn!("Resize listener not registered; surface size is fixed");
        }

        let mut engine = Self {
            host,
            store: ParticleStore::new(),
            look: tuning.look.clone(),
            font: tuning.look.font(),
            origin: Vec2::ZERO,
            frame_loop: FrameLoop::new(),
            resize_token,
            mounted: true,
        };

        engine.resize_surface();
        let (w, h) = engine.surface_size();
        engine.origin = Vec2::new(w as f32 / 2.0, h as f32 / 2.0);

        engine
            .store
            .spawn(engine.origin, tuning.count, tuning, rng);

        log::info!(
            "Burst mounted: {} particles from ({:.0}, {:.0}) on {}x{}",
            engine.store.len(),
            engine.origin.x,
            engine.origin.y,
            w,
            h
        );

        engine.frame_loop.arm(&mut engine.host);
        Ok(engine)
    }

    /// Viewport changed: match the surface to it. Particles are untouched.
    pub fn on_resize(&mut self) {
        self.resize_surface();
    }

    fn resize_surface(&mut self) {
        let (w, h) = self.host.viewport_size();
        if let Some(surface) = self.host.surface() {
            surface.set_size(w, h);
            log::debug!("Burst surface resized to {}x{}", w, h);
        }
    }

    fn surface_size(&mut self) -> (u32, u32) {
        self.host.surface().map(|s| s.size()).unwrap_or((0, 0))
    }

    /// Display refresh callback: one frame step, then re-arm
    pub fn on_frame(&mut self) {
        if !self.frame_loop.fire() {
            log::trace!("Ignoring frame callback the loop does not own");
            return;
        }

        let style = FrameStyle::new(&self.font, &self.look);
        if let Some(surface) = self.host.surface() {
            let drawn = frame_step(&mut self.store, surface, &style);
            log::trace!("Frame {}: {} glyphs", self.frame_loop.fired(), drawn);
        }

        self.frame_loop.arm(&mut self.host);
    }

    /// Stop the loop and release host registrations
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.frame_loop.cancel(&mut self.host);
        if let Some(token) = self.resize_token.take() {
            self.host.unlisten_resize(token);
        }
        log::info!("Burst unmounted after {} frames", self.frame_loop.fired());
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Burst origin (surface centre at mount time)
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn pending_frame(&self) -> Option<H::FrameHandle> {
        self.frame_loop.pending()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_loop.fired()
    }
}

impl<H: Host> Drop for ParticleEngine<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
