//! Celebration phases
//!
//! Presses fill the meter during `Setup`; reaching the target starts the
//! burst, and a fixed timeout later the card is revealed. Timers live in the
//! page glue; this type only decides transitions.

/// Current phase of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Collecting presses
    Setup,
    /// Burst mounted
    Explosion,
    /// Message card shown
    Reveal,
}

/// Result of a single press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Not in setup; nothing changed
    Ignored,
    /// Counted, meter not yet full
    Counted,
    /// Meter filled; now in `Explosion`
    Completed,
}

#[derive(Debug, Clone)]
pub struct Celebration {
    count: u32,
    target: u32,
    phase: Phase,
}

impl Celebration {
    /// A target of zero is treated as one press
    pub fn new(target: u32) -> Self {
        Self {
            count: 0,
            target: target.max(1),
            phase: Phase::Setup,
        }
    }

    pub fn press(&mut self) -> PressOutcome {
        if self.phase != Phase::Setup {
            return PressOutcome::Ignored;
        }

        self.count += 1;
        if self.count >= self.target {
            self.count = self.target;
            self.phase = Phase::Explosion;
            log::info!("Meter full after {} presses", self.count);
            PressOutcome::Completed
        } else {
            PressOutcome::Counted
        }
    }

    /// Burst timeout elapsed. Returns true if the card should now be shown.
    pub fn finish_explosion(&mut self) -> bool {
        if self.phase == Phase::Explosion {
            self.phase = Phase::Reveal;
            log::info!("Revealing card");
            true
        } else {
            false
        }
    }

    /// Meter fill in [0, 1]
    pub fn progress(&self) -> f32 {
        self.count as f32 / self.target as f32
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn target(&self) -> u32 {
        self.target
    }
}
