//! Display preferences
//!
//! Read from LocalStorage separately from the tuning table.

use serde::{Deserialize, Serialize};

/// Burst density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Density {
    Sparse,
    #[default]
    Standard,
    Lush,
}

impl Density {
    /// Scale a base particle count for this preset
    pub fn scale_count(&self, base: usize) -> usize {
        match self {
            Density::Sparse => base / 3,
            Density::Standard => base,
            Density::Lush => base.saturating_mul(2),
        }
    }
}

/// User display preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How many particles a burst uses
    pub density: Density,
    /// Skip the burst entirely (empty animation, card still revealed)
    pub reduced_motion: bool,
}

impl Settings {
    /// Effective particle count for a burst
    pub fn particle_count(&self, base: usize) -> usize {
        if self.reduced_motion {
            0
        } else {
            self.density.scale_count(base)
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "heart_burst_settings";

    /// Load settings from LocalStorage, honouring prefers-reduced-motion (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let window = web_sys::window();
        let storage = window
            .as_ref()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let mut settings = Self::default();
        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(saved) => {
                        log::info!("Loaded settings from LocalStorage");
                        settings = saved;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        let prefers_reduced = window
            .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
            .map(|query| query.matches())
            .unwrap_or(false);
        if prefers_reduced && !settings.reduced_motion {
            log::info!("System prefers reduced motion");
            settings.reduced_motion = true;
        }

        settings
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
