// Display and personalization settings
//
// Scale, fullscreen and wallpaper live for the process only.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_WALLPAPER: &str =
    "https://images.unsplash.com/photo-1633167606207-d840b5070fc2?q=100";
pub const SCALE_MIN: f64 = 0.8;
pub const SCALE_MAX: f64 = 1.2;
pub const SCALE_STEP: f64 = 0.05;
pub const BASE_FONT_PX: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsTab {
    Personalization,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FullscreenMode {
    Windowed,
    /// The host window is really fullscreen
    Native,
    /// The host refused; the desktop only covers the page
    Pseudo,
}

impl FullscreenMode {
    pub fn is_fullscreen(self) -> bool {
        !matches!(self, FullscreenMode::Windowed)
    }
}

/// Host window that may or may not allow fullscreen.
pub trait FullscreenHost {
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), String>;
}

/// Handle for one in-flight wallpaper request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallpaperTicket(u64);

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    scale: f64,
    tab: SettingsTab,
    fullscreen: FullscreenMode,
    wallpaper: String,
    generating: bool,
    #[serde(skip)]
    next_ticket: u64,
}

impl Settings {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            tab: SettingsTab::Personalization,
            fullscreen: FullscreenMode::Windowed,
            wallpaper: DEFAULT_WALLPAPER.to_string(),
            generating: false,
            next_ticket: 0,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn font_size(&self) -> f64 {
        BASE_FONT_PX * self.scale
    }

    /// Clamped to the slider range and snapped to its step.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return self.scale;
        }
        let clamped = scale.clamp(SCALE_MIN, SCALE_MAX);
        let steps = ((clamped - SCALE_MIN) / SCALE_STEP).round();
        // Round away float noise so 0.8 + 3 * 0.05 reads back as 0.95
        self.scale = ((SCALE_MIN + steps * SCALE_STEP) * 100.0).round() / 100.0;
        self.scale
    }

    pub fn tab(&self) -> SettingsTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: SettingsTab) {
        self.tab = tab;
    }

    pub fn fullscreen(&self) -> FullscreenMode {
        self.fullscreen
    }

    /// Never fails: a refused native request falls back to pseudo-fullscreen.
    pub fn toggle_fullscreen(&mut self, host: &mut dyn FullscreenHost) -> FullscreenMode {
        self.fullscreen = match self.fullscreen {
            FullscreenMode::Windowed => match host.set_fullscreen(true) {
                Ok(()) => FullscreenMode::Native,
                Err(e) => {
                    warn!("Native full-screen disallowed: {}. Using pseudo-fullscreen instead.", e);
                    FullscreenMode::Pseudo
                }
            },
            FullscreenMode::Native => {
                if let Err(e) = host.set_fullscreen(false) {
                    warn!("Failed to exit full-screen: {}", e);
                }
                FullscreenMode::Windowed
            }
            FullscreenMode::Pseudo => FullscreenMode::Windowed,
        };
        self.fullscreen
    }

    pub fn wallpaper(&self) -> &str {
        &self.wallpaper
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Returns a ticket when a request should be sent, `None` for an empty
    /// prompt or while another request is in flight.
    pub fn begin_wallpaper_generation(&mut self, prompt: &str) -> Option<WallpaperTicket> {
        if prompt.trim().is_empty() || self.generating {
            return None;
        }
        self.generating = true;
        self.next_ticket += 1;
        Some(WallpaperTicket(self.next_ticket))
    }

    /// Apply a finished request. Failures leave the wallpaper untouched.
    pub fn finish_wallpaper_generation<E: std::fmt::Display>(
        &mut self,
        ticket: WallpaperTicket,
        result: Result<String, E>,
    ) -> bool {
        if ticket.0 != self.next_ticket || !self.generating {
            return false;
        }
        self.generating = false;
        match result {
            Ok(image) => {
                info!("Wallpaper updated");
                self.wallpaper = image;
                true
            }
            Err(e) => {
                warn!("Wallpaper generation failed: {}", e);
                false
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}
