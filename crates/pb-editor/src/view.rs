//! Session view state and editor configuration.
//!
//! None of this is part of the document: view changes are never recorded
//! in history.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

// ─── Config ──────────────────────────────────────────────────────────────

/// Editor-wide settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo depth. `None` keeps history unbounded.
    pub history_limit: Option<usize>,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            zoom_min: 0.25,
            zoom_max: 2.0,
            zoom_step: 0.1,
        }
    }
}

impl EditorConfig {
    /// Parse settings, rejecting non-finite or inverted zoom bounds.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(text)?;
        let bounds = [config.zoom_min, config.zoom_max, config.zoom_step];
        if bounds.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(serde_json::Error::custom(
                "zoom_min, zoom_max and zoom_step must be positive numbers",
            ));
        }
        if config.zoom_min > config.zoom_max {
            return Err(serde_json::Error::custom(format!(
                "zoom_min ({}) is greater than zoom_max ({})",
                config.zoom_min, config.zoom_max
            )));
        }
        Ok(config)
    }
}

// ─── View ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Edit,
    /// Interactive affordances (selection, drops) are suppressed.
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl DeviceType {
    /// Canvas width in px; `None` = fill the viewport.
    pub fn canvas_width(self) -> Option<u32> {
        match self {
            DeviceType::Desktop => None,
            DeviceType::Tablet => Some(768),
            DeviceType::Mobile => Some(375),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub mode: ViewMode,
    pub device: DeviceType,
    zoom: f64,
    pub show_grid: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            mode: ViewMode::Edit,
            device: DeviceType::Desktop,
            zoom: 1.0,
            show_grid: true,
        }
    }
}

impl ViewSettings {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped to the configured range. An inverted
    /// range pins the zoom to `zoom_max`.
    pub fn set_zoom(&mut self, zoom: f64, config: &EditorConfig) {
        self.zoom = zoom.max(config.zoom_min).min(config.zoom_max);
    }

    pub fn zoom_in(&mut self, config: &EditorConfig) {
        self.set_zoom(self.zoom + config.zoom_step, config);
    }

    pub fn zoom_out(&mut self, config: &EditorConfig) {
        self.set_zoom(self.zoom - config.zoom_step, config);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    pub fn is_preview(&self) -> bool {
        self.mode == ViewMode::Preview
    }

    pub fn toggle_preview(&mut self) {
        self.mode = match self.mode {
            ViewMode::Edit => ViewMode::Preview,
            ViewMode::Preview => ViewMode::Edit,
        };
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
    }
}
