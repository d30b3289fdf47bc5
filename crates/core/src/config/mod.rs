use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub render: RenderParameters,
    pub layout: LayoutConfig,
    pub fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            render: RenderParameters::default(),
            layout: LayoutConfig::default(),
            fps: 30,
        }
    }
}

impl AppConfig {
    /// Parses a JSON document. Missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Parameters that drive the envelope and cross-fade pipeline.
///
/// Values are expected to be validated upstream. The pipeline never rejects
/// them: sizes derived from out-of-range values are floored to one sample and
/// the cross-fade speedup is clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParameters {
    /// Number of bars in a row. Powers of two are preferred.
    pub bar_count: usize,
    /// Seconds of audio spanned by one page.
    pub window_seconds: f64,
    /// Steepness of the sigmoid blend between adjacent pages.
    pub crossfade_speed: f64,
    /// Envelope window size relative to the probe stride.
    pub oversample: u32,
    /// 0 keeps all bars equal, 1 applies a full Hanning taper.
    pub center_peak_strength: f32,
    /// Decimation step used when estimating the audio scale.
    pub scale_stride: usize,
    /// Compute half the bars and mirror them around the centre.
    pub mirror: bool,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            bar_count: 64,
            window_seconds: 0.5,
            crossfade_speed: 6.0,
            oversample: 4,
            center_peak_strength: 0.7,
            scale_stride: 16,
            mirror: false,
        }
    }
}

impl RenderParameters {
    /// Names of the fields that sit outside their documented ranges.
    pub fn out_of_range(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if !(8..=256).contains(&self.bar_count) {
            fields.push("bar_count");
        }
        if !(0.1..=2.0).contains(&self.window_seconds) {
            fields.push("window_seconds");
        }
        if !(0.5..=10.0).contains(&self.crossfade_speed) {
            fields.push("crossfade_speed");
        }
        if !(1..=8).contains(&self.oversample) {
            fields.push("oversample");
        }
        if !(0.0..=1.0).contains(&self.center_peak_strength) {
            fields.push("center_peak_strength");
        }
        if self.scale_stride == 0 {
            fields.push("scale_stride");
        }
        fields
    }
}

/// Canvas geometry used to turn amplitudes into bar sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub bar_gap: f32,
    /// Horizontal padding on each side.
    pub padding: f32,
    /// Tallest bar as a fraction of the canvas height.
    pub max_bar_height_ratio: f32,
    /// Bars never shrink below this so silence stays visible.
    pub min_bar_height: f32,
    pub reflection_opacity: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            bar_gap: 4.0,
            padding: 80.0,
            max_bar_height_ratio: 0.42,
            min_bar_height: 2.0,
            reflection_opacity: 0.3,
        }
    }
}
