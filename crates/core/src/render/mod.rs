//! Spatial shaping and bar layout. Produces numbers only; drawing is left to
//! the host renderer.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::LayoutConfig;

/// Height multiplier in `[0, 1]` for bar `bar_index` of `total_bars`.
///
/// Blends a flat profile with a Hanning window: `strength = 0` leaves every
/// bar at 1, `strength = 1` takes the edges to 0 and the centre to 1.
/// Strength is clamped to `[0, 1]`, and rows of fewer than two bars are not
/// tapered at all.
pub fn center_peak_multiplier(bar_index: usize, total_bars: usize, strength: f32) -> f32 {
    if total_bars < 2 {
        return 1.0;
    }

    let strength = if strength.is_nan() {
        0.0
    } else {
        strength.clamp(0.0, 1.0)
    };
    let phase = 2.0 * PI * bar_index as f32 / (total_bars - 1) as f32;
    let hanning = 0.5 * (1.0 - phase.cos());
    (1.0 - strength) + strength * hanning
}

/// Applies [`center_peak_multiplier`] to every bar of a row.
pub fn shape_amplitudes(amplitudes: &[f32], strength: f32) -> Vec<f32> {
    let total = amplitudes.len();
    amplitudes
        .iter()
        .enumerate()
        .map(|(i, amplitude)| amplitude * center_peak_multiplier(i, total, strength))
        .collect()
}

/// Width of each bar so that bars, gaps and padding fill `total_width`.
///
/// Over-constrained inputs give a zero or negative width; this helper does
/// not validate them.
pub fn bar_width(total_width: f32, bar_count: usize, bar_gap: f32, padding: f32) -> f32 {
    let bars = bar_count as f32;
    (total_width - 2.0 * padding - bars * bar_gap) / bars
}

/// Reflects a row around the centre: `[a(n-1) .. a0, a0 .. a(n-1)]`.
pub fn mirror_amplitudes(amplitudes: &[f32]) -> Vec<f32> {
    amplitudes
        .iter()
        .rev()
        .chain(amplitudes.iter())
        .copied()
        .collect()
}

/// Placement of one bar and its reflection, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    /// Left edge.
    pub x: f32,
    pub width: f32,
    /// Extent above the baseline.
    pub height: f32,
    /// Extent below the baseline.
    pub reflection_height: f32,
}

/// Turns amplitude rows into bar geometry for a fixed canvas.
#[derive(Debug, Clone)]
pub struct BarLayout {
    layout: LayoutConfig,
    center_peak_strength: f32,
}

impl BarLayout {
    pub fn new(layout: LayoutConfig, center_peak_strength: f32) -> Self {
        Self {
            layout,
            center_peak_strength,
        }
    }

    /// Y coordinate bars grow away from.
    pub fn baseline(&self) -> f32 {
        self.layout.height / 2.0
    }

    pub fn max_bar_height(&self) -> f32 {
        self.layout.height * self.layout.max_bar_height_ratio
    }

    pub fn reflection_opacity(&self) -> f32 {
        self.layout.reflection_opacity
    }

    pub fn bars(&self, amplitudes: &[f32]) -> Vec<BarGeometry> {
        let total = amplitudes.len();
        let width = bar_width(
            self.layout.width,
            total,
            self.layout.bar_gap,
            self.layout.padding,
        );
        let max_height = self.max_bar_height();

        amplitudes
            .iter()
            .enumerate()
            .map(|(i, amplitude)| {
                let taper = center_peak_multiplier(i, total, self.center_peak_strength);
                let height = (amplitude * max_height * taper).max(self.layout.min_bar_height);
                BarGeometry {
                    x: self.layout.padding + i as f32 * (width + self.layout.bar_gap),
                    width,
                    height,
                    reflection_height: height,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_strength_is_flat() {
        for i in 0..10 {
            assert_eq!(center_peak_multiplier(i, 10, 0.0), 1.0);
        }
    }

    #[test]
    fn full_strength_peaks_in_the_centre() {
        assert!((center_peak_multiplier(2, 5, 1.0) - 1.0).abs() < 1e-3);
        assert!(center_peak_multiplier(0, 5, 1.0).abs() < 1e-3);
        assert!(center_peak_multiplier(4, 5, 1.0).abs() < 1e-3);
    }

    #[test]
    fn partial_strength_lifts_the_edges() {
        let edge = center_peak_multiplier(0, 10, 0.7);
        assert!(edge > 0.0 && edge < 1.0);
        assert!((edge - 0.3).abs() < 1e-6);
    }

    #[test]
    fn degenerate_rows_are_not_tapered() {
        assert_eq!(center_peak_multiplier(0, 1, 1.0), 1.0);
        assert_eq!(center_peak_multiplier(0, 0, 1.0), 1.0);
        assert_eq!(center_peak_multiplier(0, 8, f32::NAN), 1.0);
        assert!(center_peak_multiplier(0, 8, 5.0).abs() < 1e-6);
    }

    #[test]
    fn computes_bar_widths() {
        assert!((bar_width(1920.0, 10, 4.0, 80.0) - 172.0).abs() < 0.1);
        assert!((bar_width(1000.0, 10, 0.0, 0.0) - 100.0).abs() < 0.1);
        assert!(bar_width(100.0, 10, 20.0, 0.0) < 0.0);
    }

    #[test]
    fn mirrors_around_the_centre() {
        assert_eq!(
            mirror_amplitudes(&[0.1, 0.2, 0.3]),
            vec![0.3, 0.2, 0.1, 0.1, 0.2, 0.3]
        );
        assert!(mirror_amplitudes(&[]).is_empty());
    }

    #[test]
    fn shapes_whole_rows() {
        let shaped = shape_amplitudes(&[1.0; 5], 1.0);
        assert!(shaped[0].abs() < 1e-6);
        assert!((shaped[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn lays_out_bars_with_minimum_height() {
        let layout = BarLayout::new(LayoutConfig::default(), 0.0);
        let bars = layout.bars(&[0.0, 0.5, 1.0]);

        assert_eq!(layout.baseline(), 540.0);
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].x, 80.0);
        assert!((bars[1].x - (80.0 + bars[0].width + 4.0)).abs() < 1e-3);
        assert_eq!(bars[0].height, 2.0);
        assert!((bars[2].height - layout.max_bar_height()).abs() < 1e-3);
        assert_eq!(bars[1].reflection_height, bars[1].height);
    }
}
