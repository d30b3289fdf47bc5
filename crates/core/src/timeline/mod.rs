use crate::{
    analysis::{build_page, sigmoid},
    AudioBuffer, AudioScale, RenderParameters,
};

/// Speedup anchors: (-6 dB, 0.5x) and (0 dB, 2x).
const QUIET_DB: f64 = -6.0;
const LOUD_DB: f64 = 0.0;
const MIN_SPEEDUP: f64 = 0.5;
const MAX_SPEEDUP: f64 = 2.0;
/// Keeps `log10` finite for silent pages.
const LOUDNESS_FLOOR: f64 = 1e-4;

/// Final per-bar values for one output frame.
pub type FrameAmplitudes = Vec<f32>;

/// Maps output frames to playback time. The frame index is explicit state,
/// never read from a host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    fps: u32,
    frame: u64,
}

impl PlaybackClock {
    pub fn new(fps: u32) -> Self {
        Self::at_frame(fps, 0)
    }

    pub fn at_frame(fps: u32, frame: u64) -> Self {
        Self { fps, frame }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Playback position in seconds. A zero fps clock stays at zero.
    pub fn time_seconds(&self) -> f64 {
        if self.fps == 0 {
            0.0
        } else {
            self.frame as f64 / f64::from(self.fps)
        }
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }

    pub fn advance(&mut self) {
        self.frame = self.frame.saturating_add(1);
    }
}

/// Number of frames needed to cover `duration_seconds` at `fps`.
pub fn frame_count(duration_seconds: f64, fps: u32) -> u64 {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return 0;
    }
    (duration_seconds * f64::from(fps)).ceil() as u64
}

/// Sample spacing derived from the render parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub bar_count: usize,
    /// Samples averaged per bar.
    pub window_size: usize,
    /// Samples between consecutive probe centres.
    pub stride: usize,
}

impl PageGeometry {
    /// Both sizes are floored to one sample, whatever the parameters.
    pub fn new(sample_rate: u32, params: &RenderParameters) -> Self {
        let bars = params.bar_count.max(1) as f64;
        let window = (f64::from(sample_rate) * params.window_seconds / bars).floor() as usize;
        let window_size = window.max(1);
        let stride = (window_size / params.oversample.max(1) as usize).max(1);

        Self {
            bar_count: params.bar_count,
            window_size,
            stride,
        }
    }

    /// Samples covered by one page.
    pub fn page_span(&self) -> usize {
        self.bar_count.max(1).saturating_mul(self.stride)
    }
}

/// Continuous page position split into the page it starts on and the progress
/// towards the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePosition {
    pub offset: i64,
    /// Always in `[0, 1)`.
    pub fraction: f64,
}

impl PagePosition {
    pub fn locate(seconds: f64, sample_rate: u32, geometry: &PageGeometry) -> Self {
        let seconds = if seconds.is_finite() { seconds } else { 0.0 };
        let sample = seconds * f64::from(sample_rate);
        let position = sample / geometry.stride as f64 / geometry.bar_count.max(1) as f64;

        let offset = position.floor();
        let fraction = (position - offset).clamp(0.0, 1.0 - f64::EPSILON);
        Self {
            offset: offset as i64,
            fraction,
        }
    }
}

/// Straight line through `(x1, y1)` and `(x2, y2)`, evaluated at `x`.
///
/// Undefined when `x1 == x2`.
pub fn interpolate_linear(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    y1 + (y2 - y1) * (x - x1) / (x2 - x1)
}

/// Cross-fade speed multiplier in `[0.5, 2]` driven by the loudest bar of the
/// upcoming page: quiet pages fade slowly, loud ones quickly.
pub fn loudness_speedup(page: &[f32]) -> f64 {
    let peak = page.iter().copied().fold(0.0_f32, f32::max);
    let max_db = 10.0 * (LOUDNESS_FLOOR + f64::from(peak)).log10();
    interpolate_linear(QUIET_DB, MIN_SPEEDUP, LOUD_DB, MAX_SPEEDUP, max_db)
        .clamp(MIN_SPEEDUP, MAX_SPEEDUP)
}

/// Weight of the second page, an S-curve over `fraction` centred on 0.5.
pub fn blend_weight(crossfade_speed: f64, speedup: f64, fraction: f64) -> f64 {
    sigmoid(crossfade_speed * speedup * (fraction - 0.5))
}

/// Amplitudes for the frame shown at `seconds`: the two pages surrounding the
/// position, blended with a loudness-adaptive sigmoid weight.
///
/// Pages are rebuilt from raw samples on every call, so identical inputs
/// always produce identical output.
pub fn frame_amplitudes(
    buffer: &AudioBuffer,
    seconds: f64,
    params: &RenderParameters,
    scale: AudioScale,
) -> FrameAmplitudes {
    let geometry = PageGeometry::new(buffer.sample_rate(), params);
    let position = PagePosition::locate(seconds, buffer.sample_rate(), &geometry);

    let page = |offset: i64| {
        build_page(
            buffer,
            offset,
            geometry.bar_count,
            geometry.stride,
            geometry.window_size,
            scale,
        )
    };
    let current = page(position.offset);
    let upcoming = page(position.offset.saturating_add(1));

    let speedup = loudness_speedup(&upcoming);
    let weight = blend_weight(params.crossfade_speed, speedup, position.fraction);

    current
        .iter()
        .zip(&upcoming)
        .map(|(&a, &b)| ((1.0 - weight) * f64::from(a) + weight * f64::from(b)) as f32)
        .collect()
}
