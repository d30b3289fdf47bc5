//! Core library for the waveform bar visualiser.
//!
//! Turns decoded audio into one row of bar amplitudes per output frame. Each
//! module owns one stage of the pipeline: envelope extraction (`analysis`),
//! page cross-fading over playback time (`timeline`), spatial taper and bar
//! layout (`render`), and whole-render precomputation (`record`). Everything
//! is synchronous and side-effect free over read-only audio.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod record;
pub mod render;
pub mod timeline;

pub use analysis::{build_page, compute_scale, sample_amplitude, sigmoid, EnvelopePage};
pub use audio::{AudioBuffer, AudioScale, WaveformEngine};
pub use config::{AppConfig, LayoutConfig, RenderParameters};
pub use error::{Result, WaveformError};
pub use record::{FrameSequence, Precomputer};
pub use render::{
    bar_width, center_peak_multiplier, mirror_amplitudes, shape_amplitudes, BarGeometry,
    BarLayout,
};
pub use timeline::{
    frame_amplitudes, frame_count, interpolate_linear, FrameAmplitudes, PageGeometry,
    PagePosition, PlaybackClock,
};
