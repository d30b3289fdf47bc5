use std::sync::Arc;

use crate::{
    analysis, render, timeline, FrameAmplitudes, PlaybackClock, RenderParameters, Result,
    WaveformError,
};

/// Decoded multichannel audio. All channels share the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wraps already deinterleaved channels.
    ///
    /// An empty buffer is accepted; every query against it yields silence.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(WaveformError::InvalidInput("sample rate must be non-zero"));
        }

        if let Some(first) = channels.first() {
            if channels.iter().any(|channel| channel.len() != first.len()) {
                return Err(WaveformError::InvalidInput(
                    "all channels must have the same length",
                ));
            }
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Single-channel convenience constructor.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// Splits interleaved frames (`L R L R ...`) into channels.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(WaveformError::InvalidInput(
                "interleaved audio needs at least one channel",
            ));
        }
        if samples.len() % channel_count != 0 {
            return Err(WaveformError::InvalidInput(
                "interleaved sample count is not a multiple of the channel count",
            ));
        }

        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, sample) in channels.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }

        Self::new(channels, sample_rate)
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / f64::from(self.sample_rate)
    }

    /// Arithmetic mean of all channels at `index`.
    ///
    /// Callers must keep `index < self.len()`.
    pub(crate) fn mono_at(&self, index: usize) -> f32 {
        let sum: f32 = self.channels.iter().map(|channel| channel[index]).sum();
        sum / self.channels.len() as f32
    }
}

/// Spread (standard deviation) of the mono signal, used to normalise every
/// envelope probe against the overall loudness of the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioScale(f64);

impl AudioScale {
    /// Fallback used when nothing could be measured.
    pub const NEUTRAL: Self = Self(1.0);

    /// Non-finite or non-positive values collapse to [`AudioScale::NEUTRAL`].
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self::NEUTRAL
        }
    }

    /// Estimates the scale of `buffer`, visiting every `stride_step`-th sample.
    pub fn compute(buffer: &AudioBuffer, stride_step: usize) -> Self {
        analysis::compute_scale(buffer, stride_step)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for AudioScale {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// High level façade over one decoded buffer.
///
/// The scale is computed once at construction and reused for every frame.
/// The engine holds no mutable state, so clones can render frames from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct WaveformEngine {
    buffer: Arc<AudioBuffer>,
    params: RenderParameters,
    scale: AudioScale,
}

impl WaveformEngine {
    pub fn new(buffer: impl Into<Arc<AudioBuffer>>, params: RenderParameters) -> Self {
        let buffer = buffer.into();
        let scale = AudioScale::compute(&buffer, params.scale_stride);
        tracing::debug!(
            samples = buffer.len(),
            channels = buffer.channel_count(),
            sample_rate = buffer.sample_rate(),
            scale = scale.value(),
            "waveform engine ready"
        );
        Self::with_scale(buffer, params, scale)
    }

    /// Reuses a scale computed elsewhere, e.g. cached alongside the buffer.
    pub fn with_scale(
        buffer: impl Into<Arc<AudioBuffer>>,
        params: RenderParameters,
        scale: AudioScale,
    ) -> Self {
        let out_of_range = params.out_of_range();
        if !out_of_range.is_empty() {
            tracing::warn!(fields = ?out_of_range, "render parameters outside documented ranges");
        }

        Self {
            buffer: buffer.into(),
            params,
            scale,
        }
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    pub fn params(&self) -> &RenderParameters {
        &self.params
    }

    pub fn scale(&self) -> AudioScale {
        self.scale
    }

    /// Bar amplitudes for the frame shown at `seconds`.
    ///
    /// With mirroring enabled, half as many bars are computed and reflected
    /// around the centre, so odd bar counts come back one bar shorter and
    /// rows of fewer than two bars come back empty.
    pub fn frame_at(&self, seconds: f64) -> FrameAmplitudes {
        if !self.params.mirror {
            return timeline::frame_amplitudes(&self.buffer, seconds, &self.params, self.scale);
        }

        let half = RenderParameters {
            bar_count: self.params.bar_count / 2,
            ..self.params.clone()
        };
        if half.bar_count == 0 {
            return FrameAmplitudes::new();
        }
        let amplitudes = timeline::frame_amplitudes(&self.buffer, seconds, &half, self.scale);
        render::mirror_amplitudes(&amplitudes)
    }

    /// Bar amplitudes for the frame at `clock`'s current position.
    pub fn frame_at_clock(&self, clock: &PlaybackClock) -> FrameAmplitudes {
        self.frame_at(clock.time_seconds())
    }

    /// Amplitudes with the centre-peak taper applied.
    pub fn heights_at(&self, seconds: f64) -> Vec<f32> {
        render::shape_amplitudes(&self.frame_at(seconds), self.params.center_peak_strength)
    }
}
