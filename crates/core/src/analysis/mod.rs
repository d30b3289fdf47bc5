//! Envelope extraction: per-bar loudness from raw samples.

use crate::{AudioBuffer, AudioScale};

/// Gain applied to the rectified mean before the logistic compressor.
const COMPRESSOR_GAIN: f64 = 2.5;
/// Output scale of the compressor, so a saturated bar reaches 0.95.
const COMPRESSOR_SCALE: f64 = 1.9;
/// Variance floor used by the scale estimate.
const VARIANCE_FLOOR: f64 = 1e-10;

/// One row of per-bar amplitudes for a single integer page offset.
pub type EnvelopePage = Vec<f32>;

/// Logistic function `1 / (1 + e^-x)`.
///
/// `sigmoid(0.0)` is exactly `0.5`. For very large magnitudes the result
/// saturates to `0.0` or `1.0` in floating point.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Loudness of the window of `window_size` samples centred on
/// `center_sample`, in `[0, 0.95]`.
///
/// The window is clamped to the buffer, so probes before the start or past
/// the end simply see fewer (or no) samples. An empty window yields `0.0`.
/// Samples are downmixed to mono and divided by `scale`; only positive
/// excursions contribute to the mean.
pub fn sample_amplitude(
    buffer: &AudioBuffer,
    center_sample: i64,
    window_size: usize,
    scale: AudioScale,
) -> f32 {
    let window = i64::try_from(window_size).unwrap_or(i64::MAX);
    let len = i64::try_from(buffer.len()).unwrap_or(i64::MAX);

    let first = center_sample.saturating_sub(window / 2);
    let start = first.clamp(0, len);
    let end = first.saturating_add(window).clamp(0, len);
    if end <= start {
        return 0.0;
    }

    let scale = scale.value();
    let mut sum = 0.0_f64;
    for index in start as usize..end as usize {
        let normalized = f64::from(buffer.mono_at(index)) / scale;
        if normalized > 0.0 {
            sum += normalized;
        }
    }

    let mean = sum / (end - start) as f64;
    let amplitude = COMPRESSOR_SCALE * (sigmoid(COMPRESSOR_GAIN * mean) - 0.5);
    amplitude.max(0.0) as f32
}

/// Population standard deviation of the mono downmix, visiting every
/// `stride_step`-th sample.
///
/// An empty buffer yields [`AudioScale::NEUTRAL`].
pub fn compute_scale(buffer: &AudioBuffer, stride_step: usize) -> AudioScale {
    let mut count = 0_usize;
    let mut sum = 0.0_f64;
    let mut sum_sq = 0.0_f64;

    for index in (0..buffer.len()).step_by(stride_step.max(1)) {
        let value = f64::from(buffer.mono_at(index));
        sum += value;
        sum_sq += value * value;
        count += 1;
    }

    if count == 0 {
        return AudioScale::NEUTRAL;
    }

    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64 - mean * mean).max(VARIANCE_FLOOR);
    AudioScale::new(variance.sqrt())
}

/// Builds the page at `page_offset`: `bar_count` envelope probes spaced
/// `stride` samples apart, starting at sample
/// `page_offset * bar_count * stride`.
pub fn build_page(
    buffer: &AudioBuffer,
    page_offset: i64,
    bar_count: usize,
    stride: usize,
    window_size: usize,
    scale: AudioScale,
) -> EnvelopePage {
    let bars = i64::try_from(bar_count).unwrap_or(i64::MAX);
    let stride = i64::try_from(stride).unwrap_or(i64::MAX);
    let first_bar = page_offset.saturating_mul(bars);

    (0..bars)
        .map(|bar| {
            let center = first_bar.saturating_add(bar).saturating_mul(stride);
            sample_amplitude(buffer, center, window_size, scale)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use proptest::prelude::*;

    use super::*;

    fn mono(samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::mono(samples, 44_100).unwrap()
    }

    fn sine(len: usize) -> AudioBuffer {
        mono(
            (0..len)
                .map(|i| (2.0 * PI * 440.0 * i as f32 / 44_100.0).sin())
                .collect(),
        )
    }

    #[test]
    fn sigmoid_of_zero_is_exactly_half() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(100.0) - 1.0).abs() < 1e-3);
        assert!(sigmoid(-100.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn sigmoid_stays_in_open_unit_interval(x in -30.0_f64..30.0) {
            let y = sigmoid(x);
            prop_assert!(y > 0.0 && y < 1.0);
        }

        #[test]
        fn sigmoid_is_monotonic(a in -30.0_f64..30.0, delta in 0.001_f64..10.0) {
            prop_assert!(sigmoid(a + delta) > sigmoid(a));
        }
    }

    #[test]
    fn silence_has_zero_amplitude_everywhere() {
        let buffer = mono(vec![0.0; 1000]);
        let scale = compute_scale(&buffer, 1);

        for center in [-500, 0, 500, 999, 5000] {
            assert_eq!(sample_amplitude(&buffer, center, 100, scale), 0.0);
        }
    }

    #[test]
    fn constant_signal_is_positive_and_bounded() {
        let buffer = mono(vec![1.0; 1000]);
        let scale = compute_scale(&buffer, 1);
        let amplitude = sample_amplitude(&buffer, 500, 100, scale);

        assert!(amplitude > 0.0);
        assert!(amplitude <= 1.0);
    }

    #[test]
    fn out_of_range_centres_degrade_to_zero() {
        let buffer = mono(vec![0.5; 100]);
        let scale = compute_scale(&buffer, 1);

        assert_eq!(sample_amplitude(&buffer, -50, 10, scale), 0.0);
        assert_eq!(sample_amplitude(&buffer, 200, 10, scale), 0.0);
        assert_eq!(sample_amplitude(&buffer, i64::MIN, usize::MAX, scale), 0.0);

        // Partially overlapping windows still see the in-range samples.
        let edge = sample_amplitude(&buffer, -50, 200, scale);
        assert!(edge.is_finite());
        assert!(edge > 0.0);
    }

    #[test]
    fn negative_excursions_are_discarded() {
        let buffer = mono(vec![-1.0; 200]);
        assert_eq!(sample_amplitude(&buffer, 100, 50, AudioScale::NEUTRAL), 0.0);
    }

    #[test]
    fn louder_windows_map_higher() {
        let mut samples = vec![0.05_f32; 500];
        samples.extend(vec![0.8_f32; 500]);
        let buffer = mono(samples);
        let scale = compute_scale(&buffer, 1);

        let quiet = sample_amplitude(&buffer, 250, 100, scale);
        let loud = sample_amplitude(&buffer, 750, 100, scale);
        assert!(loud > quiet);
    }

    #[test]
    fn sine_scale_is_close_to_rms() {
        let buffer = sine(44_100);

        let full = compute_scale(&buffer, 1).value();
        assert!(full > 0.5 && full < 1.0);
        assert!((full - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.01);

        let decimated = compute_scale(&buffer, 16).value();
        assert!(decimated > 0.5 && decimated < 1.0);
    }

    #[test]
    fn near_silence_has_small_scale() {
        let buffer = mono(vec![0.001; 1000]);
        assert!(compute_scale(&buffer, 1).value() < 0.01);
    }

    #[test]
    fn empty_buffer_scale_is_neutral() {
        let buffer = AudioBuffer::new(Vec::new(), 48_000).unwrap();
        assert_eq!(compute_scale(&buffer, 4), AudioScale::NEUTRAL);
        assert_eq!(compute_scale(&buffer, 0).value(), 1.0);
    }

    #[test]
    fn pages_probe_consecutive_strides() {
        // Loud only between samples 400 and 600.
        let mut samples = vec![0.0_f32; 1000];
        samples[400..600].iter_mut().for_each(|s| *s = 1.0);
        let buffer = mono(samples);
        let scale = compute_scale(&buffer, 1);

        let page = build_page(&buffer, 0, 10, 50, 20, scale);
        assert_eq!(page.len(), 10);
        assert_eq!(page[0], 0.0);
        assert!(page[9] > 0.0, "bar 9 is centred on sample 450");

        let next = build_page(&buffer, 1, 10, 50, 20, scale);
        assert!(next[0] > 0.0, "page 1 starts at sample 500");
        assert_eq!(next[9], 0.0);
    }

    #[test]
    fn pages_past_the_end_are_silent() {
        let buffer = mono(vec![1.0; 100]);
        let page = build_page(&buffer, 50, 8, 10, 10, AudioScale::NEUTRAL);
        assert!(page.iter().all(|&value| value == 0.0));
    }
}
