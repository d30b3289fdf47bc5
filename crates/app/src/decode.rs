//! WAV decoding into an [`AudioBuffer`].

use std::path::Path;

use waveform_bars_core::{AudioBuffer, Result, WaveformError};

pub fn load_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = hound::WavReader::open(path).map_err(wav_error)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(wav_error)?,
        hound::SampleFormat::Int => {
            let full_scale = (1_u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / full_scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(wav_error)?
        }
    };

    tracing::info!(
        ?path,
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        bits = spec.bits_per_sample,
        "decoded wav"
    );

    AudioBuffer::from_interleaved(&samples, usize::from(spec.channels), spec.sample_rate)
}

fn wav_error(err: hound::Error) -> WaveformError {
    WaveformError::msg(format!("WAV error: {err}"))
}
