use std::{io::Write, ops::Range, path::Path};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{timeline::frame_count, FrameAmplitudes, PlaybackClock, Result, WaveformEngine};

/// Every frame of a render, ready to be handed to a renderer or cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSequence {
    pub fps: u32,
    pub bar_count: usize,
    pub frames: Vec<FrameAmplitudes>,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

/// Renders frames ahead of time.
///
/// Frames do not depend on each other, so they are computed in parallel
/// against the shared, read-only engine.
#[derive(Debug, Clone)]
pub struct Precomputer {
    engine: WaveformEngine,
    fps: u32,
}

impl Precomputer {
    pub fn new(engine: WaveformEngine, fps: u32) -> Self {
        Self { engine, fps }
    }

    pub fn engine(&self) -> &WaveformEngine {
        &self.engine
    }

    /// Frames needed to cover the whole buffer.
    pub fn total_frames(&self) -> u64 {
        frame_count(self.engine.buffer().duration_seconds(), self.fps)
    }

    pub fn render_all(&self) -> FrameSequence {
        self.render_range(0..self.total_frames())
    }

    pub fn render_range(&self, frames: Range<u64>) -> FrameSequence {
        tracing::debug!(
            start = frames.start,
            end = frames.end,
            fps = self.fps,
            "precomputing frames"
        );

        let rendered: Vec<FrameAmplitudes> = frames
            .into_par_iter()
            .map(|frame| {
                self.engine
                    .frame_at_clock(&PlaybackClock::at_frame(self.fps, frame))
            })
            .collect();

        tracing::debug!(frames = rendered.len(), "precompute finished");

        FrameSequence {
            fps: self.fps,
            bar_count: rendered.first().map_or(0, Vec::len),
            frames: rendered,
        }
    }
}
