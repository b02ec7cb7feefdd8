use std::sync::Arc;
use anyhow::{Result, bail};

/// Decoded PCM of a whole track, interleaved by channel.
#[derive(Debug, Clone)]
pub struct AudioClip {
    data: Arc<Vec<f32>>,
    channels: usize,
    sample_rate: u32,
}

impl AudioClip {
    pub fn new(data: Vec<f32>, channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            bail!("Audio must have at least one channel");
        }
        if sample_rate == 0 {
            bail!("Audio sample rate must be non-zero");
        }
        if data.len() % channels != 0 {
            bail!("Audio data length must be a multiple of the channel count ({channels})");
        }
        Ok(Self {
            data: Arc::new(data),
            channels,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn frame_count(&self) -> usize {
        self.data.len() / self.channels
    }

    pub fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn duration_ms(&self) -> u64 {
        (self.duration() * 1000.0).round() as u64
    }

    /// Averages all channels of each frame.
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels == 1 {
            return self.data.as_ref().clone();
        }
        let scale = 1.0 / self.channels as f32;
        self.data
            .chunks_exact(self.channels)
            .map(|frame| frame.iter().sum::<f32>() * scale)
            .collect()
    }

    pub fn data(&self) -> &Arc<Vec<f32>> {
        &self.data
    }
}
