use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Beat positions as sample offsets into the analysed waveform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedBeats {
    pub positions: Vec<u64>,
    pub sample_rate: u32,
    pub tempo_bpm: Option<f64>,
}

/// Tempo estimation plus beat placement over a mono waveform.
pub trait BeatTracker: Send + Sync {
    fn track(&self, mono: &[f32], sample_rate: u32) -> TrackedBeats;
}

/// Spectral-flux onset envelope, autocorrelation tempo estimate and
/// dynamic-programming beat placement.
#[derive(Debug, Clone)]
pub struct SpectralFluxTracker {
    pub fft_size: usize,
    pub hop: usize,
    pub min_bpm: f64,
    pub max_bpm: f64,
    /// Centre of the log-normal tempo prior.
    pub start_bpm: f64,
    /// Width of the tempo prior in octaves.
    pub prior_octaves: f64,
    /// How strongly beat spacing is held to the estimated period.
    pub tightness: f64,
}

impl Default for SpectralFluxTracker {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop: 512,
            min_bpm: 40.0,
            max_bpm: 240.0,
            start_bpm: 120.0,
            prior_octaves: 1.0,
            tightness: 100.0,
        }
    }
}

impl BeatTracker for SpectralFluxTracker {
    fn track(&self, mono: &[f32], sample_rate: u32) -> TrackedBeats {
        let empty = TrackedBeats {
            positions: Vec::new(),
            sample_rate,
            tempo_bpm: None,
        };
        if sample_rate == 0 || self.hop == 0 || self.fft_size == 0 {
            return empty;
        }

        let Some(envelope) = normalize(self.onset_envelope(mono)) else {
            return empty;
        };
        let frame_rate = sample_rate as f64 / self.hop as f64;
        let Some(period) = self.estimate_period(&envelope, frame_rate) else {
            return empty;
        };

        let frames = self.place_beats(&envelope, period);
        TrackedBeats {
            positions: frames.into_iter().map(|f| (f * self.hop) as u64).collect(),
            sample_rate,
            tempo_bpm: Some(60.0 * frame_rate / period),
        }
    }
}

impl SpectralFluxTracker {
    /// Half-wave rectified log-magnitude flux per hop, frames centred on
    /// `frame * hop`.
    pub fn onset_envelope(&self, mono: &[f32]) -> Vec<f64> {
        let n = self.fft_size;
        let pad = n / 2;
        let padded_len = mono.len() + 2 * pad;
        if mono.is_empty() || padded_len < n {
            return Vec::new();
        }

        let mut planner = FftPlanner::<f32>::new();
        let fft: Arc<dyn Fft<f32>> = planner.plan_fft_forward(n);
        let window: Vec<f32> = (0..n)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos()))
            .collect();

        let sample_at = |idx: usize| -> f32 {
            if idx < pad || idx >= pad + mono.len() {
                0.0
            } else {
                mono[idx - pad]
            }
        };

        let frame_count = 1 + (padded_len - n) / self.hop;
        let bins = n / 2 + 1;
        let mut buffer = vec![Complex::new(0.0f32, 0.0); n];
        let mut previous = vec![0.0f64; bins];
        let mut envelope = Vec::with_capacity(frame_count);

        for frame in 0..frame_count {
            let start = frame * self.hop;
            for (k, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(sample_at(start + k) * window[k], 0.0);
            }
            fft.process(&mut buffer);

            let mut flux = 0.0;
            for (bin, prev) in previous.iter_mut().enumerate() {
                let magnitude = (1.0 + 100.0 * buffer[bin].norm() as f64).ln();
                if frame > 0 {
                    flux += (magnitude - *prev).max(0.0);
                }
                *prev = magnitude;
            }
            envelope.push(flux);
        }
        envelope
    }

    /// Beat period in frames, or `None` when the envelope carries no
    /// periodicity in the allowed tempo range.
    pub fn estimate_period(&self, envelope: &[f64], frame_rate: f64) -> Option<f64> {
        let min_lag = ((60.0 * frame_rate / self.max_bpm).floor() as usize).max(1);
        let max_lag = ((60.0 * frame_rate / self.min_bpm).ceil() as usize).min(envelope.len().saturating_sub(1));
        if min_lag + 1 >= max_lag {
            return None;
        }

        let smoothed = smooth3(envelope);
        let mean = smoothed.iter().sum::<f64>() / smoothed.len() as f64;
        let centred: Vec<f64> = smoothed.iter().map(|v| v - mean).collect();

        let autocorr = |lag: usize| -> f64 {
            let overlap = centred.len() - lag;
            let sum: f64 = centred[..overlap]
                .iter()
                .zip(&centred[lag..])
                .map(|(a, b)| a * b)
                .sum();
            sum / overlap as f64
        };

        let scores: Vec<f64> = (min_lag..=max_lag)
            .map(|lag| {
                let bpm = 60.0 * frame_rate / lag as f64;
                let octaves = (bpm / self.start_bpm).log2() / self.prior_octaves;
                autocorr(lag) * (-0.5 * octaves * octaves).exp()
            })
            .collect();

        let (best, &best_score) = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        if best_score <= 0.0 {
            return None;
        }

        // Parabolic refinement around the peak.
        let mut period = (min_lag + best) as f64;
        if best > 0 && best + 1 < scores.len() {
            let (l, c, r) = (scores[best - 1], scores[best], scores[best + 1]);
            let denom = l - 2.0 * c + r;
            if denom.abs() > f64::EPSILON {
                period += (0.5 * (l - r) / denom).clamp(-0.5, 0.5);
            }
        }
        Some(period)
    }

    /// Picks the frame sequence maximising onset strength while keeping
    /// consecutive gaps close to `period`.
    pub fn place_beats(&self, envelope: &[f64], period: f64) -> Vec<usize> {
        let n = envelope.len();
        if n == 0 || period < 1.0 {
            return Vec::new();
        }

        let local = local_score(envelope, period);
        let min_gap = (period / 2.0).round().max(1.0) as usize;
        let max_gap = (period * 2.0).round() as usize;

        let mut cumulative = vec![0.0f64; n];
        let mut backlink: Vec<Option<usize>> = vec![None; n];

        for i in 0..n {
            let mut best: Option<(usize, f64)> = None;
            if i >= min_gap {
                for j in i.saturating_sub(max_gap)..=(i - min_gap) {
                    let gap = (i - j) as f64 / period;
                    let score = cumulative[j] - self.tightness * gap.ln().powi(2);
                    if best.map_or(true, |(_, s)| score > s) {
                        best = Some((j, score));
                    }
                }
            }
            match best {
                Some((j, score)) if score > 0.0 => {
                    cumulative[i] = local[i] + score;
                    backlink[i] = Some(j);
                }
                _ => cumulative[i] = local[i],
            }
        }

        let Some(last) = last_beat(&cumulative) else {
            return Vec::new();
        };

        let mut beats = vec![last];
        let mut cursor = last;
        while let Some(prev) = backlink[cursor] {
            beats.push(prev);
            cursor = prev;
        }
        beats.reverse();

        trim_weak_edges(beats, &local)
    }
}

fn normalize(envelope: Vec<f64>) -> Option<Vec<f64>> {
    if envelope.len() < 2 {
        return None;
    }
    let mean = envelope.iter().sum::<f64>() / envelope.len() as f64;
    let variance = envelope.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (envelope.len() - 1) as f64;
    let std = variance.sqrt();
    if !std.is_finite() || std < 1e-9 {
        return None;
    }
    Some(envelope.into_iter().map(|v| v / std).collect())
}

fn smooth3(values: &[f64]) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let prev = if i > 0 { values[i - 1] } else { values[i] };
            let next = values.get(i + 1).copied().unwrap_or(values[i]);
            0.25 * prev + 0.5 * values[i] + 0.25 * next
        })
        .collect()
}

/// Envelope convolved with a narrow gaussian whose width scales with the period.
fn local_score(envelope: &[f64], period: f64) -> Vec<f64> {
    let half = period.round() as isize;
    let kernel: Vec<f64> = (-half..=half)
        .map(|k| (-0.5 * (k as f64 * 32.0 / period).powi(2)).exp())
        .collect();

    (0..envelope.len() as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, w)| {
                    let idx = i + k as isize - half;
                    (idx >= 0 && (idx as usize) < envelope.len()).then(|| envelope[idx as usize] * w)
                })
                .sum()
        })
        .collect()
}

/// Last local maximum of the cumulative score that is at least half the
/// median local maximum.
fn last_beat(cumulative: &[f64]) -> Option<usize> {
    let n = cumulative.len();
    let maxima: Vec<usize> = (0..n)
        .filter(|&i| {
            let left = i == 0 || cumulative[i] > cumulative[i - 1];
            let right = i + 1 == n || cumulative[i] >= cumulative[i + 1];
            left && right
        })
        .collect();
    if maxima.is_empty() {
        return None;
    }

    let mut values: Vec<f64> = maxima.iter().map(|&i| cumulative[i]).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let median = values[values.len() / 2];

    maxima.into_iter().rev().find(|&i| cumulative[i] >= 0.5 * median)
}

fn trim_weak_edges(beats: Vec<usize>, local: &[f64]) -> Vec<usize> {
    if beats.is_empty() {
        return beats;
    }
    let rms = (beats.iter().map(|&b| local[b].powi(2)).sum::<f64>() / beats.len() as f64).sqrt();
    let threshold = 0.5 * rms;

    let first = beats.iter().position(|&b| local[b] > threshold);
    let last = beats.iter().rposition(|&b| local[b] > threshold);
    match (first, last) {
        (Some(first), Some(last)) => beats[first..=last].to_vec(),
        _ => Vec::new(),
    }
}
