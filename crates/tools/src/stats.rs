use std::collections::VecDeque;
use std::time::Duration;

/// A frame this many times slower than the window average is logged.
const SPIKE_FACTOR: u32 = 4;

/// Frame times over the last `window` frames, for the stats overlay.
#[derive(Debug)]
pub struct FrameStats {
    samples: VecDeque<Duration>,
    window: usize,
    total_frames: u64,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(120)
    }
}

impl FrameStats {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            window,
            total_frames: 0,
        }
    }

    /// Add one frame time, dropping the oldest once the window is full.
    pub fn record(&mut self, dt: Duration) {
        if self.is_spike(dt) {
            tracing::debug!(
                frame_ms = dt.as_secs_f32() * 1_000.0,
                average_ms = self.average().as_secs_f32() * 1_000.0,
                frame = self.total_frames,
                "frame time spike"
            );
        }
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(dt);
        self.total_frames += 1;
    }

    /// Whether `dt` stands out against a full window.
    pub fn is_spike(&self, dt: Duration) -> bool {
        self.samples.len() == self.window
            && !self.average().is_zero()
            && dt > self.average() * SPIKE_FACTOR
    }

    /// Frames currently in the window.
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Frames recorded since creation.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.samples.iter().copied().min().unwrap_or_default()
    }

    /// Frames per second over the window, 0 when empty.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}
