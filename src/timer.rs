use std::time::{Duration, Instant};

/// Measures frame time and schedules the fixed pause between frames.
pub struct FrameTimer {
    last_frame_time: Instant,
    pause: Duration,
}

impl FrameTimer {
    pub fn new(pause: Duration) -> Self {
        Self {
            last_frame_time: Instant::now(),
            pause,
        }
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        let current_time = Instant::now();

        let delta_time = current_time
            .duration_since(self.last_frame_time)
            .as_secs_f32();

        self.last_frame_time = current_time;

        delta_time
    }

    /// When the next frame may start, counted from the end of this one.
    pub fn next_frame(&self) -> Instant {
        Instant::now() + self.pause
    }
}
