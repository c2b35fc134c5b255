//! Frame clock for the render loop.
//!
//! The simulation advances in fixed slices of `fixed_dt` consumed from an
//! accumulator fed by wall-clock time. A frame that took longer than
//! `max_frame_dt` (window drag, debugger break, app switch) is treated as a
//! single nominal frame of `stall_dt` instead, so circles never jump across
//! the field after a hitch.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

pub struct TimeState {
    pub fixed_dt: f64,
    pub max_frame_dt: f64,
    pub stall_dt: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    pub stalled_frames: u64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_frame_dt: 0.1,
            stall_dt: 0.016,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            stalled_frames: 0,
            last_instant: Instant::now(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Feed `elapsed` seconds of wall-clock time into the accumulator.
    pub fn advance(&mut self, elapsed: f64) {
        self.real_dt = elapsed;
        if self.real_dt > self.max_frame_dt {
            log::debug!(
                "Frame took {:.1}ms, treating as {:.1}ms",
                self.real_dt * 1000.0,
                self.stall_dt * 1000.0
            );
            self.real_dt = self.stall_dt;
            self.stalled_frames += 1;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Restart wall-clock measurement, e.g. after the window was hidden.
    pub fn reset_clock(&mut self) {
        self.last_instant = Instant::now();
        self.accumulator = 0.0;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
