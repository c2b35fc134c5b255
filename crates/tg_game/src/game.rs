//! The touch game engine: bouncing circles, hit testing, scoring and rounds.
//!
//! Coordinates are pixels in the play field, origin top-left, y down, the same
//! space taps arrive in. The engine never talks to the UI directly; anything
//! the UI should react to is queued as a [`GameEvent`] and drained once per
//! frame.
//!
//! Each round lays out a fresh set of circles: one more than the previous
//! round up to `max_sequential_round`, then a random count. Circles shrink
//! geometrically toward a floor and speed up linearly. Every round also picks
//! a new background gradient, and circle colours are drawn from the half of
//! the range that contrasts with it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use tg_core::{Gradient, Rgb};
use tg_render::shading::FLASH_SECONDS;

use crate::config::GameRules;
use crate::particles::{Particle, ParticleSystem};

/// Background shown before the first round is laid out.
const INITIAL_BACKGROUND: Gradient = Gradient::new(Rgb::new(0.9, 0.9, 1.0), Rgb::new(1.0, 0.9, 0.9));

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub color: Rgb,
    pub flash_timer: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Hit { points: u32, remaining: usize },
    RoundComplete { round: u32 },
    GameOver { score: u32 },
}

impl GameEvent {
    /// Text for events that should be surfaced to the player.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Hit { .. } => None,
            Self::RoundComplete { round } => {
                Some(format!("Level complete! Advancing to round {round}"))
            }
            Self::GameOver { score } => Some(format!("Game Over! You reached {score} points!")),
        }
    }
}

pub struct Game {
    rules: GameRules,
    pending_rules: Option<GameRules>,
    circles: Vec<Circle>,
    particles: ParticleSystem,
    background: Gradient,
    score: u32,
    round: u32,
    game_over: bool,
    width: f32,
    height: f32,
    rng: StdRng,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(rules: GameRules, seed: u64) -> Self {
        Self {
            rules,
            pending_rules: None,
            circles: Vec::new(),
            particles: ParticleSystem::new(),
            background: INITIAL_BACKGROUND,
            score: 0,
            round: 1,
            game_over: false,
            width: 0.0,
            height: 0.0,
            rng: StdRng::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Bind the game to a field of `width` x `height` pixels and lay out the
    /// current round.
    pub fn init(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.lay_out_round();
        log::info!(
            "Game initialized: {}x{}, base radius {:.1}",
            self.width,
            self.height,
            self.base_radius()
        );
    }

    /// Field size changed (window resize). Circles keep their size and are
    /// pulled back inside the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        for circle in &mut self.circles {
            circle.x = clamp_axis(circle.x, circle.radius, self.width);
            circle.y = clamp_axis(circle.y, circle.radius, self.height);
        }
    }

    /// New rules take effect from the next laid-out round.
    /// Circles already on screen keep the current round's tolerance and
    /// scoring.
    pub fn set_rules(&mut self, rules: GameRules) {
        self.pending_rules = Some(rules);
    }

    fn min_dimension(&self) -> f32 {
        self.width.min(self.height)
    }

    fn base_radius(&self) -> f32 {
        self.min_dimension() * self.rules.base_radius_fraction
    }

    /// Circle radius for the current round.
    pub fn round_radius(&self) -> f32 {
        let min_radius = self.min_dimension() * self.rules.min_radius_fraction;
        let exponent = self.round.saturating_sub(1) as i32;
        (self.base_radius() * self.rules.shrink_per_round.powi(exponent)).max(min_radius)
    }

    /// Circle speed for the current round, pixels per second.
    pub fn round_speed(&self) -> f32 {
        let steps = self.round.saturating_sub(1) as f32;
        self.rules.base_speed * (1.0 + steps * self.rules.speed_step_per_round)
    }

    fn round_circle_count(&mut self) -> u32 {
        if self.round <= self.rules.max_sequential_round {
            self.round
        } else {
            self.rng
                .gen_range(self.rules.random_circles_min..=self.rules.random_circles_max)
        }
    }

    fn lay_out_round(&mut self) {
        if let Some(rules) = self.pending_rules.take() {
            self.rules = rules;
        }
        self.circles.clear();

        let radius = self.round_radius();
        let speed = self.round_speed();

        let color1 = self.random_background_color();
        let color2 = self.random_background_color();
        self.background = Gradient::new(color1, color2);
        let bright_background = self.background.average_brightness() > 0.5;

        let count = self.round_circle_count();
        for _ in 0..count {
            let x = uniform_in_axis(&mut self.rng, radius, self.width);
            let y = uniform_in_axis(&mut self.rng, radius, self.height);
            let color = if bright_background {
                Rgb::new(
                    self.rng.gen::<f32>() * 0.4,
                    self.rng.gen::<f32>() * 0.4,
                    self.rng.gen::<f32>() * 0.4,
                )
            } else {
                Rgb::new(
                    self.rng.gen::<f32>() * 0.4 + 0.6,
                    self.rng.gen::<f32>() * 0.4 + 0.6,
                    self.rng.gen::<f32>() * 0.4 + 0.6,
                )
            };
            let angle = self.rng.gen_range(0.0..TAU);
            self.circles.push(Circle {
                x,
                y,
                radius,
                velocity_x: angle.cos() * speed,
                velocity_y: angle.sin() * speed,
                color,
                flash_timer: 0.0,
            });
        }

        log::info!(
            "Round {} laid out: {} circles, radius={:.1}, speed={:.1}",
            self.round,
            count,
            radius,
            speed
        );
    }

    /// Channels kept in 0.3..1.0 so the background never gets too dark.
    fn random_background_color(&mut self) -> Rgb {
        Rgb::new(
            self.rng.gen::<f32>() * 0.7 + 0.3,
            self.rng.gen::<f32>() * 0.7 + 0.3,
            self.rng.gen::<f32>() * 0.7 + 0.3,
        )
    }

    pub fn update(&mut self, dt: f32) {
        if self.game_over {
            return;
        }

        for circle in &mut self.circles {
            circle.x += circle.velocity_x * dt;
            circle.y += circle.velocity_y * dt;

            if circle.flash_timer > 0.0 {
                circle.flash_timer -= dt;
            }

            if circle.x - circle.radius < 0.0 || circle.x + circle.radius > self.width {
                circle.velocity_x = -circle.velocity_x;
                circle.x = clamp_axis(circle.x, circle.radius, self.width);
            }
            if circle.y - circle.radius < 0.0 || circle.y + circle.radius > self.height {
                circle.velocity_y = -circle.velocity_y;
                circle.y = clamp_axis(circle.y, circle.radius, self.height);
            }
        }

        self.particles.update(dt);
    }

    /// Register a tap. Returns true when it hit a circle.
    pub fn handle_touch(&mut self, x: f32, y: f32) -> bool {
        if self.game_over {
            return false;
        }

        let tolerance = self.rules.hit_tolerance;
        let Some(index) = self
            .circles
            .iter()
            .position(|c| is_hit(x, y, c, tolerance))
        else {
            return false;
        };

        let mut circle = self.circles.remove(index);
        circle.flash_timer = FLASH_SECONDS;
        self.particles
            .spawn_explosion(&mut self.rng, x, y, circle.radius, circle.color);

        let points = self.rules.points_per_hit;
        self.score = self.score.saturating_add(points);
        let remaining = self.circles.len();
        log::debug!(
            "Hit circle! Score: {} (+{}), remaining: {}",
            self.score,
            points,
            remaining
        );
        self.events.push(GameEvent::Hit { points, remaining });

        if self.circles.is_empty() {
            self.round += 1;
            log::info!("Level complete! Advancing to round {}", self.round);
            self.events.push(GameEvent::RoundComplete { round: self.round });
            self.lay_out_round();
        }

        if let Some(target) = self.rules.target_score {
            if self.score >= target {
                self.game_over = true;
                log::info!("Game over at {} points", self.score);
                self.events.push(GameEvent::GameOver { score: self.score });
            }
        }

        true
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.round = 1;
        self.game_over = false;
        self.events.clear();
        self.lay_out_round();
        log::info!("Game reset");
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn background(&self) -> Gradient {
        self.background
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.count()
    }

    pub fn field_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

fn is_hit(x: f32, y: f32, circle: &Circle, tolerance: f32) -> bool {
    let dx = x - circle.x;
    let dy = y - circle.y;
    (dx * dx + dy * dy).sqrt() <= circle.radius * tolerance
}

/// Keep a centre coordinate such that the circle fits in `[0, extent]`. When
/// the circle is wider than the field it is centred.
fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    if extent <= radius * 2.0 {
        return extent / 2.0;
    }
    value.clamp(radius, extent - radius)
}

fn uniform_in_axis<R: Rng>(rng: &mut R, radius: f32, extent: f32) -> f32 {
    let lo = radius;
    let hi = extent - radius;
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        extent / 2.0
    }
}
