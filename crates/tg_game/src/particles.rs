//! Explosion particles spawned when a circle is hit.

use rand::Rng;
use std::f32::consts::TAU;
use tg_core::Rgb;

/// Downward acceleration in pixels per second squared.
const GRAVITY: f32 = 600.0;
/// Extra upward kick so explosions burst up before falling.
const UPWARD_BIAS: f32 = 200.0;
const MIN_SPEED: f32 = 200.0;
const SPEED_RANGE: f32 = 400.0;
const COLOR_JITTER: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub size: f32,
    pub color: Rgb,
    pub lifetime: f32,
    pub max_lifetime: f32,
}

impl Particle {
    /// Opacity fading linearly to zero over the particle's life.
    pub fn alpha(&self) -> f32 {
        1.0 - self.lifetime / self.max_lifetime
    }
}

#[derive(Debug, Default, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Burst of 20 to 30 particles around `(x, y)`, sized relative to the
    /// circle that was hit and tinted with a slightly jittered copy of its
    /// colour.
    pub fn spawn_explosion<R: Rng>(&mut self, rng: &mut R, x: f32, y: f32, radius: f32, color: Rgb) {
        let count = rng.gen_range(20..=30);
        self.particles.reserve(count);
        for _ in 0..count {
            let angle = rng.gen_range(0.0..TAU);
            let speed = MIN_SPEED + rng.gen::<f32>() * SPEED_RANGE;
            let size = radius * 0.15 + rng.gen::<f32>() * radius * 0.1;
            let color = Rgb::new(
                jitter(rng, color.r),
                jitter(rng, color.g),
                jitter(rng, color.b),
            );
            let max_lifetime = 0.5 + rng.gen::<f32>() * 0.5;
            self.particles.push(Particle {
                x,
                y,
                velocity_x: angle.cos() * speed,
                velocity_y: angle.sin() * speed - UPWARD_BIAS,
                size,
                color,
                lifetime: 0.0,
                max_lifetime,
            });
        }
    }

    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.x += p.velocity_x * dt;
            p.y += p.velocity_y * dt;
            p.velocity_y += GRAVITY * dt;
            p.lifetime += dt;
        }
        self.particles.retain(|p| p.lifetime < p.max_lifetime);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }
}

fn jitter<R: Rng>(rng: &mut R, channel: f32) -> f32 {
    (channel + (rng.gen::<f32>() - 0.5) * COLOR_JITTER).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn explosion_spawns_between_20_and_30_particles() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut system = ParticleSystem::new();
            system.spawn_explosion(&mut rng, 10.0, 10.0, 40.0, Rgb::new(0.5, 0.5, 0.5));
            assert!((20..=30).contains(&system.count()));
        }
    }

    #[test]
    fn explosion_particles_respect_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut system = ParticleSystem::new();
        let radius = 40.0;
        system.spawn_explosion(&mut rng, 0.0, 0.0, radius, Rgb::new(0.95, 0.02, 0.5));
        for p in system.iter() {
            assert!(p.size >= radius * 0.15 && p.size <= radius * 0.25);
            assert!(p.max_lifetime >= 0.5 && p.max_lifetime <= 1.0);
            assert!(p.color.r <= 1.0 && p.color.g >= 0.0);
            assert!((p.color.b - 0.5).abs() <= 0.1 + 1e-6);
            assert_eq!(p.lifetime, 0.0);
        }
    }

    #[test]
    fn particles_fall_under_gravity() {
        let mut system = ParticleSystem {
            particles: vec![Particle {
                x: 0.0,
                y: 0.0,
                velocity_x: 0.0,
                velocity_y: 0.0,
                size: 2.0,
                color: Rgb::WHITE,
                lifetime: 0.0,
                max_lifetime: 10.0,
            }],
        };
        system.update(0.1);
        let p = system.iter().next().expect("particle alive");
        assert!((p.velocity_y - 60.0).abs() < 1e-4);
        system.update(0.1);
        let p = system.iter().next().expect("particle alive");
        assert!(p.y > 0.0);
    }

    #[test]
    fn particles_expire_after_lifetime() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut system = ParticleSystem::new();
        system.spawn_explosion(&mut rng, 0.0, 0.0, 10.0, Rgb::WHITE);
        system.update(0.49);
        assert!(system.count() > 0);
        system.update(0.52);
        assert_eq!(system.count(), 0);
    }

    #[test]
    fn alpha_fades_to_zero() {
        let mut p = Particle {
            x: 0.0,
            y: 0.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            size: 1.0,
            color: Rgb::WHITE,
            lifetime: 0.0,
            max_lifetime: 0.8,
        };
        assert_eq!(p.alpha(), 1.0);
        p.lifetime = 0.4;
        assert!((p.alpha() - 0.5).abs() < 1e-6);
    }
}
