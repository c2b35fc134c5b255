//! Fake sphere lighting for flat circles.
//!
//! A circle is drawn as concentric rings, each filled with the base colour
//! scaled by a brightness factor that depends on how far the ring sits from
//! the centre: a hot specular core, mid-tones, a shadowed band, then a dark
//! edge lifted by a thin rim light. Values above 1.0 are intentional; they
//! push dark colours toward white in the core before the final clamp.

use glam::Vec2;

/// How long a hit circle flashes, in seconds.
pub const FLASH_SECONDS: f32 = 0.15;
const FLASH_BOOST: f32 = 0.8;
const AMBIENT_SCALE: f32 = 0.88;
const AMBIENT_FLOOR: f32 = 0.12;
/// Highlight spot offset toward the light, as a fraction of the radius.
pub const HIGHLIGHT_OFFSET: f32 = 0.3;
pub const HIGHLIGHT_RADIUS: f32 = 0.22;
pub const HIGHLIGHT_ALPHA: f32 = 0.6;
pub const HIGHLIGHT_SEGMENTS: u32 = 28;

/// Raw brightness for a ring whose centre line sits at `normalized_radius`
/// (0 at the circle centre, 1 at the edge).
pub fn ring_brightness(ring: u32, normalized_radius: f32) -> f32 {
    let n = normalized_radius;
    if ring == 0 {
        2.4
    } else if n < 0.15 {
        let t = n / 0.15;
        2.4 - t * 0.6
    } else if n < 0.35 {
        let t = (n - 0.15) / 0.2;
        1.8 - t * 0.4
    } else if n < 0.6 {
        let t = (n - 0.35) / 0.25;
        1.4 - t * t * 0.35
    } else if n < 0.85 {
        let t = (n - 0.6) / 0.25;
        1.05 - t * t * 0.35
    } else {
        let t = (n - 0.85) / 0.15;
        let mut b = 0.7 - t * t * t * 0.35;
        if n > 0.9 {
            let rim = (n - 0.9) / 0.1;
            b += rim * rim * 0.25;
        }
        b
    }
}

/// Final brightness: ambient lift so nothing goes fully black, plus the hit
/// flash while `flash_timer` is running.
pub fn lit_brightness(raw: f32, flash_timer: f32) -> f32 {
    let mut b = raw * AMBIENT_SCALE + AMBIENT_FLOOR;
    if flash_timer > 0.0 {
        b += flash_timer / FLASH_SECONDS * FLASH_BOOST;
    }
    b
}

/// Where the glossy highlight sits relative to the circle centre: pulled
/// toward `light`. A circle sitting on the light gets its highlight straight
/// up (negative y).
pub fn highlight_offset(center: Vec2, light: Vec2, radius: f32) -> Vec2 {
    let to_light = light - center;
    let dist = to_light.length();
    if dist > 0.01 {
        to_light / dist * radius * HIGHLIGHT_OFFSET
    } else {
        Vec2::new(0.0, -radius * HIGHLIGHT_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_ring_is_brightest() {
        assert_eq!(ring_brightness(0, 0.02), 2.4);
        assert!(ring_brightness(1, 0.06) < 2.4);
    }

    #[test]
    fn brightness_is_continuous_at_band_edges() {
        let eps = 1e-4;
        for edge in [0.15f32, 0.35, 0.6, 0.85] {
            let below = ring_brightness(1, edge - eps);
            let above = ring_brightness(1, edge + eps);
            assert!(
                (below - above).abs() < 0.01,
                "discontinuity at {edge}: {below} vs {above}"
            );
        }
    }

    #[test]
    fn brightness_falls_off_toward_edge_before_rim() {
        let samples = [0.1f32, 0.3, 0.5, 0.7, 0.88];
        for pair in samples.windows(2) {
            assert!(ring_brightness(1, pair[0]) > ring_brightness(1, pair[1]));
        }
    }

    #[test]
    fn rim_light_lifts_outermost_ring() {
        let inner_edge = ring_brightness(1, 0.9);
        let outer_edge = ring_brightness(1, 0.99);
        let without_rim = 0.7 - ((0.99f32 - 0.85) / 0.15).powi(3) * 0.35;
        assert!((outer_edge - without_rim - 0.81 * 0.25).abs() < 1e-4);
        assert!(inner_edge > 0.0);
    }

    #[test]
    fn ambient_floor_keeps_colour_visible() {
        assert!((lit_brightness(0.0, 0.0) - 0.12).abs() < 1e-6);
        assert!((lit_brightness(1.0, 0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn flash_adds_full_boost_at_start() {
        let base = lit_brightness(1.0, 0.0);
        let flashing = lit_brightness(1.0, FLASH_SECONDS);
        assert!((flashing - base - 0.8).abs() < 1e-6);
        assert_eq!(lit_brightness(1.0, -0.01), base);
    }

    #[test]
    fn highlight_points_toward_light() {
        let offset = highlight_offset(Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0), 50.0);
        assert!((offset.x - 15.0).abs() < 1e-4);
        assert!(offset.y.abs() < 1e-4);
    }

    #[test]
    fn highlight_defaults_upward_at_light_position() {
        let offset = highlight_offset(Vec2::new(50.0, 50.0), Vec2::new(50.0, 50.0), 10.0);
        assert_eq!(offset, Vec2::new(0.0, -3.0));
    }
}
