//! Colour helpers shared by the engine, the renderer and the HUD.
//!
//! The engine works in normalised floating point channels. The HUD reasons in
//! 8-bit channels, so conversions truncate the same way an integer cast of
//! `channel * 255` does.

use serde::Deserialize;

/// Linear RGB with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Mean of the three channels.
    pub fn brightness(self) -> f32 {
        (self.r + self.g + self.b) / 3.0
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(
            (self.r * factor).min(1.0),
            (self.g * factor).min(1.0),
            (self.b * factor).min(1.0),
        )
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    pub fn to_rgb8(self) -> Rgb8 {
        Rgb8 {
            r: channel_to_u8(self.r),
            g: channel_to_u8(self.g),
            b: channel_to_u8(self.b),
        }
    }
}

fn channel_to_u8(c: f32) -> u8 {
    // `as` saturates, so out-of-range channels clamp to 0/255.
    (c * 255.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived luminance (ITU-R BT.601 weights) in `0.0..=1.0`.
    pub fn luminance(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

/// Two-stop background gradient. How the stops map to screen edges is up to
/// the surface drawing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub color1: Rgb,
    pub color2: Rgb,
}

impl Gradient {
    pub const fn new(color1: Rgb, color2: Rgb) -> Self {
        Self { color1, color2 }
    }

    /// Mean of all six channels.
    pub fn average_brightness(&self) -> f32 {
        (self.color1.brightness() + self.color2.brightness()) / 2.0
    }

    pub fn to_rgb8(&self) -> [Rgb8; 2] {
        [self.color1.to_rgb8(), self.color2.to_rgb8()]
    }
}

/// Label colours chosen to stay readable on top of the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPalette {
    pub text: Rgb8,
    pub shadow: Rgb8,
}

/// Luminance above which the background counts as bright.
pub const LUMINANCE_THRESHOLD: f32 = 0.5;

impl TextPalette {
    /// Dark text with a light shadow on bright backgrounds, and the reverse on
    /// dark ones. The threshold is applied to the mean luminance of both stops.
    pub fn for_background(colors: [Rgb8; 2]) -> Self {
        let average = (colors[0].luminance() + colors[1].luminance()) / 2.0;
        if average > LUMINANCE_THRESHOLD {
            Self {
                text: Rgb8::BLACK,
                shadow: Rgb8::WHITE,
            }
        } else {
            Self {
                text: Rgb8::WHITE,
                shadow: Rgb8::BLACK,
            }
        }
    }

    /// Used while the engine has no background to report.
    pub fn fallback() -> Self {
        Self {
            text: Rgb8::BLACK,
            shadow: Rgb8::WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_rgb8_truncates() {
        let c = Rgb::new(0.999, 0.5, 0.0).to_rgb8();
        assert_eq!(c, Rgb8::new(254, 127, 0));
        assert_eq!(Rgb::WHITE.to_rgb8(), Rgb8::WHITE);
    }

    #[test]
    fn to_rgb8_saturates_out_of_range() {
        let c = Rgb::new(1.4, -0.2, 0.5).to_rgb8();
        assert_eq!(c.r, 255);
        assert_eq!(c.g, 0);
    }

    #[test]
    fn luminance_weights_green_most() {
        assert!((Rgb8::WHITE.luminance() - 1.0).abs() < 1e-6);
        assert_eq!(Rgb8::BLACK.luminance(), 0.0);
        let green = Rgb8::new(0, 255, 0).luminance();
        let red = Rgb8::new(255, 0, 0).luminance();
        let blue = Rgb8::new(0, 0, 255).luminance();
        assert!(green > red && red > blue);
    }

    #[test]
    fn palette_flips_at_half_luminance() {
        let bright = TextPalette::for_background([Rgb8::new(200, 200, 200), Rgb8::WHITE]);
        assert_eq!(bright.text, Rgb8::BLACK);
        assert_eq!(bright.shadow, Rgb8::WHITE);

        let dark = TextPalette::for_background([Rgb8::new(40, 40, 40), Rgb8::new(90, 90, 90)]);
        assert_eq!(dark.text, Rgb8::WHITE);
        assert_eq!(dark.shadow, Rgb8::BLACK);
    }

    #[test]
    fn palette_uses_mean_of_both_stops() {
        let mostly_bright = [Rgb8::WHITE, Rgb8::new(50, 50, 50)];
        assert_eq!(TextPalette::for_background(mostly_bright).text, Rgb8::BLACK);

        let mostly_dark = [Rgb8::BLACK, Rgb8::new(200, 200, 200)];
        assert_eq!(TextPalette::for_background(mostly_dark).text, Rgb8::WHITE);
    }

    #[test]
    fn fallback_palette_is_dark_text() {
        assert_eq!(TextPalette::fallback().text, Rgb8::BLACK);
    }

    #[test]
    fn gradient_average_brightness() {
        let g = Gradient::new(Rgb::new(0.3, 0.3, 0.3), Rgb::new(0.9, 0.9, 0.9));
        assert!((g.average_brightness() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn rgb_deserializes_from_object() {
        let c: Rgb = serde_json::from_str(r#"{"r":0.1,"g":0.2,"b":0.3}"#).expect("rgb parses");
        assert_eq!(c, Rgb::new(0.1, 0.2, 0.3));
    }
}
