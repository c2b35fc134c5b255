//! Game screen layout in physical pixels.
//!
//! Top to bottom: info bar, game view, Reset button, Exit button, banner
//! strip. Everything but the game view has a fixed logical height scaled by
//! the window's DPI factor; the game view takes whatever is left.

use tg_core::Rect;

const INFO_BAR_HEIGHT: f32 = 48.0;
const BUTTON_HEIGHT: f32 = 48.0;
const BANNER_HEIGHT: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLayout {
    pub info_bar: Rect,
    pub game_view: Rect,
    pub reset_button: Rect,
    pub exit_button: Rect,
    /// Empty when no banner slot is reserved.
    pub banner: Rect,
}

impl ScreenLayout {
    pub fn compute(width: u32, height: u32, scale_factor: f32, reserve_banner: bool) -> Self {
        let w = width as f32;
        let h = height as f32;
        let scale = scale_factor.max(0.1);

        let info_h = INFO_BAR_HEIGHT * scale;
        let button_h = BUTTON_HEIGHT * scale;
        let banner_h = if reserve_banner {
            BANNER_HEIGHT * scale
        } else {
            0.0
        };

        let fixed = info_h + button_h * 2.0 + banner_h;
        let view_h = (h - fixed).max(0.0);

        let info_bar = Rect::new(0.0, 0.0, w, info_h);
        let game_view = Rect::new(0.0, info_h, w, view_h);
        let reset_button = Rect::new(0.0, game_view.bottom(), w, button_h);
        let exit_button = Rect::new(0.0, reset_button.bottom(), w, button_h);
        let banner = Rect::new(0.0, exit_button.bottom(), w, banner_h);

        Self {
            info_bar,
            game_view,
            reset_button,
            exit_button,
            banner,
        }
    }

    /// Window pixel position to game view coordinates, or `None` when the
    /// point falls outside the view.
    pub fn to_game_coords(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        if self.game_view.is_empty() {
            return None;
        }
        self.game_view.to_local(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_stack_without_gaps() {
        let layout = ScreenLayout::compute(480, 800, 1.0, true);
        assert_eq!(layout.info_bar.y, 0.0);
        assert_eq!(layout.game_view.y, layout.info_bar.bottom());
        assert_eq!(layout.reset_button.y, layout.game_view.bottom());
        assert_eq!(layout.exit_button.y, layout.reset_button.bottom());
        assert_eq!(layout.banner.y, layout.exit_button.bottom());
        assert_eq!(layout.banner.bottom(), 800.0);
        assert_eq!(layout.game_view.height, 800.0 - 48.0 - 96.0 - 50.0);
    }

    #[test]
    fn banner_slot_is_optional() {
        let layout = ScreenLayout::compute(480, 800, 1.0, false);
        assert!(layout.banner.is_empty());
        assert_eq!(layout.exit_button.bottom(), 800.0);
    }

    #[test]
    fn fixed_sections_scale_with_dpi() {
        let layout = ScreenLayout::compute(960, 1600, 2.0, true);
        assert_eq!(layout.info_bar.height, 96.0);
        assert_eq!(layout.banner.height, 100.0);
    }

    #[test]
    fn tiny_window_collapses_game_view() {
        let layout = ScreenLayout::compute(100, 100, 1.0, true);
        assert_eq!(layout.game_view.height, 0.0);
        assert_eq!(layout.to_game_coords(10.0, 50.0), None);
    }

    #[test]
    fn taps_convert_to_view_coordinates() {
        let layout = ScreenLayout::compute(480, 800, 1.0, true);
        assert_eq!(layout.to_game_coords(100.0, 148.0), Some((100.0, 100.0)));
        assert_eq!(layout.to_game_coords(100.0, 10.0), None);
        let below = layout.game_view.bottom() + 1.0;
        assert_eq!(layout.to_game_coords(100.0, below), None);
    }
}
