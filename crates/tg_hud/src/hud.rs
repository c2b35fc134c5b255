//! Game screen chrome drawn with egui on top of the shape pass.
//!
//! Integration pattern: `egui_wgpu::Renderer::render()` needs a
//! `RenderPass<'static>` while `begin_render_pass` borrows the encoder, so a
//! frame goes through four phases:
//!
//!   1. `prepare()` -- run the UI, produce tessellated primitives and actions
//!   2. `upload()`  -- upload textures and update GPU buffers
//!   3. `paint()`   -- render into a pass created with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! Layout rectangles arrive in physical pixels and are converted to egui
//! points here. Labels are painted on the background layer so they never
//! take input; buttons, the toast and the interstitial are real widgets.

use tg_core::{Rect, Rgb8, TextPalette, TimeState};
use winit::window::Window;

const LABEL_FONT_SIZE: f32 = 20.0;
const BANNER_FONT_SIZE: f32 = 14.0;
const SHADOW_OFFSET: f32 = 1.0;
const LOADING_BALL_RADIUS: f32 = 20.0;

/// Everything the game screen shows this frame.
pub struct PlayingView<'a> {
    pub score: u32,
    pub round: u32,
    pub palette: TextPalette,
    pub info_bar: Rect,
    pub reset_button: Rect,
    pub exit_button: Rect,
    pub banner: Rect,
    pub banner_text: Option<&'a str>,
    /// Creative of the interstitial being presented.
    pub interstitial: Option<&'a str>,
}

pub enum HudScreen<'a> {
    Loading {
        ball_offset_x: f32,
        travel_px: f32,
        ball_color: Rgb8,
    },
    Playing(PlayingView<'a>),
}

#[derive(Debug, Clone, Default)]
pub struct DebugStats {
    pub tier_label: String,
    pub circles: u32,
    pub particles: u32,
    pub touches: u32,
    pub draw_batches: u32,
    pub ad_status: String,
    pub seed: u64,
}

pub struct HudFrame<'a> {
    pub screen: HudScreen<'a>,
    pub toast: Option<&'a str>,
    pub time: &'a TimeState,
    pub debug: Option<DebugStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudActions {
    pub reset: bool,
    pub exit: bool,
    pub dismiss_interstitial: bool,
    pub cycle_tier: bool,
}

pub struct Hud {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl Hud {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    /// True while the pointer is over a HUD widget.
    pub fn wants_pointer(&self) -> bool {
        self.egui_ctx.wants_pointer_input()
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug panel: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        frame: &HudFrame<'_>,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        HudActions,
    ) {
        let mut actions = HudActions::default();
        let ppp = window.scale_factor() as f32;
        let debug_visible = self.debug_visible;
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            match &frame.screen {
                HudScreen::Loading {
                    ball_offset_x,
                    travel_px,
                    ball_color,
                } => loading_ui(ctx, *ball_offset_x, *travel_px, *ball_color),
                HudScreen::Playing(view) => playing_ui(ctx, view, ppp, &mut actions),
            }
            if let Some(text) = frame.toast {
                toast_ui(ctx, text);
            }
            if debug_visible {
                debug_ui(ctx, frame.time, frame.debug.as_ref(), &mut actions);
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn loading_ui(ctx: &egui::Context, ball_offset_x: f32, travel_px: f32, ball_color: Rgb8) {
    let screen = ctx.screen_rect();
    let painter = ctx.layer_painter(egui::LayerId::background());
    let centre = screen.center();
    let start_x = centre.x - travel_px / 2.0;
    painter.circle_filled(
        egui::pos2(start_x + ball_offset_x, centre.y),
        LOADING_BALL_RADIUS,
        to_color32(ball_color),
    );
    painter.text(
        egui::pos2(centre.x, centre.y + LOADING_BALL_RADIUS * 3.0),
        egui::Align2::CENTER_CENTER,
        "Loading...",
        egui::FontId::proportional(LABEL_FONT_SIZE),
        egui::Color32::from_gray(60),
    );
}

fn playing_ui(
    ctx: &egui::Context,
    view: &PlayingView<'_>,
    ppp: f32,
    actions: &mut HudActions,
) {
    let painter = ctx.layer_painter(egui::LayerId::background());
    let text = to_color32(view.palette.text);
    let shadow = to_color32(view.palette.shadow);

    let bar = to_points(view.info_bar, ppp);
    let font = egui::FontId::proportional(LABEL_FONT_SIZE);
    let left = egui::pos2(bar.left() + 12.0, bar.center().y);
    let right = egui::pos2(bar.right() - 12.0, bar.center().y);
    shadowed_text(
        &painter,
        left,
        egui::Align2::LEFT_CENTER,
        &format!("Score: {}", view.score),
        font.clone(),
        text,
        shadow,
    );
    shadowed_text(
        &painter,
        right,
        egui::Align2::RIGHT_CENTER,
        &format!("Round: {}", view.round),
        font,
        text,
        shadow,
    );

    if hud_button(ctx, "hud_reset", "Reset Game", to_points(view.reset_button, ppp)) {
        actions.reset = true;
    }
    if hud_button(ctx, "hud_exit", "Exit", to_points(view.exit_button, ppp)) {
        actions.exit = true;
    }

    if !view.banner.is_empty() {
        let banner = to_points(view.banner, ppp);
        painter.rect_filled(banner, 0.0, egui::Color32::from_gray(32));
        if let Some(creative) = view.banner_text {
            painter.text(
                banner.center(),
                egui::Align2::CENTER_CENTER,
                creative,
                egui::FontId::proportional(BANNER_FONT_SIZE),
                egui::Color32::from_gray(230),
            );
        }
    }

    if let Some(creative) = view.interstitial {
        let modal = egui::Modal::new(egui::Id::new("hud_interstitial")).show(ctx, |ui| {
            ui.set_width(ctx.screen_rect().width() * 0.7);
            ui.heading("Advertisement");
            ui.add_space(8.0);
            ui.label(creative);
            ui.add_space(12.0);
            ui.button("Close").clicked()
        });
        if modal.inner {
            actions.dismiss_interstitial = true;
        }
    }
}

fn hud_button(ctx: &egui::Context, id: &str, label: &str, rect: egui::Rect) -> bool {
    if rect.height() <= 0.0 {
        return false;
    }
    egui::Area::new(egui::Id::new(id))
        .fixed_pos(rect.min)
        .show(ctx, |ui| {
            ui.add_sized(rect.size(), egui::Button::new(label))
                .clicked()
        })
        .inner
}

fn shadowed_text(
    painter: &egui::Painter,
    pos: egui::Pos2,
    anchor: egui::Align2,
    text: &str,
    font: egui::FontId,
    color: egui::Color32,
    shadow: egui::Color32,
) {
    painter.text(
        pos + egui::vec2(SHADOW_OFFSET, SHADOW_OFFSET),
        anchor,
        text,
        font.clone(),
        shadow,
    );
    painter.text(pos, anchor, text, font, color);
}

fn toast_ui(ctx: &egui::Context, text: &str) {
    egui::Area::new(egui::Id::new("hud_toast"))
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -160.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .fill(egui::Color32::from_black_alpha(200))
                .show(ui, |ui| {
                    ui.colored_label(egui::Color32::WHITE, text);
                });
        });
}

fn debug_ui(
    ctx: &egui::Context,
    time: &TimeState,
    stats: Option<&DebugStats>,
    actions: &mut HudActions,
) {
    egui::Window::new("Debug")
        .default_pos([10.0, 60.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", time.smoothed_fps));
            ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
            ui.label(format!("Steps this frame: {}", time.steps_this_frame));
            ui.label(format!("Total steps: {}", time.fixed_step_count));
            ui.label(format!("Stalled frames: {}", time.stalled_frames));
            if let Some(stats) = stats {
                ui.separator();
                ui.label(format!("Circles: {}", stats.circles));
                ui.label(format!("Particles: {}", stats.particles));
                ui.label(format!("Active touches: {}", stats.touches));
                ui.label(format!("Draw batches: {}", stats.draw_batches));
                ui.label(format!("Seed: {}", stats.seed));
                ui.label(format!("Interstitial: {}", stats.ad_status));

                ui.separator();
                ui.horizontal(|ui| {
                    ui.label(format!("Fidelity: {}", stats.tier_label));
                    if ui.button("Cycle").clicked() {
                        actions.cycle_tier = true;
                    }
                });
            }
        });
}

pub fn to_color32(c: Rgb8) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

/// Physical-pixel rectangle to egui points.
pub fn to_points(rect: Rect, pixels_per_point: f32) -> egui::Rect {
    let ppp = if pixels_per_point > 0.0 {
        pixels_per_point
    } else {
        1.0
    };
    egui::Rect::from_min_size(
        egui::pos2(rect.x / ppp, rect.y / ppp),
        egui::vec2(rect.width / ppp, rect.height / ppp),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_convert_exactly() {
        let palette = TextPalette::for_background([Rgb8::WHITE, Rgb8::new(200, 200, 200)]);
        assert_eq!(to_color32(palette.text), egui::Color32::BLACK);
        assert_eq!(to_color32(palette.shadow), egui::Color32::WHITE);
    }

    #[test]
    fn rects_scale_to_points() {
        let r = to_points(Rect::new(0.0, 96.0, 960.0, 200.0), 2.0);
        assert_eq!(r.min, egui::pos2(0.0, 48.0));
        assert_eq!(r.size(), egui::vec2(480.0, 100.0));
    }

    #[test]
    fn invalid_scale_is_treated_as_one() {
        let r = to_points(Rect::new(10.0, 20.0, 30.0, 40.0), 0.0);
        assert_eq!(r.min, egui::pos2(10.0, 20.0));
    }
}
