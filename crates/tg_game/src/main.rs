//! Touch Game -- application entry point and game screen.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. The app
//! starts on a loading screen and switches to the game screen once the splash
//! time is up. On the game screen every `RedrawRequested` runs one frame:
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed the fixed-step clock
//!   2. config hot reload, keyboard shortcuts, ad network events
//!   3. `session.render()` -- step the game and rebuild the frame mesh
//!   4. game events become toasts; score, round and text colours refresh
//!   5. draw the shape pass, then the egui HUD on top
//!
//! Taps are forwarded to the engine the moment they arrive, on this same
//! thread, so the game is never touched concurrently.

mod ads;
mod config;
mod game;
mod haptics;
mod house_ads;
mod layout;
mod particles;
#[cfg(test)]
mod replay;
mod session;
mod splash;

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use ads::AdManager;
use config::{load_config_from_path, load_config_or_default, ConfigWatcher, GameConfig};
use game::GameEvent;
use haptics::{default_haptics, HapticFeedback, HapticKind};
use house_ads::HouseAdNetwork;
use layout::ScreenLayout;
use session::EngineSession;
use splash::SplashScreen;
use tg_core::{FidelityTier, InputState, Key, MouseBtn, Rgb8, TextPalette, TimeState};
use tg_core::{ToastLength, ToastQueue};
use tg_hud::{DebugStats, Hud, HudActions, HudFrame, HudScreen, PlayingView};
use tg_platform::PlatformConfig;
use tg_render::GpuContext;

const CONFIG_PATH_ENV: &str = "TOUCHGAME_CONFIG";
const SEED_ENV: &str = "TOUCHGAME_SEED";

const INSTRUCTIONS: &str = "Tap the moving circles to score points!\n\
                            Every hit is worth 10 points.\n\
                            Circles get smaller and faster each round!";
const INSTRUCTIONS_SECONDS: f32 = 10.0;

const FALLBACK_CLEAR: wgpu::Color = wgpu::Color::WHITE;

enum Screen {
    Loading { started: Instant },
    Playing,
}

/// What the labels currently show, refreshed from the engine every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DisplayState {
    score: u32,
    round: u32,
    palette: TextPalette,
}

impl DisplayState {
    fn initial() -> Self {
        Self {
            score: 0,
            round: 1,
            palette: TextPalette::fallback(),
        }
    }

    fn refresh(&mut self, session: &EngineSession) {
        self.score = session.score();
        self.round = session.round();
        self.palette = palette_for(session.background_colors());
    }
}

struct AppState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    hud: Hud,
    screen: Screen,
    splash: SplashScreen,
    layout: ScreenLayout,
    config_path: PathBuf,
    config_watcher: ConfigWatcher,
    config: GameConfig,
    seed: u64,
    session: EngineSession,
    ads: AdManager,
    haptics: Box<dyn HapticFeedback>,
    toasts: ToastQueue,
    display: DisplayState,
    tier: FidelityTier,
}

impl AppState {
    fn new(
        window: Arc<Window>,
        gpu: GpuContext,
        config: GameConfig,
        config_path: PathBuf,
        seed: u64,
    ) -> Self {
        let hud = Hud::new(&gpu.device, gpu.surface_format, &window);
        let layout = ScreenLayout::compute(
            gpu.size.0,
            gpu.size.1,
            window.scale_factor() as f32,
            config.ads.enabled,
        );

        let (ad_tx, ad_rx) = mpsc::channel();
        let network = HouseAdNetwork::new(config.ads.house.clone(), ad_tx, seed);
        let ads = AdManager::new(
            config.ads.clone(),
            Box::new(network),
            ad_rx,
            seed,
            Instant::now(),
        );

        Self {
            hud,
            layout,
            time: TimeState::new(),
            input: InputState::new(),
            screen: Screen::Loading {
                started: Instant::now(),
            },
            splash: SplashScreen::new(&config.splash),
            config_watcher: ConfigWatcher::new(config_path.clone()),
            config_path,
            session: EngineSession::new(config.rules.clone(), seed),
            ads,
            haptics: default_haptics(),
            toasts: ToastQueue::new(),
            display: DisplayState::initial(),
            tier: FidelityTier::default(),
            config,
            seed,
            window,
            gpu,
        }
    }

    fn enter_game(&mut self) {
        log::info!("Loading finished, entering game screen");
        self.screen = Screen::Playing;
        self.session.initialize(&self.gpu, self.layout.game_view);
        self.display.refresh(&self.session);
        self.ads.start();
        self.toasts
            .push(INSTRUCTIONS, ToastLength::Custom(INSTRUCTIONS_SECONDS));
        self.time.reset_clock();
    }

    fn relayout(&mut self) {
        self.layout = ScreenLayout::compute(
            self.gpu.size.0,
            self.gpu.size.1,
            self.window.scale_factor() as f32,
            self.ads.is_enabled(),
        );
        self.session
            .set_viewport(self.gpu.size, self.layout.game_view);
    }

    fn reload_config(&mut self, reason: &str) {
        match load_config_from_path(&self.config_path) {
            Ok(new_config) => {
                if new_config.rules != self.config.rules {
                    self.session.set_rules(new_config.rules.clone());
                    log::info!("Game rules reloaded ({}), applied from the next round", reason);
                }
                if new_config.ads != self.config.ads
                    || new_config.window != self.config.window
                    || new_config.splash != self.config.splash
                {
                    log::warn!("Window, splash and ads settings only apply after a restart");
                }
                self.config = new_config;
            }
            Err(err) => {
                log::error!(
                    "Config reload failed for '{}' ({}): {}",
                    self.config_path.display(),
                    reason,
                    err
                );
            }
        }
    }

    fn handle_tap(&mut self, x: f64, y: f64) {
        if !matches!(self.screen, Screen::Playing) || self.ads.presenting().is_some() {
            return;
        }
        let Some((gx, gy)) = self.layout.to_game_coords(x as f32, y as f32) else {
            return;
        };
        self.haptics.perform(HapticKind::VirtualKey);
        let hit = self.session.touch(gx, gy);
        log::debug!("Tap at ({:.0}, {:.0}) -> {}", gx, gy, if hit { "hit" } else { "miss" });
        if hit {
            self.haptics.perform(HapticKind::LongPress);
        }
    }

    fn handle_game_events(&mut self) {
        for event in self.session.drain_events() {
            let Some(message) = event.message() else {
                continue;
            };
            let length = match event {
                GameEvent::GameOver { .. } => ToastLength::Long,
                _ => ToastLength::Short,
            };
            self.toasts.push(message, length);
        }
    }

    fn reset_game(&mut self) {
        self.session.reset();
        self.ads.on_game_reset();
        self.display.refresh(&self.session);
        log::info!(
            "Game reset: Score: {} / Round: {}",
            self.display.score,
            self.display.round
        );
    }

    fn handle_shortcuts(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.is_just_pressed(Key::Escape) {
            log::info!("Escape pressed, exiting.");
            event_loop.exit();
        }
        if self.input.is_just_pressed(Key::F3) {
            self.hud.toggle_debug();
        }
        if self.input.is_just_pressed(Key::F5) {
            self.tier = self.tier.next();
            log::info!("Fidelity tier: {}", self.tier.label());
        }
        if self.input.is_just_pressed(Key::R) && matches!(self.screen, Screen::Playing) {
            self.reset_game();
        }
    }

    fn apply_hud_actions(&mut self, actions: HudActions, event_loop: &ActiveEventLoop) {
        if actions.reset {
            self.reset_game();
        }
        if actions.exit {
            log::info!("Exit pressed, exiting.");
            event_loop.exit();
        }
        if actions.dismiss_interstitial {
            self.ads.dismiss_interstitial();
        }
        if actions.cycle_tier {
            self.tier = self.tier.next();
            log::info!("Fidelity tier (debug panel): {}", self.tier.label());
        }
    }

    fn update_playing(&mut self) {
        let now = Instant::now();
        self.time.begin_frame();

        if self.config_watcher.should_reload() {
            self.reload_config("file watcher");
        }

        self.ads.poll(now);
        self.session.set_paused(self.ads.presenting().is_some());
        self.session.render(&self.gpu, &mut self.time, self.tier);

        self.handle_game_events();
        self.display.refresh(&self.session);
        self.ads.on_progress(self.display.round, now);

        self.toasts.tick(self.time.real_dt as f32);
        self.haptics.poll();
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let ball_offset_x = match self.screen {
            Screen::Loading { started } => self.splash.offset_x(started.elapsed()),
            Screen::Playing => 0.0,
        };
        let screen = match self.screen {
            Screen::Loading { .. } => HudScreen::Loading {
                ball_offset_x,
                travel_px: self.config.splash.travel_px,
                ball_color: self.config.splash.ball_color.to_rgb8(),
            },
            Screen::Playing => HudScreen::Playing(PlayingView {
                score: self.display.score,
                round: self.display.round,
                palette: self.display.palette,
                info_bar: self.layout.info_bar,
                reset_button: self.layout.reset_button,
                exit_button: self.layout.exit_button,
                banner: self.layout.banner,
                banner_text: self.ads.banner_creative(),
                interstitial: self.ads.presenting().map(|ad| ad.creative.as_str()),
            }),
        };
        let debug = DebugStats {
            tier_label: self.tier.label().to_string(),
            circles: self.session.circle_count() as u32,
            particles: self.session.particle_count() as u32,
            touches: self.input.active_touches() as u32,
            draw_batches: self.session.batch_count() as u32,
            ad_status: self.ads.status_label().to_string(),
            seed: self.seed,
        };
        let frame = HudFrame {
            screen,
            toast: self.toasts.current().map(|t| t.text.as_str()),
            time: &self.time,
            debug: Some(debug),
        };
        let (egui_primitives, egui_textures_delta, actions) =
            self.hud.prepare(&self.window, &frame);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Game Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(FALLBACK_CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            if matches!(self.screen, Screen::Playing) {
                self.session.draw(&mut render_pass);
            }
        }

        self.hud.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("HUD Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.hud
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.hud.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.apply_hud_actions(actions, event_loop);
    }

    fn shutdown(&mut self) {
        self.ads.destroy_banner();
        self.session.destroy();
    }
}

struct App {
    state: Option<AppState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let config_path = config_path_from_env(std::env::var(CONFIG_PATH_ENV).ok());
        let config = match load_config_or_default(&config_path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}. Falling back to built-in defaults");
                GameConfig::default()
            }
        };
        let seed = resolve_seed(std::env::var(SEED_ENV).ok().as_deref(), config.seed);
        log::info!("Config: '{}', seed {}", config_path.display(), seed);

        let platform = PlatformConfig {
            title: config.window.title.clone(),
            width: config.window.width,
            height: config.window.height,
            ..PlatformConfig::default()
        };
        let window = match tg_platform::create_window(event_loop, &platform) {
            Ok(window) => window,
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
                return;
            }
        };
        log::info!("Window created: {}x{}", platform.width, platform.height);

        let gpu = match GpuContext::new(window.clone()) {
            Ok(gpu) => gpu,
            Err(err) => {
                log::error!("GPU initialization failed: {err}");
                event_loop.exit();
                return;
            }
        };

        self.state = Some(AppState::new(window, gpu, config, config_path, seed));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_mut() {
            state.shutdown();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.hud.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.relayout();
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                state.relayout();
            }

            WindowEvent::Focused(focused) => {
                if focused {
                    state.ads.resume_banner();
                    state.time.reset_clock();
                } else {
                    state.ads.pause_banner();
                }
            }

            WindowEvent::Occluded(occluded) => {
                if occluded {
                    state.ads.pause_banner();
                } else {
                    state.ads.resume_banner();
                    state.time.reset_clock();
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(game_key),
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.mouse_position = (position.x, position.y);
            }

            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ElementState::Pressed => {
                    let fresh = state.input.mouse_down(MouseBtn::Left);
                    if fresh && !egui_consumed && !state.hud.wants_pointer() {
                        let (x, y) = state.input.mouse_position;
                        state.handle_tap(x, y);
                    }
                }
                ElementState::Released => state.input.mouse_up(MouseBtn::Left),
            },

            WindowEvent::Touch(touch) => {
                let position = (touch.location.x, touch.location.y);
                match touch.phase {
                    TouchPhase::Started => {
                        state.input.touch_started(touch.id, position);
                        if !egui_consumed {
                            state.handle_tap(position.0, position.1);
                        }
                    }
                    TouchPhase::Moved => state.input.touch_moved(touch.id, position),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        state.input.touch_ended(touch.id)
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.handle_shortcuts(event_loop);

                match state.screen {
                    Screen::Loading { started } => {
                        if state.splash.is_finished(started.elapsed()) {
                            state.enter_game();
                        }
                    }
                    Screen::Playing => state.update_playing(),
                }

                state.draw(event_loop);
                state.input.end_frame();
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F5 => Some(Key::F5),
        KeyCode::KeyR => Some(Key::R),
        _ => None,
    }
}

/// Label colours for the current background, or dark text on the white
/// fallback while the engine has nothing to report.
fn palette_for(colors: Option<[Rgb8; 2]>) -> TextPalette {
    colors.map_or_else(TextPalette::fallback, TextPalette::for_background)
}

fn config_path_from_env(value: Option<String>) -> PathBuf {
    value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_PATH))
}

/// Environment override first, then the config file, then a fresh random seed.
fn resolve_seed(env_value: Option<&str>, config_seed: Option<u64>) -> u64 {
    if let Some(raw) = env_value {
        match raw.trim().parse::<u64>() {
            Ok(seed) => return seed,
            Err(err) => log::warn!("Ignoring {SEED_ENV}='{raw}': {err}"),
        }
    }
    config_seed.unwrap_or_else(rand::random)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Touch Game starting...");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
        std::process::exit(1);
    }
}
