//! The engine bound to a render surface.
//!
//! A session is the only thing the game screen talks to: it owns the
//! [`Game`], the shape pipeline and the GPU buffers the frame mesh streams
//! into. Before `initialize` (and after `destroy`) queries answer with neutral
//! defaults so the screen can keep drawing its chrome.

use glam::Vec2;
use wgpu::util::DeviceExt;

use tg_core::{FidelityTier, Rect, Rgb8, TimeState};
use tg_render::{
    CircleShape, GpuContext, ParticleShape, ScreenCamera, ShapeMesh, ShapePipeline, ShapeVertex,
};

use crate::config::GameRules;
use crate::game::{Game, GameEvent};

struct SessionResources {
    game: Game,
    viewport: Rect,
    pipeline: ShapePipeline,
    camera: ScreenCamera,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
    mesh: ShapeMesh,
}

pub struct EngineSession {
    rules: GameRules,
    seed: u64,
    paused: bool,
    resources: Option<SessionResources>,
}

impl EngineSession {
    pub fn new(rules: GameRules, seed: u64) -> Self {
        Self {
            rules,
            seed,
            paused: false,
            resources: None,
        }
    }

    /// Bind a fresh game to `gpu`, sized to `viewport` (window pixels).
    pub fn initialize(&mut self, gpu: &GpuContext, viewport: Rect) {
        if self.resources.take().is_some() {
            log::info!("Re-initializing engine session, previous resources released");
        }

        let pipeline = ShapePipeline::new(&gpu.device, gpu.surface_format);
        let camera = ScreenCamera::new(gpu.size.0, gpu.size.1);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);

        let mut game = Game::new(self.rules.clone(), self.seed);
        game.init(viewport.width, viewport.height);

        self.resources = Some(SessionResources {
            game,
            viewport,
            pipeline,
            camera,
            camera_buffer,
            camera_bind_group,
            vertex_buffer: create_vertex_buffer(&gpu.device, 1),
            index_buffer: create_index_buffer(&gpu.device, 1),
            vertex_capacity: 1,
            index_capacity: 1,
            mesh: ShapeMesh::new(),
        });
        log::info!(
            "Engine session initialized, game view {}x{} at ({}, {})",
            viewport.width,
            viewport.height,
            viewport.x,
            viewport.y
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.resources.is_some()
    }

    /// Window or layout changed size.
    pub fn set_viewport(&mut self, window_size: (u32, u32), viewport: Rect) {
        if let Some(res) = &mut self.resources {
            res.camera.viewport = window_size;
            res.viewport = viewport;
            res.game.resize(viewport.width, viewport.height);
        }
    }

    /// While paused, banked steps are consumed without moving the game.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::debug!("Engine session {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    pub fn set_rules(&mut self, rules: GameRules) {
        if let Some(res) = &mut self.resources {
            res.game.set_rules(rules.clone());
        }
        self.rules = rules;
    }

    /// Advance the game by every fixed step the clock has banked, then build
    /// and upload this frame's mesh. Returns the number of steps taken.
    pub fn render(&mut self, gpu: &GpuContext, time: &mut TimeState, tier: FidelityTier) -> u32 {
        let paused = self.paused;
        let Some(res) = &mut self.resources else {
            return 0;
        };

        let dt = time.fixed_dt as f32;
        let mut steps = 0;
        while time.should_step() {
            if !paused {
                res.game.update(dt);
            }
            steps += 1;
        }

        build_frame_mesh(&mut res.mesh, &res.game, res.camera.viewport, res.viewport, tier);
        res.upload(gpu);
        steps
    }

    /// Record the frame's draw calls into `pass`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(res) = &self.resources else {
            return;
        };
        if res.mesh.indices.is_empty() {
            return;
        }

        pass.set_pipeline(&res.pipeline.render_pipeline);
        pass.set_bind_group(0, &res.camera_bind_group, &[]);
        pass.set_vertex_buffer(0, res.vertex_buffer.slice(..));
        pass.set_index_buffer(res.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        let target = res.camera.viewport;
        for batch in &res.mesh.batches {
            let (x, y, w, h) = scissor_for(batch.clip, target);
            if w == 0 || h == 0 {
                continue;
            }
            pass.set_scissor_rect(x, y, w, h);
            pass.draw_indexed(
                batch.index_start..(batch.index_start + batch.index_count),
                0,
                0..1,
            );
        }
    }

    pub fn touch(&mut self, x: f32, y: f32) -> bool {
        match &mut self.resources {
            Some(res) => res.game.handle_touch(x, y),
            None => false,
        }
    }

    pub fn score(&self) -> u32 {
        self.resources.as_ref().map_or(0, |r| r.game.score())
    }

    pub fn round(&self) -> u32 {
        self.resources.as_ref().map_or(0, |r| r.game.round())
    }

    pub fn is_game_over(&self) -> bool {
        self.resources.as_ref().is_some_and(|r| r.game.is_game_over())
    }

    pub fn reset(&mut self) {
        if let Some(res) = &mut self.resources {
            res.game.reset();
        }
    }

    /// Both gradient endpoints as 8-bit colours, `None` until initialized.
    pub fn background_colors(&self) -> Option<[Rgb8; 2]> {
        self.resources
            .as_ref()
            .map(|r| r.game.background().to_rgb8())
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.resources
            .as_mut()
            .map(|r| r.game.drain_events())
            .unwrap_or_default()
    }

    pub fn circle_count(&self) -> usize {
        self.resources.as_ref().map_or(0, |r| r.game.circles().len())
    }

    pub fn particle_count(&self) -> usize {
        self.resources
            .as_ref()
            .map_or(0, |r| r.game.particle_count())
    }

    pub fn batch_count(&self) -> usize {
        self.resources.as_ref().map_or(0, |r| r.mesh.batches.len())
    }

    pub fn destroy(&mut self) {
        if self.resources.take().is_some() {
            log::info!("Engine session destroyed");
        }
    }
}

impl SessionResources {
    fn upload(&mut self, gpu: &GpuContext) {
        self.ensure_mesh_capacity(gpu, self.mesh.vertices.len(), self.mesh.indices.len());
        if !self.mesh.vertices.is_empty() {
            gpu.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.mesh.vertices));
            gpu.queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&self.mesh.indices));
        }
        gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );
    }

    fn ensure_mesh_capacity(&mut self, gpu: &GpuContext, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.vertex_capacity {
            self.vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&gpu.device, self.vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.index_capacity {
            self.index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&gpu.device, self.index_capacity);
        }
    }
}

/// Window gradient (top color1, bottom color2) unclipped, then the game view
/// gradient (top color2, bottom color1), circles and particles clipped to the
/// view.
fn build_frame_mesh(
    mesh: &mut ShapeMesh,
    game: &Game,
    window_size: (u32, u32),
    viewport: Rect,
    tier: FidelityTier,
) {
    mesh.clear();
    let background = game.background();

    let window = Rect::new(0.0, 0.0, window_size.0 as f32, window_size.1 as f32);
    mesh.push_vertical_gradient(window, background.color1, background.color2);

    if viewport.is_empty() {
        return;
    }

    mesh.set_clip(Some(viewport));
    mesh.push_vertical_gradient(viewport, background.color2, background.color1);

    let origin = Vec2::new(viewport.x, viewport.y);
    let (field_w, field_h) = game.field_size();
    let light = origin + Vec2::new(field_w / 2.0, field_h / 2.0);

    for circle in game.circles() {
        mesh.push_lit_circle(
            &CircleShape {
                center: origin + Vec2::new(circle.x, circle.y),
                radius: circle.radius,
                color: circle.color,
                flash_timer: circle.flash_timer,
            },
            light,
            tier,
        );
    }

    for particle in game.particles() {
        mesh.push_particle(&ParticleShape {
            center: origin + Vec2::new(particle.x, particle.y),
            size: particle.size,
            color: particle.color,
            alpha: particle.alpha(),
        });
    }
}

/// Pixel scissor for a batch, clamped to the render target.
fn scissor_for(clip: Option<Rect>, target: (u32, u32)) -> (u32, u32, u32, u32) {
    let Some(clip) = clip else {
        return (0, 0, target.0, target.1);
    };
    let x0 = (clip.x.max(0.0) as u32).min(target.0);
    let y0 = (clip.y.max(0.0) as u32).min(target.1);
    let x1 = (clip.right().max(0.0).ceil() as u32).min(target.0);
    let y1 = (clip.bottom().max(0.0).ceil() as u32).min(target.1);
    (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<ShapeVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Frame Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Frame Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_session_answers_defaults() {
        let mut session = EngineSession::new(GameRules::default(), 1);
        assert!(!session.is_initialized());
        assert_eq!(session.score(), 0);
        assert_eq!(session.round(), 0);
        assert!(!session.is_game_over());
        assert_eq!(session.background_colors(), None);
        assert!(!session.touch(10.0, 10.0));
        assert!(session.drain_events().is_empty());
        session.reset();
        session.destroy();
    }

    #[test]
    fn frame_mesh_clips_game_content_to_view() {
        let mut game = Game::new(GameRules::default(), 7);
        game.init(480.0, 600.0);
        let viewport = Rect::new(0.0, 48.0, 480.0, 600.0);
        let mut mesh = ShapeMesh::new();
        build_frame_mesh(&mut mesh, &game, (480, 800), viewport, FidelityTier::Tier0);

        assert_eq!(mesh.batches.len(), 2);
        assert_eq!(mesh.batches[0].clip, None);
        assert_eq!(mesh.batches[0].index_count, 6);
        assert_eq!(mesh.batches[1].clip, Some(viewport));

        let tier = FidelityTier::Tier0;
        let circle_indices = (tier.circle_rings() * tier.circle_segments() * 6) as usize;
        assert_eq!(mesh.indices.len(), 6 + 6 + circle_indices);
    }

    #[test]
    fn gradients_run_in_opposite_directions() {
        let mut game = Game::new(GameRules::default(), 3);
        game.init(100.0, 100.0);
        let bg = game.background();
        let viewport = Rect::new(0.0, 50.0, 100.0, 100.0);
        let mut mesh = ShapeMesh::new();
        build_frame_mesh(&mut mesh, &game, (100, 200), viewport, FidelityTier::Tier0);

        // Window quad: first vertex is top-left.
        assert_eq!(mesh.vertices[0].color, bg.color1.to_rgba(1.0));
        assert_eq!(mesh.vertices[3].color, bg.color2.to_rgba(1.0));
        // View quad.
        assert_eq!(mesh.vertices[4].color, bg.color2.to_rgba(1.0));
        assert_eq!(mesh.vertices[7].color, bg.color1.to_rgba(1.0));
    }

    #[test]
    fn circles_are_offset_by_view_origin() {
        let mut game = Game::new(GameRules::default(), 11);
        game.init(200.0, 200.0);
        let c = game.circles()[0];
        let viewport = Rect::new(0.0, 300.0, 200.0, 200.0);
        let mut mesh = ShapeMesh::new();
        build_frame_mesh(&mut mesh, &game, (200, 600), viewport, FidelityTier::Tier0);
        let centre = Vec2::new(c.x, c.y + 300.0);
        let circle_vertices = &mesh.vertices[8..];
        assert!(circle_vertices
            .iter()
            .all(|v| Vec2::from(v.position).distance(centre) <= c.radius + 1e-3));
    }

    #[test]
    fn empty_view_draws_only_window_background() {
        let mut game = Game::new(GameRules::default(), 1);
        game.init(10.0, 10.0);
        let mut mesh = ShapeMesh::new();
        build_frame_mesh(
            &mut mesh,
            &game,
            (100, 100),
            Rect::new(0.0, 48.0, 100.0, 0.0),
            FidelityTier::Tier2,
        );
        assert_eq!(mesh.batches.len(), 1);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn scissor_is_clamped_to_target() {
        assert_eq!(scissor_for(None, (480, 800)), (0, 0, 480, 800));
        let clip = Rect::new(-10.0, 48.0, 600.0, 600.0);
        assert_eq!(scissor_for(Some(clip), (480, 800)), (0, 48, 480, 600));
        let outside = Rect::new(0.0, 900.0, 480.0, 100.0);
        let (_, _, _, h) = scissor_for(Some(outside), (480, 800));
        assert_eq!(h, 0);
    }
}
