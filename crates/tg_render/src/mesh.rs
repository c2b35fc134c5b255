//! CPU-side mesh building for the shape pipeline.
//!
//! The whole frame (window background, play-field background, circles,
//! particles) is appended to one vertex/index list and streamed to the GPU.
//! Batches record index ranges plus an optional clip rectangle so the game
//! view content can be scissored to its viewport in the same render pass.

use glam::Vec2;
use std::f32::consts::TAU;
use tg_core::{FidelityTier, Rect, Rgb};

use crate::shading::{
    highlight_offset, lit_brightness, ring_brightness, HIGHLIGHT_ALPHA, HIGHLIGHT_RADIUS,
    HIGHLIGHT_SEGMENTS,
};
use crate::vertex::ShapeVertex;

/// A contiguous run of indices drawn with the same clip rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawBatch {
    pub index_start: u32,
    pub index_count: u32,
    pub clip: Option<Rect>,
}

/// Input for one lit circle.
#[derive(Debug, Clone, Copy)]
pub struct CircleShape {
    pub center: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub flash_timer: f32,
}

/// Input for one particle square.
#[derive(Debug, Clone, Copy)]
pub struct ParticleShape {
    pub center: Vec2,
    pub size: f32,
    pub color: Rgb,
    pub alpha: f32,
}

#[derive(Debug, Default)]
pub struct ShapeMesh {
    pub vertices: Vec<ShapeVertex>,
    pub indices: Vec<u32>,
    pub batches: Vec<DrawBatch>,
    clip: Option<Rect>,
}

impl ShapeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
        self.clip = None;
    }

    /// Clip every following shape to `clip` (or stop clipping with `None`).
    pub fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn push_indices(&mut self, new_indices: &[u32]) {
        let index_start = self.indices.len() as u32;
        self.indices.extend_from_slice(new_indices);
        let index_count = new_indices.len() as u32;
        if let Some(last) = self.batches.last_mut() {
            if last.clip == self.clip && last.index_start + last.index_count == index_start {
                last.index_count += index_count;
                return;
            }
        }
        self.batches.push(DrawBatch {
            index_start,
            index_count,
            clip: self.clip,
        });
    }

    fn push_vertex(&mut self, position: Vec2, color: [f32; 4]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(ShapeVertex {
            position: position.to_array(),
            color,
        });
        index
    }

    /// Rectangle shaded from `top` at its upper edge to `bottom` at its lower.
    pub fn push_vertical_gradient(&mut self, rect: Rect, top: Rgb, bottom: Rgb) {
        let top_c = top.to_rgba(1.0);
        let bottom_c = bottom.to_rgba(1.0);
        let tl = self.push_vertex(Vec2::new(rect.x, rect.y), top_c);
        let tr = self.push_vertex(Vec2::new(rect.right(), rect.y), top_c);
        let br = self.push_vertex(Vec2::new(rect.right(), rect.bottom()), bottom_c);
        let bl = self.push_vertex(Vec2::new(rect.x, rect.bottom()), bottom_c);
        self.push_indices(&[tl, tr, br, tl, br, bl]);
    }

    /// Axis-aligned square centred on `center`.
    pub fn push_square(&mut self, center: Vec2, size: f32, color: [f32; 4]) {
        let h = size / 2.0;
        let a = self.push_vertex(center + Vec2::new(-h, -h), color);
        let b = self.push_vertex(center + Vec2::new(h, -h), color);
        let c = self.push_vertex(center + Vec2::new(h, h), color);
        let d = self.push_vertex(center + Vec2::new(-h, h), color);
        self.push_indices(&[a, b, c, a, c, d]);
    }

    /// Annulus between `inner` and `outer` radius. `inner == 0` gives a disc
    /// with degenerate inner triangles, which rasterise to nothing.
    pub fn push_ring(
        &mut self,
        center: Vec2,
        inner: f32,
        outer: f32,
        segments: u32,
        color: [f32; 4],
    ) {
        let segments = segments.max(3);
        let base = self.vertices.len() as u32;
        for i in 0..=segments {
            let angle = TAU * i as f32 / segments as f32;
            let dir = Vec2::new(angle.cos(), angle.sin());
            self.push_vertex(center + dir * inner, color);
            self.push_vertex(center + dir * outer, color);
        }
        let mut ring_indices = Vec::with_capacity(segments as usize * 6);
        for i in 0..segments {
            let inner_a = base + i * 2;
            let outer_a = inner_a + 1;
            let inner_b = inner_a + 2;
            let outer_b = inner_a + 3;
            ring_indices.extend_from_slice(&[inner_a, outer_a, outer_b, inner_a, outer_b, inner_b]);
        }
        self.push_indices(&ring_indices);
    }

    /// Filled disc as a triangle fan around the centre.
    pub fn push_disc(&mut self, center: Vec2, radius: f32, segments: u32, color: [f32; 4]) {
        let segments = segments.max(3);
        let hub = self.push_vertex(center, color);
        for i in 0..=segments {
            let angle = TAU * i as f32 / segments as f32;
            self.push_vertex(center + Vec2::new(angle.cos(), angle.sin()) * radius, color);
        }
        let mut fan = Vec::with_capacity(segments as usize * 3);
        for i in 0..segments {
            fan.extend_from_slice(&[hub, hub + 1 + i, hub + 2 + i]);
        }
        self.push_indices(&fan);
    }

    /// Sphere-shaded circle with an optional glossy highlight pulled toward
    /// `light`.
    pub fn push_lit_circle(&mut self, circle: &CircleShape, light: Vec2, tier: FidelityTier) {
        let rings = tier.circle_rings().max(1);
        let segments = tier.circle_segments();
        for ring in 0..rings {
            let inner = ring as f32 / rings as f32 * circle.radius;
            let outer = (ring + 1) as f32 / rings as f32 * circle.radius;
            let normalized = (inner + outer) / 2.0 / circle.radius.max(f32::EPSILON);
            let brightness = lit_brightness(ring_brightness(ring, normalized), circle.flash_timer);
            let color = circle.color.scaled(brightness).to_rgba(1.0);
            self.push_ring(circle.center, inner, outer, segments, color);
        }

        if tier.draws_highlight() {
            let offset = highlight_offset(circle.center, light, circle.radius);
            self.push_disc(
                circle.center + offset,
                circle.radius * HIGHLIGHT_RADIUS,
                HIGHLIGHT_SEGMENTS,
                Rgb::WHITE.to_rgba(HIGHLIGHT_ALPHA),
            );
        }
    }

    pub fn push_particle(&mut self, particle: &ParticleShape) {
        self.push_square(
            particle.center,
            particle.size,
            particle.color.to_rgba(particle.alpha.clamp(0.0, 1.0)),
        );
    }
}
