//! World-to-screen projection for label anchors.

use cartotext_core::FrameNumber;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Projects world-space label anchors into screen space and carries the
/// per-frame camera facts the placement pass consumes: zoom level, frame
/// number and whether the camera is currently moving.
#[derive(Debug, Clone)]
pub struct ScreenProjector {
    view_proj: Mat4,
    viewport: Vec2,
    zoom: f32,
    frame: FrameNumber,
    moving: bool,
}

impl ScreenProjector {
    /// Build from a precomputed view-projection matrix.
    pub fn new(view_proj: Mat4, viewport: Vec2, zoom: f32) -> Self {
        Self {
            view_proj,
            viewport,
            zoom,
            frame: FrameNumber::ZERO,
            moving: false,
        }
    }

    /// Perspective camera at `position` with yaw/pitch orientation.
    pub fn perspective(
        position: Vec3,
        yaw: f32,
        pitch: f32,
        fov: f32,
        viewport: Vec2,
        zoom: f32,
    ) -> Self {
        let rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
        let view = Mat4::from_rotation_translation(rotation, position).inverse();
        let aspect = viewport.x / viewport.y.max(1.0);
        let proj = Mat4::perspective_rh(fov, aspect, 0.1, 10_000.0);
        Self::new(proj * view, viewport, zoom)
    }

    /// Orthographic top-down camera over the map plane (z = 0), covering
    /// `half_extent` world units from `center` in both axes.
    pub fn top_down(center: Vec2, half_extent: f32, viewport: Vec2, zoom: f32) -> Self {
        let eye = Vec3::new(center.x, center.y, 10.0);
        let view = Mat4::look_at_rh(eye, eye - Vec3::Z, Vec3::Y);
        let proj = Mat4::orthographic_rh(
            -half_extent,
            half_extent,
            -half_extent,
            half_extent,
            0.1,
            100.0,
        );
        Self::new(proj * view, viewport, zoom)
    }

    /// Project a world point to screen pixels.
    ///
    /// Returns None when the point is behind the camera or outside the
    /// view frustum.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    /// Viewport size in pixels.
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Continuous zoom level.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Zoom level floored to the style cache key granularity.
    pub fn zoom_floor(&self) -> u32 {
        self.zoom.max(0.0).floor() as u32
    }

    /// Current frame number.
    pub fn frame(&self) -> FrameNumber {
        self.frame
    }

    /// Advance the frame counter.
    pub fn advance_frame(&mut self) {
        self.frame = self.frame.advance();
    }

    /// Whether the camera reported motion this frame.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Flag camera motion; placement defers expensive re-collection while set.
    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }
}
