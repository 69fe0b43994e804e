use glam::{Mat4, Vec3};
use trailcubes_common::config::{
    CAMERA_BOTTOM, CAMERA_FAR, CAMERA_LEFT, CAMERA_NEAR, CAMERA_RIGHT, CAMERA_TOP,
};

/// Orthographic camera at the origin looking down -Z.
///
/// Bounds are plain fields. Changing them has no effect on the cached
/// projection until [`OrthographicCamera::update_projection_matrix`] runs.
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
    projection_updates: u64,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self::new(
            CAMERA_LEFT,
            CAMERA_RIGHT,
            CAMERA_TOP,
            CAMERA_BOTTOM,
            CAMERA_NEAR,
            CAMERA_FAR,
        )
    }
}

impl OrthographicCamera {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
            projection: Self::compute(left, right, top, bottom, near, far),
            projection_updates: 0,
        }
    }

    fn compute(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Mat4 {
        Mat4::orthographic_rh(left, right, bottom, top, near, far)
    }

    /// Fit left/right to `aspect` with the visible height fixed at one unit
    /// either side of the origin. Does not touch the cached projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.right = aspect;
        self.left = -aspect;
    }

    /// Recompute the cached projection from the current bounds.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Self::compute(
            self.left,
            self.right,
            self.top,
            self.bottom,
            self.near,
            self.far,
        );
        self.projection_updates += 1;
    }

    /// Number of times the projection has been recomputed since creation.
    pub fn projection_updates(&self) -> u64 {
        self.projection_updates
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn inverse_view_projection(&self) -> Mat4 {
        self.view_projection().inverse()
    }
}
