use crate::canvas::{CanvasGeometry, canvas_relative_position, to_ndc};
use crate::event::{EventOutcome, InputEvent};
use glam::{Mat4, Vec2, Vec3};
use trailcubes_scene::OrthographicCamera;

/// Last mapped pointer position in scene space. Last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    position: Vec2,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position on the z=0 plane.
    pub fn as_vec3(&self) -> Vec3 {
        self.position.extend(0.0)
    }

    pub fn set(&mut self, position: Vec2) {
        self.position = position;
    }
}

/// Map a point in normalized device coordinates back into scene space.
pub fn unproject(ndc: Vec3, inverse_view_projection: &Mat4) -> Vec3 {
    inverse_view_projection.project_point3(ndc)
}

/// Turns pointer and touch events into scene-space positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputMapper;

impl InputMapper {
    pub fn new() -> Self {
        Self
    }

    /// Scene-space position under `client`, or `None` for a zero-sized canvas.
    pub fn scene_position(
        &self,
        client: Vec2,
        canvas: &CanvasGeometry,
        camera: &OrthographicCamera,
    ) -> Option<Vec2> {
        if canvas.is_degenerate() {
            return None;
        }
        let pixel = canvas_relative_position(client, canvas);
        let ndc = to_ndc(pixel, canvas.buffer);
        let scene = unproject(ndc.extend(0.0), &camera.inverse_view_projection());
        Some(scene.truncate())
    }

    /// Apply one event to `pointer`.
    pub fn handle(
        &self,
        event: &InputEvent,
        canvas: &CanvasGeometry,
        camera: &OrthographicCamera,
        pointer: &mut PointerState,
    ) -> EventOutcome {
        let prevent_default = event.wants_default_suppressed();

        let Some(client) = event.primary_client() else {
            tracing::debug!("touch move without contacts ignored");
            return EventOutcome {
                updated: false,
                prevent_default,
            };
        };

        let Some(position) = self.scene_position(client, canvas, camera) else {
            tracing::debug!("input on zero-sized canvas ignored");
            return EventOutcome {
                updated: false,
                prevent_default,
            };
        };

        pointer.set(position);
        tracing::trace!("pointer -> ({:.3}, {:.3})", position.x, position.y);

        EventOutcome {
            updated: true,
            prevent_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasRect;
    use crate::event::TouchPoint;
    use trailcubes_common::PixelSize;

    fn camera_for(size: PixelSize) -> OrthographicCamera {
        let mut cam = OrthographicCamera::default();
        cam.set_aspect(size.aspect().unwrap());
        cam.update_projection_matrix();
        cam
    }

    #[test]
    fn unproject_identity_is_noop() {
        let p = unproject(Vec3::new(0.25, -0.5, 0.0), &Mat4::IDENTITY);
        assert_eq!(p, Vec3::new(0.25, -0.5, 0.0));
    }

    #[test]
    fn canvas_center_maps_to_origin() {
        let size = PixelSize::new(400, 300);
        let canvas = CanvasGeometry::new(CanvasRect::new(30.0, 40.0, 400.0, 300.0), size);
        let cam = camera_for(size);
        let p = InputMapper::new()
            .scene_position(Vec2::new(230.0, 190.0), &canvas, &cam)
            .unwrap();
        assert!(p.length() < 1e-5);
    }

    #[test]
    fn corners_map_to_camera_bounds() {
        let size = PixelSize::new(800, 400);
        let canvas = CanvasGeometry::unscaled(size);
        let cam = camera_for(size);
        let mapper = InputMapper::new();

        let top_left = mapper.scene_position(Vec2::ZERO, &canvas, &cam).unwrap();
        assert!((top_left - Vec2::new(-2.0, 1.0)).length() < 1e-5);

        let bottom_right = mapper
            .scene_position(Vec2::new(800.0, 400.0), &canvas, &cam)
            .unwrap();
        assert!((bottom_right - Vec2::new(2.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn y_axis_is_inverted() {
        let size = PixelSize::new(300, 300);
        let canvas = CanvasGeometry::unscaled(size);
        let cam = camera_for(size);
        let mapper = InputMapper::new();
        let upper = mapper
            .scene_position(Vec2::new(150.0, 50.0), &canvas, &cam)
            .unwrap();
        let lower = mapper
            .scene_position(Vec2::new(150.0, 250.0), &canvas, &cam)
            .unwrap();
        assert!(upper.y > lower.y);
        assert!((upper.x - lower.x).abs() < 1e-6);
    }

    #[test]
    fn pointer_event_overwrites_state() {
        let size = PixelSize::new(200, 200);
        let canvas = CanvasGeometry::unscaled(size);
        let cam = camera_for(size);
        let mut pointer = PointerState::new();
        let mapper = InputMapper::new();

        mapper.handle(&InputEvent::pointer(0.0, 0.0), &canvas, &cam, &mut pointer);
        let event = InputEvent::pointer(200.0, 100.0);
        let outcome = mapper.handle(&event, &canvas, &cam, &mut pointer);

        assert!(outcome.updated);
        assert!(!outcome.prevent_default);
        assert!((pointer.position() - Vec2::new(1.0, 0.0)).length() < 1e-5);
        assert_eq!(pointer.as_vec3().z, 0.0);
    }

    #[test]
    fn touch_uses_first_contact_and_prevents_default() {
        let size = PixelSize::new(200, 200);
        let canvas = CanvasGeometry::unscaled(size);
        let cam = camera_for(size);
        let mut pointer = PointerState::new();
        let event = InputEvent::TouchMove {
            touches: vec![
                TouchPoint {
                    id: 1,
                    client: Vec2::new(0.0, 100.0),
                },
                TouchPoint {
                    id: 2,
                    client: Vec2::new(200.0, 100.0),
                },
            ],
        };
        let outcome = InputMapper::new().handle(&event, &canvas, &cam, &mut pointer);
        assert!(outcome.updated);
        assert!(outcome.prevent_default);
        assert!((pointer.position() - Vec2::new(-1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn touch_without_contacts_is_noop() {
        let size = PixelSize::new(200, 200);
        let canvas = CanvasGeometry::unscaled(size);
        let cam = camera_for(size);
        let mut pointer = PointerState::new();
        pointer.set(Vec2::new(0.3, 0.4));

        let event = InputEvent::TouchMove { touches: vec![] };
        let outcome = InputMapper::new().handle(&event, &canvas, &cam, &mut pointer);

        assert!(!outcome.updated);
        assert!(outcome.prevent_default);
        assert_eq!(pointer.position(), Vec2::new(0.3, 0.4));
    }

    #[test]
    fn zero_sized_canvas_is_ignored() {
        let canvas = CanvasGeometry::unscaled(PixelSize::new(0, 0));
        let cam = OrthographicCamera::default();
        let mut pointer = PointerState::new();
        let event = InputEvent::pointer(5.0, 5.0);
        let outcome = InputMapper::new().handle(&event, &canvas, &cam, &mut pointer);
        assert!(!outcome.updated);
        assert_eq!(pointer.position(), Vec2::ZERO);
    }
}
