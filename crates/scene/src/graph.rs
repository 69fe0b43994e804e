use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use trailcubes_common::{Color, SceneConfig};

/// Directional light aimed at the origin from `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(-1.0, 2.0, 4.0),
        }
    }
}

impl DirectionalLight {
    /// Unit vector pointing from the scene towards the light.
    pub fn direction(&self) -> Vec3 {
        self.position.try_normalize().unwrap_or(Vec3::Z)
    }
}

/// A unit box with a fixed color at a fixed offset inside its group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub color: Color,
    pub offset: Vec3,
    pub size: f32,
}

/// Parent node for the cubes. Position follows the pointer, rotation follows time.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub position: Vec3,
    /// Euler angles (x, y) in radians, applied in XYZ order.
    pub rotation: Vec2,
    scale: f32,
    cubes: Vec<Cube>,
}

impl Group {
    pub fn new(scale: f32, cubes: Vec<Cube>) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec2::ZERO,
            scale,
            cubes,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    /// Move within the XY plane. Z stays at zero.
    pub fn set_planar_position(&mut self, xy: Vec2) {
        self.position = xy.extend(0.0);
    }

    pub fn local_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }

    /// World matrices of every cube, in creation order.
    pub fn cube_world_matrices(&self) -> impl Iterator<Item = (Mat4, &Cube)> + '_ {
        let parent = self.local_matrix();
        self.cubes.iter().map(move |cube| {
            let local = Mat4::from_scale_rotation_translation(
                Vec3::splat(cube.size),
                Quat::IDENTITY,
                cube.offset,
            );
            (parent * local, cube)
        })
    }
}

/// Group rotation for a given elapsed time. Unbounded; no wrapping.
pub fn rotation_at(elapsed_secs: f32, y_ratio: f32) -> Vec2 {
    Vec2::new(elapsed_secs, elapsed_secs * y_ratio)
}

/// The whole scene: one light and one cube group.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub light: DirectionalLight,
    pub group: Group,
}

impl Default for Scene {
    fn default() -> Self {
        Self::build(&SceneConfig::default())
    }
}

impl Scene {
    /// Build the six-cube scene. Cubes sit on each axis at `cube_offset`.
    pub fn build(config: &SceneConfig) -> Self {
        let d = config.cube_offset;
        let size = config.cube_size;
        let placements = [
            (0xFF0000, Vec3::new(-d, 0.0, 0.0)),
            (0xFFFF00, Vec3::new(d, 0.0, 0.0)),
            (0x00FF00, Vec3::new(0.0, -d, 0.0)),
            (0x00FFFF, Vec3::new(0.0, d, 0.0)),
            (0x0000FF, Vec3::new(0.0, 0.0, -d)),
            (0xFF00FF, Vec3::new(0.0, 0.0, d)),
        ];
        let cubes = placements
            .into_iter()
            .map(|(hex, offset)| Cube {
                color: Color::from_hex(hex),
                offset,
                size,
            })
            .collect();

        tracing::debug!(
            "built scene: 6 cubes, scale={}, offset={}",
            config.group_scale,
            d
        );

        Self {
            light: DirectionalLight::default(),
            group: Group::new(config.group_scale, cubes),
        }
    }
}
