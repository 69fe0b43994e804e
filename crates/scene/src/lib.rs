//! Scene graph for the cube demo: an orthographic camera, one directional
//! light and a group of six cubes.
//!
//! # Invariants
//! - The group never leaves the z=0 plane.
//! - Group rotation is a pure function of elapsed time.
//! - Cubes are created once and only move with their group.

mod camera;
mod graph;

pub use camera::OrthographicCamera;
pub use graph::{Cube, DirectionalLight, Group, Scene, rotation_at};
