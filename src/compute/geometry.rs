//! Vertex data and camera math for the two demos.

use glam::{Mat4, Vec3};

use crate::schema::CubeConfig;

/// Two triangles covering one cell, as interleaved `(x, y)` pairs.
pub const CELL_VERTICES: [f32; 12] = [
    -0.8, -0.8, //
    0.8, -0.8, //
    0.8, 0.8, //
    -0.8, -0.8, //
    0.8, 0.8, //
    -0.8, 0.8, //
];

/// Byte stride of one cell vertex (`Float32x2`).
pub const CELL_VERTEX_STRIDE: u64 = 2 * std::mem::size_of::<f32>() as u64;

/// Number of vertices drawn per cell instance.
pub const CELL_VERTEX_COUNT: u32 = (CELL_VERTICES.len() / 2) as u32;

/// Grid uniform contents: the grid dimensions as floats.
#[inline]
pub fn grid_uniform(grid_size: u32) -> [f32; 2] {
    [grid_size as f32, grid_size as f32]
}

/// One cube vertex: homogeneous position, colour and texture coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl CubeVertex {
    /// Vertex on the unit cube; the colour is the position remapped to [0, 1].
    fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, z, 1.0],
            color: [(x + 1.0) / 2.0, (y + 1.0) / 2.0, (z + 1.0) / 2.0, 1.0],
            uv: [u, v],
        }
    }
}

pub const CUBE_VERTEX_SIZE: u64 = std::mem::size_of::<CubeVertex>() as u64;
pub const CUBE_POSITION_OFFSET: u64 = 0;
pub const CUBE_COLOR_OFFSET: u64 = 16;
pub const CUBE_UV_OFFSET: u64 = 32;
pub const CUBE_VERTEX_COUNT: u32 = 36;

/// The 36 vertices of a cube, six faces of two counter-clockwise triangles.
pub fn cube_vertices() -> Vec<CubeVertex> {
    #[rustfmt::skip]
    let table: [(f32, f32, f32, f32, f32); CUBE_VERTEX_COUNT as usize] = [
        // -y
        ( 1.0, -1.0,  1.0, 0.0, 1.0),
        (-1.0, -1.0,  1.0, 1.0, 1.0),
        (-1.0, -1.0, -1.0, 1.0, 0.0),
        ( 1.0, -1.0, -1.0, 0.0, 0.0),
        ( 1.0, -1.0,  1.0, 0.0, 1.0),
        (-1.0, -1.0, -1.0, 1.0, 0.0),
        // +x
        ( 1.0,  1.0,  1.0, 0.0, 1.0),
        ( 1.0, -1.0,  1.0, 1.0, 1.0),
        ( 1.0, -1.0, -1.0, 1.0, 0.0),
        ( 1.0,  1.0, -1.0, 0.0, 0.0),
        ( 1.0,  1.0,  1.0, 0.0, 1.0),
        ( 1.0, -1.0, -1.0, 1.0, 0.0),
        // +y
        (-1.0,  1.0,  1.0, 0.0, 1.0),
        ( 1.0,  1.0,  1.0, 1.0, 1.0),
        ( 1.0,  1.0, -1.0, 1.0, 0.0),
        (-1.0,  1.0, -1.0, 0.0, 0.0),
        (-1.0,  1.0,  1.0, 0.0, 1.0),
        ( 1.0,  1.0, -1.0, 1.0, 0.0),
        // -x
        (-1.0, -1.0,  1.0, 0.0, 1.0),
        (-1.0,  1.0,  1.0, 1.0, 1.0),
        (-1.0,  1.0, -1.0, 1.0, 0.0),
        (-1.0, -1.0, -1.0, 0.0, 0.0),
        (-1.0, -1.0,  1.0, 0.0, 1.0),
        (-1.0,  1.0, -1.0, 1.0, 0.0),
        // +z
        ( 1.0,  1.0,  1.0, 0.0, 1.0),
        (-1.0,  1.0,  1.0, 1.0, 1.0),
        (-1.0, -1.0,  1.0, 1.0, 0.0),
        (-1.0, -1.0,  1.0, 1.0, 0.0),
        ( 1.0, -1.0,  1.0, 0.0, 0.0),
        ( 1.0,  1.0,  1.0, 0.0, 1.0),
        // -z
        ( 1.0, -1.0, -1.0, 0.0, 1.0),
        (-1.0, -1.0, -1.0, 1.0, 1.0),
        (-1.0,  1.0, -1.0, 1.0, 0.0),
        ( 1.0,  1.0, -1.0, 0.0, 0.0),
        ( 1.0, -1.0, -1.0, 0.0, 1.0),
        (-1.0,  1.0, -1.0, 1.0, 0.0),
    ];

    table
        .iter()
        .map(|&(x, y, z, u, v)| CubeVertex::new(x, y, z, u, v))
        .collect()
}

/// Projection matrix for the cube camera (WebGPU clip space, depth in [0, 1]).
pub fn cube_projection(config: &CubeConfig, aspect: f32) -> Mat4 {
    Mat4::perspective_rh(config.fov_y, aspect, config.near, config.far)
}

/// Model-view-projection matrix for the cube at `seconds`.
///
/// The cube sits `camera_distance` in front of the camera and turns by one
/// radian about the axis `(sin t, cos t, 0)`, which itself sweeps around
/// over time.
pub fn cube_transform(projection: Mat4, camera_distance: f32, seconds: f32) -> Mat4 {
    let axis = Vec3::new(seconds.sin(), seconds.cos(), 0.0);
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -camera_distance))
        * Mat4::from_axis_angle(axis, 1.0);
    projection * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_cell_vertex_buffer_layout() {
        let bytes: &[u8] = bytemuck::cast_slice(&CELL_VERTICES);
        assert_eq!(bytes.len(), CELL_VERTICES.len() * 4);
        assert_eq!(bytes.len(), 48);
        assert_eq!(CELL_VERTEX_COUNT, 6);
        assert_eq!(CELL_VERTEX_STRIDE, 8);
    }

    #[test]
    fn test_grid_uniform() {
        assert_eq!(grid_uniform(100), [100.0, 100.0]);
        let uniform = grid_uniform(512);
        let bytes: &[u8] = bytemuck::cast_slice(&uniform);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..4], &512.0f32.to_le_bytes());
    }

    #[test]
    fn test_cube_layout_offsets() {
        assert_eq!(CUBE_VERTEX_SIZE, 40);
        assert_eq!(std::mem::offset_of!(CubeVertex, position) as u64, CUBE_POSITION_OFFSET);
        assert_eq!(std::mem::offset_of!(CubeVertex, color) as u64, CUBE_COLOR_OFFSET);
        assert_eq!(std::mem::offset_of!(CubeVertex, uv) as u64, CUBE_UV_OFFSET);
    }

    #[test]
    fn test_cube_vertices() {
        let vertices = cube_vertices();
        assert_eq!(vertices.len(), CUBE_VERTEX_COUNT as usize);
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len() as u64, CUBE_VERTEX_SIZE * CUBE_VERTEX_COUNT as u64);

        for v in &vertices {
            assert!(v.position[..3].iter().all(|c| c.abs() == 1.0));
            assert_eq!(v.position[3], 1.0);
            assert_eq!(v.color[0], (v.position[0] + 1.0) / 2.0);
        }
    }

    #[test]
    fn test_cube_faces_wind_outward() {
        let vertices = cube_vertices();
        for tri in vertices.chunks(3) {
            let p = |i: usize| Vec3::from_slice(&tri[i].position[..3]);
            let normal = (p(1) - p(0)).cross(p(2) - p(0));
            let centroid = (p(0) + p(1) + p(2)) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle winds inward: {tri:?}");
        }
    }

    #[test]
    fn test_cube_centre_projects_inside_clip_volume() {
        let config = CubeConfig::default();
        let projection = cube_projection(&config, 16.0 / 9.0);
        for t in [0.0f32, 0.5, 1.7, 10.0] {
            let mvp = cube_transform(projection, config.camera_distance, t);
            let clip = mvp * Vec4::new(0.0, 0.0, 0.0, 1.0);
            assert!((clip.w - 4.0).abs() < 1e-4);
            assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
            let depth = clip.z / clip.w;
            assert!((0.0..=1.0).contains(&depth));
        }
    }

    #[test]
    fn test_cube_corners_stay_in_front_of_camera() {
        let config = CubeConfig::default();
        let projection = cube_projection(&config, 1.0);
        let mvp = cube_transform(projection, config.camera_distance, 2.3);
        for v in cube_vertices() {
            let clip = mvp * Vec4::from_array(v.position);
            assert!(clip.w > config.near);
        }
    }
}
