//! Small procedural meshes, used to measure surfaces before the host builds them.

use glam::{DMat4, DVec3};

use crate::bounds::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: DVec3,
    pub normal: DVec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices.iter().map(|v| v.pos))
    }

    pub fn transformed(&self, m: DMat4) -> Mesh {
        let vertices = self
            .vertices
            .iter()
            .map(|v| Vertex {
                pos: m.transform_point3(v.pos),
                normal: m.transform_vector3(v.normal).normalize_or_zero(),
            })
            .collect();
        Mesh {
            vertices,
            indices: self.indices.clone(),
        }
    }
}

/// Flat grid in the ZX plane facing +Y: `size_x` along X, `size_z` along Z.
pub fn grid(size_x: f64, size_z: f64, rows: u32, cols: u32) -> Mesh {
    let rows = rows.max(2);
    let cols = cols.max(2);
    let mut mesh = Mesh::default();
    for r in 0..rows {
        let z = (r as f64 / (rows - 1) as f64 - 0.5) * size_z;
        for c in 0..cols {
            let x = (c as f64 / (cols - 1) as f64 - 0.5) * size_x;
            mesh.vertices.push(Vertex {
                pos: DVec3::new(x, 0.0, z),
                normal: DVec3::Y,
            });
        }
    }
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let a = r * cols + c;
            let b = a + 1;
            let d = a + cols;
            let e = d + 1;
            mesh.indices.extend_from_slice(&[a, d, b, b, d, e]);
        }
    }
    mesh
}
