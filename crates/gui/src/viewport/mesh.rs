//! CPU-side render meshes for the voxel viewport.

use std::collections::HashSet;

use glam::Vec3;
use shared::{Cell, Face, GridExtent};

/// Lift highlight quads off the surface they cover
const HIGHLIGHT_OFFSET: f32 = 0.002;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 9
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, color: [f32; 3]) {
        let base = self.vertex_count() as u32;
        for v in corners {
            push_vert(&mut self.vertices, v, normal, color);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
#[derive(Clone, Debug, Default)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 7
    }
}

/// Corners of one face of the unit cube at `cell`, counter-clockwise from outside
pub fn face_quad(cell: Cell, face: Face) -> [Vec3; 4] {
    let o = Vec3::new(cell.x as f32, cell.y as f32, cell.z as f32);
    let c = |x: f32, y: f32, z: f32| o + Vec3::new(x, y, z);
    match face {
        Face::Bottom => [c(0., 0., 0.), c(0., 1., 0.), c(1., 1., 0.), c(1., 0., 0.)],
        Face::Top => [c(0., 0., 1.), c(1., 0., 1.), c(1., 1., 1.), c(0., 1., 1.)],
        Face::Left => [c(0., 0., 0.), c(0., 0., 1.), c(0., 1., 1.), c(0., 1., 0.)],
        Face::Right => [c(1., 0., 0.), c(1., 1., 0.), c(1., 1., 1.), c(1., 0., 1.)],
        Face::Front => [c(0., 0., 0.), c(1., 0., 0.), c(1., 0., 1.), c(0., 0., 1.)],
        Face::Back => [c(0., 1., 0.), c(0., 1., 1.), c(1., 1., 1.), c(1., 1., 0.)],
    }
}

/// Solid mesh for all occupied cells. Faces shared by two cubes are skipped.
pub fn cubes(cells: &HashSet<Cell>, color: [f32; 3]) -> MeshData {
    let mut mesh = MeshData::default();
    for &cell in cells {
        for face in Face::ALL {
            if cells.contains(&cell.neighbor(face)) {
                continue;
            }
            mesh.push_quad(face_quad(cell, face), Vec3::from(face.normal()), color);
        }
    }
    mesh
}

/// Quads slightly in front of the given faces
pub fn face_highlight(faces: &[(Cell, Face)], color: [f32; 3]) -> MeshData {
    let mut mesh = MeshData::default();
    for &(cell, face) in faces {
        let normal = Vec3::from(face.normal());
        let quad = face_quad(cell, face).map(|v| v + normal * HIGHLIGHT_OFFSET);
        mesh.push_quad(quad, normal, color);
    }
    mesh
}

/// Quad on the ground plane over column `(x, y)`
pub fn ground_highlight(x: i32, y: i32, color: [f32; 3]) -> MeshData {
    let mut mesh = MeshData::default();
    let quad = face_quad(Cell::new(x, y, 0), Face::Bottom).map(|v| v + Vec3::Z * HIGHLIGHT_OFFSET);
    mesh.push_quad(quad, Vec3::Z, color);
    mesh
}

// ── Grid and axes ────────────────────────────────────────────

/// Ground lattice covering the grid footprint at `z = 0`
pub fn grid(extent: &GridExtent, opacity: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let color = [0.6_f32, 0.6, 0.6, opacity];
    let (w, d) = (extent.x as f32, extent.y as f32);

    for i in 0..=extent.x {
        let f = i as f32;
        push_line_vert(&mut vertices, f, 0.0, 0.0, color);
        push_line_vert(&mut vertices, f, d, 0.0, color);
    }
    for j in 0..=extent.y {
        let f = j as f32;
        push_line_vert(&mut vertices, 0.0, f, 0.0, color);
        push_line_vert(&mut vertices, w, f, 0.0, color);
    }

    LineMeshData { vertices }
}

pub fn axes(length: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let r = [0.9_f32, 0.2, 0.2, 1.0];
    let g = [0.2_f32, 0.8, 0.2, 1.0];
    let b = [0.2_f32, 0.3, 0.9, 1.0];

    // X axis
    push_line_vert(&mut vertices, 0.0, 0.0, 0.0, r);
    push_line_vert(&mut vertices, length, 0.0, 0.0, r);
    // Y axis
    push_line_vert(&mut vertices, 0.0, 0.0, 0.0, g);
    push_line_vert(&mut vertices, 0.0, length, 0.0, g);
    // Z axis
    push_line_vert(&mut vertices, 0.0, 0.0, 0.0, b);
    push_line_vert(&mut vertices, 0.0, 0.0, length, b);

    LineMeshData { vertices }
}

// ── Helpers ──────────────────────────────────────────────────

fn push_vert(v: &mut Vec<f32>, p: Vec3, n: Vec3, c: [f32; 3]) {
    v.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, c[0], c[1], c[2]]);
}

fn push_line_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, c: [f32; 4]) {
    v.extend_from_slice(&[px, py, pz, c[0], c[1], c[2], c[3]]);
}
