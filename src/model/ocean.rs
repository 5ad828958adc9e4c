use glam::Vec3;

use crate::utils::{Mesh, Vertex};

const OCEAN_COLOR: [f32; 4] = [0.0, 0.47, 0.75, 1.0];

/// Regular grid of vertices whose heights are rewritten every frame.
///
/// Each vertex keeps an immutable plane coordinate `(x, y)` and a mutable
/// height. The plane lies flat in world space: plane `x` is world x, plane
/// `y` is world -z and the height is world y. Vertex count and triangle
/// topology are fixed at construction.
#[derive(Debug, Clone)]
pub struct HeightField {
    columns: usize,
    rows: usize,
    coords: Vec<[f32; 2]>,
    heights: Vec<f32>,
    dirty: bool,
}

impl HeightField {
    /// A `width` x `depth` plane centred on the origin, split into
    /// `segments_x` x `segments_y` quads. Rows run from +y to -y and
    /// columns from -x to +x.
    pub fn plane(width: f32, depth: f32, segments_x: usize, segments_y: usize) -> Self {
        let segments_x = segments_x.max(1);
        let segments_y = segments_y.max(1);
        let columns = segments_x + 1;
        let rows = segments_y + 1;

        let mut coords = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            let y = depth / 2.0 - row as f32 * depth / segments_y as f32;
            for col in 0..columns {
                let x = col as f32 * width / segments_x as f32 - width / 2.0;
                coords.push([x, y]);
            }
        }

        Self {
            columns,
            rows,
            heights: vec![0.0; coords.len()],
            coords,
            dirty: true,
        }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn coords(&self) -> &[[f32; 2]] {
        &self.coords
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Recompute every height from its plane coordinate and mark the field dirty.
    pub fn rewrite_heights<F>(&mut self, mut height_at: F)
    where
        F: FnMut(f32, f32) -> f32,
    {
        for ([x, y], h) in self.coords.iter().zip(self.heights.iter_mut()) {
            *h = height_at(*x, *y);
        }
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether the field changed since the last call and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn world_position(&self, idx: usize) -> Vec3 {
        let [x, y] = self.coords[idx];
        Vec3::new(x, self.heights[idx], -y)
    }

    /// Two triangles per quad, counter-clockwise seen from above.
    pub fn indices(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity((self.columns - 1) * (self.rows - 1) * 6);
        for row in 0..self.rows - 1 {
            for col in 0..self.columns - 1 {
                let a = (row * self.columns + col) as u32;
                let b = ((row + 1) * self.columns + col) as u32;
                let c = ((row + 1) * self.columns + col + 1) as u32;
                let d = (row * self.columns + col + 1) as u32;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        indices
    }

    /// Vertices in world space with normals from central differences.
    pub fn vertices(&self) -> Vec<Vertex> {
        let at = |row: usize, col: usize| self.world_position(row * self.columns + col);

        let mut vertices = Vec::with_capacity(self.len());
        for row in 0..self.rows {
            for col in 0..self.columns {
                let along_x = at(row, (col + 1).min(self.columns - 1)) - at(row, col.saturating_sub(1));
                let along_z = at((row + 1).min(self.rows - 1), col) - at(row.saturating_sub(1), col);
                let normal = match along_z.cross(along_x).normalize_or_zero() {
                    n if n == Vec3::ZERO => Vec3::Y,
                    n => n,
                };

                vertices.push(Vertex {
                    pos: at(row, col).to_array(),
                    normal: normal.to_array(),
                    color: OCEAN_COLOR,
                });
            }
        }
        vertices
    }

    pub fn mesh(&self) -> Mesh {
        Mesh { vertices: self.vertices(), indices: self.indices() }
    }
}
