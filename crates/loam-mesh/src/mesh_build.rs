use loam_geom::{Aabb, Vec3};

/// Flat vertex/index arrays in the layout GPU uploads expect: interleaved
/// xyz positions and normals, xy texture coordinates, u16 triangle indices.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u16>,
}

impl MeshBuild {
    /// Clears all arrays but retains capacity for reuse across builds.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
    }

    /// Pre-reserves space for a `dim` x `dim` vertex grid and its cells.
    pub fn reserve_grid(&mut self, dim: usize) {
        let verts = dim * dim;
        let cells = (dim - 1) * (dim - 1);
        self.pos.reserve(verts * 3);
        self.norm.reserve(verts * 3);
        self.uv.reserve(verts * 2);
        self.idx.reserve(cells * 6);
    }

    #[inline]
    pub fn push_vertex(&mut self, p: Vec3, u: f32, v: f32) {
        self.pos.extend_from_slice(&[p.x, p.y, p.z]);
        self.norm.extend_from_slice(&[0.0, 0.0, 0.0]);
        self.uv.extend_from_slice(&[u, v]);
    }

    #[inline]
    pub fn push_triangle(&mut self, a: u16, b: u16, c: u16) {
        self.idx.extend_from_slice(&[a, b, c]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos[i * 3], self.pos[i * 3 + 1], self.pos[i * 3 + 2])
    }

    #[inline]
    pub fn normal(&self, i: usize) -> Vec3 {
        Vec3::new(self.norm[i * 3], self.norm[i * 3 + 1], self.norm[i * 3 + 2])
    }

    pub fn positions(&self) -> &[f32] {
        &self.pos
    }

    pub fn normals(&self) -> &[f32] {
        &self.norm
    }

    /// Bounding box of all vertices; `None` for an empty mesh.
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points((0..self.vertex_count()).map(|i| self.vertex(i)))
    }

    /// Accumulates area-weighted face normals onto each vertex and
    /// renormalizes. Call once after all triangles are pushed.
    pub fn finalize_normals(&mut self) {
        for tri in self.idx.chunks_exact(3) {
            let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let a = self.vertex(ia);
            let b = self.vertex(ib);
            let c = self.vertex(ic);
            let face = (b - a).cross(c - a);
            for i in [ia, ib, ic] {
                self.norm[i * 3] += face.x;
                self.norm[i * 3 + 1] += face.y;
                self.norm[i * 3 + 2] += face.z;
            }
        }
        for i in 0..self.vertex_count() {
            let n = self.normal(i).normalized();
            self.norm[i * 3] = n.x;
            self.norm[i * 3 + 1] = n.y;
            self.norm[i * 3 + 2] = n.z;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_count() {
        let mut m = MeshBuild::default();
        m.push_vertex(Vec3::new(0.0, 0.0, 0.0), 0.0, 0.0);
        m.push_vertex(Vec3::new(1.0, 0.0, 0.0), 1.0, 0.0);
        m.push_vertex(Vec3::new(0.0, 0.0, 1.0), 0.0, 1.0);
        m.push_triangle(0, 2, 1);
        assert_eq!(m.vertex_count(), 3);
        assert_eq!(m.triangle_count(), 1);
    }

    #[test]
    fn finalize_normals_points_up_for_ccw_ground_triangle() {
        let mut m = MeshBuild::default();
        m.push_vertex(Vec3::new(0.0, 0.0, 0.0), 0.0, 0.0);
        m.push_vertex(Vec3::new(0.0, 0.0, 1.0), 0.0, 1.0);
        m.push_vertex(Vec3::new(1.0, 0.0, 1.0), 1.0, 1.0);
        m.push_triangle(0, 1, 2);
        m.finalize_normals();
        for i in 0..3 {
            let n = m.normal(i);
            assert!((n.y - 1.0).abs() < 1e-5, "normal {n:?} not up");
        }
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut m = MeshBuild::default();
        m.reserve_grid(9);
        let cap = m.pos.capacity();
        m.push_vertex(Vec3::ZERO, 0.0, 0.0);
        m.clear_keep_capacity();
        assert_eq!(m.vertex_count(), 0);
        assert!(m.pos.capacity() >= cap);
    }

    #[test]
    fn aabb_of_empty_mesh_is_none() {
        assert!(MeshBuild::default().aabb().is_none());
    }
}
