use crate::sortlast::bounds::Aabb;
use glam::{Vec3, Vec4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    pub color: Vec4,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, color: Vec4) -> Self {
        Self {
            vertices: [v0, v1, v2],
            color,
        }
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::from_point(self.vertices[0]);
        aabb.grow_point(self.vertices[1]);
        aabb.grow_point(self.vertices[2]);
        aabb
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    bounds: Aabb,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let bounds = Self::compute_bounds(&triangles);
        Self { triangles, bounds }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn compute_bounds(triangles: &[Triangle]) -> Aabb {
        triangles.iter().fold(Aabb::EMPTY, |mut acc, tri| {
            acc.grow(&tri.bounds());
            acc
        })
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn sub_mesh(&self, start: usize, end: usize) -> Mesh {
        Mesh::new(self.triangles[start..end].to_vec())
    }

    pub fn translate(&mut self, offset: Vec3) {
        for tri in &mut self.triangles {
            for v in &mut tri.vertices {
                *v += offset;
            }
        }
        self.bounds = self.bounds.translated(offset);
    }

    pub fn scale_colors(&mut self, factor: f32) {
        for tri in &mut self.triangles {
            tri.color *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(offset: f32) -> Triangle {
        Triangle::new(
            Vec3::new(offset, 0.0, 0.0),
            Vec3::new(offset + 1.0, 0.0, 0.0),
            Vec3::new(offset, 1.0, 2.0),
            Vec4::ONE,
        )
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mesh = Mesh::new(vec![tri(0.0), tri(3.0)]);
        assert_eq!(mesh.bounds().min, Vec3::ZERO);
        assert_eq!(mesh.bounds().max, Vec3::new(4.0, 1.0, 2.0));
    }

    #[test]
    fn empty_mesh_has_empty_bounds() {
        assert!(Mesh::empty().bounds().is_empty());
    }

    #[test]
    fn translate_moves_vertices_and_bounds() {
        let mut mesh = Mesh::new(vec![tri(0.0)]);
        mesh.translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.triangles()[0].vertices[0], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.bounds(), Mesh::new(mesh.triangles().to_vec()).bounds());
    }

    #[test]
    fn scale_colors_touches_alpha() {
        let mut mesh = Mesh::new(vec![tri(0.0)]);
        mesh.scale_colors(0.5);
        assert_eq!(mesh.triangles()[0].color, Vec4::splat(0.5));
    }
}
