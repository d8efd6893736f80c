use crate::sortlast::mesh::Triangle;
use glam::Mat4;

pub fn visibility_sort(triangles: &[Triangle], modelview: &Mat4) -> Vec<Triangle> {
    let mut keyed: Vec<(f32, Triangle)> = triangles
        .iter()
        .map(|tri| (-modelview.transform_point3(tri.centroid()).z, *tri))
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().map(|(_, tri)| tri).collect()
}
