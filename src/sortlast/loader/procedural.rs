use crate::sortlast::mesh::{Mesh, Triangle};
use glam::{Vec3, Vec4};

const FACE_COLORS: [Vec4; 6] = [
    Vec4::new(1.0, 0.0, 0.0, 1.0),
    Vec4::new(0.0, 1.0, 1.0, 1.0),
    Vec4::new(0.0, 1.0, 0.0, 1.0),
    Vec4::new(1.0, 0.0, 1.0, 1.0),
    Vec4::new(0.0, 0.0, 1.0, 1.0),
    Vec4::new(1.0, 1.0, 0.0, 1.0),
];

pub fn make_box() -> Mesh {
    let corner = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);

    // Each face as a quad wound counter-clockwise when seen from outside.
    let faces: [[Vec3; 4]; 6] = [
        // +x
        [corner(1., 0., 0.), corner(1., 1., 0.), corner(1., 1., 1.), corner(1., 0., 1.)],
        // -x
        [corner(0., 0., 0.), corner(0., 0., 1.), corner(0., 1., 1.), corner(0., 1., 0.)],
        // +y
        [corner(0., 1., 0.), corner(0., 1., 1.), corner(1., 1., 1.), corner(1., 1., 0.)],
        // -y
        [corner(0., 0., 0.), corner(1., 0., 0.), corner(1., 0., 1.), corner(0., 0., 1.)],
        // +z
        [corner(0., 0., 1.), corner(1., 0., 1.), corner(1., 1., 1.), corner(0., 1., 1.)],
        // -z
        [corner(0., 0., 0.), corner(0., 1., 0.), corner(1., 1., 0.), corner(1., 0., 0.)],
    ];

    let triangles = faces
        .iter()
        .zip(FACE_COLORS.iter())
        .flat_map(|(q, &color)| {
            [
                Triangle::new(q[0], q[1], q[2], color),
                Triangle::new(q[0], q[2], q[3], color),
            ]
        })
        .collect();

    Mesh::new(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_is_twelve_triangles_in_unit_cube() {
        let mesh = make_box();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.bounds().min, Vec3::ZERO);
        assert_eq!(mesh.bounds().max, Vec3::ONE);
    }

    #[test]
    fn faces_wind_outward() {
        let mesh = make_box();
        let center = mesh.bounds().center();
        for tri in mesh.triangles() {
            let [a, b, c] = tri.vertices;
            let normal = (b - a).cross(c - a);
            assert!(normal.dot(tri.centroid() - center) > 0.0);
        }
    }
}
