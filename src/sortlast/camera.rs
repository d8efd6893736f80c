use crate::sortlast::bounds::Aabb;
use crate::sortlast::comm::{CommError, RunContext};
use glam::{Mat4, Vec3};

pub const THETA_ROTATION_DEGREES: f32 = 25.0;
pub const PHI_ROTATION_DEGREES: f32 = 15.0;
pub const CAMERA_DISTANCE_FACTOR: f32 = 1.5;
pub const NEAR_PLANE_FACTOR: f32 = 1.0 / 3.0;
pub const FAR_PLANE_FACTOR: f32 = 2.0;
pub const BASE_FIELD_OF_VIEW_DEGREES: f32 = 45.0;
pub const DEFAULT_ZOOM: f32 = 1.0;

pub fn reduce_bounds(local: &Aabb, ctx: &RunContext) -> Result<Aabb, CommError> {
    let min = ctx.all_reduce_min(local.min)?;
    let max = ctx.all_reduce_max(local.max)?;
    Ok(Aabb::new(min, max))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub modelview: Mat4,
    pub projection: Mat4,
    pub center: Vec3,
    pub diameter: f32,
}

impl Camera {
    pub fn from_bounds(bounds: &Aabb, width: usize, height: usize, zoom: f32) -> Self {
        let (center, diameter) = if bounds.is_empty() || !(bounds.diameter() > 0.0) {
            log::warn!("geometry has no extent, framing a unit volume instead");
            let center = if bounds.is_empty() { Vec3::ZERO } else { bounds.center() };
            (center, 1.0)
        } else {
            (bounds.center(), bounds.diameter())
        };

        let modelview = Mat4::from_translation(Vec3::new(0.0, 0.0, -CAMERA_DISTANCE_FACTOR * diameter))
            * Mat4::from_rotation_x(PHI_ROTATION_DEGREES.to_radians())
            * Mat4::from_rotation_y(THETA_ROTATION_DEGREES.to_radians())
            * Mat4::from_translation(-center);

        let projection = Mat4::perspective_rh_gl(
            (BASE_FIELD_OF_VIEW_DEGREES / zoom).to_radians(),
            width as f32 / height as f32,
            diameter * NEAR_PLANE_FACTOR,
            diameter * FAR_PLANE_FACTOR,
        );

        Camera {
            modelview,
            projection,
            center,
            diameter,
        }
    }

    pub fn build(local: &Aabb, width: usize, height: usize, ctx: &RunContext) -> Result<Self, CommError> {
        let global = reduce_bounds(local, ctx)?;
        log::debug!(
            "rank {}: global bounds {:?} .. {:?}",
            ctx.rank(),
            global.min,
            global.max
        );
        Ok(Self::from_bounds(&global, width, height, DEFAULT_ZOOM))
    }

    #[inline]
    pub fn view_distance(&self, point: Vec3) -> f32 {
        -self.modelview.transform_point3(point).z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sortlast::comm::World;
    use crate::sortlast::distribute::broadcast_mesh;
    use crate::sortlast::loader::make_box;
    use approx::assert_relative_eq;

    #[test]
    fn center_maps_in_front_of_camera() {
        let bounds = Aabb::new(Vec3::new(-1.0, 2.0, 0.0), Vec3::new(3.0, 4.0, 2.0));
        let camera = Camera::from_bounds(&bounds, 1100, 900, DEFAULT_ZOOM);
        let eye = camera.modelview.transform_point3(bounds.center());
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(eye.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(eye.z, -1.5 * bounds.diameter(), epsilon = 1e-5);
    }

    #[test]
    fn geometry_lies_between_clip_planes() {
        let bounds = make_box().bounds();
        let camera = Camera::from_bounds(&bounds, 100, 100, DEFAULT_ZOOM);
        let near = camera.diameter * NEAR_PLANE_FACTOR;
        let far = camera.diameter * FAR_PLANE_FACTOR;
        for corner in [bounds.min, bounds.max] {
            let d = camera.view_distance(corner);
            assert!(d > near && d < far);
        }
    }

    #[test]
    fn empty_bounds_do_not_poison_matrices() {
        let camera = Camera::from_bounds(&Aabb::EMPTY, 10, 10, DEFAULT_ZOOM);
        assert!(camera.modelview.is_finite());
        assert!(camera.projection.is_finite());
    }

    #[test]
    fn reduction_is_union_of_offset_boxes() {
        for p in [1, 2, 3, 4, 6, 8] {
            let results = World::new(p)
                .run(|ctx| {
                    let mesh = broadcast_mesh(ctx.is_root().then(make_box), -0.05, ctx)?;
                    let global = reduce_bounds(&mesh.bounds(), ctx)?;
                    Ok::<_, CommError>((mesh.bounds(), global))
                })
                .unwrap();

            let pairs: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
            let union = pairs.iter().fold(Aabb::EMPTY, |acc, (local, _)| acc.union(local));
            let reversed = pairs.iter().rev().fold(Aabb::EMPTY, |acc, (local, _)| acc.union(local));
            assert_eq!(union, reversed);
            for (_, global) in &pairs {
                assert_eq!(*global, union);
            }
        }
    }

    #[test]
    fn every_rank_builds_identical_matrices() {
        let cameras = World::new(4)
            .run(|ctx| {
                let mesh = broadcast_mesh(ctx.is_root().then(make_box), 0.0, ctx)?;
                Camera::build(&mesh.bounds(), 64, 48, ctx)
            })
            .unwrap();
        let first = cameras[0].as_ref().unwrap();
        for camera in &cameras {
            let camera = camera.as_ref().unwrap();
            assert_eq!(camera.modelview.to_cols_array(), first.modelview.to_cols_array());
            assert_eq!(camera.projection.to_cols_array(), first.projection.to_cols_array());
        }
    }
}
