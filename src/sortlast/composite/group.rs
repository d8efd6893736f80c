use crate::sortlast::bounds::Aabb;
use crate::sortlast::camera::Camera;
use crate::sortlast::comm::{CommError, RunContext};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessGroup {
    members: Vec<usize>,
    position: usize,
}

impl ProcessGroup {
    pub fn new(members: Vec<usize>, rank: usize) -> Option<Self> {
        let position = members.iter().position(|&m| m == rank)?;
        Some(Self { members, position })
    }

    pub fn world(ctx: &RunContext) -> Self {
        Self {
            members: (0..ctx.size()).collect(),
            position: ctx.rank(),
        }
    }

    // All ranks ordered by the view distance of their local geometry,
    // nearest first. Ranks without geometry go last; equal distances keep
    // rank order.
    pub fn by_view_distance(local: &Aabb, camera: &Camera, ctx: &RunContext) -> Result<Self, CommError> {
        let distance = if local.is_empty() {
            f32::INFINITY
        } else {
            camera.view_distance(local.center())
        };
        let distances = ctx.all_gather(distance)?;

        let mut members: Vec<usize> = (0..ctx.size()).collect();
        members.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]).then(a.cmp(&b)));

        Ok(Self::new(members, ctx.rank()).unwrap_or_else(|| Self::world(ctx)))
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn rank_at(&self, position: usize) -> usize {
        self.members[position]
    }
}
