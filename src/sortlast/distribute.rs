use crate::sortlast::bounds::Aabb;
use crate::sortlast::comm::{CommError, RunContext};
use crate::sortlast::mesh::Mesh;
use glam::{UVec3, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Distribution {
    Duplicate { overlap: f32 },
    Divide,
}

impl Distribution {
    pub const DEFAULT_OVERLAP: f32 = -0.05;

    pub fn label(&self) -> &'static str {
        match self {
            Distribution::Duplicate { .. } => "duplicate",
            Distribution::Divide => "divide",
        }
    }

    pub fn distribute(&self, source: Option<Mesh>, ctx: &RunContext) -> Result<Mesh, CommError> {
        match *self {
            Distribution::Duplicate { overlap } => broadcast_mesh(source, overlap, ctx),
            Distribution::Divide => scatter_mesh(source, ctx),
        }
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution::Duplicate {
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

pub fn chunk_range(rank: usize, process_count: usize, triangle_count: usize) -> (usize, usize) {
    let start = rank * triangle_count / process_count;
    let end = (rank + 1) * triangle_count / process_count;
    (start, end)
}

pub fn scatter_mesh(source: Option<Mesh>, ctx: &RunContext) -> Result<Mesh, CommError> {
    let chunks = source.map(|mesh| {
        let n = mesh.triangle_count();
        (0..ctx.size())
            .map(|rank| {
                let (start, end) = chunk_range(rank, ctx.size(), n);
                mesh.sub_mesh(start, end)
            })
            .collect()
    });
    ctx.scatter(chunks, 0)
}

pub fn broadcast_mesh(source: Option<Mesh>, overlap: f32, ctx: &RunContext) -> Result<Mesh, CommError> {
    let mut mesh = ctx.broadcast(source, 0)?;
    let offset = grid_offset(ctx.rank(), ctx.size(), overlap, &mesh.bounds());
    mesh.translate(offset);
    Ok(mesh)
}

fn integer_root_ceil(n: usize, exponent: u32) -> usize {
    let mut c = 1usize;
    while c.pow(exponent) < n {
        c += 1;
    }
    c
}

fn largest_divisor_at_most(n: usize, limit: usize) -> usize {
    (1..=limit.min(n)).rev().find(|d| n % d == 0).unwrap_or(1)
}

pub fn grid_dimensions(process_count: usize) -> UVec3 {
    let p = process_count.max(1);
    let nx = largest_divisor_at_most(p, integer_root_ceil(p, 3));
    let rest = p / nx;
    let ny = largest_divisor_at_most(rest, integer_root_ceil(rest, 2));
    let nz = rest / ny;
    UVec3::new(nx as u32, ny as u32, nz as u32)
}

pub fn grid_cell(rank: usize, process_count: usize) -> UVec3 {
    let dims = grid_dimensions(process_count);
    let (nx, ny) = (dims.x as usize, dims.y as usize);
    UVec3::new(
        (rank % nx) as u32,
        ((rank / nx) % ny) as u32,
        (rank / (nx * ny)) as u32,
    )
}

// Translation applied to the copy on `rank`. A pure function of its
// inputs, so every run places replicas identically.
pub fn grid_offset(rank: usize, process_count: usize, overlap: f32, source_bounds: &Aabb) -> Vec3 {
    if source_bounds.is_empty() {
        return Vec3::ZERO;
    }
    grid_cell(rank, process_count).as_vec3() * source_bounds.extent() * (1.0 - overlap)
}
