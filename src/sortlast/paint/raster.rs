// Edge-function triangle rasterizer shared by the painter backends.
//
// Vertices are snapped to a fixed-point subpixel grid so that two
// triangles sharing an edge evaluate it with exactly opposite signs; the
// tie rule then paints every pixel center on that edge exactly once.

use crate::sortlast::image::ImageView;
use crate::sortlast::mesh::Triangle;
use glam::{Mat4, Vec4};

const SUBPIXEL_BITS: u32 = 8;
const SUBPIXEL_ONE: i64 = 1 << SUBPIXEL_BITS;
const COORD_LIMIT: f32 = (1u64 << 22) as f32;

#[derive(Clone, Copy, Debug)]
pub struct ScreenTriangle {
    x: [i64; 3],
    y: [i64; 3],
    depth: [f32; 3],
    area: i64,
    color: Vec4,
}

#[inline]
fn edge(ax: i64, ay: i64, bx: i64, by: i64, px: i64, py: i64) -> i64 {
    (px - ax) * (by - ay) - (py - ay) * (bx - ax)
}

// Whether a pixel center lying exactly on the edge `a -> b` belongs to
// this triangle. Opposite directions always disagree.
#[inline]
fn owns_edge(ax: i64, ay: i64, bx: i64, by: i64) -> bool {
    let (dx, dy) = (bx - ax, by - ay);
    dy > 0 || (dy == 0 && dx < 0)
}

impl ScreenTriangle {
    pub fn project(tri: &Triangle, mvp: &Mat4, width: usize, height: usize) -> Option<Self> {
        let mut x = [0i64; 3];
        let mut y = [0i64; 3];
        let mut depth = [0f32; 3];

        for (i, v) in tri.vertices.iter().enumerate() {
            let clip = *mvp * v.extend(1.0);
            if clip.w <= 0.0 {
                return None;
            }
            let ndc = clip.truncate() / clip.w;
            let sx = ((ndc.x + 1.0) * 0.5 * width as f32).clamp(-COORD_LIMIT, COORD_LIMIT);
            let sy = ((1.0 - ndc.y) * 0.5 * height as f32).clamp(-COORD_LIMIT, COORD_LIMIT);
            x[i] = (sx * SUBPIXEL_ONE as f32).round() as i64;
            y[i] = (sy * SUBPIXEL_ONE as f32).round() as i64;
            depth[i] = (ndc.z + 1.0) * 0.5;
        }

        let mut area = edge(x[0], y[0], x[1], y[1], x[2], y[2]);
        if area == 0 {
            return None;
        }
        if area < 0 {
            x.swap(1, 2);
            y.swap(1, 2);
            depth.swap(1, 2);
            area = -area;
        }

        Some(Self {
            x,
            y,
            depth,
            area,
            color: tri.color,
        })
    }

    pub fn draw(&self, view: &mut ImageView<'_>) {
        let rows = view.rows();
        let width = view.width() as i64;

        let min_x = (*self.x.iter().min().unwrap_or(&0)).div_euclid(SUBPIXEL_ONE).max(0);
        let max_x = (*self.x.iter().max().unwrap_or(&0)).div_euclid(SUBPIXEL_ONE).min(width - 1);
        let min_y = (*self.y.iter().min().unwrap_or(&0))
            .div_euclid(SUBPIXEL_ONE)
            .max(rows.start as i64);
        let max_y = (*self.y.iter().max().unwrap_or(&0))
            .div_euclid(SUBPIXEL_ONE)
            .min(rows.end as i64 - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let [x0, x1, x2] = self.x;
        let [y0, y1, y2] = self.y;
        let owns = [
            owns_edge(x1, y1, x2, y2),
            owns_edge(x2, y2, x0, y0),
            owns_edge(x0, y0, x1, y1),
        ];
        let inv_area = 1.0 / self.area as f64;

        for py in min_y..=max_y {
            let cy = py * SUBPIXEL_ONE + SUBPIXEL_ONE / 2;
            for px in min_x..=max_x {
                let cx = px * SUBPIXEL_ONE + SUBPIXEL_ONE / 2;
                let w = [
                    edge(x1, y1, x2, y2, cx, cy),
                    edge(x2, y2, x0, y0, cx, cy),
                    edge(x0, y0, x1, y1, cx, cy),
                ];
                let inside = w
                    .iter()
                    .zip(owns.iter())
                    .all(|(&w, &owns)| w > 0 || (w == 0 && owns));
                if !inside {
                    continue;
                }

                let depth = ((w[0] as f64 * self.depth[0] as f64
                    + w[1] as f64 * self.depth[1] as f64
                    + w[2] as f64 * self.depth[2] as f64)
                    * inv_area) as f32;
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }
                view.shade(px as usize, py as usize, self.color, depth);
            }
        }
    }
}

pub fn project_all(triangles: &[Triangle], mvp: &Mat4, width: usize, height: usize) -> Vec<ScreenTriangle> {
    triangles
        .iter()
        .filter_map(|tri| ScreenTriangle::project(tri, mvp, width, height))
        .collect()
}
