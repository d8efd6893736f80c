use super::raster::project_all;
use super::Painter;
use crate::sortlast::image::Image;
use crate::sortlast::mesh::Triangle;
use glam::Mat4;
use rayon::prelude::*;

// Paints horizontal bands of rows in parallel. Each band walks the full
// triangle list in order, so blending order matches the serial painter.
pub struct TiledRasterPainter {
    pub bands_per_thread: usize,
}

impl Default for TiledRasterPainter {
    fn default() -> Self {
        Self { bands_per_thread: 4 }
    }
}

impl TiledRasterPainter {
    fn rows_per_band(&self, height: usize) -> usize {
        let bands = rayon::current_num_threads() * self.bands_per_thread.max(1);
        height.div_ceil(bands).max(1)
    }
}

impl Painter for TiledRasterPainter {
    fn paint(&self, triangles: &[Triangle], image: &mut Image, modelview: &Mat4, projection: &Mat4) {
        let mvp = *projection * *modelview;
        let screen = project_all(triangles, &mvp, image.width(), image.height());
        let rows_per_band = self.rows_per_band(image.height());

        image
            .view_mut()
            .split_rows(rows_per_band)
            .into_par_iter()
            .for_each(|mut band| {
                for tri in &screen {
                    tri.draw(&mut band);
                }
            });
    }
}
