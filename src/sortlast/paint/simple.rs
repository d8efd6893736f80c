use super::raster::project_all;
use super::Painter;
use crate::sortlast::image::Image;
use crate::sortlast::mesh::Triangle;
use glam::Mat4;

pub struct SimpleRasterPainter;

impl Painter for SimpleRasterPainter {
    fn paint(&self, triangles: &[Triangle], image: &mut Image, modelview: &Mat4, projection: &Mat4) {
        let mvp = *projection * *modelview;
        let screen = project_all(triangles, &mvp, image.width(), image.height());
        let mut view = image.view_mut();
        for tri in &screen {
            tri.draw(&mut view);
        }
    }
}
