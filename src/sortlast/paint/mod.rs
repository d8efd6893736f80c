mod raster;
mod simple;
mod tiled;
mod visibility;

pub use simple::SimpleRasterPainter;
pub use tiled::TiledRasterPainter;
pub use visibility::visibility_sort;

use crate::sortlast::camera::Camera;
use crate::sortlast::image::Image;
use crate::sortlast::mesh::Triangle;
use glam::Mat4;

pub trait Painter {
    fn paint(&self, triangles: &[Triangle], image: &mut Image, modelview: &Mat4, projection: &Mat4);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PainterBackend {
    #[default]
    SimpleRaster,
    TiledRaster,
}

impl PainterBackend {
    pub fn label(&self) -> &'static str {
        match self {
            PainterBackend::SimpleRaster => "simple",
            PainterBackend::TiledRaster => "tiled",
        }
    }
}

impl Painter for PainterBackend {
    fn paint(&self, triangles: &[Triangle], image: &mut Image, modelview: &Mat4, projection: &Mat4) {
        match self {
            PainterBackend::SimpleRaster => SimpleRasterPainter.paint(triangles, image, modelview, projection),
            PainterBackend::TiledRaster => {
                TiledRasterPainter::default().paint(triangles, image, modelview, projection)
            }
        }
    }
}

pub fn render_local<P: Painter + ?Sized>(painter: &P, triangles: &[Triangle], image: &mut Image, camera: &Camera) {
    if image.order_dependent_blend() {
        let sorted = visibility_sort(triangles, &camera.modelview);
        painter.paint(&sorted, image, &camera.modelview, &camera.projection);
    } else {
        painter.paint(triangles, image, &camera.modelview, &camera.projection);
    }
}
