mod format;
mod gather;
mod pixel;
mod ppm;
mod view;

pub use format::{ColorFormat, DepthFormat, ImageFormat};
pub use pixel::Channel;
pub use view::ImageView;

use glam::Vec4;
use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("cannot combine {left:?} image with {right:?} image")]
    FormatMismatch { left: ImageFormat, right: ImageFormat },
    #[error("pixel region {left:?} does not match {right:?}")]
    RegionMismatch {
        left: Range<usize>,
        right: Range<usize>,
    },
}

#[derive(Clone, Debug)]
pub enum PixelBuffer {
    UByteColorFloatDepth { color: Vec<[u8; 4]>, depth: Vec<f32> },
    FloatColorFloatDepth { color: Vec<Vec4>, depth: Vec<f32> },
    UByteColorOnly { color: Vec<[u8; 4]> },
    FloatColorOnly { color: Vec<Vec4> },
}

impl PixelBuffer {
    fn format(&self) -> ImageFormat {
        match self {
            PixelBuffer::UByteColorFloatDepth { .. } => {
                ImageFormat::new(ColorFormat::UByte, DepthFormat::Float)
            }
            PixelBuffer::FloatColorFloatDepth { .. } => {
                ImageFormat::new(ColorFormat::Float, DepthFormat::Float)
            }
            PixelBuffer::UByteColorOnly { .. } => ImageFormat::new(ColorFormat::UByte, DepthFormat::None),
            PixelBuffer::FloatColorOnly { .. } => ImageFormat::new(ColorFormat::Float, DepthFormat::None),
        }
    }

    fn len(&self) -> usize {
        match self {
            PixelBuffer::UByteColorFloatDepth { color, .. } | PixelBuffer::UByteColorOnly { color } => {
                color.len()
            }
            PixelBuffer::FloatColorFloatDepth { color, .. } | PixelBuffer::FloatColorOnly { color } => {
                color.len()
            }
        }
    }

    fn slice(&self, range: Range<usize>) -> PixelBuffer {
        match self {
            PixelBuffer::UByteColorFloatDepth { color, depth } => PixelBuffer::UByteColorFloatDepth {
                color: color[range.clone()].to_vec(),
                depth: depth[range].to_vec(),
            },
            PixelBuffer::FloatColorFloatDepth { color, depth } => PixelBuffer::FloatColorFloatDepth {
                color: color[range.clone()].to_vec(),
                depth: depth[range].to_vec(),
            },
            PixelBuffer::UByteColorOnly { color } => PixelBuffer::UByteColorOnly {
                color: color[range].to_vec(),
            },
            PixelBuffer::FloatColorOnly { color } => PixelBuffer::FloatColorOnly {
                color: color[range].to_vec(),
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Image {
    width: usize,
    height: usize,
    region: Range<usize>,
    pixels: PixelBuffer,
}

impl Image {
    pub(crate) fn from_parts(width: usize, height: usize, region: Range<usize>, pixels: PixelBuffer) -> Self {
        debug_assert_eq!(region.len(), pixels.len());
        debug_assert!(region.end <= width * height);
        Self {
            width,
            height,
            region,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn region(&self) -> Range<usize> {
        self.region.clone()
    }

    pub fn pixel_count(&self) -> usize {
        self.region.len()
    }

    pub fn is_full(&self) -> bool {
        self.region == (0..self.width * self.height)
    }

    pub fn format(&self) -> ImageFormat {
        self.pixels.format()
    }

    pub fn order_dependent_blend(&self) -> bool {
        self.format().order_dependent_blend()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn color(&self, pixel: usize) -> Vec4 {
        let i = pixel - self.region.start;
        match &self.pixels {
            PixelBuffer::UByteColorFloatDepth { color, .. } | PixelBuffer::UByteColorOnly { color } => {
                color[i].to_linear()
            }
            PixelBuffer::FloatColorFloatDepth { color, .. } | PixelBuffer::FloatColorOnly { color } => {
                color[i]
            }
        }
    }

    pub fn depth(&self, pixel: usize) -> Option<f32> {
        let i = pixel - self.region.start;
        match &self.pixels {
            PixelBuffer::UByteColorFloatDepth { depth, .. }
            | PixelBuffer::FloatColorFloatDepth { depth, .. } => Some(depth[i]),
            PixelBuffer::UByteColorOnly { .. } | PixelBuffer::FloatColorOnly { .. } => None,
        }
    }

    pub fn shade(&mut self, pixel: usize, color: Vec4, depth: f32) {
        let (x, row) = (pixel % self.width, pixel / self.width);
        self.view_mut().shade(x, row, color, depth);
    }

    pub fn view_mut(&mut self) -> ImageView<'_> {
        debug_assert!(self.is_full(), "painting needs the full frame");
        ImageView::new(self.width, 0, self.height, &mut self.pixels)
    }

    pub fn sub_image(&self, range: Range<usize>) -> Image {
        debug_assert!(range.start >= self.region.start && range.end <= self.region.end);
        let local = range.start - self.region.start..range.end - self.region.start;
        Image::from_parts(self.width, self.height, range, self.pixels.slice(local))
    }

    pub fn empty_like(&self) -> Image {
        let at = self.region.start;
        self.sub_image(at..at)
    }

    fn check_compatible(&self, other: &Image) -> Result<(), ImageError> {
        if self.format() != other.format() {
            return Err(ImageError::FormatMismatch {
                left: self.format(),
                right: other.format(),
            });
        }
        Ok(())
    }

    // Merges `other`, which covers the same region, into this image.
    // `self_in_front` orders the two for blending formats and breaks depth
    // ties for depth formats.
    pub fn merge(&mut self, other: &Image, self_in_front: bool) -> Result<(), ImageError> {
        self.check_compatible(other)?;
        if self.region != other.region {
            return Err(ImageError::RegionMismatch {
                left: self.region(),
                right: other.region(),
            });
        }

        match (&mut self.pixels, &other.pixels) {
            (
                PixelBuffer::UByteColorFloatDepth { color, depth },
                PixelBuffer::UByteColorFloatDepth {
                    color: src_color,
                    depth: src_depth,
                },
            ) => pixel::depth_resolve(color, depth, src_color, src_depth, self_in_front),
            (
                PixelBuffer::FloatColorFloatDepth { color, depth },
                PixelBuffer::FloatColorFloatDepth {
                    color: src_color,
                    depth: src_depth,
                },
            ) => pixel::depth_resolve(color, depth, src_color, src_depth, self_in_front),
            (PixelBuffer::UByteColorOnly { color }, PixelBuffer::UByteColorOnly { color: src }) => {
                pixel::blend_over(color, src, self_in_front)
            }
            (PixelBuffer::FloatColorOnly { color }, PixelBuffer::FloatColorOnly { color: src }) => {
                pixel::blend_over(color, src, self_in_front)
            }
            _ => unreachable!("formats checked above"),
        }
        Ok(())
    }

    pub fn paste(&mut self, piece: &Image) -> Result<(), ImageError> {
        self.check_compatible(piece)?;
        if piece.region.start < self.region.start || piece.region.end > self.region.end {
            return Err(ImageError::RegionMismatch {
                left: self.region(),
                right: piece.region(),
            });
        }
        let at = piece.region.start - self.region.start..piece.region.end - self.region.start;

        match (&mut self.pixels, &piece.pixels) {
            (
                PixelBuffer::UByteColorFloatDepth { color, depth },
                PixelBuffer::UByteColorFloatDepth {
                    color: src_color,
                    depth: src_depth,
                },
            ) => {
                color[at.clone()].copy_from_slice(src_color);
                depth[at].copy_from_slice(src_depth);
            }
            (
                PixelBuffer::FloatColorFloatDepth { color, depth },
                PixelBuffer::FloatColorFloatDepth {
                    color: src_color,
                    depth: src_depth,
                },
            ) => {
                color[at.clone()].copy_from_slice(src_color);
                depth[at].copy_from_slice(src_depth);
            }
            (PixelBuffer::UByteColorOnly { color }, PixelBuffer::UByteColorOnly { color: src }) => {
                color[at].copy_from_slice(src)
            }
            (PixelBuffer::FloatColorOnly { color }, PixelBuffer::FloatColorOnly { color: src }) => {
                color[at].copy_from_slice(src)
            }
            _ => unreachable!("formats checked above"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats() -> [ImageFormat; 4] {
        [
            ImageFormat::new(ColorFormat::UByte, DepthFormat::Float),
            ImageFormat::new(ColorFormat::Float, DepthFormat::Float),
            ImageFormat::new(ColorFormat::UByte, DepthFormat::None),
            ImageFormat::new(ColorFormat::Float, DepthFormat::None),
        ]
    }

    #[test]
    fn cleared_pixels_are_transparent_and_far() {
        for format in formats() {
            let image = format.allocate(4, 4);
            for p in image.region() {
                assert_eq!(image.color(p), Vec4::ZERO);
                if format.order_dependent_blend() {
                    assert_eq!(image.depth(p), None);
                } else {
                    assert_eq!(image.depth(p), Some(f32::INFINITY));
                }
            }
        }
    }

    #[test]
    fn depth_shading_keeps_nearest() {
        let mut image = ImageFormat::new(ColorFormat::Float, DepthFormat::Float).allocate(2, 2);
        image.shade(3, Vec4::new(1.0, 0.0, 0.0, 1.0), 0.5);
        image.shade(3, Vec4::new(0.0, 1.0, 0.0, 1.0), 0.7);
        assert_eq!(image.color(3), Vec4::new(1.0, 0.0, 0.0, 1.0));
        image.shade(3, Vec4::new(0.0, 0.0, 1.0, 1.0), 0.1);
        assert_eq!(image.color(3), Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(image.depth(3), Some(0.1));
    }

    #[test]
    fn shade_addresses_frame_pixels_row_major() {
        let mut image = ImageFormat::new(ColorFormat::UByte, DepthFormat::Float).allocate(3, 2);
        image.shade(4, Vec4::ONE, 0.5);
        for p in image.region() {
            let expected = if p == 4 { Vec4::ONE } else { Vec4::ZERO };
            assert_eq!(image.color(p), expected);
        }
        assert_eq!(image.depth(4), Some(0.5));
        assert_eq!(image.depth(1), Some(f32::INFINITY));
    }

    #[test]
    fn color_only_shading_blends_over() {
        let mut image = ImageFormat::new(ColorFormat::Float, DepthFormat::None).allocate(1, 1);
        image.shade(0, Vec4::new(0.0, 1.0, 0.0, 1.0), 0.9);
        image.shade(0, Vec4::new(0.5, 0.0, 0.0, 0.5), 0.1);
        assert_eq!(image.color(0), Vec4::new(0.5, 0.5, 0.0, 1.0));
    }

    #[test]
    fn sub_image_then_paste_restores() {
        for format in formats() {
            let mut image = format.allocate(3, 2);
            image.shade(4, Vec4::ONE, 0.25);
            let piece = image.sub_image(3..6);
            assert_eq!(piece.region(), 3..6);
            assert_eq!(piece.color(4), image.color(4));

            let mut target = format.allocate(3, 2);
            target.paste(&piece).unwrap();
            assert_eq!(target.color(4), image.color(4));
            assert_eq!(target.depth(4), image.depth(4));
        }
    }

    #[test]
    fn merge_rejects_mismatched_inputs() {
        let mut a = ImageFormat::new(ColorFormat::UByte, DepthFormat::Float).allocate(2, 2);
        let b = ImageFormat::new(ColorFormat::Float, DepthFormat::Float).allocate(2, 2);
        assert!(matches!(a.merge(&b, true), Err(ImageError::FormatMismatch { .. })));

        let c = a.sub_image(0..2);
        assert!(matches!(a.merge(&c, true), Err(ImageError::RegionMismatch { .. })));
    }

    #[test]
    fn merge_respects_front_order_for_blending() {
        let format = ImageFormat::new(ColorFormat::Float, DepthFormat::None);
        let mut back = format.allocate(1, 1);
        back.shade(0, Vec4::new(0.0, 1.0, 0.0, 1.0), 0.0);
        let mut front = format.allocate(1, 1);
        front.shade(0, Vec4::new(0.5, 0.0, 0.0, 0.5), 0.0);

        let mut held_by_back = back.clone();
        held_by_back.merge(&front, false).unwrap();
        let mut held_by_front = front.clone();
        held_by_front.merge(&back, true).unwrap();

        assert_eq!(held_by_back.color(0), Vec4::new(0.5, 0.5, 0.0, 1.0));
        assert_eq!(held_by_front.color(0), held_by_back.color(0));
    }
}
