use super::{Image, PixelBuffer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorFormat {
    #[default]
    UByte,
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DepthFormat {
    #[default]
    Float,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ImageFormat {
    color: ColorFormat,
    depth: DepthFormat,
}

impl ImageFormat {
    pub const fn new(color: ColorFormat, depth: DepthFormat) -> Self {
        Self { color, depth }
    }

    pub fn color(&self) -> ColorFormat {
        self.color
    }

    pub fn depth(&self) -> DepthFormat {
        self.depth
    }

    pub fn order_dependent_blend(&self) -> bool {
        matches!(self.depth, DepthFormat::None)
    }

    pub fn color_label(&self) -> &'static str {
        match self.color {
            ColorFormat::UByte => "byte",
            ColorFormat::Float => "float",
        }
    }

    pub fn depth_label(&self) -> &'static str {
        match self.depth {
            DepthFormat::Float => "float",
            DepthFormat::None => "none",
        }
    }

    pub fn allocate(&self, width: usize, height: usize) -> Image {
        let count = width * height;
        let pixels = match (self.color, self.depth) {
            (ColorFormat::UByte, DepthFormat::Float) => PixelBuffer::UByteColorFloatDepth {
                color: vec![[0; 4]; count],
                depth: vec![f32::INFINITY; count],
            },
            (ColorFormat::Float, DepthFormat::Float) => PixelBuffer::FloatColorFloatDepth {
                color: vec![glam::Vec4::ZERO; count],
                depth: vec![f32::INFINITY; count],
            },
            (ColorFormat::UByte, DepthFormat::None) => PixelBuffer::UByteColorOnly {
                color: vec![[0; 4]; count],
            },
            (ColorFormat::Float, DepthFormat::None) => PixelBuffer::FloatColorOnly {
                color: vec![glam::Vec4::ZERO; count],
            },
        };
        Image::from_parts(width, height, 0..count, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(color: ColorFormat, depth: DepthFormat, order_dependent: bool) {
        let format = ImageFormat::new(color, depth);
        assert_eq!(format.order_dependent_blend(), order_dependent);

        let image = format.allocate(7, 3);
        assert_eq!(image.pixel_count(), 21);
        assert_eq!(image.format(), format);
        assert_eq!(image.order_dependent_blend(), order_dependent);
        assert_eq!(image.region(), 0..21);
    }

    #[test]
    fn ubyte_color_float_depth() {
        check(ColorFormat::UByte, DepthFormat::Float, false);
        let image = ImageFormat::new(ColorFormat::UByte, DepthFormat::Float).allocate(2, 2);
        assert!(matches!(image.pixels(), PixelBuffer::UByteColorFloatDepth { .. }));
    }

    #[test]
    fn float_color_float_depth() {
        check(ColorFormat::Float, DepthFormat::Float, false);
        let image = ImageFormat::new(ColorFormat::Float, DepthFormat::Float).allocate(2, 2);
        assert!(matches!(image.pixels(), PixelBuffer::FloatColorFloatDepth { .. }));
    }

    #[test]
    fn ubyte_color_only() {
        check(ColorFormat::UByte, DepthFormat::None, true);
        let image = ImageFormat::new(ColorFormat::UByte, DepthFormat::None).allocate(2, 2);
        assert!(matches!(image.pixels(), PixelBuffer::UByteColorOnly { .. }));
    }

    #[test]
    fn float_color_only() {
        check(ColorFormat::Float, DepthFormat::None, true);
        let image = ImageFormat::new(ColorFormat::Float, DepthFormat::None).allocate(2, 2);
        assert!(matches!(image.pixels(), PixelBuffer::FloatColorOnly { .. }));
    }

    #[test]
    fn labels() {
        let format = ImageFormat::new(ColorFormat::UByte, DepthFormat::None);
        assert_eq!(format.color_label(), "byte");
        assert_eq!(format.depth_label(), "none");
        assert_eq!(ImageFormat::default().depth_label(), "float");
    }
}
