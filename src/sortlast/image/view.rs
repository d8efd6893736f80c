use super::pixel::Channel;
use super::PixelBuffer;
use glam::Vec4;
use std::ops::Range;

enum Samples<'a> {
    UByteDepth(&'a mut [[u8; 4]], &'a mut [f32]),
    FloatDepth(&'a mut [Vec4], &'a mut [f32]),
    UByte(&'a mut [[u8; 4]]),
    Float(&'a mut [Vec4]),
}

pub struct ImageView<'a> {
    width: usize,
    rows: Range<usize>,
    samples: Samples<'a>,
}

impl<'a> ImageView<'a> {
    pub(super) fn new(width: usize, first_row: usize, row_count: usize, pixels: &'a mut PixelBuffer) -> Self {
        let samples = match pixels {
            PixelBuffer::UByteColorFloatDepth { color, depth } => Samples::UByteDepth(color, depth),
            PixelBuffer::FloatColorFloatDepth { color, depth } => Samples::FloatDepth(color, depth),
            PixelBuffer::UByteColorOnly { color } => Samples::UByte(color),
            PixelBuffer::FloatColorOnly { color } => Samples::Float(color),
        };
        Self {
            width,
            rows: first_row..first_row + row_count,
            samples,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    #[inline]
    pub fn shade(&mut self, x: usize, y: usize, color: Vec4, depth: f32) {
        let i = (y - self.rows.start) * self.width + x;
        match &mut self.samples {
            Samples::UByteDepth(c, d) => {
                if depth < d[i] {
                    d[i] = depth;
                    c[i] = <[u8; 4]>::from_linear(color);
                }
            }
            Samples::FloatDepth(c, d) => {
                if depth < d[i] {
                    d[i] = depth;
                    c[i] = color;
                }
            }
            Samples::UByte(c) => c[i] = <[u8; 4]>::over(<[u8; 4]>::from_linear(color), c[i]),
            Samples::Float(c) => c[i] = Vec4::over(color, c[i]),
        }
    }

    pub fn split_rows(self, rows_per_band: usize) -> Vec<ImageView<'a>> {
        let rows_per_band = rows_per_band.max(1);
        let width = self.width;
        let first = self.rows.start;
        let stride = rows_per_band * width.max(1);

        let band = |index: usize, len: usize, samples: Samples<'a>| ImageView {
            width,
            rows: first + index * rows_per_band..first + index * rows_per_band + len / width.max(1),
            samples,
        };

        match self.samples {
            Samples::UByteDepth(c, d) => c
                .chunks_mut(stride)
                .zip(d.chunks_mut(stride))
                .enumerate()
                .map(|(i, (c, d))| band(i, c.len(), Samples::UByteDepth(c, d)))
                .collect(),
            Samples::FloatDepth(c, d) => c
                .chunks_mut(stride)
                .zip(d.chunks_mut(stride))
                .enumerate()
                .map(|(i, (c, d))| band(i, c.len(), Samples::FloatDepth(c, d)))
                .collect(),
            Samples::UByte(c) => c
                .chunks_mut(stride)
                .enumerate()
                .map(|(i, c)| band(i, c.len(), Samples::UByte(c)))
                .collect(),
            Samples::Float(c) => c
                .chunks_mut(stride)
                .enumerate()
                .map(|(i, c)| band(i, c.len(), Samples::Float(c)))
                .collect(),
        }
    }
}
