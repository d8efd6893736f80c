use super::{Image, ImageError};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

impl Image {
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut rgb = vec![0u8; self.width * self.height * 3];
        for pixel in self.region() {
            let c = self.color(pixel).clamp(glam::Vec4::ZERO, glam::Vec4::ONE) * 255.0;
            let o = pixel * 3;
            rgb[o] = c.x.round() as u8;
            rgb[o + 1] = c.y.round() as u8;
            rgb[o + 2] = c.z.round() as u8;
        }
        rgb
    }

    pub fn save_ppm<P: AsRef<Path>>(&self, path: P) -> Result<(), ImageError> {
        let file = BufWriter::new(File::create(path.as_ref())?);
        PnmEncoder::new(file)
            .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
            .write_image(
                &self.to_rgb8(),
                self.width as u32,
                self.height as u32,
                ExtendedColorType::Rgb8,
            )?;
        Ok(())
    }
}
