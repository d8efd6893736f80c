use super::Image;
use crate::sortlast::comm::{CommError, RunContext};

impl Image {
    pub fn gather(self, root: usize, ctx: &RunContext) -> Result<Option<Image>, CommError> {
        if ctx.rank() != root {
            ctx.send(root, self)?;
            return Ok(None);
        }

        let mut full = self.format().allocate(self.width, self.height);
        for peer in 0..ctx.size() {
            let piece = if peer == root {
                None
            } else {
                Some(ctx.recv::<Image>(peer)?)
            };
            let piece = piece.as_ref().unwrap_or(&self);
            full.paste(piece)?;
        }
        Ok(Some(full))
    }
}

#[cfg(test)]
mod tests {
    use crate::sortlast::comm::World;
    use crate::sortlast::image::{ColorFormat, DepthFormat, ImageFormat};
    use glam::Vec4;

    #[test]
    fn root_assembles_disjoint_regions() {
        let results = World::new(3)
            .run(|ctx| {
                let mut image = ImageFormat::new(ColorFormat::UByte, DepthFormat::Float).allocate(3, 3);
                let r = ctx.rank();
                image.shade(r * 3 + r, Vec4::new(1.0, 0.0, 0.0, 1.0), 0.5);
                let band = image.sub_image(r * 3..r * 3 + 3);
                band.gather(0, ctx)
            })
            .unwrap();

        let mut results = results.into_iter();
        let full = results.next().unwrap().unwrap().expect("root holds the frame");
        assert!(full.is_full());
        for p in full.region() {
            let expected = if p % 4 == 0 { Vec4::new(1.0, 0.0, 0.0, 1.0) } else { Vec4::ZERO };
            assert_eq!(full.color(p), expected);
        }
        for other in results {
            assert!(other.unwrap().is_none());
        }
    }
}
