use glam::Vec4;

pub trait Channel: Copy + Send + Sync {
    fn from_linear(color: Vec4) -> Self;
    fn to_linear(self) -> Vec4;
    fn over(front: Self, back: Self) -> Self;
}

impl Channel for [u8; 4] {
    #[inline]
    fn from_linear(color: Vec4) -> Self {
        let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
        [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
    }

    #[inline]
    fn to_linear(self) -> Vec4 {
        Vec4::new(self[0] as f32, self[1] as f32, self[2] as f32, self[3] as f32) / 255.0
    }

    #[inline]
    fn over(front: Self, back: Self) -> Self {
        let remaining = 255 - front[3] as u32;
        let mut out = [0u8; 4];
        for i in 0..4 {
            let scaled = (back[i] as u32 * remaining + 127) / 255;
            out[i] = front[i].saturating_add(scaled as u8);
        }
        out
    }
}

impl Channel for Vec4 {
    #[inline]
    fn from_linear(color: Vec4) -> Self {
        color
    }

    #[inline]
    fn to_linear(self) -> Vec4 {
        self
    }

    #[inline]
    fn over(front: Self, back: Self) -> Self {
        front + back * (1.0 - front.w)
    }
}

pub(super) fn blend_over<C: Channel>(dst: &mut [C], src: &[C], dst_in_front: bool) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = if dst_in_front { C::over(*d, s) } else { C::over(s, *d) };
    }
}

// Keeps the nearer sample per pixel. Equal depths keep the front member's
// sample so the result does not depend on which rank holds the buffer.
pub(super) fn depth_resolve<C: Copy>(
    dst_color: &mut [C],
    dst_depth: &mut [f32],
    src_color: &[C],
    src_depth: &[f32],
    dst_in_front: bool,
) {
    for i in 0..dst_depth.len() {
        let take_src = if dst_in_front {
            src_depth[i] < dst_depth[i]
        } else {
            src_depth[i] <= dst_depth[i]
        };
        if take_src {
            dst_depth[i] = src_depth[i];
            dst_color[i] = src_color[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubyte_over_transparent_is_identity() {
        let c = [12u8, 200, 7, 255];
        assert_eq!(<[u8; 4]>::over(c, [0; 4]), c);
        assert_eq!(<[u8; 4]>::over([0; 4], c), c);
    }

    #[test]
    fn opaque_front_hides_back() {
        let front = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let back = Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(Vec4::over(front, back), front);
    }

    #[test]
    fn half_transparent_front_mixes() {
        let front = Vec4::new(0.5, 0.0, 0.0, 0.5);
        let back = Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(Vec4::over(front, back), Vec4::new(0.5, 0.5, 0.0, 1.0));
    }

    #[test]
    fn ubyte_round_trip_of_quantized_values() {
        let c = [0u8, 64, 128, 255];
        assert_eq!(<[u8; 4]>::from_linear(c.to_linear()), c);
    }

    #[test]
    fn depth_ties_go_to_front() {
        let mut color = [1u8];
        let mut depth = [0.5f32];
        depth_resolve(&mut color, &mut depth, &[2u8], &[0.5], false);
        assert_eq!(color, [2]);

        let mut color = [1u8];
        depth_resolve(&mut color, &mut depth, &[3u8], &[0.5], true);
        assert_eq!(color, [1]);
    }
}
