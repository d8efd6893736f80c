use super::CommError;
use crate::sortlast::image::Image;
use crate::sortlast::mesh::Mesh;
use glam::Vec3;

pub enum Payload {
    Token,
    Count(u64),
    Scalar(f32),
    Vector(Vec3),
    Mesh(Mesh),
    Image(Image),
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Payload::Token => "token",
            Payload::Count(_) => "count",
            Payload::Scalar(_) => "scalar",
            Payload::Vector(_) => "vector",
            Payload::Mesh(_) => "mesh",
            Payload::Image(_) => "image",
        }
    }
}

macro_rules! payload_conversions {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl From<$ty> for Payload {
                fn from(value: $ty) -> Self {
                    Payload::$variant(value)
                }
            }

            impl TryFrom<Payload> for $ty {
                type Error = CommError;

                fn try_from(payload: Payload) -> Result<Self, Self::Error> {
                    match payload {
                        Payload::$variant(value) => Ok(value),
                        other => Err(CommError::UnexpectedPayload {
                            peer: usize::MAX,
                            expected: $name,
                            got: other.kind(),
                        }),
                    }
                }
            }
        )*
    };
}

payload_conversions! {
    u64 => Count, "count";
    f32 => Scalar, "scalar";
    Vec3 => Vector, "vector";
    Mesh => Mesh, "mesh";
    Image => Image, "image";
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Payload::Token
    }
}

impl TryFrom<Payload> for () {
    type Error = CommError;

    fn try_from(payload: Payload) -> Result<Self, Self::Error> {
        match payload {
            Payload::Token => Ok(()),
            other => Err(CommError::UnexpectedPayload {
                peer: usize::MAX,
                expected: "token",
                got: other.kind(),
            }),
        }
    }
}
