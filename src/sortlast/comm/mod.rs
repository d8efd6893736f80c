// Rank-to-rank messaging and the blocking collectives built on it.
//
// Every rank owns a `RunContext` holding one outgoing channel per peer and
// one incoming channel per peer. Messages between a pair of ranks arrive in
// the order they were sent, and all ranks issue the same sequence of
// collectives, so a receive never needs a tag to find its message.

mod payload;
mod world;

pub use payload::Payload;
pub use world::World;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommError {
    #[error("rank {peer} disconnected before the collective completed")]
    Disconnected { peer: usize },
    #[error("rank {peer} sent a {got} message where a {expected} was expected")]
    UnexpectedPayload {
        peer: usize,
        expected: &'static str,
        got: &'static str,
    },
    #[error("collective on rank {rank} is missing its root data")]
    MissingRootData { rank: usize },
    #[error("scatter needs {expected} items but the root supplied {got}")]
    ScatterLength { expected: usize, got: usize },
    #[error("received image does not fit: {0}")]
    Image(#[from] crate::sortlast::image::ImageError),
    #[error("failed to launch rank thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub struct RunContext {
    rank: usize,
    size: usize,
    outboxes: Vec<Sender<Payload>>,
    inboxes: Vec<Receiver<Payload>>,
}

impl RunContext {
    pub(crate) fn new(
        rank: usize,
        outboxes: Vec<Sender<Payload>>,
        inboxes: Vec<Receiver<Payload>>,
    ) -> Self {
        debug_assert_eq!(outboxes.len(), inboxes.len());
        Self {
            rank,
            size: outboxes.len(),
            outboxes,
            inboxes,
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.rank == 0
    }

    pub fn send<T: Into<Payload>>(&self, dest: usize, value: T) -> Result<(), CommError> {
        self.outboxes[dest]
            .send(value.into())
            .map_err(|_| CommError::Disconnected { peer: dest })
    }

    pub fn recv<T>(&self, source: usize) -> Result<T, CommError>
    where
        T: TryFrom<Payload, Error = CommError>,
    {
        let payload = self.inboxes[source]
            .recv()
            .map_err(|_| CommError::Disconnected { peer: source })?;
        T::try_from(payload).map_err(|err| match err {
            CommError::UnexpectedPayload { expected, got, .. } => CommError::UnexpectedPayload {
                peer: source,
                expected,
                got,
            },
            other => other,
        })
    }

    pub fn barrier(&self) -> Result<(), CommError> {
        if self.is_root() {
            for peer in 1..self.size {
                self.recv::<()>(peer)?;
            }
            for peer in 1..self.size {
                self.send(peer, ())?;
            }
        } else {
            self.send(0, ())?;
            self.recv::<()>(0)?;
        }
        Ok(())
    }

    pub fn broadcast<T>(&self, value: Option<T>, root: usize) -> Result<T, CommError>
    where
        T: Clone + Into<Payload> + TryFrom<Payload, Error = CommError>,
    {
        if self.rank == root {
            let value = value.ok_or(CommError::MissingRootData { rank: self.rank })?;
            for peer in (0..self.size).filter(|&p| p != root) {
                self.send(peer, value.clone())?;
            }
            Ok(value)
        } else {
            self.recv(root)
        }
    }

    pub fn scatter<T>(&self, values: Option<Vec<T>>, root: usize) -> Result<T, CommError>
    where
        T: Into<Payload> + TryFrom<Payload, Error = CommError>,
    {
        if self.rank == root {
            let values = values.ok_or(CommError::MissingRootData { rank: self.rank })?;
            if values.len() != self.size {
                return Err(CommError::ScatterLength {
                    expected: self.size,
                    got: values.len(),
                });
            }
            let mut own = None;
            for (peer, value) in values.into_iter().enumerate() {
                if peer == root {
                    own = Some(value);
                } else {
                    self.send(peer, value)?;
                }
            }
            own.ok_or(CommError::MissingRootData { rank: self.rank })
        } else {
            self.recv(root)
        }
    }

    pub fn all_gather<T>(&self, value: T) -> Result<Vec<T>, CommError>
    where
        T: Clone + Into<Payload> + TryFrom<Payload, Error = CommError>,
    {
        for peer in (0..self.size).filter(|&p| p != self.rank) {
            self.send(peer, value.clone())?;
        }
        let mut own = Some(value);
        (0..self.size)
            .map(|peer| {
                if peer == self.rank {
                    own.take().ok_or(CommError::MissingRootData { rank: self.rank })
                } else {
                    self.recv(peer)
                }
            })
            .collect()
    }

    pub fn all_reduce<T, F>(&self, value: T, op: F) -> Result<T, CommError>
    where
        T: Clone + Into<Payload> + TryFrom<Payload, Error = CommError>,
        F: Fn(T, T) -> T,
    {
        let values = self.all_gather(value)?;
        let mut iter = values.into_iter();
        let first = iter.next().ok_or(CommError::MissingRootData { rank: self.rank })?;
        Ok(iter.fold(first, op))
    }

    pub fn all_reduce_min(&self, value: glam::Vec3) -> Result<glam::Vec3, CommError> {
        self.all_reduce(value, glam::Vec3::min)
    }

    pub fn all_reduce_max(&self, value: glam::Vec3) -> Result<glam::Vec3, CommError> {
        self.all_reduce(value, glam::Vec3::max)
    }

    pub fn all_reduce_sum(&self, value: u64) -> Result<u64, CommError> {
        self.all_reduce(value, |a, b| a + b)
    }
}
