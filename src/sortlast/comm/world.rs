use super::{CommError, Payload, RunContext};
use crossbeam_channel::{unbounded, Receiver, Sender};

pub struct World {
    size: usize,
}

impl World {
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn contexts(&self) -> Vec<RunContext> {
        let n = self.size;
        let mut outboxes: Vec<Vec<Option<Sender<Payload>>>> = (0..n).map(|_| vec![None; n]).collect();
        let mut inboxes: Vec<Vec<Option<Receiver<Payload>>>> = (0..n).map(|_| vec![None; n]).collect();

        for src in 0..n {
            for dst in 0..n {
                let (tx, rx) = unbounded();
                outboxes[src][dst] = Some(tx);
                inboxes[dst][src] = Some(rx);
            }
        }

        outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (out, inb))| {
                RunContext::new(
                    rank,
                    out.into_iter().flatten().collect(),
                    inb.into_iter().flatten().collect(),
                )
            })
            .collect()
    }

    pub fn run<F, R>(&self, body: F) -> Result<Vec<R>, CommError>
    where
        F: Fn(&RunContext) -> R + Sync,
        R: Send,
    {
        let body = &body;
        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.size);
            for ctx in self.contexts() {
                let handle = std::thread::Builder::new()
                    .name(format!("rank-{}", ctx.rank()))
                    .spawn_scoped(scope, move || {
                        let result = body(&ctx);
                        log::trace!("rank {} finished", ctx.rank());
                        result
                    })?;
                handles.push(handle);
            }

            Ok(handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_see_their_own_index() {
        let ranks = World::new(4).run(|ctx| (ctx.rank(), ctx.size())).unwrap();
        assert_eq!(ranks, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
    }

    #[test]
    fn zero_ranks_means_one() {
        assert_eq!(World::new(0).size(), 1);
    }

    #[test]
    fn point_to_point_is_fifo() {
        let results = World::new(2)
            .run(|ctx| -> Result<Vec<u64>, CommError> {
                if ctx.is_root() {
                    for i in 0..5u64 {
                        ctx.send(1, i)?;
                    }
                    Ok(Vec::new())
                } else {
                    (0..5).map(|_| ctx.recv::<u64>(0)).collect()
                }
            })
            .unwrap();
        assert_eq!(results[1].as_ref().unwrap(), &vec![0, 1, 2, 3, 4]);
    }
}
