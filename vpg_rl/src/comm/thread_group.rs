//! Star-topology collectives over channels for worker threads.
//!
//! Rank 0 is the hub: non-root ranks send their contribution up and
//! block on the reply; rank 0 gathers all contributions, reduces them
//! in rank order (so the result is the same bit pattern everywhere),
//! and fans the result out. A blocking `recv` is the barrier, which is
//! what gives collectives their lockstep semantics.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use super::Collective;

enum Payload {
    Floats(Vec<f64>),
    Bytes(Vec<u8>),
}

enum Role {
    Root {
        gather: Receiver<(usize, Payload)>,
        /// Reply channel for rank `i + 1` at index `i`.
        replies: Vec<Sender<Payload>>,
    },
    Member {
        to_root: Sender<(usize, Payload)>,
        from_root: Receiver<Payload>,
    },
}

/// One worker's endpoint into a [`ThreadGroup`].
pub struct GroupMember {
    rank: usize,
    world_size: usize,
    role: Role,
}

/// Builder for a fixed-size group of same-process workers.
pub struct ThreadGroup;

impl ThreadGroup {
    /// Creates the endpoints for a group of `world_size` workers, rank
    /// `i` at index `i`. Each endpoint must end up on its own thread.
    pub fn new(world_size: usize) -> Vec<GroupMember> {
        assert!(world_size >= 1, "a worker group needs at least one rank");
        let (to_root, gather) = unbounded();
        let mut replies = Vec::with_capacity(world_size - 1);
        let mut member_roles = Vec::with_capacity(world_size - 1);
        for _ in 1..world_size {
            let (reply_tx, reply_rx) = unbounded();
            replies.push(reply_tx);
            member_roles.push(Role::Member {
                to_root: to_root.clone(),
                from_root: reply_rx,
            });
        }

        let mut members = Vec::with_capacity(world_size);
        members.push(GroupMember {
            rank: 0,
            world_size,
            role: Role::Root { gather, replies },
        });
        for (i, role) in member_roles.into_iter().enumerate() {
            members.push(GroupMember {
                rank: i + 1,
                world_size,
                role,
            });
        }
        members
    }

    /// Spawns one named thread per rank, runs `work` on each endpoint,
    /// joins them all, and returns the results ordered by rank.
    ///
    /// Panics if any worker thread panics.
    pub fn run<T, F>(world_size: usize, work: F) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(GroupMember) -> T + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        let results: Arc<Mutex<Vec<Option<T>>>> =
            Arc::new(Mutex::new((0..world_size).map(|_| None).collect()));

        let mut handles = Vec::with_capacity(world_size);
        for member in Self::new(world_size) {
            let work = Arc::clone(&work);
            let results = Arc::clone(&results);
            let rank = member.rank;
            let handle = thread::Builder::new()
                .name(format!("vpg-worker-{rank}"))
                .spawn(move || {
                    let output = work(member);
                    results.lock()[rank] = Some(output);
                })
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }
        for handle in handles {
            handle.join().expect("worker thread panicked");
        }

        let slots = Arc::try_unwrap(results)
            .unwrap_or_else(|_| panic!("worker results still shared after join"))
            .into_inner();
        slots
            .into_iter()
            .map(|slot| slot.expect("worker exited without a result"))
            .collect()
    }
}

impl GroupMember {
    fn reduce_floats(&self, values: &[f64]) -> Vec<f64> {
        match &self.role {
            Role::Root { gather, replies } => {
                let mut slots: Vec<Option<Vec<f64>>> = vec![None; self.world_size];
                slots[0] = Some(values.to_vec());
                for _ in 1..self.world_size {
                    let (rank, payload) = gather.recv().expect("worker group disbanded");
                    let Payload::Floats(contribution) = payload else {
                        panic!("collective mismatch: rank {rank} sent bytes to a reduction");
                    };
                    assert_eq!(
                        contribution.len(),
                        values.len(),
                        "collective mismatch: rank {rank} reduced a different length"
                    );
                    slots[rank] = Some(contribution);
                }

                // Rank-order accumulation keeps the result deterministic.
                let mut sum = vec![0.0; values.len()];
                for contribution in slots.iter().flatten() {
                    for (acc, v) in sum.iter_mut().zip(contribution) {
                        *acc += v;
                    }
                }
                for reply in replies {
                    reply
                        .send(Payload::Floats(sum.clone()))
                        .expect("worker group disbanded");
                }
                sum
            }
            Role::Member { to_root, from_root } => {
                to_root
                    .send((self.rank, Payload::Floats(values.to_vec())))
                    .expect("worker group disbanded");
                match from_root.recv().expect("worker group disbanded") {
                    Payload::Floats(sum) => sum,
                    Payload::Bytes(_) => {
                        panic!("collective mismatch: reduction answered with bytes")
                    }
                }
            }
        }
    }
}

impl Collective for GroupMember {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn allreduce_sum(&self, values: &[f64]) -> Vec<f64> {
        if self.world_size == 1 {
            return values.to_vec();
        }
        self.reduce_floats(values)
    }

    fn broadcast_bytes(&self, bytes: Vec<u8>) -> Vec<u8> {
        match &self.role {
            Role::Root { replies, .. } => {
                for reply in replies {
                    reply
                        .send(Payload::Bytes(bytes.clone()))
                        .expect("worker group disbanded");
                }
                bytes
            }
            Role::Member { from_root, .. } => {
                match from_root.recv().expect("worker group disbanded") {
                    Payload::Bytes(broadcast) => broadcast,
                    Payload::Floats(_) => {
                        panic!("collective mismatch: broadcast answered with floats")
                    }
                }
            }
        }
    }
}
