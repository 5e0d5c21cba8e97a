//! Background chunk build workers and their job queues.
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use loam_chunk::{ChunkBuf, ChunkOccupancy, generate_chunk_buffer_with};
use loam_mesh::{MeshBuild, build_chunk_mesh};
use loam_world::{BiomeAssignment, ChunkCoord, GenCtx, World};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Request to build one chunk. `rev` is the streaming revision the job was
/// queued under; results from older revisions are dropped by the receiver.
#[derive(Clone, Copy, Debug)]
pub struct BuildJob {
    pub coord: ChunkCoord,
    pub rev: u64,
    pub job_id: u64,
}

/// Completed chunk build: buffers, surface mesh, and per-stage timings.
pub struct JobOut {
    pub coord: ChunkCoord,
    pub rev: u64,
    pub job_id: u64,
    pub buf: ChunkBuf,
    pub mesh: MeshBuild,
    pub occupancy: ChunkOccupancy,
    pub assignment: BiomeAssignment,
    pub t_total_ms: u32,
    pub t_gen_ms: u32,
    pub t_mesh_ms: u32,
}

#[inline]
fn elapsed_ms(start: Instant) -> u32 {
    start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

fn process_build_job(job: BuildJob, world: &World, ctx: &GenCtx, tx: &Sender<JobOut>) {
    let t_job_start = Instant::now();

    let t0 = Instant::now();
    let generated = generate_chunk_buffer_with(world, ctx, job.coord);
    let t_gen_ms = elapsed_ms(t0);

    let t0 = Instant::now();
    let mesh = build_chunk_mesh(&generated.buf);
    let t_mesh_ms = elapsed_ms(t0);

    let _ = tx.send(JobOut {
        coord: job.coord,
        rev: job.rev,
        job_id: job.job_id,
        buf: generated.buf,
        mesh,
        occupancy: generated.occupancy,
        assignment: generated.assignment,
        t_total_ms: elapsed_ms(t_job_start),
        t_gen_ms,
        t_mesh_ms,
    });
}

/// Owns the worker pool and the job/result channels. Submission never
/// blocks; results are drained from the simulation thread.
pub struct Runtime {
    job_tx: Sender<BuildJob>,
    res_rx: Receiver<JobOut>,
    _pool: Arc<ThreadPool>,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    pub workers: usize,
}

impl Runtime {
    pub fn new(world: Arc<World>) -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::with_workers(world, workers)
    }

    pub fn with_workers(world: Arc<World>, workers: usize) -> Self {
        let workers = workers.max(1);
        let (job_tx, job_rx) = unbounded::<BuildJob>();
        let (res_tx, res_rx) = unbounded::<JobOut>();

        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("loam-build-{i}"))
                .build()
                .expect("build pool"),
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let world = world.clone();
            let queued = queued.clone();
            let inflight = inflight.clone();
            pool.spawn(move || {
                // One noise context per worker, reused across jobs.
                let ctx = world.make_gen_ctx();
                while let Ok(job) = rx.recv() {
                    queued.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    process_build_job(job, world.as_ref(), &ctx, &tx);
                    inflight.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }
        log::info!("runtime started with {workers} build worker(s)");

        Self {
            job_tx,
            res_rx,
            _pool: pool,
            queued,
            inflight,
            workers,
        }
    }

    pub fn submit_build_job(&self, job: BuildJob) {
        self.queued.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(job).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Non-blocking drain of every finished job.
    pub fn drain_worker_results(&self) -> Vec<JobOut> {
        self.res_rx.try_iter().collect()
    }

    /// (queued, inflight) snapshot for debug overlays and settling checks.
    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (
            self.queued.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
        )
    }

    /// True when no job is queued or being processed. Results may still be
    /// waiting in the channel; drain after observing idle.
    pub fn is_idle(&self) -> bool {
        let (q, i) = self.queue_debug_counts();
        q == 0 && i == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_world::WorldGenConfig;
    use std::time::Duration;

    fn world() -> Arc<World> {
        let mut cfg = WorldGenConfig::default();
        cfg.chunk.size = 8;
        cfg.blend.radius = 2;
        Arc::new(World::new(9, &cfg).unwrap())
    }

    fn drain_blocking(rt: &Runtime, want: usize) -> Vec<JobOut> {
        let mut out = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while out.len() < want && Instant::now() < deadline {
            out.extend(rt.drain_worker_results());
            thread::sleep(Duration::from_millis(5));
        }
        out
    }

    #[test]
    fn builds_submitted_chunks() {
        let rt = Runtime::with_workers(world(), 2);
        for (i, (cx, cz)) in [(0, 0), (1, 0), (0, 1)].iter().enumerate() {
            rt.submit_build_job(BuildJob {
                coord: ChunkCoord::new(*cx, *cz),
                rev: 1,
                job_id: i as u64,
            });
        }
        let results = drain_blocking(&rt, 3);
        assert_eq!(results.len(), 3);
        let mut coords: Vec<_> = results.iter().map(|r| (r.coord.cx, r.coord.cz)).collect();
        coords.sort();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0)]);
        for r in &results {
            assert_eq!(r.rev, 1);
            assert!(r.mesh.vertex_count() > 0);
            assert_eq!(r.buf.n, 8);
        }
    }

    #[test]
    fn results_match_synchronous_generation() {
        let w = world();
        let rt = Runtime::with_workers(w.clone(), 1);
        let coord = ChunkCoord::new(3, -1);
        rt.submit_build_job(BuildJob {
            coord,
            rev: 7,
            job_id: 0,
        });
        let results = drain_blocking(&rt, 1);
        assert_eq!(results.len(), 1);
        let expected = loam_chunk::generate_chunk_buffer(&w, coord);
        assert_eq!(results[0].buf.heights, expected.buf.heights);
        assert_eq!(results[0].buf.density, expected.buf.density);
        assert_eq!(results[0].occupancy, expected.occupancy);
    }

    #[test]
    fn counters_settle_to_idle() {
        let rt = Runtime::with_workers(world(), 2);
        for i in 0..8 {
            rt.submit_build_job(BuildJob {
                coord: ChunkCoord::new(i, i),
                rev: 1,
                job_id: i as u64,
            });
        }
        let results = drain_blocking(&rt, 8);
        assert_eq!(results.len(), 8);
        // The inflight counter drops just after the result is sent, so give
        // the workers a moment to finish bookkeeping.
        let deadline = Instant::now() + Duration::from_secs(5);
        while !rt.is_idle() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(rt.queue_debug_counts(), (0, 0));
    }
}
