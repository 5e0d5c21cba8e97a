use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hashbrown::{HashMap, HashSet};
use loam_geom::Vec3;
use loam_nav::NavGraph;
use loam_runtime::{BuildJob, Runtime};
use loam_world::{BiomeAssignment, ChunkCoord, World};

use crate::store::{ChunkEntry, ChunkStore};

/// Streaming counters, cumulative since construction. Every submitted job
/// eventually produces exactly one result, so after the pipeline settles
/// `results_applied + results_discarded == jobs_submitted`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamStats {
    pub ticks: u64,
    pub recomputes: u64,
    pub jobs_submitted: u64,
    pub results_applied: u64,
    pub results_discarded: u64,
    pub chunks_evicted: u64,
}

/// Keeps the resident set equal to a disc of chunks around the viewer.
///
/// Each tick drains finished build jobs into the store (the single merge
/// point), then recomputes the desired set when the viewer has moved at
/// least `movement_threshold` world units since the last recompute. Builds
/// run on the worker pool; a job whose chunk leaves the desired set before
/// completion is cancelled by dropping its in-flight entry, and its result
/// is discarded on arrival.
pub struct StreamingManager {
    world: Arc<World>,
    runtime: Runtime,
    store: ChunkStore,
    nav: NavGraph,
    /// Revision each in-flight coordinate was queued under. Arrivals that
    /// do not match are stale and dropped.
    inflight: HashMap<ChunkCoord, u64>,
    last_recompute_pos: Option<Vec3>,
    rev: u64,
    next_job_id: u64,
    stats: StreamStats,
}

impl StreamingManager {
    pub fn new(world: Arc<World>) -> Self {
        let runtime = Runtime::new(world.clone());
        Self::with_runtime(world, runtime)
    }

    pub fn with_workers(world: Arc<World>, workers: usize) -> Self {
        let runtime = Runtime::with_workers(world.clone(), workers);
        Self::with_runtime(world, runtime)
    }

    fn with_runtime(world: Arc<World>, runtime: Runtime) -> Self {
        Self {
            store: ChunkStore::new(world.clone()),
            nav: NavGraph::new(),
            runtime,
            world,
            inflight: HashMap::new(),
            last_recompute_pos: None,
            rev: 0,
            next_job_id: 0,
            stats: StreamStats::default(),
        }
    }

    /// One streaming step for the current viewer position.
    pub fn tick(&mut self, viewer: Vec3) {
        self.stats.ticks += 1;
        self.apply_results();

        let threshold = self.world.params().movement_threshold;
        if let Some(last) = self.last_recompute_pos {
            if viewer.distance(last) < threshold {
                return;
            }
        }
        self.last_recompute_pos = Some(viewer);
        self.recompute_desired(viewer);
    }

    fn recompute_desired(&mut self, viewer: Vec3) {
        self.stats.recomputes += 1;
        self.rev += 1;

        let center = self.world.anchor_chunk(viewer.x, viewer.z);
        let desired = self.desired_disc(center);

        let resident: Vec<ChunkCoord> = self.store.coords().collect();
        for coord in resident {
            if !desired.contains(&coord) {
                self.nav.remove_chunk(coord);
                self.store.remove(coord);
                self.stats.chunks_evicted += 1;
            }
        }

        // Cancel builds for chunks that left the desired set. Their results
        // are dropped on arrival instead of resurrecting evicted chunks.
        self.inflight.retain(|coord, _| desired.contains(coord));

        let mut submitted = 0usize;
        for &coord in &desired {
            if self.store.is_resident(coord) || self.inflight.contains_key(&coord) {
                continue;
            }
            let job_id = self.next_job_id;
            self.next_job_id += 1;
            self.inflight.insert(coord, self.rev);
            self.runtime.submit_build_job(BuildJob {
                coord,
                rev: self.rev,
                job_id,
            });
            self.stats.jobs_submitted += 1;
            submitted += 1;
        }
        log::debug!(
            "stream rev {} center ({}, {}): {} desired, {} submitted",
            self.rev,
            center.cx,
            center.cz,
            desired.len(),
            submitted
        );
    }

    /// Chunk coordinates whose Euclidean offset from `center` is within the
    /// view distance. A disc, so at distance 1 the four diagonal neighbours
    /// are excluded.
    fn desired_disc(&self, center: ChunkCoord) -> HashSet<ChunkCoord> {
        let r = self.world.params().view_distance;
        let ri = r.floor() as i32;
        let mut out = HashSet::new();
        for dz in -ri..=ri {
            for dx in -ri..=ri {
                if (dx * dx + dz * dz) as f32 <= r * r {
                    out.insert(ChunkCoord::new(center.cx + dx, center.cz + dz));
                }
            }
        }
        out
    }

    /// Merges finished builds into the store and nav graph. This is the
    /// only place worker output touches shared state.
    pub fn apply_results(&mut self) {
        for out in self.runtime.drain_worker_results() {
            match self.inflight.get(&out.coord) {
                Some(&rev) if rev == out.rev => {
                    self.inflight.remove(&out.coord);
                    self.nav.add_chunk(&out.buf, &out.mesh);
                    self.store.insert(ChunkEntry {
                        buf: out.buf,
                        mesh: out.mesh,
                        occupancy: out.occupancy,
                        assignment: out.assignment,
                        built_rev: out.rev,
                    });
                    self.stats.results_applied += 1;
                    log::trace!(
                        "chunk ({}, {}) resident: gen={}ms mesh={}ms total={}ms",
                        out.coord.cx,
                        out.coord.cz,
                        out.t_gen_ms,
                        out.t_mesh_ms,
                        out.t_total_ms
                    );
                }
                _ => {
                    self.stats.results_discarded += 1;
                    log::trace!(
                        "discarded stale build for ({}, {}) rev {}",
                        out.coord.cx,
                        out.coord.cz,
                        out.rev
                    );
                }
            }
        }
    }

    /// Blocks until every in-flight build has been applied or discarded,
    /// or the timeout passes. Returns whether the pipeline settled.
    pub fn drain_until_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.apply_results();
            if self.inflight.is_empty() && self.runtime.is_idle() {
                // Cancelled jobs may have finished between the checks;
                // drain their results so the counters balance.
                self.apply_results();
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[inline]
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    #[inline]
    pub fn nav(&self) -> &NavGraph {
        &self.nav
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    #[inline]
    pub fn inflight_count(&self) -> usize {
        self.inflight.len()
    }

    #[inline]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.store.is_resident(coord)
    }

    /// Sorted resident coordinates, mainly for assertions and overlays.
    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        let mut v: Vec<ChunkCoord> = self.store.coords().collect();
        v.sort_by_key(|c| (c.cx, c.cz));
        v
    }

    #[inline]
    pub fn height_at(&self, wx: f32, wz: f32) -> Option<f32> {
        self.store.height_at(wx, wz)
    }

    #[inline]
    pub fn biome_at(&self, wx: f32, wz: f32) -> Option<BiomeAssignment> {
        self.store.biome_at(wx, wz)
    }
}
