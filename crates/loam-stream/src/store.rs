use std::sync::Arc;

use hashbrown::HashMap;
use loam_chunk::{ChunkBuf, ChunkOccupancy};
use loam_mesh::MeshBuild;
use loam_world::{BiomeAssignment, ChunkCoord, World};

/// Everything kept for one resident chunk.
pub struct ChunkEntry {
    pub buf: ChunkBuf,
    pub mesh: MeshBuild,
    pub occupancy: ChunkOccupancy,
    pub assignment: BiomeAssignment,
    pub built_rev: u64,
}

/// Owns all resident chunk data, keyed by coordinate. Other systems query
/// through this store and never hold direct references across ticks, so an
/// eviction can never leave a dangling chunk in consumer hands.
pub struct ChunkStore {
    world: Arc<World>,
    chunks: HashMap<ChunkCoord, ChunkEntry>,
}

impl ChunkStore {
    pub fn new(world: Arc<World>) -> Self {
        Self {
            world,
            chunks: HashMap::new(),
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Inserts a built chunk, replacing any previous entry at the same
    /// coordinate. At most one entry per coordinate ever exists.
    pub fn insert(&mut self, entry: ChunkEntry) -> Option<ChunkEntry> {
        self.chunks.insert(entry.buf.coord, entry)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<ChunkEntry> {
        self.chunks.remove(&coord)
    }

    #[inline]
    pub fn get(&self, coord: ChunkCoord) -> Option<&ChunkEntry> {
        self.chunks.get(&coord)
    }

    #[inline]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChunkEntry> {
        self.chunks.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Interpolated surface height at a world position, or `None` when the
    /// covering chunk is not resident. Absence is explicit; there is no
    /// fallback height.
    pub fn height_at(&self, wx: f32, wz: f32) -> Option<f32> {
        let coord = self.world.chunk_containing(wx, wz);
        self.chunks.get(&coord)?.buf.height_at_world(wx, wz)
    }

    /// Biome record of the chunk covering a world position, or `None` when
    /// it is not resident.
    pub fn biome_at(&self, wx: f32, wz: f32) -> Option<BiomeAssignment> {
        let coord = self.world.chunk_containing(wx, wz);
        self.chunks.get(&coord).map(|e| e.assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_chunk::generate_chunk_buffer;
    use loam_mesh::build_chunk_mesh;
    use loam_world::WorldGenConfig;

    fn store() -> ChunkStore {
        let mut cfg = WorldGenConfig::default();
        cfg.chunk.size = 8;
        cfg.blend.radius = 2;
        ChunkStore::new(Arc::new(World::new(5, &cfg).unwrap()))
    }

    fn entry_for(store: &ChunkStore, cx: i32, cz: i32) -> ChunkEntry {
        let r = generate_chunk_buffer(store.world(), ChunkCoord::new(cx, cz));
        let mesh = build_chunk_mesh(&r.buf);
        ChunkEntry {
            buf: r.buf,
            mesh,
            occupancy: r.occupancy,
            assignment: r.assignment,
            built_rev: 1,
        }
    }

    #[test]
    fn insert_then_query_then_remove() {
        let mut s = store();
        let e = entry_for(&s, 0, 0);
        assert!(s.insert(e).is_none());
        assert!(s.is_resident(ChunkCoord::new(0, 0)));
        assert_eq!(s.len(), 1);

        let mid = s.world().chunk_world_size() * 0.5;
        assert!(s.height_at(mid, mid).is_some());
        assert!(s.biome_at(mid, mid).is_some());

        assert!(s.remove(ChunkCoord::new(0, 0)).is_some());
        assert!(s.height_at(mid, mid).is_none());
        assert!(s.biome_at(mid, mid).is_none());
    }

    #[test]
    fn reinsert_replaces_rather_than_duplicates() {
        let mut s = store();
        let a = entry_for(&s, 2, -1);
        let mut b = entry_for(&s, 2, -1);
        b.built_rev = 9;
        s.insert(a);
        let replaced = s.insert(b);
        assert!(replaced.is_some());
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(ChunkCoord::new(2, -1)).unwrap().built_rev, 9);
    }

    #[test]
    fn queries_outside_resident_chunks_are_absent() {
        let mut s = store();
        s.insert(entry_for(&s, 0, 0));
        let far = s.world().chunk_world_size() * 10.0;
        assert!(s.height_at(far, far).is_none());
        assert!(s.biome_at(-far, 0.0).is_none());
    }
}
