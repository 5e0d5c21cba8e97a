//! Per-chunk navigation surfaces and the cross-chunk connection graph.
#![forbid(unsafe_code)]

use hashbrown::HashMap;
use loam_chunk::ChunkBuf;
use loam_geom::Vec3;
use loam_mesh::MeshBuild;
use loam_world::ChunkCoord;

/// Direction indices into [`NavSurface::anchors`], matching
/// [`ChunkCoord::neighbors4`] order: +x, -x, +z, -z.
const DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Walkable summary of one chunk. The whole extracted surface is walkable,
/// so this keeps only what stitching and pathfinding consumers need.
#[derive(Clone, Debug)]
pub struct NavSurface {
    pub coord: ChunkCoord,
    pub triangle_count: usize,
    pub walkable_area: f32,
    /// Entry anchor per direction, inset 45% of the chunk edge length from
    /// the chunk origin toward each shared-edge midpoint. Heights are read
    /// from the chunk's own heightfield at registration time.
    anchors: [Vec3; 4],
}

impl NavSurface {
    pub fn build(buf: &ChunkBuf, mesh: &MeshBuild) -> Self {
        let s = buf.world_size();
        let (ox, oz) = buf.origin_world();
        let mut anchors = [Vec3::ZERO; 4];
        for (i, (dx, dz)) in DIRS.iter().enumerate() {
            let mid_x = ox + (0.5 + 0.5 * *dx as f32) * s;
            let mid_z = oz + (0.5 + 0.5 * *dz as f32) * s;
            let dir = Vec3::new(mid_x - ox, 0.0, mid_z - oz).normalized();
            let px = ox + dir.x * 0.45 * s;
            let pz = oz + dir.z * 0.45 * s;
            let py = buf.height_at_world(px, pz).unwrap_or(0.0);
            anchors[i] = Vec3::new(px, py, pz);
        }
        let mut area = 0.0f32;
        for tri in mesh.idx.chunks_exact(3) {
            let a = mesh.vertex(tri[0] as usize);
            let b = mesh.vertex(tri[1] as usize);
            let c = mesh.vertex(tri[2] as usize);
            area += (b - a).cross(c - a).length() * 0.5;
        }
        Self {
            coord: buf.coord,
            triangle_count: mesh.triangle_count(),
            walkable_area: area,
            anchors,
        }
    }

    /// Anchor facing the given adjacent chunk, if it is 4-adjacent.
    pub fn anchor_toward(&self, neighbor: ChunkCoord) -> Option<Vec3> {
        let dx = neighbor.cx - self.coord.cx;
        let dz = neighbor.cz - self.coord.cz;
        DIRS.iter()
            .position(|d| *d == (dx, dz))
            .map(|i| self.anchors[i])
    }
}

/// Bidirectional link joining two resident chunks at their shared edge.
#[derive(Clone, Debug, PartialEq)]
pub struct NavConnection {
    pub a: ChunkCoord,
    pub b: ChunkCoord,
    pub a_point: Vec3,
    pub b_point: Vec3,
    pub width: f32,
}

#[inline]
fn pair_key(a: ChunkCoord, b: ChunkCoord) -> (ChunkCoord, ChunkCoord) {
    if (a.cx, a.cz) <= (b.cx, b.cz) { (a, b) } else { (b, a) }
}

/// Graph of resident navigation surfaces and their connections. Links only
/// ever reference chunks currently registered; removing a chunk tears down
/// every connection touching it.
#[derive(Default)]
pub struct NavGraph {
    surfaces: HashMap<ChunkCoord, NavSurface>,
    connections: HashMap<(ChunkCoord, ChunkCoord), NavConnection>,
}

impl NavGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a chunk's surface and links it to every already-resident
    /// 4-neighbour. Returns the number of connections created. Surfaces
    /// with no walkable area are not registered; the chunk stays renderable
    /// elsewhere but gets no connections.
    pub fn add_chunk(&mut self, buf: &ChunkBuf, mesh: &MeshBuild) -> usize {
        let surface = NavSurface::build(buf, mesh);
        let coord = surface.coord;
        if surface.walkable_area <= 0.0 {
            log::warn!(
                "nav chunk ({}, {}) skipped, zero walkable area",
                coord.cx,
                coord.cz
            );
            return 0;
        }
        let edge_len = buf.world_size();
        self.surfaces.insert(coord, surface);

        let mut linked = 0usize;
        for neighbor in coord.neighbors4() {
            let Some(other) = self.surfaces.get(&neighbor) else {
                continue;
            };
            let own = &self.surfaces[&coord];
            let (Some(a_point), Some(b_point)) =
                (own.anchor_toward(neighbor), other.anchor_toward(coord))
            else {
                continue;
            };
            self.connections.insert(
                pair_key(coord, neighbor),
                NavConnection {
                    a: coord,
                    b: neighbor,
                    a_point,
                    b_point,
                    width: edge_len,
                },
            );
            linked += 1;
        }
        log::debug!(
            "nav chunk ({}, {}) registered, {} link(s)",
            coord.cx,
            coord.cz,
            linked
        );
        linked
    }

    /// Removes a chunk and every connection with an endpoint in it.
    /// Returns the number of connections dropped.
    pub fn remove_chunk(&mut self, coord: ChunkCoord) -> usize {
        self.surfaces.remove(&coord);
        let before = self.connections.len();
        self.connections
            .retain(|_, c| c.a != coord && c.b != coord);
        before - self.connections.len()
    }

    #[inline]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.surfaces.contains_key(&coord)
    }

    pub fn surface(&self, coord: ChunkCoord) -> Option<&NavSurface> {
        self.surfaces.get(&coord)
    }

    /// Connection between two chunks in either argument order.
    pub fn connection(&self, a: ChunkCoord, b: ChunkCoord) -> Option<&NavConnection> {
        self.connections.get(&pair_key(a, b))
    }

    pub fn connections_of(&self, coord: ChunkCoord) -> impl Iterator<Item = &NavConnection> {
        self.connections
            .values()
            .filter(move |c| c.a == coord || c.b == coord)
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.surfaces.len()
    }

    #[inline]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
