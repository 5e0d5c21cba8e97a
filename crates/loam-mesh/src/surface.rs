use loam_chunk::ChunkBuf;
use loam_geom::Vec3;

use crate::mesh_build::MeshBuild;

/// Extracts the walkable surface of a chunk as one vertex per column.
///
/// Each column scans the density grid top-down for the highest solid sample
/// and places its vertex at that sample's height. This is a heightmap
/// triangulation, not an isosurface: density carved hollow strictly below
/// the surface never shows up in the output.
pub fn build_chunk_mesh(buf: &ChunkBuf) -> MeshBuild {
    let dim = buf.dim();
    debug_assert!(
        dim * dim <= usize::from(u16::MAX) + 1,
        "vertex grid exceeds u16 index range"
    );
    let (ox, oz) = buf.origin_world();
    let mut mesh = MeshBuild::default();
    mesh.reserve_grid(dim);

    for lz in 0..dim {
        for lx in 0..dim {
            let mut top = 0.0f32;
            for ly in (0..dim).rev() {
                if buf.is_solid(lx, ly, lz) {
                    top = ly as f32 * buf.voxel_size;
                    break;
                }
            }
            let p = Vec3::new(
                ox + lx as f32 * buf.voxel_size,
                top,
                oz + lz as f32 * buf.voxel_size,
            );
            mesh.push_vertex(p, lx as f32 / buf.n as f32, lz as f32 / buf.n as f32);
        }
    }

    // Two triangles per cell, wound counter-clockwise seen from above so
    // normals come out facing up.
    for lz in 0..buf.n {
        for lx in 0..buf.n {
            let i00 = (lz * dim + lx) as u16;
            let i10 = i00 + 1;
            let i01 = ((lz + 1) * dim + lx) as u16;
            let i11 = i01 + 1;
            mesh.push_triangle(i00, i01, i11);
            mesh.push_triangle(i00, i11, i10);
        }
    }

    mesh.finalize_normals();
    log::trace!(
        "meshed chunk ({}, {}): {} vertices, {} triangles",
        buf.coord.cx,
        buf.coord.cz,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_world::ChunkCoord;

    // Hand-built buffer: constant surface height over an n=4 chunk.
    fn flat_buf(height: f32) -> ChunkBuf {
        let n = 4usize;
        let dim = n + 1;
        let heights = vec![height; dim * dim];
        let mut density = vec![0.0f32; dim * dim * dim];
        for ly in 0..dim {
            let wy = ly as f32;
            for lz in 0..dim {
                for lx in 0..dim {
                    density[(ly * dim + lz) * dim + lx] = height - wy;
                }
            }
        }
        let mut occupied = vec![false; n * n * n];
        for ly in 0..n {
            for lz in 0..n {
                for lx in 0..n {
                    occupied[(ly * n + lz) * n + lx] =
                        density[(ly * dim + lz) * dim + lx] > 0.0;
                }
            }
        }
        ChunkBuf {
            coord: ChunkCoord::new(0, 0),
            n,
            voxel_size: 1.0,
            heights,
            density,
            occupied,
        }
    }

    #[test]
    fn flat_chunk_meshes_to_grid() {
        let buf = flat_buf(2.5);
        let mesh = build_chunk_mesh(&buf);
        let dim = buf.dim();
        assert_eq!(mesh.vertex_count(), dim * dim);
        assert_eq!(mesh.triangle_count(), buf.n * buf.n * 2);
        // Highest solid sample sits at y = 2, below the continuous height.
        for i in 0..mesh.vertex_count() {
            assert_eq!(mesh.vertex(i).y, 2.0);
        }
    }

    #[test]
    fn flat_chunk_normals_point_up() {
        let mesh = build_chunk_mesh(&flat_buf(3.0));
        for i in 0..mesh.vertex_count() {
            let n = mesh.normal(i);
            assert!((n.y - 1.0).abs() < 1e-5);
            assert!(n.x.abs() < 1e-5 && n.z.abs() < 1e-5);
        }
    }

    #[test]
    fn uvs_span_unit_square() {
        let mesh = build_chunk_mesh(&flat_buf(1.5));
        let uv_first = (mesh.uv[0], mesh.uv[1]);
        let last = mesh.vertex_count() - 1;
        let uv_last = (mesh.uv[last * 2], mesh.uv[last * 2 + 1]);
        assert_eq!(uv_first, (0.0, 0.0));
        assert_eq!(uv_last, (1.0, 1.0));
    }

    #[test]
    fn carved_pocket_below_surface_is_invisible() {
        let mut buf = flat_buf(3.5);
        let plain = build_chunk_mesh(&buf);
        // Hollow out an interior sample below the top solid layer.
        let i = buf.didx(2, 1, 2);
        buf.density[i] = -1.0;
        let carved = build_chunk_mesh(&buf);
        assert_eq!(plain, carved);
    }

    #[test]
    fn carved_top_sample_lowers_column() {
        let mut buf = flat_buf(3.5);
        // Hollow the top solid sample of one column; the scan should fall
        // through to the next solid sample below it.
        let i = buf.didx(1, 3, 1);
        buf.density[i] = -1.0;
        let mesh = build_chunk_mesh(&buf);
        let v = mesh.vertex(1 * buf.dim() + 1);
        assert_eq!(v.y, 2.0);
    }

    #[test]
    fn empty_chunk_meshes_flat_at_zero() {
        let buf = flat_buf(-1.0);
        let mesh = build_chunk_mesh(&buf);
        assert_eq!(mesh.vertex_count(), buf.dim() * buf.dim());
        for i in 0..mesh.vertex_count() {
            assert_eq!(mesh.vertex(i).y, 0.0);
        }
    }

    #[test]
    fn mesh_positions_are_world_space() {
        let n = 4usize;
        let dim = n + 1;
        let mut buf = flat_buf(2.5);
        buf.coord = ChunkCoord::new(3, -2);
        let mesh = build_chunk_mesh(&buf);
        let (ox, oz) = buf.origin_world();
        let v = mesh.vertex(0);
        assert_eq!((v.x, v.z), (ox, oz));
        let v_last = mesh.vertex(dim * dim - 1);
        assert_eq!((v_last.x, v_last.z), (ox + n as f32, oz + n as f32));
    }
}
