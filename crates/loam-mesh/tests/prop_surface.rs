use loam_chunk::generate_chunk_buffer;
use loam_mesh::build_chunk_mesh;
use loam_world::{ChunkCoord, World, WorldGenConfig};
use proptest::prelude::*;

fn small_world(seed: i32) -> World {
    let mut cfg = WorldGenConfig::default();
    cfg.chunk.size = 8;
    cfg.blend.radius = 2;
    World::new(seed, &cfg).unwrap()
}

proptest! {
    // meshing a generated chunk is deterministic
    #[test]
    fn mesh_deterministic(seed in 0i32..1000, cx in -8i32..=8, cz in -8i32..=8) {
        let w = small_world(seed);
        let coord = ChunkCoord::new(cx, cz);
        let a = build_chunk_mesh(&generate_chunk_buffer(&w, coord).buf);
        let b = build_chunk_mesh(&generate_chunk_buffer(&w, coord).buf);
        prop_assert_eq!(a, b);
    }

    // a heightmap mesh never produces downward or sideways-only normals
    #[test]
    fn normals_always_have_upward_component(cx in -8i32..=8, cz in -8i32..=8) {
        let w = small_world(23);
        let buf = generate_chunk_buffer(&w, ChunkCoord::new(cx, cz)).buf;
        let mesh = build_chunk_mesh(&buf);
        for i in 0..mesh.vertex_count() {
            let n = mesh.normal(i);
            prop_assert!((n.length() - 1.0).abs() < 1e-3, "normal not unit: {n:?}");
            prop_assert!(n.y > 0.0, "normal {n:?} not upward");
        }
    }

    // vertex heights stay within the terrain envelope
    #[test]
    fn vertex_heights_bounded(seed in 0i32..500, cx in -4i32..=4, cz in -4i32..=4) {
        let w = small_world(seed);
        let buf = generate_chunk_buffer(&w, ChunkCoord::new(cx, cz)).buf;
        let mesh = build_chunk_mesh(&buf);
        let max = w.max_terrain_height();
        for i in 0..mesh.vertex_count() {
            let y = mesh.vertex(i).y;
            prop_assert!(y >= 0.0 && y <= max + 1e-4);
        }
    }

    // index buffer only references existing vertices
    #[test]
    fn indices_in_range(cx in -4i32..=4, cz in -4i32..=4) {
        let w = small_world(5);
        let buf = generate_chunk_buffer(&w, ChunkCoord::new(cx, cz)).buf;
        let mesh = build_chunk_mesh(&buf);
        let verts = mesh.vertex_count();
        for &i in &mesh.idx {
            prop_assert!(usize::from(i) < verts);
        }
    }
}
