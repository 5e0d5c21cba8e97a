use loam_geom::{Aabb, Vec3, lerp};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_constants() {
    assert!(vec3_approx_eq(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(Vec3::UP, Vec3::new(0.0, 1.0, 0.0), 1e-6));
}

#[test]
fn vec3_add_sub() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c, Vec3::new(-3.0, 7.0, -3.0), 1e-6));

    let d = c - a;
    assert!(vec3_approx_eq(d, b, 1e-6));
}

#[test]
fn vec3_dot_length_normalized() {
    let v = Vec3::new(3.0, 4.0, 0.0);
    assert!(approx_eq(v.dot(v), 25.0, 1e-6));
    assert!(approx_eq(v.length(), 5.0, 1e-6));

    let n = v.normalized();
    assert!(approx_eq(n.length(), 1.0, 1e-6));
    assert!(vec3_approx_eq(n, Vec3::new(0.6, 0.8, 0.0), 1e-6));

    // Zero vector normalization should be a no-op (not NaN, unchanged)
    let zn = Vec3::ZERO.normalized();
    assert!(vec3_approx_eq(zn, Vec3::ZERO, 1e-6));
}

#[test]
fn vec3_distance_and_lerp() {
    let a = Vec3::new(1.0, 0.0, 0.0);
    let b = Vec3::new(4.0, 4.0, 0.0);
    assert!(approx_eq(a.distance(b), 5.0, 1e-6));
    assert!(vec3_approx_eq(a.lerp(b, 0.5), Vec3::new(2.5, 2.0, 0.0), 1e-6));
}

#[test]
fn scalar_lerp_endpoints() {
    assert!(approx_eq(lerp(2.0, 6.0, 0.0), 2.0, 1e-6));
    assert!(approx_eq(lerp(2.0, 6.0, 1.0), 6.0, 1e-6));
    assert!(approx_eq(lerp(2.0, 6.0, 0.25), 3.0, 1e-6));
}

#[test]
fn aabb_from_points_and_extend() {
    let pts = [
        Vec3::new(1.0, 2.0, 3.0),
        Vec3::new(-1.0, 5.0, 0.0),
        Vec3::new(0.0, -2.0, 7.0),
    ];
    let aabb = Aabb::from_points(pts).unwrap();
    assert!(vec3_approx_eq(aabb.min, Vec3::new(-1.0, -2.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(aabb.max, Vec3::new(1.0, 5.0, 7.0), 1e-6));

    let mut grown = aabb;
    grown.extend(Vec3::new(10.0, 0.0, -4.0));
    assert!(vec3_approx_eq(grown.min, Vec3::new(-1.0, -2.0, -4.0), 1e-6));
    assert!(vec3_approx_eq(grown.max, Vec3::new(10.0, 5.0, 7.0), 1e-6));
}

#[test]
fn aabb_empty_point_set() {
    assert!(Aabb::from_points(std::iter::empty()).is_none());
}

#[test]
fn aabb_center_size() {
    let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 6.0));
    assert!(vec3_approx_eq(aabb.center(), Vec3::new(2.0, 1.0, 3.0), 1e-6));
    assert!(vec3_approx_eq(aabb.size(), Vec3::new(4.0, 2.0, 6.0), 1e-6));
}
