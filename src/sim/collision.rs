//! Collision detection against static world geometry
//!
//! The simulation only sees the [`SpatialIndex`] contract: "does this sphere
//! touch the world, and if so which way and how far do I push it out?".
//! Hosts plug in whatever acceleration structure they load their scene into.
//! The brute-force indices here cover headless play and tests.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::closest_point_on_segment;

/// A sphere in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Unit surface normal at contact (pointing out of the solid side)
    pub normal: Vec3,
    /// Penetration depth along `normal`
    pub depth: f32,
}

/// Static geometry that can be queried with a sphere
///
/// Implementations must answer `None` when they hold no geometry.
pub trait SpatialIndex {
    fn intersect(&self, sphere: &Sphere) -> Option<CollisionResult>;
}

impl<S: SpatialIndex + ?Sized> SpatialIndex for &S {
    fn intersect(&self, sphere: &Sphere) -> Option<CollisionResult> {
        (**self).intersect(sphere)
    }
}

impl<S: SpatialIndex + ?Sized> SpatialIndex for Box<S> {
    fn intersect(&self, sphere: &Sphere) -> Option<CollisionResult> {
        (**self).intersect(sphere)
    }
}

/// `None` is a world whose geometry has not finished loading
impl<S: SpatialIndex> SpatialIndex for Option<S> {
    fn intersect(&self, sphere: &Sphere) -> Option<CollisionResult> {
        self.as_ref().and_then(|index| index.intersect(sphere))
    }
}

/// A world with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWorld;

impl SpatialIndex for EmptyWorld {
    fn intersect(&self, _sphere: &Sphere) -> Option<CollisionResult> {
        None
    }
}

/// Infinite horizontal floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPlane {
    pub height: f32,
}

impl SpatialIndex for GroundPlane {
    fn intersect(&self, sphere: &Sphere) -> Option<CollisionResult> {
        let bottom = sphere.center.y - sphere.radius;
        if bottom < self.height {
            Some(CollisionResult {
                normal: Vec3::Y,
                depth: self.height - bottom,
            })
        } else {
            None
        }
    }
}

/// A single world triangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Face normal from winding order (zero for degenerate triangles)
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    /// Whether the projection of `p` onto the triangle plane lies inside it
    fn contains_projection(&self, p: Vec3) -> bool {
        let v0 = self.c - self.a;
        let v1 = self.b - self.a;
        let v2 = p - self.a;

        let dot00 = v0.dot(v0);
        let dot01 = v0.dot(v1);
        let dot02 = v0.dot(v2);
        let dot11 = v1.dot(v1);
        let dot12 = v1.dot(v2);

        let denom = dot00 * dot11 - dot01 * dot01;
        if denom.abs() < 1e-12 {
            return false;
        }
        let inv = 1.0 / denom;
        let u = (dot11 * dot02 - dot01 * dot12) * inv;
        let v = (dot00 * dot12 - dot01 * dot02) * inv;
        u >= 0.0 && v >= 0.0 && u + v <= 1.0
    }

    /// Sphere-vs-triangle contact
    ///
    /// Face contacts always push along the winding normal, so the back of a
    /// face counts as solid and a ball that sinks past the plane within one
    /// substep is pushed back to the front. Edge and corner contacts push
    /// away from the closest edge point.
    pub fn intersect(&self, sphere: &Sphere) -> Option<CollisionResult> {
        let n = self.normal();
        if n == Vec3::ZERO {
            return None;
        }

        let dist = (sphere.center - self.a).dot(n);
        if dist.abs() >= sphere.radius {
            return None;
        }

        if self.contains_projection(sphere.center) {
            return Some(CollisionResult {
                normal: n,
                depth: sphere.radius - dist,
            });
        }

        let r2 = sphere.radius * sphere.radius;
        for (start, end) in [(self.a, self.b), (self.b, self.c), (self.c, self.a)] {
            let closest = closest_point_on_segment(sphere.center, start, end);
            let offset = sphere.center - closest;
            let d2 = offset.length_squared();
            if d2 < r2 {
                let Some(normal) = offset.try_normalize() else {
                    continue;
                };
                return Some(CollisionResult {
                    normal,
                    depth: sphere.radius - d2.sqrt(),
                });
            }
        }

        None
    }
}

/// Brute-force triangle soup
///
/// Every triangle is tested in insertion order. Each contact pushes a scratch
/// copy of the sphere out of that triangle before the next is tested; the
/// total displacement is reported as a single normal and depth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriangleWorld {
    triangles: Vec<Triangle>,
}

impl TriangleWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Add a quad `a b c d` (counter-clockwise) as two triangles
    pub fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        self.triangles.push(Triangle::new(a, b, c));
        self.triangles.push(Triangle::new(a, c, d));
    }

    /// Add a horizontal square centered on `center`
    pub fn add_floor(&mut self, center: Vec3, half_extent: f32) {
        let h = half_extent;
        self.add_quad(
            center + Vec3::new(-h, 0.0, h),
            center + Vec3::new(h, 0.0, h),
            center + Vec3::new(h, 0.0, -h),
            center + Vec3::new(-h, 0.0, -h),
        );
    }

    /// Add an axis-aligned box, optionally without its top face (a bucket)
    pub fn add_box(&mut self, min: Vec3, max: Vec3, open_top: bool) {
        let corner = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);

        // Bottom (-Y)
        self.add_quad(corner(x0, y0, z0), corner(x1, y0, z0), corner(x1, y0, z1), corner(x0, y0, z1));
        if !open_top {
            // Top (+Y)
            self.add_quad(corner(x0, y1, z1), corner(x1, y1, z1), corner(x1, y1, z0), corner(x0, y1, z0));
        }
        // Front (+Z)
        self.add_quad(corner(x0, y0, z1), corner(x1, y0, z1), corner(x1, y1, z1), corner(x0, y1, z1));
        // Back (-Z)
        self.add_quad(corner(x1, y0, z0), corner(x0, y0, z0), corner(x0, y1, z0), corner(x1, y1, z0));
        // Right (+X)
        self.add_quad(corner(x1, y0, z1), corner(x1, y0, z0), corner(x1, y1, z0), corner(x1, y1, z1));
        // Left (-X)
        self.add_quad(corner(x0, y0, z0), corner(x0, y0, z1), corner(x0, y1, z1), corner(x0, y1, z0));
    }
}

impl SpatialIndex for TriangleWorld {
    fn intersect(&self, sphere: &Sphere) -> Option<CollisionResult> {
        let mut moved = *sphere;
        let mut hit = false;

        for triangle in &self.triangles {
            if let Some(contact) = triangle.intersect(&moved) {
                moved.center += contact.normal * contact.depth;
                hit = true;
            }
        }

        if !hit {
            return None;
        }

        let push = moved.center - sphere.center;
        let normal = push.try_normalize()?;
        Some(CollisionResult {
            normal,
            depth: push.length(),
        })
    }
}
