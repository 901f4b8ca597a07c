use atrium_3d::Aabb;
use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

/// Slab-method ray-AABB intersection, returns the entry distance or None.
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = Vec3::new(
        if ray_direction.x != 0.0 { 1.0 / ray_direction.x } else { f32::INFINITY },
        if ray_direction.y != 0.0 { 1.0 / ray_direction.y } else { f32::INFINITY },
        if ray_direction.z != 0.0 { 1.0 / ray_direction.z } else { f32::INFINITY },
    );

    let (mut tmin, mut tmax) = ((min.x - ray_origin.x) * inv.x, (max.x - ray_origin.x) * inv.x);
    if tmin > tmax {
        std::mem::swap(&mut tmin, &mut tmax);
    }

    let (mut tymin, mut tymax) = ((min.y - ray_origin.y) * inv.y, (max.y - ray_origin.y) * inv.y);
    if tymin > tymax {
        std::mem::swap(&mut tymin, &mut tymax);
    }

    if (tmin > tymax) || (tymin > tmax) {
        return None;
    }
    if tymin > tmin {
        tmin = tymin;
    }
    if tymax < tmax {
        tmax = tymax;
    }

    let (mut tzmin, mut tzmax) = ((min.z - ray_origin.z) * inv.z, (max.z - ray_origin.z) * inv.z);
    if tzmin > tzmax {
        std::mem::swap(&mut tzmin, &mut tzmax);
    }

    if (tmin > tzmax) || (tzmin > tmax) {
        return None;
    }
    if tzmin > tmin {
        tmin = tzmin;
    }
    if tzmax < tmax {
        tmax = tzmax;
    }

    if tmax < 0.0 {
        return None;
    }
    Some(if tmin >= 0.0 { tmin } else { tmax })
}

/// Intersects a world-space ray with a local-space box under `xform`.
/// Returns the world-space distance along the ray so hits against
/// differently scaled houses compare correctly.
pub fn ray_box_hit(ray: Ray, xform: Mat4, bounds: Aabb) -> Option<f32> {
    if bounds.is_empty() {
        return None;
    }
    let inv = xform.inverse();
    let o_local = inv.transform_point3(ray.origin);
    let d_local = inv.transform_vector3(ray.dir);
    let t_local = ray_aabb_hit_t(o_local, d_local, bounds.min, bounds.max)?;
    let hit_world = xform.transform_point3(o_local + d_local * t_local);
    Some(hit_world.distance(ray.origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_BOX: (Vec3, Vec3) = (Vec3::splat(-1.0), Vec3::splat(1.0));

    #[test]
    fn ray_through_box_hits_near_face() {
        let t = ray_aabb_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, UNIT_BOX.0, UNIT_BOX.1);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn ray_past_box_misses() {
        let t = ray_aabb_hit_t(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z, UNIT_BOX.0, UNIT_BOX.1);
        assert_eq!(t, None);
    }

    #[test]
    fn box_behind_origin_misses() {
        let t = ray_aabb_hit_t(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z, UNIT_BOX.0, UNIT_BOX.1);
        assert_eq!(t, None);
    }

    #[test]
    fn origin_inside_box_hits_exit_face() {
        let t = ray_aabb_hit_t(Vec3::ZERO, Vec3::NEG_Z, UNIT_BOX.0, UNIT_BOX.1);
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn axis_parallel_ray_respects_slab_bounds() {
        // Travels along +X at y=0.5, z=0.5: inside both slabs, must hit.
        let t = ray_aabb_hit_t(Vec3::new(-4.0, 0.5, 0.5), Vec3::X, UNIT_BOX.0, UNIT_BOX.1);
        assert_eq!(t, Some(3.0));
        // Same ray shifted above the box: parallel to the y-slab, must miss.
        let t = ray_aabb_hit_t(Vec3::new(-4.0, 2.0, 0.5), Vec3::X, UNIT_BOX.0, UNIT_BOX.1);
        assert_eq!(t, None);
    }

    #[test]
    fn scaled_box_reports_world_distance() {
        let bounds = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        // Quarter-scale box at the origin: faces sit at +/-0.25.
        let xform = Mat4::from_scale(Vec3::splat(0.25));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z);
        let t = ray_box_hit(ray, xform, bounds).unwrap();
        assert!((t - 1.75).abs() < 1e-5);
    }

    #[test]
    fn translated_box_is_hit_in_world_space() {
        let bounds = Aabb {
            min: Vec3::ZERO,
            max: Vec3::new(2.0, 2.0, 2.0),
        };
        let xform = Mat4::from_translation(Vec3::new(10.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::new(11.0, 1.0, 5.0), Vec3::NEG_Z);
        let t = ray_box_hit(ray, xform, bounds).unwrap();
        assert!((t - 8.0).abs() < 1e-5);
    }
}
