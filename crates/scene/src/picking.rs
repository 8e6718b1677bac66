use glam::Vec3;

/// A half-line used for click picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray; `direction` is normalised. Returns `None` for a zero or
    /// non-finite direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first hit with `aabb`, using the slab
    /// method. A ray starting inside the box hits at `t = 0`.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        let inv = self.direction.recip();
        let t1 = (aabb.min - self.origin) * inv;
        let t2 = (aabb.max - self.origin) * inv;

        // NaN from 0 * inf (origin on a slab plane, parallel ray) is ignored
        // by min/max, which keep the other operand.
        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();

        if t_far < 0.0 || t_near > t_far {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_center_size(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn ray_hits_box_in_front() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z).expect("ray");
        let t = ray.intersect_aabb(&unit_box()).expect("hit");
        assert!((t - 4.5).abs() < 1e-6);
        assert!((ray.at(t).z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn ray_misses_box_to_the_side() {
        let ray = Ray::new(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z).expect("ray");
        assert_eq!(ray.intersect_aabb(&unit_box()), None);
    }

    #[test]
    fn box_behind_ray_is_missed() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).expect("ray");
        assert_eq!(ray.intersect_aabb(&unit_box()), None);
    }

    #[test]
    fn ray_from_inside_hits_at_zero() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X).expect("ray");
        assert_eq!(ray.intersect_aabb(&unit_box()), Some(0.0));
    }

    #[test]
    fn diagonal_ray_from_camera_pose_hits_origin_box() {
        let eye = Vec3::new(5.0, 5.0, 5.0);
        let ray = Ray::new(eye, -eye).expect("ray");
        assert!(ray.intersect_aabb(&unit_box()).is_some());
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn aabb_geometry() {
        let b = Aabb::from_center_size(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(2.0));
        assert_eq!(b.center(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(b.size(), Vec3::splat(2.0));
        assert!(b.contains(Vec3::new(2.0, 1.0, -1.0)));
        assert!(!b.contains(Vec3::new(2.1, 0.0, 0.0)));
    }
}
