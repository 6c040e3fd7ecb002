use crate::math::Vec3;

/// Axis-aligned bounding boxes
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, p: [f64; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Aabb3::new([first.x, first.y, first.z], [first.x, first.y, first.z]);
        for p in iter {
            b.expand(p);
        }
        Some(b)
    }

    pub fn expand(&mut self, p: Vec3) {
        let a = [p.x, p.y, p.z];
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(a[axis]);
            self.max[axis] = self.max[axis].max(a[axis]);
        }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        let o = [offset.x, offset.y, offset.z];
        Aabb3::new(
            [self.min[0] + o[0], self.min[1] + o[1], self.min[2] + o[2]],
            [self.max[0] + o[0], self.max[1] + o[1], self.max[2] + o[2]],
        )
    }

    /// Slab test; returns the entry distance along `dir` clamped to `t_min`.
    pub fn ray_hit_t(&self, origin: Vec3, dir: Vec3, mut t_min: f64, mut t_max: f64) -> Option<f64> {
        let o = [origin.x, origin.y, origin.z];
        let d = [dir.x, dir.y, dir.z];
        for axis in 0..3 {
            if d[axis].abs() < 1e-12 {
                if o[axis] < self.min[axis] || o[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d[axis];
            let mut t1 = (self.min[axis] - o[axis]) * inv;
            let mut t2 = (self.max[axis] - o[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_max < t_min {
                return None;
            }
        }

        Some(t_min)
    }
}
