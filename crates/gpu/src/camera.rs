use foundation::math::{Vec2, Vec3};
use scene::picking::Ray;

pub type Mat4 = [[f32; 4]; 4];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        if self.height <= 0.0 {
            1.0
        } else {
            (self.width / self.height).max(1e-6)
        }
    }

    /// Pixel (origin top-left, y down) → normalized device coords in [-1, 1].
    pub fn to_ndc(&self, px: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            px.x / self.width * 2.0 - 1.0,
            1.0 - px.y / self.height * 2.0,
        ))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera3D {
    pub fn look_at(position: Vec3, target: Vec3, fov_y_rad: f64, near: f64, far: f64) -> Self {
        Self {
            position,
            target,
            fov_y_rad,
            near,
            far,
        }
    }

    fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = (self.target - self.position).normalized()?;
        let right = forward.cross(Vec3::UP).normalized()?;
        let up = right.cross(forward);
        Some((forward, right, up))
    }

    /// World-space ray through a pixel. `None` for a degenerate viewport or a
    /// camera looking straight along the up axis.
    pub fn screen_ray(&self, px: Vec2, viewport: Viewport) -> Option<Ray> {
        let ndc = viewport.to_ndc(px)?;
        let (forward, right, up) = self.basis()?;
        let tan_half = (0.5 * self.fov_y_rad).tan();
        let dir = forward
            + right * (ndc.x * tan_half * viewport.aspect())
            + up * (ndc.y * tan_half);
        Some(Ray::new(self.position, dir.normalized()?))
    }

    pub fn view_proj(&self, viewport: Viewport) -> Mat4 {
        let view = mat4_look_at_rh(self.position, self.target, Vec3::UP);
        let proj = mat4_perspective_rh_z0(self.fov_y_rad, viewport.aspect(), self.near, self.far);
        mat4_mul(proj, view)
    }
}

/// Orbit controls: the eye sits on a sphere around `target`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw_rad: f64,
    pub pitch_rad: f64,
    pub distance: f64,
    pub target: Vec3,
    pub fov_y_rad: f64,
}

pub const ORBIT_SPEED: f64 = 0.005;
pub const PITCH_LIMIT_RAD: f64 = 1.55;
pub const MIN_DISTANCE: f64 = 0.25;
pub const MAX_DISTANCE: f64 = 5000.0;

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw_rad: 0.6,
            pitch_rad: 0.6,
            distance: 50.0,
            target: Vec3::ZERO,
            fov_y_rad: 75f64.to_radians(),
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let dir = Vec3::new(
            self.pitch_rad.cos() * self.yaw_rad.cos(),
            self.pitch_rad.sin(),
            self.pitch_rad.cos() * self.yaw_rad.sin(),
        );
        self.target + dir * self.distance
    }

    pub fn camera(&self) -> Camera3D {
        let far = (self.distance * 20.0).max(1000.0);
        Camera3D::look_at(self.eye(), self.target, self.fov_y_rad, 0.1, far)
    }

    /// Pointer delta in pixels.
    pub fn orbit(&mut self, delta_x_px: f64, delta_y_px: f64) {
        self.yaw_rad += delta_x_px * ORBIT_SPEED;
        self.pitch_rad =
            (self.pitch_rad + delta_y_px * ORBIT_SPEED).clamp(-PITCH_LIMIT_RAD, PITCH_LIMIT_RAD);
    }

    /// Pointer delta in pixels; moves the target in the camera plane.
    pub fn pan(&mut self, delta_x_px: f64, delta_y_px: f64) {
        let forward = (self.target - self.eye()).normalized().unwrap_or(Vec3::UP);
        let Some(right) = forward.cross(Vec3::UP).normalized() else {
            return;
        };
        let real_up = right.cross(forward);
        let pan_scale = self.distance * 0.002;
        self.target += right * (-delta_x_px * pan_scale) + real_up * (delta_y_px * pan_scale);
    }

    /// Wheel delta; exponential dolly.
    pub fn zoom(&mut self, wheel_delta_y: f64) {
        let factor = (wheel_delta_y * 0.0015).exp();
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Aim at `center` from far enough away to see an object of `extent`.
    pub fn frame(&mut self, center: Vec3, extent: f64) {
        self.target = center;
        self.distance = (extent * 1.5).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    // Column-major matrix multiply: c = a * b
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    // Column-major, RH, depth range [0, 1].
    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalized().unwrap_or(Vec3::new(0.0, 0.0, -1.0));
    let s = f.cross(up).normalized().unwrap_or(Vec3::new(1.0, 0.0, 0.0));
    let u = s.cross(f);

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, -f.x as f32, 0.0],
        [s.y as f32, u.y as f32, -f.y as f32, 0.0],
        [s.z as f32, u.z as f32, -f.z as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}
