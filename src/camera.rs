use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

pub const FOV_Y_DEGREES: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

/// Camera position inside the rig plus the rig's XYZ Euler rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl CameraPose {
    pub const fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::new(0.1, 0.1, 0.1), Vec3::ZERO)
    }
}

/// A perspective camera parented to a rotating rig group.
///
/// The rig rotates the camera's local position around the origin; the view
/// orientation is recomputed every tick by [`CameraRig::look_at`].
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub pose: CameraPose,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    view: Mat4,
}

impl CameraRig {
    pub fn new(aspect: f32) -> Self {
        let mut rig = Self {
            pose: CameraPose::default(),
            fov_y_deg: FOV_Y_DEGREES,
            near: NEAR,
            far: FAR,
            aspect: sanitize_aspect(aspect),
            view: Mat4::IDENTITY,
        };
        rig.look_at(Vec3::ZERO);
        rig
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    pub fn set_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
    }

    pub fn rig_rotation(&self) -> Quat {
        let r = self.pose.rotation;
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)
    }

    pub fn world_position(&self) -> Vec3 {
        self.rig_rotation() * self.pose.position
    }

    /// Orient the view from the camera's world position toward `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let eye = self.world_position();
        let forward = target - eye;
        if forward.length_squared() < 1e-12 {
            return;
        }
        let mut up = Vec3::Y;
        if forward.normalize().cross(up).length_squared() < 1e-10 {
            up = Vec3::Z;
        }
        self.view = Mat4::look_at_rh(eye, target, up);
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> ViewProjection {
        ViewProjection {
            view: self.view,
            projection: self.projection(),
            near: self.near,
            far: self.far,
        }
    }
}

/// Snapshot of the matrices needed to project points for one tick.
#[derive(Debug, Clone, Copy)]
pub struct ViewProjection {
    pub view: Mat4,
    pub projection: Mat4,
    pub near: f32,
    pub far: f32,
}

/// A point projected to normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub ndc_x: f32,
    pub ndc_y: f32,
    /// Distance in front of the camera along the view axis.
    pub depth: f32,
}

impl ViewProjection {
    pub fn project(&self, p: Vec3) -> Option<Projected> {
        let v = self.view * Vec4::new(p.x, p.y, p.z, 1.0);
        let depth = -v.z;
        if depth < self.near || depth > self.far {
            return None;
        }
        let clip = self.projection * v;
        if clip.w <= 0.0 {
            return None;
        }
        Some(Projected {
            ndc_x: clip.x / clip.w,
            ndc_y: clip.y / clip.w,
            depth,
        })
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn rig_rotation_moves_camera_around_y() {
        let mut rig = CameraRig::new(1.0);
        rig.set_pose(CameraPose::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, PI, 0.0)));
        let p = rig.world_position();
        assert!((p.x + 2.0).abs() < 1e-5, "{p:?}");
        assert!(p.z.abs() < 1e-5);
    }

    #[test]
    fn look_at_puts_origin_at_screen_center() {
        let mut rig = CameraRig::new(1.6);
        rig.set_pose(CameraPose::new(Vec3::new(10.0, 10.0, 10.0), Vec3::ZERO));
        rig.look_at(Vec3::ZERO);
        let hit = rig.view_projection().project(Vec3::ZERO).expect("origin visible");
        assert!(hit.ndc_x.abs() < 1e-5 && hit.ndc_y.abs() < 1e-5);
        assert!((hit.depth - 300f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn look_at_straight_down_stays_finite() {
        let mut rig = CameraRig::new(1.0);
        rig.set_pose(CameraPose::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO));
        rig.look_at(Vec3::ZERO);
        assert!(rig.view().is_finite());
        assert!(rig.view_projection().project(Vec3::ZERO).is_some());
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let mut rig = CameraRig::new(1.0);
        rig.set_pose(CameraPose::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO));
        rig.look_at(Vec3::ZERO);
        assert!(rig.view_projection().project(Vec3::new(0.0, 0.0, 10.0)).is_none());
    }
}
