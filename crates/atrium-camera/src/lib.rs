use glam::{Mat4, Vec3};
use wgpu::{Buffer, Queue};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::KeyCode;

pub const FOV_Y_RADIANS: f32 = 45.0 * std::f32::consts::PI / 180.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 500.0;

pub fn forward_from_yaw_pitch(yaw: f32, pitch: f32) -> Vec3 {
    let cp = pitch.cos();
    let sp = pitch.sin();
    let cy = yaw.cos();
    let sy = yaw.sin();
    Vec3::new(cy * cp, sp, -sy * cp)
}

/// First-person camera walking the house row. Yaw `PI/2` faces -Z.
pub struct WalkCamera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl WalkCamera {
    pub fn new(eye: Vec3, yaw: f32, pitch: f32) -> Self {
        Self { eye, yaw, pitch }
    }

    pub fn view(&self) -> Mat4 {
        let forward = forward_from_yaw_pitch(self.yaw, self.pitch);
        Mat4::look_at_rh(self.eye, self.eye + forward, Vec3::Y)
    }
}

pub fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(FOV_Y_RADIANS, aspect, Z_NEAR, Z_FAR)
}

/// One discrete camera adjustment. Translation runs along world axes, not
/// the view direction, so strafing stays aligned with the house row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStep {
    Left,
    Right,
    Forward,
    Back,
    TurnLeft,
    TurnRight,
}

pub struct CameraController {
    move_step: f32,
    turn_step: f32,
}

impl CameraController {
    pub fn new(move_step: f32, turn_step: f32) -> Self {
        Self {
            move_step,
            turn_step,
        }
    }

    pub fn apply(&self, cam: &mut WalkCamera, step: CameraStep) {
        match step {
            CameraStep::Left => cam.eye.x -= self.move_step,
            CameraStep::Right => cam.eye.x += self.move_step,
            CameraStep::Forward => cam.eye.z -= self.move_step,
            CameraStep::Back => cam.eye.z += self.move_step,
            CameraStep::TurnLeft => cam.yaw += self.turn_step,
            CameraStep::TurnRight => cam.yaw -= self.turn_step,
        }
    }

    pub fn handle_window_event(&self, event: &WindowEvent, cam: &mut WalkCamera) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if *repeat || *state != ElementState::Pressed {
                    return;
                }
                let step = match code {
                    KeyCode::ArrowLeft => CameraStep::Left,
                    KeyCode::ArrowRight => CameraStep::Right,
                    KeyCode::ArrowUp => CameraStep::Forward,
                    KeyCode::ArrowDown => CameraStep::Back,
                    KeyCode::KeyA => CameraStep::TurnLeft,
                    KeyCode::KeyD => CameraStep::TurnRight,
                    _ => return,
                };
                self.apply(cam, step);
            }
            _ => {}
        }
    }
}

pub fn update_camera_buffer(
    queue: &Queue,
    camera_buf: &Buffer,
    camera: &WalkCamera,
    width: u32,
    height: u32,
) {
    let aspect = (width.max(1) as f32) / (height.max(1) as f32);
    let vp = (projection(aspect) * camera.view()).to_cols_array();
    queue.write_buffer(camera_buf, 0, bytemuck::cast_slice(&vp));
}

/// World-space ray from the camera eye through a cursor position given in
/// normalized device coordinates (x right, y up, both in [-1, 1]).
pub fn cursor_ray(camera: &WalkCamera, width: u32, height: u32, ndc_x: f32, ndc_y: f32) -> (Vec3, Vec3) {
    let aspect = (width.max(1) as f32) / (height.max(1) as f32);
    let inv_vp = (projection(aspect) * camera.view()).inverse();
    let far = inv_vp.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
    let dir = (far - camera.eye).normalize();
    (camera.eye, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn facing_row() -> WalkCamera {
        WalkCamera::new(Vec3::new(0.0, 2.0, 0.0), FRAC_PI_2, 0.0)
    }

    #[test]
    fn yaw_half_pi_faces_negative_z() {
        let fwd = forward_from_yaw_pitch(FRAC_PI_2, 0.0);
        assert!(fwd.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn translation_steps_run_along_world_axes() {
        let ctl = CameraController::new(1.0, 0.25);
        let mut cam = facing_row();
        // Turning must not change what the arrow keys do.
        ctl.apply(&mut cam, CameraStep::TurnLeft);
        ctl.apply(&mut cam, CameraStep::Forward);
        ctl.apply(&mut cam, CameraStep::Right);
        assert_eq!(cam.eye, Vec3::new(1.0, 2.0, -1.0));
    }

    #[test]
    fn turn_steps_accumulate() {
        let turn = 15.0_f32.to_radians();
        let ctl = CameraController::new(1.0, turn);
        let mut cam = facing_row();
        ctl.apply(&mut cam, CameraStep::TurnLeft);
        ctl.apply(&mut cam, CameraStep::TurnLeft);
        ctl.apply(&mut cam, CameraStep::TurnRight);
        assert!((cam.yaw - (FRAC_PI_2 + turn)).abs() < 1e-6);
    }

    #[test]
    fn center_cursor_ray_follows_view_direction() {
        let cam = facing_row();
        let (origin, dir) = cursor_ray(&cam, 800, 600, 0.0, 0.0);
        assert_eq!(origin, cam.eye);
        assert!(dir.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-4));
    }

    #[test]
    fn cursor_right_of_center_tilts_ray_right() {
        let cam = facing_row();
        let (_, dir) = cursor_ray(&cam, 800, 600, 0.5, 0.0);
        assert!(dir.x > 0.0);
        assert!(dir.z < 0.0);
    }
}
