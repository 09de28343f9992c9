use anyhow::{Context, Result, anyhow};
use flatshade::Uniforms;
use glam::{Quat, Vec3};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::gpu::{Gpu, SurfaceErrorAction};
use crate::mesh::{Mesh, MeshBuffers};
use crate::pipeline::FlatPipeline;

const MOVE_STEP: f32 = 0.1;
const TURN_STEP: f32 = 0.1;

/// Control directive returned after handling an event or frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Control {
    Continue,
    Exit,
}

/// What a key press does to the camera.
#[derive(Debug, Copy, Clone, PartialEq)]
enum CameraAction {
    Move(Vec3),
    Turn(f32),
}

/// Frame outcome after `begin_frame` failed. Only a fatal surface error ends
/// the run, and it is reported as the run's failure.
fn surface_error_control(action: SurfaceErrorAction, err: &str) -> Result<Control> {
    match action {
        SurfaceErrorAction::Fatal => Err(anyhow!("surface cannot be recovered: {err}")),
        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(Control::Continue),
    }
}

fn camera_action(code: KeyCode) -> Option<CameraAction> {
    match code {
        KeyCode::KeyW => Some(CameraAction::Move(Vec3::new(0.0, 0.0, -MOVE_STEP))),
        KeyCode::KeyS => Some(CameraAction::Move(Vec3::new(0.0, 0.0, MOVE_STEP))),
        KeyCode::KeyA => Some(CameraAction::Move(Vec3::new(-MOVE_STEP, 0.0, 0.0))),
        KeyCode::KeyD => Some(CameraAction::Move(Vec3::new(MOVE_STEP, 0.0, 0.0))),
        KeyCode::KeyQ => Some(CameraAction::Turn(TURN_STEP)),
        KeyCode::KeyE => Some(CameraAction::Turn(-TURN_STEP)),
        _ => None,
    }
}

/// Entry point for the window loop.
pub struct Runtime;

impl Runtime {
    pub fn run(config: ViewerConfig, meshes: Vec<Mesh>) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, meshes);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Per-window GPU state created on `resumed`.
struct Scene {
    entry: WindowEntry,
    pipeline: FlatPipeline,
    meshes: Vec<MeshBuffers>,
}

struct AppState {
    config: ViewerConfig,
    meshes: Vec<Mesh>,
    camera: Camera,
    scene: Option<Scene>,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: ViewerConfig, meshes: Vec<Mesh>) -> Self {
        Self {
            config,
            meshes,
            camera: Camera::default(),
            scene: None,
            failure: None,
        }
    }

    fn create_scene(&self, event_loop: &ActiveEventLoop) -> Result<Scene> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width as f64,
                self.config.window.height as f64,
            ));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu_init();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let fill = self.config.fill_color();
        let pipeline = entry.with_gpu(|gpu| FlatPipeline::new(gpu.device(), gpu.surface_format(), fill))?;

        let meshes = entry.with_gpu(|gpu| {
            self.meshes
                .iter()
                .filter(|m| {
                    let ok = m.is_well_formed();
                    if !ok {
                        log::warn!("skipping mesh with out-of-range or partial indices");
                    }
                    ok
                })
                .map(|m| m.upload(gpu.device()))
                .collect::<Vec<_>>()
        });

        log::info!("uploaded {} meshes", meshes.len());

        Ok(Scene {
            entry,
            pipeline,
            meshes,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn on_key(&mut self, code: KeyCode) -> Control {
        if code == KeyCode::Escape {
            return Control::Exit;
        }

        match camera_action(code) {
            Some(CameraAction::Move(delta)) => self.camera.translate_local(delta),
            Some(CameraAction::Turn(angle)) => self.camera.rotate(Quat::from_rotation_y(angle)),
            None => {}
        }
        Control::Continue
    }

    fn redraw(&mut self) -> Result<Control> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(Control::Continue);
        };

        let camera = &self.camera;
        let clear = self.config.clear_color();
        let Scene {
            entry,
            pipeline,
            meshes,
        } = scene;

        entry.with_gpu_mut(|gpu| {
            let size = gpu.size();
            if size.width == 0 || size.height == 0 {
                return Ok(Control::Continue);
            }

            let uniforms = Uniforms::from_view_proj(camera.view_projection(gpu.aspect_ratio()));
            pipeline.write_uniforms(gpu.queue(), &uniforms);

            let mut frame = match gpu.begin_frame() {
                Ok(f) => f,
                Err(err) => {
                    let message = err.to_string();
                    return surface_error_control(gpu.handle_surface_error(err), &message);
                }
            };

            pipeline.draw(&mut frame.encoder, &frame.view, clear, meshes.as_slice());
            gpu.submit(frame);
            Ok(Control::Continue)
        })
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.scene.is_some() {
            return;
        }

        match self.create_scene(event_loop) {
            Ok(scene) => {
                scene.entry.with_window(|w| w.request_redraw());
                self.scene = Some(scene);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(scene) = &self.scene {
            scene.entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let control = match event {
            WindowEvent::CloseRequested => Control::Exit,

            WindowEvent::Resized(new_size) => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
                Control::Continue
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(scene) = self.scene.as_mut() {
                    let new_size = scene.entry.with_window(|w| w.inner_size());
                    scene.entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
                Control::Continue
            }

            WindowEvent::KeyboardInput { event, .. } => match (event.state, event.physical_key) {
                (ElementState::Pressed, PhysicalKey::Code(code)) => self.on_key(code),
                _ => Control::Continue,
            },

            WindowEvent::RedrawRequested => match self.redraw() {
                Ok(control) => control,
                Err(err) => {
                    self.scene = None;
                    self.fail(event_loop, err);
                    return;
                }
            },

            _ => Control::Continue,
        };

        if control == Control::Exit {
            // Drop GPU state before the window goes away.
            self.scene = None;
            event_loop.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_moves_in_the_view_plane() {
        assert_eq!(
            camera_action(KeyCode::KeyW),
            Some(CameraAction::Move(Vec3::new(0.0, 0.0, -MOVE_STEP)))
        );
        assert_eq!(
            camera_action(KeyCode::KeyD),
            Some(CameraAction::Move(Vec3::new(MOVE_STEP, 0.0, 0.0)))
        );
    }

    #[test]
    fn q_and_e_turn_in_opposite_directions() {
        assert_eq!(camera_action(KeyCode::KeyQ), Some(CameraAction::Turn(TURN_STEP)));
        assert_eq!(camera_action(KeyCode::KeyE), Some(CameraAction::Turn(-TURN_STEP)));
    }

    #[test]
    fn fatal_surface_error_becomes_run_failure() {
        let err = surface_error_control(SurfaceErrorAction::Fatal, "out of memory").unwrap_err();
        assert!(err.to_string().contains("out of memory"));

        for action in [SurfaceErrorAction::Reconfigured, SurfaceErrorAction::SkipFrame] {
            assert_eq!(surface_error_control(action, "timeout").unwrap(), Control::Continue);
        }
    }

    #[test]
    fn other_keys_do_nothing() {
        assert_eq!(camera_action(KeyCode::KeyZ), None);
        assert_eq!(camera_action(KeyCode::Escape), None);
    }
}
