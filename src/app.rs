//! Interactive viewer shell: window, input handling and the per-frame
//! loop that snapshots UI state into a [`RenderConfig`].
//!
//! Key bindings:
//! - `1`..`4`: Phong / texture-mapping / reflection / BRDF shading
//! - `F1`..`F6`: visualization mode (normal, albedo, depth, raw SSAO,
//!   blurred SSAO, final)
//! - `T`: cycle the texture-mapping channel (color, metalness, roughness)
//! - `K`: toggle the skybox
//! - `B` / `G`: bake the diffuse / specular irradiance map
//! - `R`: rebuild all render pipelines

use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::baker::{self, BakeKind};
use crate::camera::OrbitCamera;
use crate::errors::Result;
use crate::renderer::{RenderConfig, Renderer};
use crate::resources::material::{MaterialState, ShaderMode, TextureChannel};
use crate::resources::ply;
use crate::resources::ssao::{SsaoSettings, VisualizationMode};

/// Asset paths handed to the viewer at startup. Every path is optional;
/// missing assets fall back to built-in placeholders.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub mesh: Option<PathBuf>,
    pub albedo: Option<PathBuf>,
    pub metalness: Option<PathBuf>,
    pub roughness: Option<PathBuf>,
    pub skybox: Option<PathBuf>,
    pub diffuse_irradiance: Option<PathBuf>,
    pub specular_irradiance: Option<PathBuf>,
    /// Directory the bake output subdirectories are created under.
    pub output_root: PathBuf,
}

pub struct App {
    options: AppOptions,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,

    camera: OrbitCamera,
    material: MaterialState,
    ssao: SsaoSettings,

    dragging: bool,
    cursor: (f64, f64),
}

impl App {
    #[must_use]
    pub fn new(options: AppOptions) -> Self {
        Self {
            options,
            window: None,
            renderer: None,
            camera: OrbitCamera::default(),
            material: MaterialState::default(),
            ssao: SsaoSettings::default(),
            dragging: false,
            cursor: (0.0, 0.0),
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn load_initial_assets(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        if let Some(path) = self.options.mesh.clone() {
            match ply::load_mesh(&path) {
                Ok((mesh, bbox)) => {
                    renderer.upload_mesh(&mesh);
                    self.camera.frame_bounds(&bbox);
                }
                Err(e) => log::error!("failed to load mesh {}: {e}", path.display()),
            }
        }
        let textures = [
            (&self.options.albedo, "albedo"),
            (&self.options.metalness, "metalness"),
            (&self.options.roughness, "roughness"),
        ];
        for (path, kind) in textures {
            if let Some(path) = path {
                let loaded = match kind {
                    "albedo" => renderer.load_albedo_texture(path),
                    "metalness" => renderer.load_metalness_texture(path),
                    _ => renderer.load_roughness_texture(path),
                };
                if let Err(e) = loaded {
                    log::error!("failed to load {kind} texture {}: {e}", path.display());
                }
            }
        }
        if let Some(dir) = &self.options.skybox {
            if let Err(e) = renderer.load_skybox(dir) {
                log::error!("failed to load skybox {}: {e}", dir.display());
            } else {
                self.material.show_skybox = true;
            }
        }
        if let Some(dir) = &self.options.diffuse_irradiance {
            if let Err(e) = renderer.load_diffuse_irradiance(dir) {
                log::error!("failed to load diffuse irradiance {}: {e}", dir.display());
            }
        }
        if let Some(dir) = &self.options.specular_irradiance {
            if let Err(e) = renderer.load_specular_irradiance(dir) {
                log::error!("failed to load specular irradiance {}: {e}", dir.display());
            }
        }
    }

    fn bake(&mut self, kind: BakeKind) {
        let Some(renderer) = self.renderer.as_ref() else {
            return;
        };
        let Some(env_dir) = renderer.skybox_source_dir().map(PathBuf::from) else {
            log::warn!("no skybox loaded, nothing to bake");
            return;
        };
        log::info!("baking {kind:?} irradiance, this blocks the UI until done");
        let result = baker::bake_irradiance(
            &renderer.context.device,
            &renderer.context.queue,
            &env_dir,
            &self.options.output_root,
            kind,
            self.material.roughness,
        );
        if let Err(e) = result {
            log::error!("bake failed: {e}");
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Digit1 => self.material.shader_mode = ShaderMode::Phong,
            KeyCode::Digit2 => self.material.shader_mode = ShaderMode::TextureMapping,
            KeyCode::Digit3 => self.material.shader_mode = ShaderMode::Reflection,
            KeyCode::Digit4 => self.material.shader_mode = ShaderMode::Brdf,
            KeyCode::F1 => self.ssao.visualization = VisualizationMode::Normal,
            KeyCode::F2 => self.ssao.visualization = VisualizationMode::Albedo,
            KeyCode::F3 => self.ssao.visualization = VisualizationMode::Depth,
            KeyCode::F4 => self.ssao.visualization = VisualizationMode::Ssao,
            KeyCode::F5 => self.ssao.visualization = VisualizationMode::SsaoBlur,
            KeyCode::F6 => self.ssao.visualization = VisualizationMode::Final,
            KeyCode::KeyT => {
                self.material.texture_channel = match self.material.texture_channel {
                    TextureChannel::Color => TextureChannel::Metalness,
                    TextureChannel::Metalness => TextureChannel::Roughness,
                    TextureChannel::Roughness => TextureChannel::Color,
                };
            }
            KeyCode::KeyK => self.material.show_skybox = !self.material.show_skybox,
            KeyCode::KeyB => self.bake(BakeKind::Diffuse),
            KeyCode::KeyG => self.bake(BakeKind::Specular),
            KeyCode::KeyR => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.rebuild_pipelines();
                }
            }
            _ => {}
        }
    }

    fn render_frame(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let config = RenderConfig {
            transforms: self.camera.transforms(),
            material: self.material.clone(),
            ssao: self.ssao.to_uniforms(),
            visualization: self.ssao.visualization,
        };
        if let Err(e) = renderer.render(&config) {
            log::error!("render failed: {e}");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("pbrview")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let size = window.inner_size();
        self.camera.set_viewport(size.width, size.height);

        match pollster::block_on(Renderer::new(window, size.width, size.height)) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                // no rendering is possible without the base pipeline set
                log::error!("fatal renderer error: {e}");
                event_loop.exit();
                return;
            }
        }
        self.load_initial_assets();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.camera.set_viewport(size.width, size.height);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (last_x, last_y) = self.cursor;
                if self.dragging {
                    self.camera.rotate(
                        (position.x - last_x) as f32,
                        (position.y - last_y) as f32,
                    );
                }
                self.cursor = (position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.dragging = state == ElementState::Pressed;
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 60.0,
                };
                self.camera.zoom(scroll);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(code);
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
