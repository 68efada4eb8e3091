//! The deferred renderer.
//!
//! [`Renderer`] owns the GPU context, the off-screen targets, the five
//! passes and every uploaded asset. One call to [`Renderer::render`] runs
//! the fixed pass sequence: geometry, raw SSAO, SSAO blur, shaded
//! lighting, composite. The frame is driven entirely by an immutable
//! [`RenderConfig`] snapshot, so mode changes made mid-frame by the UI
//! only take effect on the next frame.

pub mod context;
pub mod mesh_gpu;
pub mod passes;
pub mod targets;

use std::path::{Path, PathBuf};

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::camera::FrameTransforms;
use crate::errors::Result;
use crate::resources::cubemap::CubeMapData;
use crate::resources::material::MaterialState;
use crate::resources::mesh::TriangleMesh;
use crate::resources::ssao::{SsaoUniforms, VisualizationMode};

use context::WgpuContext;
use mesh_gpu::{GpuCubeMap, GpuMesh, GpuTexture2d};
use passes::shading::ShadingInputs;
use passes::{CompositePass, GeometryPass, ShadingPass, SsaoPass};
use targets::RenderTargets;

/// Immutable per-frame snapshot of everything the passes read.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub transforms: FrameTransforms,
    pub material: MaterialState,
    pub ssao: SsaoUniforms,
    pub visualization: VisualizationMode,
}

pub struct Renderer {
    pub context: WgpuContext,
    targets: RenderTargets,

    geometry: GeometryPass,
    ssao: SsaoPass,
    shading: ShadingPass,
    composite: CompositePass,

    mesh: Option<GpuMesh>,
    albedo_tex: GpuTexture2d,
    metalness_tex: GpuTexture2d,
    roughness_tex: GpuTexture2d,
    skybox: GpuCubeMap,
    diffuse_irradiance: GpuCubeMap,
    specular_irradiance: GpuCubeMap,
    skybox_dir: Option<PathBuf>,
}

impl Renderer {
    pub async fn new<W>(window: W, width: u32, height: u32) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let context = WgpuContext::new(window, width, height).await?;
        let device = &context.device;
        let queue = &context.queue;

        let targets = RenderTargets::new(device, width, height);
        let geometry = GeometryPass::new(device);
        let ssao = SsaoPass::new(device);
        let shading = ShadingPass::new(device);
        let composite = CompositePass::new(device, context.color_format());

        let albedo_tex = GpuTexture2d::white(device, queue, "Albedo Texture");
        let metalness_tex = GpuTexture2d::white(device, queue, "Metalness Texture");
        let roughness_tex = GpuTexture2d::white(device, queue, "Roughness Texture");
        let skybox = GpuCubeMap::placeholder(device, queue);
        let diffuse_irradiance = GpuCubeMap::placeholder(device, queue);
        let specular_irradiance = GpuCubeMap::placeholder(device, queue);

        Ok(Self {
            context,
            targets,
            geometry,
            ssao,
            shading,
            composite,
            mesh: None,
            albedo_tex,
            metalness_tex,
            roughness_tex,
            skybox,
            diffuse_irradiance,
            specular_irradiance,
            skybox_dir: None,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        let (w, h) = self.context.size();
        self.targets.resize(&self.context.device, w, h);
    }

    /// Uploads a validated mesh, dropping the previous generation's
    /// buffers.
    pub fn upload_mesh(&mut self, mesh: &TriangleMesh) {
        self.mesh = Some(GpuMesh::new(&self.context.device, mesh));
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn load_albedo_texture(&mut self, path: &Path) -> Result<()> {
        self.albedo_tex = self.load_texture(path, "Albedo Texture")?;
        Ok(())
    }

    pub fn load_metalness_texture(&mut self, path: &Path) -> Result<()> {
        self.metalness_tex = self.load_texture(path, "Metalness Texture")?;
        Ok(())
    }

    pub fn load_roughness_texture(&mut self, path: &Path) -> Result<()> {
        self.roughness_tex = self.load_texture(path, "Roughness Texture")?;
        Ok(())
    }

    fn load_texture(&self, path: &Path, label: &str) -> Result<GpuTexture2d> {
        let img = image::open(path)?.to_rgba8();
        let (w, h) = img.dimensions();
        Ok(GpuTexture2d::from_rgba(
            &self.context.device,
            &self.context.queue,
            label,
            w,
            h,
            img.as_raw(),
        ))
    }

    /// Loads the skybox environment and records its directory for later
    /// irradiance bakes.
    pub fn load_skybox(&mut self, dir: &Path) -> Result<()> {
        let data = CubeMapData::load_from_dir(dir)?;
        self.skybox = GpuCubeMap::new(&self.context.device, &self.context.queue, &data);
        self.skybox_dir = Some(data.source_dir);
        Ok(())
    }

    pub fn load_diffuse_irradiance(&mut self, dir: &Path) -> Result<()> {
        let data = CubeMapData::load_from_dir(dir)?;
        self.diffuse_irradiance = GpuCubeMap::new(&self.context.device, &self.context.queue, &data);
        Ok(())
    }

    pub fn load_specular_irradiance(&mut self, dir: &Path) -> Result<()> {
        let data = CubeMapData::load_from_dir(dir)?;
        self.specular_irradiance =
            GpuCubeMap::new(&self.context.device, &self.context.queue, &data);
        Ok(())
    }

    /// Directory the current skybox was loaded from, the baker's
    /// environment source.
    pub fn skybox_source_dir(&self) -> Option<&Path> {
        self.skybox_dir.as_deref()
    }

    /// Recreates every pipeline from the embedded shader source. With
    /// unchanged source the rebuilt pipelines are identical, so repeated
    /// invocations leave rendered output pixel-identical.
    pub fn rebuild_pipelines(&mut self) {
        let device = &self.context.device;
        self.geometry = GeometryPass::new(device);
        self.ssao = SsaoPass::new(device);
        self.shading = ShadingPass::new(device);
        self.composite = CompositePass::new(device, self.context.color_format());
        log::info!("rebuilt all render pipelines");
    }

    /// Runs the five-pass sequence and presents.
    ///
    /// Surface acquisition failures are fail-soft: the frame is skipped
    /// with a warning (and the surface reconfigured when it was lost),
    /// matching the availability-over-correctness policy of a viewer.
    pub fn render(&mut self, config: &RenderConfig) -> Result<()> {
        let frame = match self.context.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(frame)
            | wgpu::CurrentSurfaceTexture::Suboptimal(frame) => frame,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                log::warn!("surface lost, reconfiguring");
                let (w, h) = self.context.size();
                self.context.resize(w, h);
                return Ok(());
            }
            e => {
                log::warn!("skipping frame: {e:?}");
                return Ok(());
            }
        };
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let device = &self.context.device;
        let queue = &self.context.queue;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        self.geometry.record(
            device,
            queue,
            &mut encoder,
            &self.targets,
            &config.transforms,
            self.mesh.as_ref(),
        );

        self.ssao
            .prepare(queue, &self.targets, &config.transforms, &config.ssao);
        self.ssao.record_raw(device, &mut encoder, &self.targets);
        self.ssao.record_blur(device, &mut encoder, &self.targets);

        let inputs = ShadingInputs {
            albedo: &self.albedo_tex,
            metalness: &self.metalness_tex,
            roughness: &self.roughness_tex,
            skybox: &self.skybox,
            diffuse_irradiance: &self.diffuse_irradiance,
            specular_irradiance: &self.specular_irradiance,
        };
        self.shading.record(
            device,
            queue,
            &mut encoder,
            &self.targets,
            &config.transforms,
            &config.material,
            &inputs,
            self.mesh.as_ref(),
            config.material.show_skybox,
        );

        self.composite.record(
            device,
            queue,
            &mut encoder,
            &self.targets,
            &surface_view,
            config.visualization,
        );

        queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
