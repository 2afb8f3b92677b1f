//! The engine: startup chain, command handling and the dirty-flag frame
//! loop.
//!
//! [`Stage`] holds every piece of viewer state and runs without a GPU;
//! [`SceneEngine`] wires it to the render chain and the worker threads.

mod bootstrap;
mod command;
mod stage;

pub use bootstrap::{AssetLoad, Bootstrap, BootstrapStep};
pub use command::VitrineCommand;
pub use stage::{Dispatch, FramePainter, Stage};

use crate::assets::AssetWorker;
use crate::error::VitrineError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::options::Options;
use crate::page::{FragmentFetcher, PageSurface};
use crate::renderer::Composer;
use crate::scene::{RenderState, Scene};

/// The showcase viewer: a [`Stage`] wired to a GPU surface and the two
/// background workers.
///
/// # Frame loop
///
/// Call [`start`](Self::start) once after construction. Then, once per
/// display refresh, call [`update`](Self::update) to drain finished asset
/// loads and fragment fetches, and [`render`](Self::render), which paints
/// only when the state is dirty. Forward window resizes to
/// [`resize`](Self::resize) and overlay calls to
/// [`execute`](Self::execute).
pub struct SceneEngine {
    /// Core wgpu device, queue, and surface.
    pub context: RenderContext,
    composer: Composer,
    stage: Stage,
    assets: AssetWorker,
    fetcher: FragmentFetcher,
}

struct GpuPainter<'a> {
    context: &'a RenderContext,
    composer: &'a mut Composer,
}

impl FramePainter for GpuPainter<'_> {
    fn paint(&mut self, scene: &Scene, state: &RenderState) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.composer.render(self.context, scene, state, &view);
        frame.present();
        Ok(())
    }
}

impl SceneEngine {
    /// Create the GPU context for `window` and build the engine.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError`] if GPU initialization, shader composition or
    /// worker startup fails.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, VitrineError> {
        let context = RenderContext::new(window, size).await?;
        Self::from_context(context, options)
    }

    /// Build the engine over an existing context.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError`] if shader composition or worker startup
    /// fails.
    pub fn from_context(
        context: RenderContext,
        options: Options,
    ) -> Result<Self, VitrineError> {
        let mut shader_composer = ShaderComposer::new()?;
        let composer = Composer::new(&context, &mut shader_composer, &options)?;
        let fetcher = FragmentFetcher::new(options.pages.site_root.clone());
        let stage = Stage::new(options, context.size());
        Ok(Self {
            context,
            composer,
            stage,
            assets: AssetWorker::new()?,
            fetcher,
        })
    }

    /// Viewer state.
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Kick off the startup asset chain.
    pub fn start(&mut self, surface: &mut dyn PageSurface) {
        let dispatch = self.stage.start(surface);
        self.dispatch(dispatch);
    }

    /// Run an overlay, keyboard or pointer command.
    pub fn execute(&mut self, command: VitrineCommand, surface: &mut dyn PageSurface) {
        let dispatch = self.stage.execute(command, web_time::Instant::now(), surface);
        self.dispatch(dispatch);
    }

    fn dispatch(&self, dispatch: Dispatch) {
        for load in dispatch.assets {
            self.assets.submit(load.kind, load.path);
        }
        for request in dispatch.pages {
            self.fetcher.submit(request);
        }
    }

    /// Drain finished asset loads and fragment fetches.
    pub fn update(&mut self, surface: &mut dyn PageSurface) {
        let now = web_time::Instant::now();
        while let Some(event) = self.assets.poll() {
            let dispatch = self.stage.on_asset(event, now, surface);
            self.dispatch(dispatch);
        }
        while let Some(fetched) = self.fetcher.poll() {
            let _ = self.stage.on_fetch(fetched, now, surface);
        }
    }

    /// One render-loop iteration. Returns whether a frame was painted.
    ///
    /// A lost or outdated surface is reconfigured here; the frame is
    /// retried on the next call.
    pub fn render(&mut self, surface: &mut dyn PageSurface) -> bool {
        let mut painter = GpuPainter {
            context: &self.context,
            composer: &mut self.composer,
        };
        match self
            .stage
            .frame(web_time::Instant::now(), surface, &mut painter)
        {
            Ok(painted) => painted,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = self.context.size();
                self.resize(width, height);
                false
            }
            Err(e) => {
                log::error!("render error: {e:?}");
                false
            }
        }
    }

    /// Resize the surface, every render target and the camera aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.composer.resize(&self.context);
        self.stage.resize(width, height);
    }
}
