//! Standalone showcase window backed by winit.
//!
//! When the `gui` feature is enabled, a transparent wry webview is laid
//! over the 3D viewport to host the page overlay and the controls button.
//!
//! ```no_run
//! # use vitrine::Viewer;
//! Viewer::builder()
//!     .with_title("Gallery")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    engine::{SceneEngine, VitrineCommand},
    error::VitrineError,
    options::Options,
    page::{DomSnapshot, PageSurface},
    InputEvent, KeyAction, MouseButton,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    /// Create a builder with the title "Vitrine" and default options.
    fn new() -> Self {
        Self {
            options: None,
            title: "Vitrine".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window showing the scene with its page overlay.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::Viewer`] if the event loop cannot be created
    /// or exits with an error.
    pub fn run(self) -> Result<(), VitrineError> {
        let event_loop =
            EventLoop::new().map_err(|e| VitrineError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            options: Some(self.options),
            title: self.title,
            host: Host::default(),
            #[cfg(feature = "gui")]
            action_rx: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| VitrineError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Where page writes land: the webview when there is one, otherwise an
/// in-memory DOM so the engine runs headless of the overlay.
#[derive(Default)]
struct Host {
    #[cfg(feature = "gui")]
    overlay: Option<crate::gui::webview::WebviewSurface>,
    fallback: DomSnapshot,
}

impl Host {
    fn surface(&mut self) -> &mut dyn PageSurface {
        #[cfg(feature = "gui")]
        if let Some(overlay) = self.overlay.as_mut() {
            return overlay;
        }
        &mut self.fallback
    }

    fn resize(&self, width: u32, height: u32) {
        #[cfg(feature = "gui")]
        if let Some(overlay) = &self.overlay {
            overlay.resize(width, height);
        }
        #[cfg(not(feature = "gui"))]
        let _ = (width, height);
    }
}

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<SceneEngine>,
    options: Option<Options>,
    title: String,
    host: Host,
    #[cfg(feature = "gui")]
    action_rx: Option<std::sync::mpsc::Receiver<VitrineCommand>>,
}

/// The wgpu surface always covers the full window; the overlay sits on top.
fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn execute(&mut self, command: VitrineCommand) {
        if let Some(engine) = &mut self.engine {
            engine.execute(command, self.host.surface());
        }
    }

    /// Run the commands pages issued since the last frame.
    #[cfg(feature = "gui")]
    fn drain_page_commands(&mut self) {
        let Some(rx) = &self.action_rx else {
            return;
        };
        let commands: Vec<VitrineCommand> = rx.try_iter().collect();
        for command in commands {
            self.execute(command);
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(options) = self.options.take() else {
            return;
        };

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (mon_size.width as f64 / scale * 0.75) as u32;
            let logical_h = (mon_size.height as f64 / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let inner = window.inner_size();
        let (vp_w, vp_h) = viewport_size(inner);

        #[cfg(feature = "gui")]
        let site_root = options.pages.site_root.clone();

        let mut engine = match pollster::block_on(SceneEngine::new(
            window.clone(),
            (vp_w, vp_h),
            options,
        )) {
            Ok(e) => e,
            Err(e) => {
                log::error!("Failed to initialize engine: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(feature = "gui")]
        match crate::gui::webview::create_webview(
            window.as_ref(),
            inner.width,
            inner.height,
            site_root,
        ) {
            Ok((wv, rx)) => {
                self.host.overlay =
                    Some(crate::gui::webview::WebviewSurface::new(wv));
                self.action_rx = Some(rx);
            }
            Err(e) => {
                log::error!("Failed to create webview: {e}");
            }
        }

        engine.start(self.host.surface());
        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(event_size) => {
                let (vp_w, vp_h) = viewport_size(event_size);
                if let Some(engine) = &mut self.engine {
                    engine.resize(vp_w, vp_h);
                }
                self.host.resize(vp_w, vp_h);
            }

            WindowEvent::RedrawRequested => {
                #[cfg(feature = "gui")]
                self.drain_page_commands();

                if let Some(engine) = &mut self.engine {
                    let surface = self.host.surface();
                    engine.update(surface);
                    let _ = engine.render(surface);
                }
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                self.execute(VitrineCommand::Input(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                }));
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.execute(VitrineCommand::Input(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                }));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                self.execute(VitrineCommand::Input(InputEvent::Scroll {
                    delta: scroll_delta,
                }));
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.execute(VitrineCommand::Input(
                    InputEvent::ModifiersChanged {
                        shift: modifiers.state().shift_key(),
                    },
                ));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                use winit::keyboard::PhysicalKey;
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let command = match KeyAction::for_key(&format!("{code:?}")) {
                    Some(KeyAction::ToggleControls) => {
                        VitrineCommand::ToggleControls
                    }
                    Some(KeyAction::CancelFlights) => {
                        VitrineCommand::CancelFlights
                    }
                    None => return,
                };
                self.execute(command);
            }

            _ => (),
        }
    }
}
