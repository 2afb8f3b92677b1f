//! The single owned context behind the viewer.
//!
//! [`Stage`] holds everything the frame loop, the resize handler, the
//! flight controller and the page loader share: render state, scene, orbit
//! controls, flights, page transitions and the startup chain. It never
//! touches the GPU or a thread; work that has to leave the frame loop comes
//! back as a [`Dispatch`] for the host to hand to its workers, and painting
//! goes through a [`FramePainter`].

use web_time::Instant;

use super::bootstrap::{AssetLoad, Bootstrap};
use super::command::VitrineCommand;
use crate::animation::{FlightConfig, FlightController, FlightId};
use crate::assets::AssetEvent;
use crate::camera::OrbitControls;
use crate::input::{InputEvent, KeyAction};
use crate::options::Options;
use crate::page::{
    CompletionOutcome, FetchResult, LoadRequest, PageLoader, PageSurface,
};
use crate::scene::{RenderState, Scene};
use crate::util::frame_timing::FrameTiming;

/// Executes one full render of the scene.
pub trait FramePainter {
    /// Draw `scene` as seen through `state`.
    ///
    /// # Errors
    ///
    /// Returns the surface error when no frame could be acquired.
    fn paint(&mut self, scene: &Scene, state: &RenderState) -> Result<(), wgpu::SurfaceError>;
}

/// Background work produced by a stage operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct Dispatch {
    /// Asset loads for the asset worker.
    pub assets: Vec<AssetLoad>,
    /// Fragment fetches for the fetcher.
    pub pages: Vec<LoadRequest>,
}

impl Dispatch {
    /// Whether there is nothing to hand off.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.pages.is_empty()
    }

    fn page(request: LoadRequest) -> Self {
        Self {
            assets: Vec::new(),
            pages: vec![request],
        }
    }
}

/// Viewer state and behaviour, independent of window and GPU.
pub struct Stage {
    options: Options,
    state: RenderState,
    scene: Scene,
    controls: OrbitControls,
    flights: FlightController,
    pages: PageLoader,
    bootstrap: Bootstrap,
    timing: FrameTiming,
}

impl Stage {
    /// Stage for `options` with the given initial viewport.
    #[must_use]
    pub fn new(options: Options, viewport: (u32, u32)) -> Self {
        let state = RenderState::from_options(&options, viewport);
        let mut controls = OrbitControls::new(&options.controls);
        controls.set_viewport_height(state.viewport().1);
        Self {
            scene: Scene::new(options.scene.background_rgb()),
            flights: FlightController::new(options.flight.policy),
            pages: PageLoader::new(&options.pages),
            bootstrap: Bootstrap::new(&options.scene, &options.pages),
            timing: FrameTiming::new(),
            controls,
            state,
            options,
        }
    }

    /// Options the stage was built from.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Current render state.
    #[must_use]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Current scene content.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Orbit controls.
    #[must_use]
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Flight controller.
    #[must_use]
    pub fn flights(&self) -> &FlightController {
        &self.flights
    }

    /// Page transition state.
    #[must_use]
    pub fn pages(&self) -> &PageLoader {
        &self.pages
    }

    /// Frame clock.
    #[must_use]
    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    /// Begin the startup chain and bring the controls button in line with
    /// the initial controls state. Later calls only re-sync the button.
    pub fn start(&mut self, surface: &mut dyn PageSurface) -> Dispatch {
        self.sync_controls_button(surface);
        self.state.request_repaint();
        let assets = self.bootstrap.start();
        if !assets.is_empty() {
            log::info!("bootstrapping scene ({} asset(s) queued)", assets.len());
        }
        Dispatch {
            assets,
            pages: Vec::new(),
        }
    }

    /// Run one command.
    pub fn execute(
        &mut self,
        command: VitrineCommand,
        now: Instant,
        surface: &mut dyn PageSurface,
    ) -> Dispatch {
        match command {
            VitrineCommand::CameraFly(config) => {
                let _ = self.camera_fly(&config, now);
            }
            VitrineCommand::LoadPage { url } => {
                return Dispatch::page(self.load_page(&url, now, surface));
            }
            VitrineCommand::ToggleControls => {
                let _ = self.toggle_controls(surface);
            }
            VitrineCommand::CancelFlights => self.flights.cancel_flights(),
            VitrineCommand::Input(event) => {
                let _ = self.handle_input(event);
            }
        }
        Dispatch::default()
    }

    /// `cameraFly`: fly position, look-at target, focus distance and focal
    /// length to `config` in lock-step.
    pub fn camera_fly(&mut self, config: &FlightConfig, now: Instant) -> FlightId {
        self.flights.fly(config, &mut self.state, now)
    }

    /// `loadPage`: start a page transition. The returned request must be
    /// fetched and its result passed to [`on_fetch`](Self::on_fetch).
    pub fn load_page(
        &mut self,
        url: &str,
        now: Instant,
        surface: &mut dyn PageSurface,
    ) -> LoadRequest {
        self.pages.load(url, now, surface)
    }

    /// `toggle3DControls`: flip the controls and recolour the button.
    /// Returns the new enabled state.
    pub fn toggle_controls(&mut self, surface: &mut dyn PageSurface) -> bool {
        let enabled = self.controls.toggle();
        self.sync_controls_button(surface);
        log::debug!("3D controls {}", if enabled { "on" } else { "off" });
        enabled
    }

    fn sync_controls_button(&self, surface: &mut dyn PageSurface) {
        let pages = &self.options.pages;
        let color = if self.controls.enabled {
            &pages.button_on_color
        } else {
            &pages.button_off_color
        };
        surface.set_background_color(&pages.rotate_button, color);
    }

    /// Feed pointer input to the orbit controls.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        self.controls.handle_input(event)
    }

    /// Run a key binding.
    pub fn handle_key(&mut self, action: KeyAction, surface: &mut dyn PageSurface) {
        match action {
            KeyAction::ToggleControls => {
                let _ = self.toggle_controls(surface);
            }
            KeyAction::CancelFlights => self.flights.cancel_flights(),
        }
    }

    /// Adopt a new viewport size. Idempotent; always marks the state dirty.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.state.resize(width, height);
        self.controls.set_viewport_height(self.state.viewport().1);
    }

    /// Apply a finished asset load and advance the startup chain.
    pub fn on_asset(
        &mut self,
        event: AssetEvent,
        now: Instant,
        surface: &mut dyn PageSurface,
    ) -> Dispatch {
        let AssetEvent { kind, path, result } = event;
        let succeeded = match result {
            Ok(payload) => {
                log::info!("{kind:?} loaded from {}", path.display());
                self.scene.apply(payload);
                self.state.request_repaint();
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        };

        let step = self.bootstrap.on_loaded(kind, succeeded);
        let mut dispatch = Dispatch {
            assets: step.loads,
            pages: Vec::new(),
        };
        if let Some(url) = step.initial_page {
            dispatch.pages.push(self.load_page(&url, now, surface));
        }
        dispatch
    }

    /// Hand a finished fragment fetch to the page loader.
    pub fn on_fetch(
        &mut self,
        fetched: FetchResult,
        now: Instant,
        surface: &mut dyn PageSurface,
    ) -> CompletionOutcome {
        self.pages.complete(fetched.token, fetched.result, now, surface)
    }

    /// Advance flights, controls and page timers to `now`. Returns whether
    /// the state needs a repaint.
    pub fn tick(&mut self, now: Instant, surface: &mut dyn PageSurface) -> bool {
        let _ = self.timing.tick(now);
        let _ = self.flights.update(now, &mut self.state);
        let _ = self.controls.update(&mut self.state);
        let _ = self.pages.poll(now, surface);
        self.state.needs_repaint()
    }

    /// One iteration of the render loop: tick, then paint only if the state
    /// is dirty. Returns whether a frame was painted.
    ///
    /// A failed paint leaves the state dirty so the next frame retries.
    ///
    /// # Errors
    ///
    /// Returns the painter's surface error; the host decides whether to
    /// reconfigure the surface.
    pub fn frame(
        &mut self,
        now: Instant,
        surface: &mut dyn PageSurface,
        painter: &mut dyn FramePainter,
    ) -> Result<bool, wgpu::SurfaceError> {
        if !self.tick(now, surface) {
            return Ok(false);
        }
        let _ = self.state.take_repaint();
        if let Err(e) = painter.paint(&self.scene, &self.state) {
            self.state.request_repaint();
            return Err(e);
        }
        self.timing.mark_painted();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use glam::Vec3;
    use web_time::Duration;

    use super::*;
    use crate::animation::{FlightPolicy, Xyz};
    use crate::assets::{AssetKind, AssetPayload, Material, Model};
    use crate::error::VitrineError;
    use crate::page::DomSnapshot;
    use crate::util::easing::EasingFunction;

    const BUTTON: &str = "#rotate-button";
    const CONTAINER: &str = "#page-container";

    #[derive(Default)]
    struct CountingPainter {
        painted: usize,
        fail_next: bool,
        last_viewport: Option<(u32, u32)>,
    }

    impl FramePainter for CountingPainter {
        fn paint(
            &mut self,
            _scene: &Scene,
            state: &RenderState,
        ) -> Result<(), wgpu::SurfaceError> {
            if std::mem::take(&mut self.fail_next) {
                return Err(wgpu::SurfaceError::Lost);
            }
            self.painted += 1;
            self.last_viewport = Some(state.viewport());
            Ok(())
        }
    }

    fn stage() -> Stage {
        Stage::new(Options::default(), (800, 600))
    }

    fn flight(time: f64) -> FlightConfig {
        FlightConfig {
            position: Xyz { x: 1.0, y: 2.0, z: 3.0 },
            target: Xyz { x: 4.0, y: 5.0, z: 6.0 },
            focus_distance: 0.4,
            focal_length: 0.2,
            time,
            easing: EasingFunction::Linear,
        }
    }

    fn empty_model() -> Model {
        Model {
            meshes: Vec::new(),
            materials: vec![Material::default()],
            textures: Vec::new(),
        }
    }

    #[test]
    fn static_frames_are_not_painted() {
        let mut stage = stage();
        let mut dom = DomSnapshot::new();
        let mut painter = CountingPainter::default();
        let t0 = Instant::now();

        let _ = stage.start(&mut dom);
        assert_eq!(stage.frame(t0, &mut dom, &mut painter), Ok(true));
        for i in 1..10 {
            let now = t0 + Duration::from_millis(16 * i);
            assert_eq!(stage.frame(now, &mut dom, &mut painter), Ok(false));
        }
        assert_eq!(painter.painted, 1);
        assert_eq!(stage.timing().painted_frames(), 1);
        assert_eq!(stage.timing().ticked_frames(), 10);
    }

    #[test]
    fn last_resize_wins_and_repaints() {
        let mut stage = stage();
        let mut dom = DomSnapshot::new();
        let mut painter = CountingPainter::default();
        let now = Instant::now();

        for (w, h) in [(1024, 768), (640, 480), (1920, 1080)] {
            stage.resize(w, h);
            assert!(stage.state().needs_repaint());
        }
        assert_eq!(stage.frame(now, &mut dom, &mut painter), Ok(true));
        assert_eq!(painter.last_viewport, Some((1920, 1080)));

        stage.resize(1920, 1080);
        assert_eq!(stage.frame(now, &mut dom, &mut painter), Ok(true));
        assert_eq!(painter.painted, 2);
    }

    #[test]
    fn zero_time_flight_lands_immediately() {
        let mut stage = stage();
        let _ = stage.camera_fly(&flight(0.0), Instant::now());

        let state = stage.state();
        assert_eq!(state.camera().eye, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.camera().target, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(state.post().focus_distance, 0.4);
        assert_eq!(state.post().focal_length, 0.2);
        assert!(state.needs_repaint());
        assert!(stage.flights().is_empty());
    }

    #[test]
    fn flight_paints_every_frame_until_it_lands() {
        let mut stage = stage();
        let mut dom = DomSnapshot::new();
        let mut painter = CountingPainter::default();
        let t0 = Instant::now();

        let _ = stage.camera_fly(&flight(100.0), t0);
        let mut painted = 0;
        for i in 0..=10 {
            let now = t0 + Duration::from_millis(10 * i);
            if stage.frame(now, &mut dom, &mut painter) == Ok(true) {
                painted += 1;
            }
        }
        assert_eq!(painted, 11);
        assert!(stage.flights().is_empty());
        assert_eq!(stage.state().camera().eye, Vec3::new(1.0, 2.0, 3.0));

        let later = t0 + Duration::from_millis(500);
        assert_eq!(stage.frame(later, &mut dom, &mut painter), Ok(false));
    }

    #[test]
    fn toggling_twice_restores_flag_and_colour() {
        let mut stage = stage();
        let mut dom = DomSnapshot::new();
        let _ = stage.start(&mut dom);
        assert!(!stage.controls().enabled);
        assert_eq!(dom.background_color(BUTTON), Some("white"));

        assert!(stage.toggle_controls(&mut dom));
        assert_eq!(dom.background_color(BUTTON), Some("#7ed767"));

        assert!(!stage.toggle_controls(&mut dom));
        assert_eq!(dom.background_color(BUTTON), Some("white"));
        assert!(!stage.controls().enabled);
    }

    #[test]
    fn disabled_controls_ignore_pointer_input() {
        let mut stage = stage();
        let mut dom = DomSnapshot::new();
        let before = *stage.state().camera();

        for command in [
            VitrineCommand::Input(InputEvent::MouseButton {
                button: crate::input::MouseButton::Left,
                pressed: true,
            }),
            VitrineCommand::Input(InputEvent::CursorMoved { x: 10.0, y: 10.0 }),
            VitrineCommand::Input(InputEvent::CursorMoved { x: 90.0, y: 40.0 }),
            VitrineCommand::Input(InputEvent::Scroll { delta: 3.0 }),
        ] {
            assert!(stage.execute(command, Instant::now(), &mut dom).is_empty());
        }
        let _ = stage.tick(Instant::now(), &mut dom);
        assert_eq!(*stage.state().camera(), before);
    }

    #[test]
    fn escape_cancels_running_flights() {
        let mut stage = stage();
        let mut dom = DomSnapshot::new();
        let _ = stage.camera_fly(&flight(1000.0), Instant::now());
        assert!(stage.flights().is_active());
        stage.handle_key(KeyAction::CancelFlights, &mut dom);
        assert!(stage.flights().is_empty());
    }

    #[test]
    fn supersede_is_the_default_policy() {
        let mut stage = stage();
        assert_eq!(stage.flights().policy(), FlightPolicy::Supersede);
        let t0 = Instant::now();
        let first = stage.camera_fly(&flight(1000.0), t0);
        let second = stage.camera_fly(&flight(1000.0), t0);
        assert!(!stage.flights().is_running(first));
        assert!(stage.flights().is_running(second));
    }

    #[test]
    fn bootstrap_chain_ends_in_initial_page() {
        let mut stage = stage();
        let mut dom = DomSnapshot::new();
        let now = Instant::now();

        let dispatch = stage.start(&mut dom);
        assert_eq!(dispatch.assets.len(), 1);
        assert_eq!(dispatch.assets[0].kind, AssetKind::Environment);

        let dispatch = stage.on_asset(
            AssetEvent {
                kind: AssetKind::Environment,
                path: PathBuf::from("env.hdr"),
                result: Err(VitrineError::asset("env.hdr", "missing")),
            },
            now,
            &mut dom,
        );
        assert_eq!(dispatch.assets.len(), 2);
        assert!(dispatch.pages.is_empty());
        assert!(stage.scene().environment().is_none());

        let _ = stage.state.take_repaint();
        let dispatch = stage.on_asset(
            AssetEvent {
                kind: AssetKind::Model,
                path: PathBuf::from("scene.gltf"),
                result: Ok(AssetPayload::Model(empty_model())),
            },
            now,
            &mut dom,
        );
        assert!(stage.scene().model().is_some());
        assert!(stage.state().needs_repaint());
        assert_eq!(dispatch.pages.len(), 1);
        assert_eq!(dispatch.pages[0].url, "page1.html");
        assert!(dom.has_class(CONTAINER, "hide"));
    }

    #[test]
    fn superseded_fetch_never_reaches_the_container() {
        let mut stage = stage();
        let mut dom = DomSnapshot::new();
        let t0 = Instant::now();

        let a = stage.load_page("a.html", t0, &mut dom);
        let b = stage.load_page("b.html", t0 + Duration::from_millis(10), &mut dom);

        let late = t0 + Duration::from_millis(600);
        let outcome = stage.on_fetch(
            FetchResult {
                token: b.token,
                url: b.url,
                result: Ok("B".into()),
            },
            late,
            &mut dom,
        );
        assert_eq!(outcome, CompletionOutcome::Committed);
        assert_eq!(dom.inner_html(CONTAINER), Some("B"));

        let outcome = stage.on_fetch(
            FetchResult {
                token: a.token,
                url: a.url,
                result: Ok("A".into()),
            },
            late,
            &mut dom,
        );
        assert_eq!(outcome, CompletionOutcome::Stale);
        assert_eq!(dom.inner_html(CONTAINER), Some("B"));
    }

    #[test]
    fn failed_paint_retries_next_frame() {
        let mut stage = stage();
        let mut dom = DomSnapshot::new();
        let mut painter = CountingPainter {
            fail_next: true,
            ..CountingPainter::default()
        };
        let now = Instant::now();

        stage.resize(640, 480);
        assert_eq!(
            stage.frame(now, &mut dom, &mut painter),
            Err(wgpu::SurfaceError::Lost)
        );
        assert!(stage.state().needs_repaint());
        assert_eq!(stage.frame(now, &mut dom, &mut painter), Ok(true));
        assert_eq!(painter.painted, 1);
    }
}
