//! Wry webview overlay above the 3D viewport.
//!
//! A transparent [`wry::WebView`] covers the whole window and hosts the
//! page container, the controls button and the pages' JS entry points
//! (`cameraFly`, `loadPage`, `toggle3DControls`). Calls come back to the
//! native side as JSON IPC and are parsed into [`VitrineCommand`]s; DOM
//! writes go the other way through [`WebviewSurface`].

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;

use wry::http::{header::CONTENT_TYPE, Response};
use wry::{dpi, Rect, WebView, WebViewBuilder};

use crate::animation::FlightConfig;
use crate::engine::VitrineCommand;
use crate::input::{InputEvent, KeyAction, MouseButton};
use crate::page::PageSurface;

/// Page shell: the container, the button and their styles.
const SHELL_HTML: &str = include_str!("../../assets/web/shell.html");

/// Create the overlay webview as a child of `window`, covering it.
///
/// Paths other than `/` are served from `site_root`, so page fragments can
/// reference images and stylesheets next to them. Returns the webview and a
/// receiver yielding the commands the pages issue.
///
/// # Errors
///
/// Returns the [`wry::Error`] if the webview cannot be created.
pub fn create_webview<W: wry::raw_window_handle::HasWindowHandle>(
    window: &W,
    window_width: u32,
    window_height: u32,
    site_root: PathBuf,
) -> Result<(WebView, mpsc::Receiver<VitrineCommand>), wry::Error> {
    let (tx, rx) = mpsc::channel();

    let webview = WebViewBuilder::new()
        .with_bounds(overlay_bounds(window_width, window_height))
        .with_transparent(true)
        .with_custom_protocol("vitrine".into(), move |_id, request| {
            serve(&site_root, request.uri().path())
        })
        .with_url("vitrine://localhost/")
        .with_initialization_script(BRIDGE_JS)
        .with_ipc_handler(move |req| {
            let body = req.body();
            if let Ok(msg) = serde_json::from_str::<serde_json::Value>(body) {
                if let Some(command) = parse_action(&msg) {
                    let _ = tx.send(command);
                }
            }
        })
        .build_as_child(window)?;

    Ok((webview, rx))
}

/// The overlay covers the whole window.
#[must_use]
pub fn overlay_bounds(window_width: u32, window_height: u32) -> Rect {
    Rect {
        position: dpi::Position::Physical(dpi::PhysicalPosition::new(0, 0)),
        size: dpi::Size::Physical(dpi::PhysicalSize::new(
            window_width.max(1),
            window_height.max(1),
        )),
    }
}

/// [`PageSurface`] that writes into the overlay's DOM.
pub struct WebviewSurface {
    webview: WebView,
}

impl WebviewSurface {
    /// Wrap a webview created by [`create_webview`].
    #[must_use]
    pub fn new(webview: WebView) -> Self {
        Self { webview }
    }

    /// Keep the overlay matched to the window.
    pub fn resize(&self, window_width: u32, window_height: u32) {
        if let Err(e) = self
            .webview
            .set_bounds(overlay_bounds(window_width, window_height))
        {
            log::warn!("overlay resize failed: {e}");
        }
    }

    fn call(&self, function: &str, args: &[&str]) {
        let script = dom_call(function, args);
        if let Err(e) = self.webview.evaluate_script(&script) {
            log::warn!("overlay script failed: {e}");
        }
    }
}

impl PageSurface for WebviewSurface {
    fn add_class(&mut self, selector: &str, class: &str) {
        self.call("addClass", &[selector, class]);
    }

    fn remove_class(&mut self, selector: &str, class: &str) {
        self.call("removeClass", &[selector, class]);
    }

    fn set_inner_html(&mut self, selector: &str, html: &str) {
        self.call("setInnerHtml", &[selector, html]);
    }

    fn set_background_color(&mut self, selector: &str, color: &str) {
        self.call("setBackgroundColor", &[selector, color]);
    }
}

// ── Internals ────────────────────────────────────────────────────────────

/// Script calling `window.__vitrine.<function>` with JSON-quoted string
/// arguments.
fn dom_call(function: &str, args: &[&str]) -> String {
    let quoted: Vec<String> = args
        .iter()
        .map(|a| serde_json::to_string(a).unwrap_or_else(|_| "\"\"".to_owned()))
        .collect();
    format!("window.__vitrine.{function}({})", quoted.join(","))
}

fn serve(site_root: &Path, path: &str) -> Response<Cow<'static, [u8]>> {
    if path == "/" || path.is_empty() {
        return respond("text/html", SHELL_HTML.as_bytes().to_vec());
    }
    let Some(file) = site_file(site_root, path) else {
        return not_found();
    };
    match std::fs::read(&file) {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&file)
                .first_or_octet_stream()
                .to_string();
            respond(&mime, bytes)
        }
        Err(e) => {
            log::warn!("overlay request {path}: {e}");
            not_found()
        }
    }
}

/// Map a request path onto `site_root`, refusing anything that climbs out
/// of it.
fn site_file(site_root: &Path, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    Some(site_root.join(relative))
}

fn respond(mime: &str, body: Vec<u8>) -> Response<Cow<'static, [u8]>> {
    Response::builder()
        .header(CONTENT_TYPE, mime)
        .body(Cow::from(body))
        .unwrap_or_else(|_| Response::new(Cow::from(Vec::new())))
}

fn not_found() -> Response<Cow<'static, [u8]>> {
    Response::builder()
        .status(404)
        .body(Cow::from(Vec::new()))
        .unwrap_or_else(|_| Response::new(Cow::from(Vec::new())))
}

/// JavaScript injected before page load. Defines the entry points pages
/// call, the `TWEEN.Easing` name table, the DOM helpers the native side
/// calls, and forwards pointer input over the page container to the orbit
/// controls.
const BRIDGE_JS: &str = r#"
(function() {
    function send(msg) { window.ipc.postMessage(JSON.stringify(msg)); }

    var families = ['Quadratic', 'Cubic', 'Quartic', 'Quintic', 'Sinusoidal',
                    'Exponential', 'Circular', 'Elastic', 'Back', 'Bounce'];
    var easing = { Linear: { None: 'Linear' } };
    families.forEach(function(f) {
        easing[f] = { In: f + 'In', Out: f + 'Out', InOut: f + 'InOut' };
    });
    window.TWEEN = { Easing: easing };

    window.cameraFly = function(config) {
        send({ action: 'camera_fly', config: config || {} });
    };
    window.loadPage = function(url) {
        send({ action: 'load_page', url: String(url) });
    };
    window.toggle3DControls = function() {
        send({ action: 'toggle_controls' });
    };

    function each(selector, fn) {
        var el = document.querySelector(selector);
        if (el) { fn(el); }
    }
    window.__vitrine = {
        addClass: function(s, c) { each(s, function(el) { el.classList.add(c); }); },
        removeClass: function(s, c) { each(s, function(el) { el.classList.remove(c); }); },
        setInnerHtml: function(s, html) { each(s, function(el) { el.innerHTML = html; }); },
        setBackgroundColor: function(s, color) {
            each(s, function(el) { el.style.backgroundColor = color; });
        }
    };

    function interactive(target) {
        return target && target.closest &&
            target.closest('a, button, input, select, textarea, [onclick]');
    }
    window.addEventListener('DOMContentLoaded', function() {
        var container = document.getElementById('page-container');
        if (!container) { return; }
        var ratio = function() { return window.devicePixelRatio || 1; };
        container.addEventListener('pointerdown', function(e) {
            if (interactive(e.target)) { return; }
            send({ action: 'pointer_button', button: e.button, pressed: true });
        });
        container.addEventListener('contextmenu', function(e) { e.preventDefault(); });
        container.addEventListener('wheel', function(e) {
            if (interactive(e.target)) { return; }
            send({ action: 'wheel', delta: -e.deltaY / 100 });
        }, { passive: true });
    });
    window.addEventListener('pointerup', function(e) {
        send({ action: 'pointer_button', button: e.button, pressed: false });
    });
    window.addEventListener('pointermove', function(e) {
        var r = window.devicePixelRatio || 1;
        send({ action: 'pointer_move', x: e.clientX * r, y: e.clientY * r });
    });
    function modifiers(e) { send({ action: 'modifiers', shift: e.shiftKey }); }
    window.addEventListener('keydown', function(e) {
        modifiers(e);
        if (!interactive(e.target)) { send({ action: 'key', code: e.code }); }
    });
    window.addEventListener('keyup', modifiers);
})();
"#;

/// Parse an IPC message from the overlay into a command.
fn parse_action(msg: &serde_json::Value) -> Option<VitrineCommand> {
    let action = msg.get("action")?.as_str()?;
    let number = |key: &str| msg.get(key).and_then(serde_json::Value::as_f64);
    match action {
        "camera_fly" => {
            let config = msg.get("config").cloned().unwrap_or_default();
            match serde_json::from_value::<FlightConfig>(config) {
                Ok(config) => Some(VitrineCommand::CameraFly(config)),
                Err(e) => {
                    log::warn!("cameraFly: bad config: {e}");
                    None
                }
            }
        }
        "load_page" => {
            let url = msg.get("url")?.as_str()?.to_owned();
            Some(VitrineCommand::LoadPage { url })
        }
        "toggle_controls" => Some(VitrineCommand::ToggleControls),
        "pointer_move" => Some(VitrineCommand::Input(InputEvent::CursorMoved {
            x: number("x")? as f32,
            y: number("y")? as f32,
        })),
        "pointer_button" => {
            let index = msg.get("button")?.as_u64()?;
            let pressed = msg.get("pressed")?.as_bool()?;
            Some(VitrineCommand::Input(InputEvent::MouseButton {
                button: MouseButton::from_dom_index(u8::try_from(index).ok()?),
                pressed,
            }))
        }
        "wheel" => Some(VitrineCommand::Input(InputEvent::Scroll {
            delta: number("delta")? as f32,
        })),
        "modifiers" => Some(VitrineCommand::Input(InputEvent::ModifiersChanged {
            shift: msg.get("shift")?.as_bool()?,
        })),
        "key" => match KeyAction::for_key(msg.get("code")?.as_str()?)? {
            KeyAction::ToggleControls => Some(VitrineCommand::ToggleControls),
            KeyAction::CancelFlights => Some(VitrineCommand::CancelFlights),
        },
        _ => None,
    }
}

    }
}
