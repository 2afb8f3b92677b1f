/// Platform-agnostic input events.
///
/// Produced by the winit window and by pointer events forwarded from the
/// page overlay, then fed to [`OrbitControls`](crate::camera::OrbitControls).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to absolute screen position.
    CursorMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll wheel (positive = zoom in).
    Scroll {
        /// Scroll amount in notches (positive = zoom in).
        delta: f32,
    },
    /// Modifier key state changed.
    ModifiersChanged {
        /// Whether the shift key is held.
        shift: bool,
    },
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Secondary (right) mouse button.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
}

impl MouseButton {
    /// Map a DOM `PointerEvent.button` index.
    #[must_use]
    pub fn from_dom_index(index: u8) -> Self {
        match index {
            1 => Self::Middle,
            2 => Self::Right,
            _ => Self::Left,
        }
    }
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            _ => Self::Left,
        }
    }
}

/// Discrete keyboard actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Same as the overlay's `toggle3DControls()`.
    ToggleControls,
    /// Stop every running camera flight where it is.
    CancelFlights,
}

impl KeyAction {
    /// Look up the action bound to a key, using the
    /// `winit::keyboard::KeyCode` debug names (`"KeyC"`, `"Escape"`).
    #[must_use]
    pub fn for_key(code: &str) -> Option<Self> {
        match code {
            "KeyC" => Some(Self::ToggleControls),
            "Escape" => Some(Self::CancelFlights),
            _ => None,
        }
    }
}
