//! The viewer's complete interactive vocabulary.
//!
//! Every operation, whether it comes from the page overlay's JS bridge, a
//! key press or pointer input, is a [`VitrineCommand`]. Hosts build
//! commands and pass them to [`Stage::execute`](super::Stage::execute).

use crate::animation::FlightConfig;
use crate::input::InputEvent;

/// One operation on the stage.
#[derive(Debug, Clone, PartialEq)]
pub enum VitrineCommand {
    /// `cameraFly(config)`: start a camera flight.
    CameraFly(FlightConfig),
    /// `loadPage(url)`: swap a page fragment into the container.
    LoadPage {
        /// Page URL or site-relative path.
        url: String,
    },
    /// `toggle3DControls()`: flip pointer-driven camera control.
    ToggleControls,
    /// Stop every running flight where it is.
    CancelFlights,
    /// Pointer, wheel or modifier input for the orbit controls.
    Input(InputEvent),
}
