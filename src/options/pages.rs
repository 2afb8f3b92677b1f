use std::path::PathBuf;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Pages", inline)]
#[serde(default)]
/// Page overlay: fragment source, transition timing and DOM hooks.
pub struct PageOptions {
    /// Directory relative page URLs are read from.
    #[schemars(skip)]
    pub site_root: PathBuf,
    /// Fragment loaded once the model is in the scene.
    #[schemars(skip)]
    pub initial_page: String,
    /// Minimum time the container stays hidden after a load starts.
    #[schemars(title = "Hide Duration (ms)", range(min = 0, max = 5000))]
    pub hide_duration_ms: u64,
    /// Delay between replacing the content and revealing it.
    #[schemars(title = "Reveal Delay (ms)", range(min = 0, max = 5000))]
    pub reveal_delay_ms: u64,
    /// Selector of the element fragments are swapped into.
    #[schemars(skip)]
    pub container: String,
    /// Selector of the element inside a fragment that gets revealed.
    #[schemars(skip)]
    pub content: String,
    /// Class toggled to hide/show the container and content.
    #[schemars(skip)]
    pub hide_class: String,
    /// Selector of the controls toggle button.
    #[schemars(skip)]
    pub rotate_button: String,
    /// Button colour while controls are enabled.
    #[schemars(skip)]
    pub button_on_color: String,
    /// Button colour while controls are disabled.
    #[schemars(skip)]
    pub button_off_color: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            site_root: PathBuf::from("."),
            initial_page: "page1.html".into(),
            hide_duration_ms: 500,
            reveal_delay_ms: 100,
            container: "#page-container".into(),
            content: "#this-page-content".into(),
            hide_class: "hide".into(),
            rotate_button: "#rotate-button".into(),
            button_on_color: "#7ed767".into(),
            button_off_color: "white".into(),
        }
    }
}

impl PageOptions {
    /// Hide duration as a [`Duration`].
    #[must_use]
    pub fn hide_duration(&self) -> Duration {
        Duration::from_millis(self.hide_duration_ms)
    }

    /// Reveal delay as a [`Duration`].
    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}
