use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::animation::FlightPolicy;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[schemars(title = "Flights", inline)]
#[serde(default)]
/// Camera flight behaviour.
pub struct FlightOptions {
    /// What happens when a flight starts while another is running.
    #[schemars(title = "Overlap Policy")]
    pub policy: FlightPolicy,
}
