//! Display projection of a broadcast result

use crate::api::BroadcastResponse;
use crate::view::geometry::{geometry_image_ref, GeometryImageRef};

/// What the broadcast panel shows once a response has arrived
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastSummary {
    pub intention: Option<String>,
    pub frequency: Option<f64>,
    pub field_type: Option<String>,
    pub packet_base64: Option<String>,
    pub image: Option<GeometryImageRef>,
}

impl BroadcastSummary {
    pub fn from_response(response: &BroadcastResponse) -> Self {
        Self {
            intention: response.payload_intention().map(str::to_string),
            frequency: response.payload_frequency(),
            field_type: response.payload_field_type(),
            packet_base64: response.packet_base64().map(str::to_string),
            image: geometry_image_ref(response),
        }
    }

    /// Label/value rows; absent values render empty
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Intention", self.intention.clone().unwrap_or_default()),
            (
                "Frequency",
                self.frequency.map(|f| format!("{} Hz", f)).unwrap_or_default(),
            ),
            ("Field", self.field_type.clone().unwrap_or_default()),
            ("Packet (base64)", self.packet_base64.clone().unwrap_or_default()),
        ]
    }
}
