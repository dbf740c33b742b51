//! Wire types exchanged with the healing service

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Sacred-geometry pattern selecting which image accompanies a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    FlowerOfLife,
    Merkaba,
    Torus,
    Metatron,
    SriYantra,
}

impl FieldType {
    /// All field types in display order
    pub const ALL: [FieldType; 5] = [
        FieldType::FlowerOfLife,
        FieldType::Merkaba,
        FieldType::Torus,
        FieldType::Metatron,
        FieldType::SriYantra,
    ];

    /// Identifier used on the wire and in image paths
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::FlowerOfLife => "flower_of_life",
            FieldType::Merkaba => "merkaba",
            FieldType::Torus => "torus",
            FieldType::Metatron => "metatron",
            FieldType::SriYantra => "sri_yantra",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::FlowerOfLife => "Flower of Life",
            FieldType::Merkaba => "Merkaba",
            FieldType::Torus => "Torus",
            FieldType::Metatron => "Metatron's Cube",
            FieldType::SriYantra => "Sri Yantra",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown field type '{}', expected one of: {}",
                    s,
                    FieldType::ALL.map(|f| f.as_str()).join(", ")
                )
            })
    }
}

/// Payload of a broadcast submission
///
/// `frequency` and `multiplier` are NaN when the user text did not parse; serde_json
/// writes non-finite floats as `null`, which is what goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentionRequest {
    pub intention: String,
    pub frequency: f64,
    pub field_type: FieldType,
    pub amplify: bool,
    pub multiplier: f64,
}

/// Server result of a broadcast, kept as the raw JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BroadcastResponse(Value);

impl BroadcastResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Underlying JSON document
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn packet(&self) -> Option<&Value> {
        self.0.get("packet").filter(|packet| !packet.is_null())
    }

    /// `packet.payload`, the server's mirror of the submitted request
    pub fn payload(&self) -> Option<&Value> {
        self.packet()
            .and_then(|packet| packet.get("payload"))
            .filter(|payload| !payload.is_null())
    }

    pub fn payload_intention(&self) -> Option<&str> {
        self.payload()
            .and_then(|payload| payload.get("intention"))
            .and_then(Value::as_str)
    }

    /// Field type as the server reported it; non-string values are rendered as JSON
    pub fn payload_field_type(&self) -> Option<String> {
        match self.payload().and_then(|payload| payload.get("field_type"))? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn payload_frequency(&self) -> Option<f64> {
        self.payload()
            .and_then(|payload| payload.get("frequency"))
            .and_then(Value::as_f64)
    }

    pub fn packet_base64(&self) -> Option<&str> {
        self.0.get("packet_base64").and_then(Value::as_str)
    }
}

impl From<Value> for BroadcastResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Entry of the healing code catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingCode {
    pub code: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affirmation: Option<String>,
}

impl HealingCode {
    /// `CODE: description (category)`
    pub fn display_line(&self) -> String {
        format!("{}: {} ({})", self.code, self.description, self.category)
    }

    /// Affirmation, if the entry carries a non-empty one
    pub fn display_affirmation(&self) -> Option<String> {
        self.affirmation
            .as_deref()
            .filter(|a| !a.is_empty())
            .map(|a| format!("\"{}\"", a))
    }
}

/// Previously stored intention record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoulArchiveEntry {
    pub id: String,
    pub title: String,
    pub intention: String,
    pub pattern_type: String,
    pub frequency: f64,
}

impl SoulArchiveEntry {
    /// Title line and pattern line
    pub fn display_lines(&self) -> [String; 2] {
        [
            format!("{} - {}", self.title, self.intention),
            format!("{} @ {}Hz", self.pattern_type, self.frequency),
        ]
    }
}
