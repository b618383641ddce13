//! Topology Data Models
//!
//! Diagram input (nodes/edges as submitted by the editor) and the derived
//! `TopologyFacts` snapshot. Input types are lenient: missing or oddly-typed
//! fields fall back to "unknown"/absent instead of failing.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;

use crate::utils::Locale;

// ============================================================================
// Diagram Input
// ============================================================================

/// Device category of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    Router,
    Switch,
    Pc,
    Server,
    Firewall,
    AccessPoint,
    #[default]
    Unknown,
    /// Any category the editor sends that we do not model explicitly
    Other(String),
}

impl DeviceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Router => "router",
            Self::Switch => "switch",
            Self::Pc => "pc",
            Self::Server => "server",
            Self::Firewall => "firewall",
            Self::AccessPoint => "access_point",
            Self::Unknown => "unknown",
            Self::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "router" => Self::Router,
            "switch" => Self::Switch,
            "pc" => Self::Pc,
            "server" => Self::Server,
            "firewall" => Self::Firewall,
            "access_point" => Self::AccessPoint,
            "" | "unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for DeviceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(name) => Self::from_name(&name),
            _ => Self::Unknown,
        })
    }
}

/// A device in the diagram. The typed fields feed pre-analysis; the node
/// serializes back exactly as it was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Option<String>,
    pub device_type: DeviceType,
    /// Everything else the editor attached (label, position, bandwidth, ...)
    pub attributes: Map<String, Value>,
    raw: Value,
}

#[derive(Deserialize)]
struct NodeFields {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "type", default)]
    device_type: DeviceType,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, device_type: DeviceType) -> Self {
        let id = id.into();
        let raw = json!({ "id": id, "type": device_type.as_str() });
        Self { id: Some(id), device_type, attributes: Map::new(), raw }
    }

    /// The node as submitted
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let fields = NodeFields::deserialize(&raw).map_err(<D::Error as de::Error>::custom)?;
        Ok(Self {
            id: fields.id,
            device_type: fields.device_type,
            attributes: fields.attributes,
            raw,
        })
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// A connection between two devices; serializes back as submitted
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub attributes: Map<String, Value>,
    raw: Value,
}

#[derive(Deserialize)]
struct EdgeFields {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    target: Option<String>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let (source, target) = (source.into(), target.into());
        let raw = json!({ "source": source, "target": target });
        Self {
            id: None,
            source: Some(source),
            target: Some(target),
            attributes: Map::new(),
            raw,
        }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl<'de> Deserialize<'de> for Edge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let fields = EdgeFields::deserialize(&raw).map_err(<D::Error as de::Error>::custom)?;
        Ok(Self {
            id: fields.id,
            source: fields.source,
            target: fields.target,
            attributes: fields.attributes,
            raw,
        })
    }
}

impl Serialize for Edge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Accepts strings and numbers as identifiers; anything else is absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================================================
// Derived Facts
// ============================================================================

/// Finding detected during pre-analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyIssue {
    NoDevices,
    DevicesNotConnected,
    DuplicateConnection,
}

impl TopologyIssue {
    pub fn describe(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::NoDevices, Locale::En) => "no devices present",
            (Self::NoDevices, Locale::Th) => "ไม่มีอุปกรณ์ในแผนผังเครือข่าย",
            (Self::DevicesNotConnected, Locale::En) => "devices are not connected",
            (Self::DevicesNotConnected, Locale::Th) => "อุปกรณ์ไม่มีการเชื่อมต่อกัน",
            (Self::DuplicateConnection, Locale::En) => "duplicate connection detected",
            (Self::DuplicateConnection, Locale::Th) => "มีการเชื่อมต่อซ้ำซ้อน",
        }
    }
}

/// Baseline advice attached to every analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    VerifyDeviceConfiguration,
    ReviewLinkPerformance,
}

impl Recommendation {
    pub fn describe(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::VerifyDeviceConfiguration, Locale::En) => "verify device configuration",
            (Self::VerifyDeviceConfiguration, Locale::Th) => {
                "ตรวจสอบให้แน่ใจว่าอุปกรณ์ทั้งหมดมีการตั้งค่าที่เหมาะสม"
            },
            (Self::ReviewLinkPerformance, Locale::En) => {
                "review bandwidth and latency of connections"
            },
            (Self::ReviewLinkPerformance, Locale::Th) => {
                "ตรวจสอบ bandwidth และ latency ของการเชื่อมต่อ"
            },
        }
    }
}

macro_rules! english_text_impls {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.describe(Locale::En))
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.describe(Locale::En))
            }
        }
    )*};
}

english_text_impls!(TopologyIssue, Recommendation);

/// Structured summary of a diagram, built once per analysis request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyFacts {
    device_count: usize,
    connection_count: usize,
    device_types: BTreeMap<String, usize>,
    potential_issues: Vec<TopologyIssue>,
    recommendations: Vec<Recommendation>,
}

impl TopologyFacts {
    pub(super) fn new(
        device_count: usize,
        connection_count: usize,
        device_types: BTreeMap<String, usize>,
        potential_issues: Vec<TopologyIssue>,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        Self { device_count, connection_count, device_types, potential_issues, recommendations }
    }

    pub fn device_count(&self) -> usize {
        self.device_count
    }

    pub fn connection_count(&self) -> usize {
        self.connection_count
    }

    pub fn device_types(&self) -> &BTreeMap<String, usize> {
        &self.device_types
    }

    pub fn potential_issues(&self) -> &[TopologyIssue] {
        &self.potential_issues
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }
}
