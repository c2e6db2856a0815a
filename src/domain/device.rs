use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier (UDID) of a simulator.
pub type DeviceId = String;

/// A simulator as reported by a device controller.
///
/// Only `udid` and `os.version` carry meaning for the registry. Every other field the controller reports
/// ends up in `properties` and survives a serialization round trip unchanged.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udid: Option<DeviceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<DeviceOs>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct DeviceOs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Device {
    pub fn os_version(&self) -> Option<&str> {
        self.os.as_ref().and_then(|os| os.version.as_deref())
    }
}
