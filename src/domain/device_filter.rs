use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// The canonical filter handed to a [`DeviceController`](crate::domain::controller::DeviceController).
///
/// A JSON object of the shape `{ name?, os?: { version }, ...passthrough }`. Keys the registry does not know
/// about are kept as they are, so a filter built by a caller reaches the controller untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceFilter(Map<String, Value>);

impl DeviceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.0.insert("name".to_string(), Value::String(name.into()));
        self
    }

    /// Sets `os.version`, keeping any other fields of an existing `os` object.
    pub fn with_os_version(mut self, version: impl Into<String>) -> Self {
        let version = Value::String(version.into());
        match self.0.get_mut("os") {
            Some(Value::Object(os)) => {
                os.insert("version".to_string(), version);
            }
            _ => {
                let mut os = Map::new();
                os.insert("version".to_string(), version);
                self.0.insert("os".to_string(), Value::Object(os));
            }
        }
        self
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up a string value by a dotted path such as `os.version`.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        let mut segments = path.split('.');
        let first = self.0.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| value.get(segment))?.as_str()
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn os_version(&self) -> Option<&str> {
        self.get_str("os.version")
    }

    pub fn udid(&self) -> Option<&str> {
        self.get_str("udid")
    }

    /// Dotted paths of every value in the filter, descending into non-empty objects.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_leaf_paths(&self.0, "", &mut paths);
        paths
    }
}

fn collect_leaf_paths(map: &Map<String, Value>, prefix: &str, paths: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() { key.clone() } else { format!("{}.{}", prefix, key) };
        match value {
            Value::Object(nested) if !nested.is_empty() => collect_leaf_paths(nested, &path, paths),
            _ => paths.push(path),
        }
    }
}

impl Display for DeviceFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", json)
    }
}
