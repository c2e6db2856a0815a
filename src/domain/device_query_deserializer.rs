use crate::domain::{DeviceFilter, DeviceQuery};
use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;

impl<'de> Deserialize<'de> for DeviceQuery {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DeviceQueryVisitor)
    }
}

struct DeviceQueryVisitor;

impl<'de> Visitor<'de> for DeviceQueryVisitor {
    type Value = DeviceQuery;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a device name, a \"name, os version\" string or a device filter")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DeviceQuery::parse(value))
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let filter = DeviceFilter::deserialize(MapAccessDeserializer::new(map))?;
        Ok(DeviceQuery::Filter(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_a_name() {
        let query: DeviceQuery = serde_json::from_str(r#""iPhone X""#).unwrap();

        assert_eq!(query, DeviceQuery::NameOnly("iPhone X".to_string()));
    }

    #[test]
    fn deserializes_a_name_and_os_version() {
        let query: DeviceQuery = serde_json::from_str(r#""iPhone X, iOS 11.4""#).unwrap();

        assert_eq!(query.normalize(), DeviceFilter::new().with_name("iPhone X").with_os_version("iOS 11.4"));
    }

    #[test]
    fn deserializes_a_filter() {
        let query: DeviceQuery = serde_json::from_str(r#"{ "udid": "240C26E6-FE33-41A3-8EF0-7858DA2F53B6" }"#).unwrap();

        assert_eq!(
            query,
            DeviceQuery::Filter(DeviceFilter::new().insert("udid", "240C26E6-FE33-41A3-8EF0-7858DA2F53B6"))
        );
    }

    #[test]
    fn rejects_other_kinds() {
        let result = serde_json::from_str::<DeviceQuery>("42");

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("expected a device name"));
    }
}
