use crate::domain::DeviceFilter;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// What a caller asks the registry for.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceQuery {
    /// `"iPhone X"`
    NameOnly(String),
    /// `"iPhone X, iOS 11.4"`
    NameAndOsVersion { name: String, os_version: String },
    /// A filter that is forwarded as it is, e.g. `{ "udid": "..." }`
    Filter(DeviceFilter),
}

impl DeviceQuery {
    /// Parses the shorthand notation, splitting on the first comma only.
    pub fn parse(query: &str) -> Self {
        match query.split_once(',') {
            Some((name, os_version)) => DeviceQuery::NameAndOsVersion {
                name: name.to_string(),
                os_version: os_version.to_string(),
            },
            None => DeviceQuery::NameOnly(query.to_string()),
        }
    }

    /// Converts the query into the filter a controller understands. Names and versions are trimmed, a filter is
    /// returned unchanged.
    pub fn normalize(self) -> DeviceFilter {
        match self {
            DeviceQuery::NameOnly(name) => DeviceFilter::new().with_name(name.trim()),
            DeviceQuery::NameAndOsVersion { name, os_version } => DeviceFilter::new().with_name(name.trim()).with_os_version(os_version.trim()),
            DeviceQuery::Filter(filter) => filter,
        }
    }
}

impl FromStr for DeviceQuery {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DeviceQuery::parse(s))
    }
}

impl From<&str> for DeviceQuery {
    fn from(query: &str) -> Self {
        DeviceQuery::parse(query)
    }
}

impl From<DeviceFilter> for DeviceQuery {
    fn from(filter: DeviceFilter) -> Self {
        DeviceQuery::Filter(filter)
    }
}

impl Display for DeviceQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceQuery::NameOnly(name) => write!(f, "{}", name.trim()),
            DeviceQuery::NameAndOsVersion { name, os_version } => write!(f, "{}, {}", name.trim(), os_version.trim()),
            DeviceQuery::Filter(filter) => write!(f, "{}", filter),
        }
    }
}
