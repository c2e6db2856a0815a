pub mod controller;
pub mod device;
mod device_filter;
mod device_query;
mod device_query_deserializer;
pub mod runtime_version;

pub use device_filter::DeviceFilter;
pub use device_query::DeviceQuery;
