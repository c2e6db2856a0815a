pub mod app_config;
pub mod applesimutils;
pub mod device_registry;
pub mod domain;
