use crate::domain::DeviceFilter;
use crate::domain::device::{Device, DeviceId};
use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::string::FromUtf8Error;
use std::time::Duration;
use thiserror::Error;

/// The tool that actually creates and lists simulators.
#[async_trait]
pub trait DeviceController: Debug + Send + Sync {
    /// Provisions a new device matching `properties` and returns its id.
    async fn create(&self, properties: &DeviceFilter) -> Result<DeviceId, ControllerError>;

    /// Lists the devices matching `properties`, in whatever order the tool reports them.
    async fn get_devices_with_properties(&self, properties: &DeviceFilter) -> Result<Vec<Device>, ControllerError>;
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("missing required device property '{0}'")]
    MissingProperty(&'static str),
    #[error("unable to run '{command}': {source}")]
    Spawn { command: String, source: io::Error },
    #[error("'{command}' did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("'{command}' failed with exit code {code:?}: {stderr}")]
    CommandFailed { command: String, code: Option<i32>, stderr: String },
    #[error("'{command}' wrote invalid UTF-8: {source}")]
    InvalidUtf8 { command: String, source: FromUtf8Error },
    #[error("unable to parse the device list: {0}")]
    InvalidDeviceList(#[from] serde_json::Error),
    #[error("'{0}' did not return a device id")]
    MissingDeviceId(String),
}
