use crate::app_config::AppConfig;
use crate::applesimutils::command::{command_line, run};
use crate::domain::DeviceFilter;
use crate::domain::controller::{ControllerError, DeviceController};
use crate::domain::device::{Device, DeviceId};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// Filter fields applesimutils can search on, with the flag that does it
const LIST_FLAGS: [(&str, &str); 4] = [
    ("udid", "--byId"),
    ("name", "--byName"),
    ("os.version", "--byOS"),
    ("deviceType.name", "--byType"),
];

/// Lists simulators with `applesimutils` and creates them with `xcrun simctl`.
#[derive(Debug)]
pub struct AppleSimUtils {
    config: Arc<AppConfig>,
}

impl AppleSimUtils {
    pub fn new(config: Arc<AppConfig>) -> Self {
        AppleSimUtils { config }
    }
}

#[async_trait]
impl DeviceController for AppleSimUtils {
    #[instrument(skip_all, fields(properties = %properties))]
    async fn create(&self, properties: &DeviceFilter) -> Result<DeviceId, ControllerError> {
        let xcrun = self.config.simulators().xcrun_path();
        let args = create_args(properties)?;

        info!("🆕 Creating simulator...");
        let stdout = run(xcrun, &args, self.config.simulators().command_timeout()).await?;

        let udid = stdout.trim();
        if udid.is_empty() {
            return Err(ControllerError::MissingDeviceId(command_line(xcrun, &args)));
        }

        info!(udid = udid, "🆕 Creating simulator... OK");
        Ok(udid.to_string())
    }

    #[instrument(skip_all, fields(properties = %properties))]
    async fn get_devices_with_properties(&self, properties: &DeviceFilter) -> Result<Vec<Device>, ControllerError> {
        debug!("🔍 Searching for simulators...");
        let stdout = run(
            self.config.simulators().applesimutils_path(),
            &list_args(properties),
            self.config.simulators().command_timeout(),
        )
        .await?;

        let devices = parse_device_list(&stdout)?;
        debug!("🔍 Searching for simulators... OK, {} found", devices.len());

        Ok(devices)
    }
}

fn list_args(properties: &DeviceFilter) -> Vec<String> {
    let mut args = vec!["--list".to_string()];

    for (path, flag) in LIST_FLAGS {
        if let Some(value) = properties.get_str(path) {
            args.push(flag.to_string());
            args.push(value.to_string());
        }
    }

    for path in ignored_paths(properties) {
        warn!("⚠️ applesimutils cannot search on '{}', ignoring it", path);
    }

    args
}

/// Paths of the filter that do not turn into a search flag, either because applesimutils has no flag for them or
/// because their value is not a string.
fn ignored_paths(properties: &DeviceFilter) -> Vec<String> {
    properties
        .leaf_paths()
        .into_iter()
        .filter(|path| !LIST_FLAGS.iter().any(|(flag_path, _)| *flag_path == path.as_str()) || properties.get_str(path).is_none())
        .collect()
}

fn create_args(properties: &DeviceFilter) -> Result<Vec<String>, ControllerError> {
    let name = properties.name().ok_or(ControllerError::MissingProperty("name"))?;
    let device_type = properties
        .get_str("deviceType.identifier")
        .or_else(|| properties.get_str("deviceType.name"))
        .unwrap_or(name);

    let mut args = vec!["simctl".to_string(), "create".to_string(), name.to_string(), device_type.to_string()];
    if let Some(runtime) = properties.get_str("os.identifier") {
        args.push(runtime.to_string());
    }

    Ok(args)
}

fn parse_device_list(stdout: &str) -> Result<Vec<Device>, ControllerError> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_str(stdout)?)
}
