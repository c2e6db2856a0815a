use crate::domain::controller::{ControllerError, DeviceController};
use crate::domain::device::{Device, DeviceId};
use crate::domain::runtime_version::{newest_runtime, runtime_version};
use crate::domain::{DeviceFilter, DeviceQuery};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Turns device queries into simulators by asking a [`DeviceController`].
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    controller: Arc<dyn DeviceController>,
}

impl DeviceRegistry {
    pub fn new(controller: Arc<dyn DeviceController>) -> Self {
        DeviceRegistry { controller }
    }

    pub fn normalize(query: impl Into<DeviceQuery>) -> DeviceFilter {
        DeviceQuery::normalize(query.into())
    }

    /// Finds the device matching `query` that runs the newest runtime. Devices the controller reports without a
    /// UDID cannot be handed out and are skipped.
    #[instrument(skip_all)]
    pub async fn acquire_device(&self, query: impl Into<DeviceQuery>) -> Result<DeviceId, RegistryError> {
        let filter = Self::normalize(query);
        info!(%filter, "📱 Acquiring device...");

        let devices = self.get_devices_with_properties(&filter).await?;
        debug!(%filter, "📱 Found {} matching device(s)", devices.len());

        let newest = newest_runtime(devices.iter().filter(|device| device.udid.is_some()));
        let Some((device, udid)) = newest.and_then(|device| device.udid.clone().map(|udid| (device, udid))) else {
            warn!(%filter, "⚠️ No device matches the query");
            return Err(RegistryError::NoMatchingDevice(filter));
        };

        info!(
            udid = udid,
            "📱 Acquiring device... OK, '{}' running {}",
            device.name.as_deref().unwrap_or("unnamed"),
            device.os_version().unwrap_or("an unknown runtime")
        );

        Ok(udid)
    }

    #[instrument(skip_all, fields(properties = %properties))]
    pub async fn create_device_with_properties(&self, properties: &DeviceFilter) -> Result<DeviceId, RegistryError> {
        debug!("🆕 Creating device...");
        let udid = self.controller.create(properties).await.map_err(RegistryError::DeviceCreationFailed)?;
        info!(udid = udid, "🆕 Creating device... OK");

        Ok(udid)
    }

    #[instrument(skip_all, fields(properties = %properties))]
    pub async fn get_devices_with_properties(&self, properties: &DeviceFilter) -> Result<Vec<Device>, RegistryError> {
        self.controller
            .get_devices_with_properties(properties)
            .await
            .map_err(RegistryError::DeviceQueryFailed)
    }

    /// Sort key for the OS runtime of `device`, see [`runtime_version`].
    pub fn get_runtime_version(device: &Device) -> u64 {
        runtime_version(device)
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("unable to query devices: {0}")]
    DeviceQueryFailed(#[source] ControllerError),
    #[error("unable to create device: {0}")]
    DeviceCreationFailed(#[source] ControllerError),
    #[error("no device matches {0}")]
    NoMatchingDevice(DeviceFilter),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::DeviceOs;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;
    use test_log::test;

    #[derive(Debug, Default)]
    struct FakeController {
        devices: Vec<Device>,
        created_udid: Option<DeviceId>,
        queries: Mutex<Vec<DeviceFilter>>,
        creations: Mutex<Vec<DeviceFilter>>,
    }

    impl FakeController {
        fn with_devices(devices: Vec<Device>) -> Self {
            FakeController { devices, ..FakeController::default() }
        }

        fn with_created_udid(udid: &str) -> Self {
            FakeController {
                created_udid: Some(udid.to_string()),
                ..FakeController::default()
            }
        }

        fn queries(&self) -> Vec<DeviceFilter> {
            self.queries.lock().unwrap().clone()
        }

        fn creations(&self) -> Vec<DeviceFilter> {
            self.creations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeviceController for FakeController {
        async fn create(&self, properties: &DeviceFilter) -> Result<DeviceId, ControllerError> {
            self.creations.lock().unwrap().push(properties.clone());
            self.created_udid.clone().ok_or(ControllerError::MissingProperty("name"))
        }

        async fn get_devices_with_properties(&self, properties: &DeviceFilter) -> Result<Vec<Device>, ControllerError> {
            self.queries.lock().unwrap().push(properties.clone());
            Ok(self.devices.clone())
        }
    }

    #[derive(Debug)]
    struct FailingController;

    #[async_trait]
    impl DeviceController for FailingController {
        async fn create(&self, _properties: &DeviceFilter) -> Result<DeviceId, ControllerError> {
            Err(ControllerError::CommandFailed {
                command: "xcrun simctl create".to_string(),
                code: Some(1),
                stderr: "Invalid device type".to_string(),
            })
        }

        async fn get_devices_with_properties(&self, _properties: &DeviceFilter) -> Result<Vec<Device>, ControllerError> {
            Err(ControllerError::MissingDeviceId("applesimutils --list".to_string()))
        }
    }

    fn device(udid: Option<&str>, version: &str) -> Device {
        Device {
            udid: udid.map(str::to_string),
            name: Some("iPhone X".to_string()),
            os: Some(DeviceOs {
                version: Some(version.to_string()),
                ..DeviceOs::default()
            }),
            ..Device::default()
        }
    }

    fn registry(controller: &Arc<FakeController>) -> DeviceRegistry {
        DeviceRegistry::new(controller.clone())
    }

    #[test(tokio::test)]
    async fn acquire_device_converts_a_string_to_a_name() {
        let controller = Arc::new(FakeController::default());

        let _ = registry(&controller).acquire_device("iPhone X").await;

        assert_eq!(controller.queries(), vec![DeviceFilter::new().with_name("iPhone X")]);
    }

    #[test(tokio::test)]
    async fn acquire_device_converts_two_strings_to_a_name_and_os_version() {
        let controller = Arc::new(FakeController::default());

        let _ = registry(&controller).acquire_device("iPhone X, iOS 11.4").await;

        let queries = controller.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(serde_json::to_value(&queries[0]).unwrap(), json!({ "name": "iPhone X", "os": { "version": "iOS 11.4" } }));
    }

    #[test(tokio::test)]
    async fn acquire_device_passes_through_a_filter() {
        let controller = Arc::new(FakeController::default());
        let filter = DeviceFilter::new().insert("udid", "240C26E6-FE33-41A3-8EF0-7858DA2F53B6");

        let _ = registry(&controller).acquire_device(filter.clone()).await;

        assert_eq!(controller.queries(), vec![filter]);
    }

    #[test(tokio::test)]
    async fn acquire_device_returns_the_device_with_the_newest_runtime() {
        let controller = Arc::new(FakeController::with_devices(vec![
            device(Some("A"), "11.4.10"),
            device(Some("B"), "11.10.1"),
            device(Some("C"), "9.1.1"),
        ]));

        let udid = registry(&controller).acquire_device("iPhone X").await;

        assert_eq!(udid.unwrap(), "B");
    }

    #[test(tokio::test)]
    async fn acquire_device_skips_devices_without_a_udid() {
        let controller = Arc::new(FakeController::with_devices(vec![device(Some("A"), "11.4"), device(None, "12.0")]));

        let udid = registry(&controller).acquire_device("iPhone X").await;

        assert_eq!(udid.unwrap(), "A");
    }

    #[test(tokio::test)]
    async fn acquire_device_fails_when_nothing_matches() {
        let controller = Arc::new(FakeController::default());

        let result = registry(&controller).acquire_device("iPhone X").await;

        assert!(matches!(result, Err(RegistryError::NoMatchingDevice(filter)) if filter.name() == Some("iPhone X")));
        assert!(controller.creations().is_empty(), "a device must not be created implicitly");
    }

    #[test(tokio::test)]
    async fn acquire_device_wraps_controller_failures() {
        let registry = DeviceRegistry::new(Arc::new(FailingController));

        let result = registry.acquire_device("iPhone X").await;

        assert!(matches!(result, Err(RegistryError::DeviceQueryFailed(ControllerError::MissingDeviceId(_)))));
    }

    #[test(tokio::test)]
    async fn create_device_with_properties_delegates_to_the_controller() {
        let controller = Arc::new(FakeController::with_created_udid("UDID"));
        let properties = DeviceFilter::new();

        let udid = registry(&controller).create_device_with_properties(&properties).await;

        assert_eq!(udid.unwrap(), "UDID");
        assert_eq!(controller.creations(), vec![properties]);
    }

    #[test(tokio::test)]
    async fn create_device_with_properties_wraps_controller_failures() {
        let registry = DeviceRegistry::new(Arc::new(FailingController));

        let result = registry.create_device_with_properties(&DeviceFilter::new().with_name("iPhone X")).await;

        match result {
            Err(RegistryError::DeviceCreationFailed(ControllerError::CommandFailed { stderr, .. })) => assert_eq!(stderr, "Invalid device type"),
            other => panic!("Expected a DeviceCreationFailed error, found {:?}", other),
        }
    }

    #[test(tokio::test)]
    async fn get_devices_with_properties_delegates_to_the_controller() {
        let devices = vec![device(Some("A"), "11.4")];
        let controller = Arc::new(FakeController::with_devices(devices.clone()));
        let properties = DeviceFilter::new();

        let result = registry(&controller).get_devices_with_properties(&properties).await;

        assert_eq!(result.unwrap(), devices);
        assert_eq!(controller.queries(), vec![properties]);
    }

    #[test(tokio::test)]
    async fn get_devices_with_properties_wraps_controller_failures() {
        let registry = DeviceRegistry::new(Arc::new(FailingController));

        let result = registry.get_devices_with_properties(&DeviceFilter::new().with_name("iPhone X")).await;

        assert!(matches!(result, Err(RegistryError::DeviceQueryFailed(ControllerError::MissingDeviceId(command))) if command == "applesimutils --list"));
    }

    #[test]
    fn get_runtime_version_works_as_a_sort_key() {
        let ascending = ["0", "9", "11.4.1", "11.4.10", "11.10.1"].map(|version| device(None, version)).to_vec();
        let mut devices = ascending.iter().rev().cloned().collect::<Vec<_>>();

        devices.sort_by_key(DeviceRegistry::get_runtime_version);

        assert_eq!(devices, ascending);
    }

    #[test]
    fn get_runtime_version_returns_0_without_a_version() {
        assert_eq!(DeviceRegistry::get_runtime_version(&Device::default()), 0);
    }
}
