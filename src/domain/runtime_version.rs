use crate::domain::device::Device;

// Every component below the major one gets three decimal digits in the ordinal.
const COMPONENT_BASE: u64 = 1_000;
const MAX_COMPONENT: u64 = COMPONENT_BASE - 1;

/// Returns a sort key for the OS runtime of a device, `0` when the device has no `os.version`.
///
/// `"11.4.10"` becomes `11_004_010`, so comparing ordinals compares versions component by component.
pub fn runtime_version(device: &Device) -> u64 {
    device.os_version().map(version_ordinal).unwrap_or(0)
}

/// Packs `major.minor.patch` into a single integer. Never fails: a prefix such as `"iOS "` is skipped, missing or
/// non-numeric components count as `0` and anything after the patch component is ignored.
pub fn version_ordinal(version: &str) -> u64 {
    let numeric = version.trim_start_matches(|c: char| !c.is_ascii_digit());
    let mut components = numeric.split('.').map(component_value);

    let major = components.next().unwrap_or(0);
    let minor = components.next().unwrap_or(0).min(MAX_COMPONENT);
    let patch = components.next().unwrap_or(0).min(MAX_COMPONENT);

    major * COMPONENT_BASE * COMPONENT_BASE + minor * COMPONENT_BASE + patch
}

fn component_value(component: &str) -> u64 {
    let digits_end = component.find(|c: char| !c.is_ascii_digit()).unwrap_or(component.len());
    let digits = &component[..digits_end];
    if digits.is_empty() {
        return 0;
    }

    // Only overflow can fail here
    digits.parse::<u32>().map(u64::from).unwrap_or(u64::from(u32::MAX))
}

/// Stable ascending sort by runtime version.
pub fn sort_by_runtime_version(devices: &mut [Device]) {
    devices.sort_by_key(runtime_version);
}

/// The device running the newest runtime, the first one on a tie.
pub fn newest_runtime<'a>(devices: impl IntoIterator<Item = &'a Device>) -> Option<&'a Device> {
    devices.into_iter().fold(None, |newest, device| match newest {
        Some(newest) if runtime_version(newest) >= runtime_version(device) => Some(newest),
        _ => Some(device),
    })
}
