use std::{ffi::CStr, fmt};

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    InstanceExtension,
    InstanceLayer,
    DeviceExtension,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameKind::InstanceExtension => "instance extension",
            NameKind::InstanceLayer => "instance layer",
            NameKind::DeviceExtension => "device extension",
        })
    }
}

/// Returns every requested name the runtime does not advertise, in request order.
///
/// Each missing name is logged; the scan always covers the whole request.
pub fn missing_names(kind: NameKind, requested: &[&CStr], available: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| {
            !available
                .iter()
                .any(|candidate| candidate.as_bytes() == name.to_bytes())
        })
        .map(|name| {
            let name = name.to_string_lossy().into_owned();
            warn!("{kind} {name} is not supported");
            name
        })
        .collect()
}

pub fn is_supported(kind: NameKind, requested: &[&CStr], available: &[String]) -> bool {
    missing_names(kind, requested, available).is_empty()
}
