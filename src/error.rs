use std::{ffi::NulError, fmt};

use ash::{prelude::VkResult, vk};

use crate::validation::NameKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The runtime is older than the configured minimum API version.
    #[error("Vulkan {found} is older than the required {required}")]
    VersionUnsupported {
        found: ApiVersion,
        required: ApiVersion,
    },

    #[error("missing {kind}s: {}", .names.join(", "))]
    MissingCapability { kind: NameKind, names: Vec<String> },

    #[error("no physical device found")]
    NoAdapterFound,

    /// No queue family on the adapter can both draw and present to the surface.
    #[error("{adapter} has no graphics queue family with presentation support")]
    UnresolvableQueueFamily { adapter: String },

    #[error("{call} failed: {result}")]
    Native {
        call: &'static str,
        #[source]
        result: vk::Result,
    },

    #[error("failed to load the Vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("invalid name: {0}")]
    InvalidName(#[from] NulError),

    #[error("window system error: {0}")]
    Window(#[from] raw_window_handle::HandleError),

    #[error("unsupported window system: {0}")]
    UnsupportedWindow(&'static str),
}

/// Attaches the name of the native call to a failed `VkResult`.
pub trait NativeResultExt<T> {
    fn native(self, call: &'static str) -> Result<T>;
}

impl<T> NativeResultExt<T> for VkResult<T> {
    fn native(self, call: &'static str) -> Result<T> {
        self.map_err(|result| Error::Native { call, result })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion(pub u32);

impl ApiVersion {
    pub const V1_3: Self = Self(vk::API_VERSION_1_3);

    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self(vk::make_api_version(0, major, minor, patch))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            vk::api_version_major(self.0),
            vk::api_version_minor(self.0),
            vk::api_version_patch(self.0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_version_displays_components() {
        assert_eq!(ApiVersion::new(1, 3, 250).to_string(), "1.3.250");
        assert!(ApiVersion::new(1, 2, 999) < ApiVersion::V1_3);
    }

    #[test]
    fn native_failure_names_the_call() {
        let result: VkResult<()> = Err(vk::Result::ERROR_DEVICE_LOST);
        let error = result.native("vkCreateDevice").unwrap_err();
        assert!(matches!(
            error,
            Error::Native {
                call: "vkCreateDevice",
                result: vk::Result::ERROR_DEVICE_LOST
            }
        ));
    }
}
