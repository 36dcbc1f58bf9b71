use crate::error::ApiVersion;

/// Settings threaded through instance bootstrap and device creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    pub application_name: String,
    pub engine_name: String,
    /// Oldest runtime version bootstrap accepts; also requested from the instance.
    pub api_version: ApiVersion,
    /// Enables the validation layer and the debug messenger.
    pub validation: bool,
    /// Enables portability enumeration and the portability subset device extension.
    pub portability: bool,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            application_name: "vkinit".to_owned(),
            engine_name: "vkinit".to_owned(),
            api_version: ApiVersion::V1_3,
            validation: cfg!(debug_assertions),
            portability: cfg!(any(target_os = "macos", target_os = "ios")),
        }
    }
}

impl InstanceConfig {
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    pub fn engine_name(mut self, name: impl Into<String>) -> Self {
        self.engine_name = name.into();
        self
    }

    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    pub fn validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }

    pub fn portability(mut self, enabled: bool) -> Self {
        self.portability = enabled;
        self
    }
}
