use std::ffi::{CStr, CString};

use ash::{extensions::ext, vk};
use log::{error, info};

use crate::{
    capability::GraphicsApi,
    config::InstanceConfig,
    driver::{Driver, InstanceDesc, MessengerDesc},
    error::{ApiVersion, Error, NativeResultExt, Result},
    validation::{self, NameKind},
    vulkan::VulkanDriver,
};

pub const VALIDATION_LAYER: &CStr =
    unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_LAYER_KHRONOS_validation\0") };

/// A live API instance. Dropping it destroys the debug messenger, then the instance.
pub struct Instance<D: Driver = VulkanDriver> {
    driver: D,
    config: InstanceConfig,
    version: ApiVersion,
    messenger: bool,
}

impl<D: Driver> Instance<D> {
    pub fn new(mut driver: D, config: &InstanceConfig, window_extensions: &[&CStr]) -> Result<Self> {
        let version = ApiVersion(
            driver
                .instance_version()
                .native("vkEnumerateInstanceVersion")?,
        );
        info!("Vulkan instance version: {version}");
        if version < config.api_version {
            error!(
                "Vulkan instance doesn't support requested version {}",
                config.api_version
            );
            return Err(Error::VersionUnsupported {
                found: version,
                required: config.api_version,
            });
        }

        let mut extensions: Vec<&CStr> = Vec::with_capacity(window_extensions.len() + 2);
        for &name in window_extensions {
            push_unique(&mut extensions, name);
        }
        let mut layers: Vec<&CStr> = Vec::new();
        let mut flags = vk::InstanceCreateFlags::empty();
        if config.validation {
            info!("Validation layers are enabled");
            push_unique(&mut extensions, ext::DebugUtils::name());
            layers.push(VALIDATION_LAYER);
        }
        if config.portability {
            push_unique(&mut extensions, vk::KhrPortabilityEnumerationFn::name());
            flags |= vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
        }

        let available_extensions = driver
            .instance_extensions()
            .native("vkEnumerateInstanceExtensionProperties")?;
        let available_layers = driver
            .instance_layers()
            .native("vkEnumerateInstanceLayerProperties")?;
        let missing_extensions = validation::missing_names(
            NameKind::InstanceExtension,
            &extensions,
            &available_extensions,
        );
        let missing_layers =
            validation::missing_names(NameKind::InstanceLayer, &layers, &available_layers);
        if !missing_extensions.is_empty() || !missing_layers.is_empty() {
            error!("Some of the extensions and/or layers are not supported by this runtime");
            return Err(if missing_extensions.is_empty() {
                Error::MissingCapability {
                    kind: NameKind::InstanceLayer,
                    names: missing_layers,
                }
            } else {
                Error::MissingCapability {
                    kind: NameKind::InstanceExtension,
                    names: missing_extensions,
                }
            });
        }

        info!(
            "Enabling extensions ({}): {}",
            extensions.len(),
            join_names(&extensions)
        );
        if !layers.is_empty() {
            info!("Enabling layers ({}): {}", layers.len(), join_names(&layers));
        }

        let application_name = CString::new(config.application_name.as_str())?;
        let engine_name = CString::new(config.engine_name.as_str())?;
        let messenger = config.validation.then(MessengerDesc::default);
        driver
            .create_instance(&InstanceDesc {
                application_name: &application_name,
                engine_name: &engine_name,
                api_version: config.api_version.0,
                flags,
                layers: &layers,
                extensions: &extensions,
                messenger,
            })
            .native("vkCreateInstance")?;
        info!("Vulkan instance created");

        // From here on a failure drops `instance`, which destroys what exists so far.
        let mut instance = Self {
            driver,
            config: config.clone(),
            version,
            messenger: false,
        };
        if let Some(desc) = messenger {
            instance
                .driver
                .create_debug_messenger(&desc)
                .native("vkCreateDebugUtilsMessengerEXT")?;
            instance.messenger = true;
            info!("Vulkan validation messenger created");
        }
        Ok(instance)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    /// Version reported by the runtime, not the one requested.
    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn has_debug_messenger(&self) -> bool {
        self.messenger
    }

    pub fn graphics_api(&self) -> GraphicsApi {
        self.driver.api()
    }
}

impl<D: Driver> Drop for Instance<D> {
    fn drop(&mut self) {
        if self.messenger {
            self.driver.destroy_debug_messenger();
        }
        self.driver.destroy_instance();
        info!("Vulkan instance destroyed");
    }
}

fn push_unique<'a>(names: &mut Vec<&'a CStr>, name: &'a CStr) {
    if !names.contains(&name) {
        names.push(name);
    }
}

fn join_names(names: &[&CStr]) -> String {
    names
        .iter()
        .map(|name| name.to_string_lossy())
        .collect::<Vec<_>>()
        .join(", ")
}
