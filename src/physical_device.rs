use ash::{extensions::khr, vk};
use log::{debug, warn};

use crate::{
    capability::Capability,
    driver::Driver,
    error::{NativeResultExt, Result},
    queue::{resolve_queue_families, QueueFamilyIndices},
    validation::{self, NameKind},
    vulkan::raw_name,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamily {
    pub index: u32,
    pub queue_count: u32,
    pub capabilities: Capability,
}

#[derive(Debug, Clone, Default)]
pub struct SwapchainSupportDetails {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupportDetails {
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Ordering key for adapters: the device type dominates, the 2D image limit breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Score {
    pub type_bonus: u32,
    pub max_image_dimension: u32,
}

impl Score {
    pub const DISCRETE_BONUS: u32 = 1000;
    pub const INTEGRATED_BONUS: u32 = 10;

    pub fn new(properties: &vk::PhysicalDeviceProperties) -> Self {
        let type_bonus = match properties.device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => Self::DISCRETE_BONUS,
            vk::PhysicalDeviceType::INTEGRATED_GPU => Self::INTEGRATED_BONUS,
            _ => 0,
        };
        Self {
            type_bonus,
            max_image_dimension: properties.limits.max_image_dimension2_d,
        }
    }

    /// Bonus and limit summed, for diagnostics.
    pub fn total(&self) -> u64 {
        u64::from(self.type_bonus) + u64::from(self.max_image_dimension)
    }
}

/// Extensions an adapter must expose to be considered ideal.
pub fn required_device_extensions() -> [&'static std::ffi::CStr; 1] {
    [khr::Swapchain::name()]
}

/// Everything learned about one adapter while evaluating it.
#[derive(Debug, Clone)]
pub struct PhysicalDevice {
    pub handle: vk::PhysicalDevice,
    pub name: String,
    pub properties: vk::PhysicalDeviceProperties,
    pub features: vk::PhysicalDeviceFeatures,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub queue_families: Vec<QueueFamily>,
    /// `None` when no family can both draw and present to the surface.
    pub queue_family_indices: Option<QueueFamilyIndices>,
    pub swapchain_support: SwapchainSupportDetails,
    pub extensions_supported: bool,
    pub suitable: bool,
    pub score: Score,
}

impl PhysicalDevice {
    pub fn query<D: Driver>(
        driver: &D,
        handle: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Self> {
        let properties = driver
            .adapter_properties(handle)
            .native("vkGetPhysicalDeviceProperties")?;
        let features = driver
            .adapter_features(handle)
            .native("vkGetPhysicalDeviceFeatures")?;
        let memory_properties = driver
            .adapter_memory_properties(handle)
            .native("vkGetPhysicalDeviceMemoryProperties")?;
        let name = raw_name(&properties.device_name);

        let queue_families: Vec<QueueFamily> = driver
            .queue_family_properties(handle)
            .native("vkGetPhysicalDeviceQueueFamilyProperties")?
            .iter()
            .enumerate()
            .map(|(index, properties)| QueueFamily {
                index: index as u32,
                queue_count: properties.queue_count,
                capabilities: Capability::from_queue_flags(properties.queue_flags),
            })
            .collect();

        let available_extensions = driver
            .device_extensions(handle)
            .native("vkEnumerateDeviceExtensionProperties")?;
        let extensions_supported = validation::is_supported(
            NameKind::DeviceExtension,
            &required_device_extensions(),
            &available_extensions,
        );

        let queue_family_indices = resolve_queue_families(&queue_families, |index| {
            driver
                .surface_support(handle, index, surface)
                .native("vkGetPhysicalDeviceSurfaceSupportKHR")
        })?;
        if queue_family_indices.is_none() {
            warn!("Rejecting {name}: no graphics queue family with presentation support");
        }

        let swapchain_support = query_swapchain_support(driver, handle, &queue_families, surface)?;
        let anisotropy = features.sampler_anisotropy == vk::TRUE;
        let suitable = extensions_supported
            && swapchain_support.is_adequate()
            && anisotropy
            && queue_family_indices.is_some();
        let score = Score::new(&properties);

        debug!(
            "Evaluated {name}: type {:?}, score {}, suitable {suitable}",
            properties.device_type,
            score.total()
        );

        Ok(Self {
            handle,
            name,
            properties,
            features,
            memory_properties,
            queue_families,
            queue_family_indices,
            swapchain_support,
            extensions_supported,
            suitable,
            score,
        })
    }

    pub fn queue_family(&self, index: u32) -> Option<&QueueFamily> {
        self.queue_families
            .iter()
            .find(|queue_family| queue_family.index == index)
    }

    pub fn supports_anisotropy(&self) -> bool {
        self.features.sampler_anisotropy == vk::TRUE
    }
}

/// Surface limits, formats and present modes, or nothing if no family can present.
pub fn query_swapchain_support<D: Driver>(
    driver: &D,
    adapter: vk::PhysicalDevice,
    queue_families: &[QueueFamily],
    surface: vk::SurfaceKHR,
) -> Result<SwapchainSupportDetails> {
    let mut presentation_supported = false;
    for queue_family in queue_families {
        if driver
            .surface_support(adapter, queue_family.index, surface)
            .native("vkGetPhysicalDeviceSurfaceSupportKHR")?
        {
            debug!("Queue family {} supports presentation", queue_family.index);
            presentation_supported = true;
        }
    }
    if !presentation_supported {
        warn!("Physical device doesn't support presentation for this surface");
        return Ok(SwapchainSupportDetails::default());
    }

    Ok(SwapchainSupportDetails {
        capabilities: driver
            .surface_capabilities(adapter, surface)
            .native("vkGetPhysicalDeviceSurfaceCapabilitiesKHR")?,
        formats: driver
            .surface_formats(adapter, surface)
            .native("vkGetPhysicalDeviceSurfaceFormatsKHR")?,
        present_modes: driver
            .surface_present_modes(adapter, surface)
            .native("vkGetPhysicalDeviceSurfacePresentModesKHR")?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdapterId(usize);

impl AdapterId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Evaluated adapters, addressed by [`AdapterId`].
#[derive(Debug, Default)]
pub struct AdapterArena {
    records: Vec<PhysicalDevice>,
}

impl AdapterArena {
    pub fn insert(&mut self, record: PhysicalDevice) -> AdapterId {
        self.records.push(record);
        AdapterId(self.records.len() - 1)
    }

    pub fn get(&self, id: AdapterId) -> Option<&PhysicalDevice> {
        self.records.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AdapterId, &PhysicalDevice)> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| (AdapterId(index), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
