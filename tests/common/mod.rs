//! In-memory driver that answers native queries from canned adapter
//! descriptions and records every create/destroy call.

#![allow(dead_code)]

use std::{cell::RefCell, ffi::c_char, rc::Rc};

use ash::{
    prelude::VkResult,
    vk::{self, Handle},
};
use vkinit::{
    driver::{DeviceDesc, DeviceDriver, Driver, InstanceDesc, MessengerDesc},
    GraphicsApi,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateInstance {
        extensions: Vec<String>,
        layers: Vec<String>,
        flags: vk::InstanceCreateFlags,
        messenger: bool,
    },
    CreateDebugMessenger,
    DestroyDebugMessenger,
    DestroyInstance,
    CreateDevice {
        adapter: String,
        families: Vec<u32>,
        extensions: Vec<String>,
        anisotropy: bool,
        dynamic_rendering: bool,
    },
    DestroyDevice,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, Clone, Copy)]
pub struct FakeFamily {
    pub flags: vk::QueueFlags,
    pub queue_count: u32,
    pub present: bool,
}

impl FakeFamily {
    pub fn new(flags: vk::QueueFlags, queue_count: u32) -> Self {
        Self {
            flags,
            queue_count,
            present: flags.contains(vk::QueueFlags::GRAPHICS),
        }
    }

    pub fn without_present(mut self) -> Self {
        self.present = false;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeAdapter {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub max_image_dimension: u32,
    pub anisotropy: bool,
    pub families: Vec<FakeFamily>,
    pub extensions: Vec<String>,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl FakeAdapter {
    pub fn new(name: &str, device_type: vk::PhysicalDeviceType, max_image_dimension: u32) -> Self {
        Self {
            name: name.to_owned(),
            device_type,
            max_image_dimension,
            anisotropy: true,
            families: vec![FakeFamily::new(
                vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
                16,
            )],
            extensions: vec!["VK_KHR_swapchain".to_owned()],
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO],
        }
    }

    pub fn discrete(name: &str, max_image_dimension: u32) -> Self {
        Self::new(name, vk::PhysicalDeviceType::DISCRETE_GPU, max_image_dimension)
    }

    pub fn integrated(name: &str, max_image_dimension: u32) -> Self {
        Self::new(name, vk::PhysicalDeviceType::INTEGRATED_GPU, max_image_dimension)
    }

    pub fn without_anisotropy(mut self) -> Self {
        self.anisotropy = false;
        self
    }

    pub fn without_extensions(mut self) -> Self {
        self.extensions.clear();
        self
    }

    pub fn without_present_modes(mut self) -> Self {
        self.present_modes.clear();
        self
    }

    pub fn with_families(mut self, families: Vec<FakeFamily>) -> Self {
        self.families = families;
        self
    }

    fn properties(&self) -> vk::PhysicalDeviceProperties {
        let mut properties = vk::PhysicalDeviceProperties {
            device_type: self.device_type,
            ..Default::default()
        };
        properties.limits.max_image_dimension2_d = self.max_image_dimension;
        for (dst, src) in properties.device_name.iter_mut().zip(self.name.bytes()) {
            *dst = src as c_char;
        }
        properties
    }
}

pub struct FakeDriver {
    pub version: u32,
    pub instance_extensions: Vec<String>,
    pub layers: Vec<String>,
    pub adapters: Vec<FakeAdapter>,
    /// Name of the native call that should fail with `ERROR_INITIALIZATION_FAILED`.
    pub fail_on: Option<&'static str>,
    pub calls: CallLog,
}

impl FakeDriver {
    pub fn new(adapters: Vec<FakeAdapter>) -> Self {
        Self {
            version: vk::API_VERSION_1_3,
            instance_extensions: vec![
                "VK_KHR_surface".to_owned(),
                "VK_KHR_xlib_surface".to_owned(),
                "VK_EXT_debug_utils".to_owned(),
                "VK_KHR_portability_enumeration".to_owned(),
            ],
            layers: vec!["VK_LAYER_KHRONOS_validation".to_owned()],
            adapters,
            fail_on: None,
            calls: CallLog::default(),
        }
    }

    pub fn failing_on(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    fn check(&self, call: &'static str) -> VkResult<()> {
        match self.fail_on {
            Some(failing) if failing == call => Err(vk::Result::ERROR_INITIALIZATION_FAILED),
            _ => Ok(()),
        }
    }

    fn adapter(&self, handle: vk::PhysicalDevice) -> VkResult<&FakeAdapter> {
        let index = handle.as_raw().wrapping_sub(1) as usize;
        self.adapters
            .get(index)
            .ok_or(vk::Result::ERROR_DEVICE_LOST)
    }
}

pub fn surface() -> vk::SurfaceKHR {
    vk::SurfaceKHR::from_raw(0x5)
}

pub fn queue_handle(family_index: u32) -> vk::Queue {
    vk::Queue::from_raw(0x100 + u64::from(family_index))
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl Driver for FakeDriver {
    type Device = FakeDevice;

    fn api(&self) -> GraphicsApi {
        GraphicsApi::Vulkan
    }

    fn instance_version(&self) -> VkResult<u32> {
        self.check("instance_version")?;
        Ok(self.version)
    }

    fn instance_extensions(&self) -> VkResult<Vec<String>> {
        self.check("instance_extensions")?;
        Ok(self.instance_extensions.clone())
    }

    fn instance_layers(&self) -> VkResult<Vec<String>> {
        self.check("instance_layers")?;
        Ok(self.layers.clone())
    }

    fn create_instance(&mut self, desc: &InstanceDesc<'_>) -> VkResult<()> {
        self.check("create_instance")?;
        self.calls.borrow_mut().push(Call::CreateInstance {
            extensions: desc
                .extensions
                .iter()
                .map(|name| name.to_string_lossy().into_owned())
                .collect(),
            layers: desc
                .layers
                .iter()
                .map(|name| name.to_string_lossy().into_owned())
                .collect(),
            flags: desc.flags,
            messenger: desc.messenger.is_some(),
        });
        Ok(())
    }

    fn create_debug_messenger(&mut self, _desc: &MessengerDesc) -> VkResult<()> {
        self.check("create_debug_messenger")?;
        self.calls.borrow_mut().push(Call::CreateDebugMessenger);
        Ok(())
    }

    fn destroy_debug_messenger(&mut self) {
        self.calls.borrow_mut().push(Call::DestroyDebugMessenger);
    }

    fn destroy_instance(&mut self) {
        self.calls.borrow_mut().push(Call::DestroyInstance);
    }

    fn enumerate_adapters(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        self.check("enumerate_adapters")?;
        Ok((1..=self.adapters.len() as u64)
            .map(vk::PhysicalDevice::from_raw)
            .collect())
    }

    fn adapter_properties(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceProperties> {
        Ok(self.adapter(adapter)?.properties())
    }

    fn adapter_features(&self, adapter: vk::PhysicalDevice) -> VkResult<vk::PhysicalDeviceFeatures> {
        let anisotropy = self.adapter(adapter)?.anisotropy;
        Ok(vk::PhysicalDeviceFeatures {
            sampler_anisotropy: if anisotropy { vk::TRUE } else { vk::FALSE },
            ..Default::default()
        })
    }

    fn adapter_memory_properties(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceMemoryProperties> {
        self.adapter(adapter)?;
        Ok(vk::PhysicalDeviceMemoryProperties::default())
    }

    fn queue_family_properties(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::QueueFamilyProperties>> {
        Ok(self
            .adapter(adapter)?
            .families
            .iter()
            .map(|family| vk::QueueFamilyProperties {
                queue_flags: family.flags,
                queue_count: family.queue_count,
                ..Default::default()
            })
            .collect())
    }

    fn device_extensions(&self, adapter: vk::PhysicalDevice) -> VkResult<Vec<String>> {
        self.check("device_extensions")?;
        Ok(self.adapter(adapter)?.extensions.clone())
    }

    fn surface_support(
        &self,
        adapter: vk::PhysicalDevice,
        family_index: u32,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        self.check("surface_support")?;
        Ok(self
            .adapter(adapter)?
            .families
            .get(family_index as usize)
            .map_or(false, |family| family.present))
    }

    fn surface_capabilities(
        &self,
        adapter: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        self.adapter(adapter)?;
        Ok(vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 3,
            ..Default::default()
        })
    }

    fn surface_formats(
        &self,
        adapter: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        Ok(self.adapter(adapter)?.formats.clone())
    }

    fn surface_present_modes(
        &self,
        adapter: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        Ok(self.adapter(adapter)?.present_modes.clone())
    }

    fn create_device(
        &self,
        adapter: vk::PhysicalDevice,
        desc: &DeviceDesc<'_>,
    ) -> VkResult<FakeDevice> {
        self.check("create_device")?;
        let adapter = self.adapter(adapter)?;
        self.calls.borrow_mut().push(Call::CreateDevice {
            adapter: adapter.name.clone(),
            families: desc.queues.iter().map(|queue| queue.family_index).collect(),
            extensions: desc
                .extensions
                .iter()
                .map(|name| name.to_string_lossy().into_owned())
                .collect(),
            anisotropy: desc.features.sampler_anisotropy == vk::TRUE,
            dynamic_rendering: desc.dynamic_rendering,
        });
        Ok(FakeDevice {
            calls: self.calls.clone(),
        })
    }
}

pub struct FakeDevice {
    calls: CallLog,
}

impl DeviceDriver for FakeDevice {
    fn handle(&self) -> vk::Device {
        vk::Device::from_raw(0xd0)
    }

    fn queue(&self, family_index: u32, _queue_index: u32) -> vk::Queue {
        queue_handle(family_index)
    }

    fn destroy(&mut self) {
        self.calls.borrow_mut().push(Call::DestroyDevice);
    }
}
