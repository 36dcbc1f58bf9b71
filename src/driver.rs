//! Native calls made during bootstrap, adapter selection and device creation.
//!
//! [`crate::vulkan::VulkanDriver`] implements these on top of `ash`. The decision
//! logic in this crate only ever talks to the traits, so it can run against any
//! runtime that answers the same questions.

use std::ffi::CStr;

use ash::{prelude::VkResult, vk};

use crate::capability::GraphicsApi;

pub struct InstanceDesc<'a> {
    pub application_name: &'a CStr,
    pub engine_name: &'a CStr,
    pub api_version: u32,
    pub flags: vk::InstanceCreateFlags,
    pub layers: &'a [&'a CStr],
    pub extensions: &'a [&'a CStr],
    /// Chained into instance creation so creation-time messages are captured too.
    pub messenger: Option<MessengerDesc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessengerDesc {
    pub severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub message_type: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl Default for MessengerDesc {
    fn default() -> Self {
        Self {
            severity: vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueRequest {
    pub family_index: u32,
    pub queue_count: u32,
    pub priority: f32,
}

pub struct DeviceDesc<'a> {
    pub queues: &'a [QueueRequest],
    pub extensions: &'a [&'a CStr],
    pub features: vk::PhysicalDeviceFeatures,
    pub dynamic_rendering: bool,
}

pub trait Driver {
    type Device: DeviceDriver;

    fn api(&self) -> GraphicsApi;

    fn instance_version(&self) -> VkResult<u32>;
    fn instance_extensions(&self) -> VkResult<Vec<String>>;
    fn instance_layers(&self) -> VkResult<Vec<String>>;

    fn create_instance(&mut self, desc: &InstanceDesc<'_>) -> VkResult<()>;
    fn create_debug_messenger(&mut self, desc: &MessengerDesc) -> VkResult<()>;
    fn destroy_debug_messenger(&mut self);
    fn destroy_instance(&mut self);

    fn enumerate_adapters(&self) -> VkResult<Vec<vk::PhysicalDevice>>;
    fn adapter_properties(&self, adapter: vk::PhysicalDevice)
        -> VkResult<vk::PhysicalDeviceProperties>;
    fn adapter_features(&self, adapter: vk::PhysicalDevice) -> VkResult<vk::PhysicalDeviceFeatures>;
    fn adapter_memory_properties(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceMemoryProperties>;
    fn queue_family_properties(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::QueueFamilyProperties>>;
    fn device_extensions(&self, adapter: vk::PhysicalDevice) -> VkResult<Vec<String>>;

    fn surface_support(
        &self,
        adapter: vk::PhysicalDevice,
        family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool>;
    fn surface_capabilities(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR>;
    fn surface_formats(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>>;
    fn surface_present_modes(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>>;

    fn create_device(
        &self,
        adapter: vk::PhysicalDevice,
        desc: &DeviceDesc<'_>,
    ) -> VkResult<Self::Device>;
}

/// A created logical device.
pub trait DeviceDriver {
    fn handle(&self) -> vk::Device;
    fn queue(&self, family_index: u32, queue_index: u32) -> vk::Queue;
    fn destroy(&mut self);
}
