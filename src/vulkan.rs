use std::{
    ffi::{c_char, c_void, CStr},
    ptr,
};

use ash::{
    extensions::{ext, khr},
    prelude::VkResult,
    vk,
};
use log::Level;

use crate::{
    capability::GraphicsApi,
    driver::{DeviceDesc, DeviceDriver, Driver, InstanceDesc, MessengerDesc},
    error::Result,
};

pub struct VulkanDriver {
    entry: ash::Entry,
    handle: Option<ash::Instance>,
    surface: Option<khr::Surface>,
    debug_utils: Option<(ext::DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl VulkanDriver {
    pub fn load() -> Result<Self> {
        let entry = unsafe { ash::Entry::load()? };
        Ok(Self {
            entry,
            handle: None,
            surface: None,
            debug_utils: None,
        })
    }

    pub fn entry(&self) -> &ash::Entry {
        &self.entry
    }

    /// The live instance, once created.
    pub fn handle(&self) -> Option<&ash::Instance> {
        self.handle.as_ref()
    }

    pub fn surface_functions(&self) -> Option<&khr::Surface> {
        self.surface.as_ref()
    }

    fn instance(&self) -> VkResult<&ash::Instance> {
        self.handle
            .as_ref()
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn surface_fns(&self) -> VkResult<&khr::Surface> {
        self.surface
            .as_ref()
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }
}

impl Driver for VulkanDriver {
    type Device = VulkanDevice;

    fn api(&self) -> GraphicsApi {
        GraphicsApi::Vulkan
    }

    fn instance_version(&self) -> VkResult<u32> {
        let version = unsafe { self.entry.try_enumerate_instance_version()? };
        Ok(version.unwrap_or(vk::API_VERSION_1_0))
    }

    fn instance_extensions(&self) -> VkResult<Vec<String>> {
        let properties = unsafe { self.entry.enumerate_instance_extension_properties(None)? };
        Ok(properties
            .iter()
            .map(|properties| raw_name(&properties.extension_name))
            .collect())
    }

    fn instance_layers(&self) -> VkResult<Vec<String>> {
        let properties = unsafe { self.entry.enumerate_instance_layer_properties()? };
        Ok(properties
            .iter()
            .map(|properties| raw_name(&properties.layer_name))
            .collect())
    }

    fn create_instance(&mut self, desc: &InstanceDesc<'_>) -> VkResult<()> {
        let application_info = vk::ApplicationInfo::builder()
            .application_name(desc.application_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(desc.engine_name)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(desc.api_version);
        let enabled_layer_names: Vec<*const c_char> =
            desc.layers.iter().map(|name| name.as_ptr()).collect();
        let enabled_extension_names: Vec<*const c_char> =
            desc.extensions.iter().map(|name| name.as_ptr()).collect();
        let mut messenger_info = desc.messenger.as_ref().map(messenger_create_info);

        let mut create_info = vk::InstanceCreateInfo::builder()
            .flags(desc.flags)
            .application_info(&application_info)
            .enabled_layer_names(&enabled_layer_names)
            .enabled_extension_names(&enabled_extension_names);
        if let Some(messenger_info) = messenger_info.as_mut() {
            create_info = create_info.push_next(messenger_info);
        }

        let handle = unsafe { self.entry.create_instance(&create_info, None)? };
        self.surface = Some(khr::Surface::new(&self.entry, &handle));
        self.handle = Some(handle);
        Ok(())
    }

    fn create_debug_messenger(&mut self, desc: &MessengerDesc) -> VkResult<()> {
        let debug_utils = ext::DebugUtils::new(&self.entry, self.instance()?);
        let messenger =
            unsafe { debug_utils.create_debug_utils_messenger(&messenger_create_info(desc), None)? };
        self.debug_utils = Some((debug_utils, messenger));
        Ok(())
    }

    fn destroy_debug_messenger(&mut self) {
        if let Some((debug_utils, messenger)) = self.debug_utils.take() {
            unsafe { debug_utils.destroy_debug_utils_messenger(messenger, None) };
        }
    }

    fn destroy_instance(&mut self) {
        self.surface = None;
        if let Some(handle) = self.handle.take() {
            unsafe { handle.destroy_instance(None) };
        }
    }

    fn enumerate_adapters(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance()?.enumerate_physical_devices() }
    }

    fn adapter_properties(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceProperties> {
        Ok(unsafe { self.instance()?.get_physical_device_properties(adapter) })
    }

    fn adapter_features(&self, adapter: vk::PhysicalDevice) -> VkResult<vk::PhysicalDeviceFeatures> {
        Ok(unsafe { self.instance()?.get_physical_device_features(adapter) })
    }

    fn adapter_memory_properties(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceMemoryProperties> {
        Ok(unsafe { self.instance()?.get_physical_device_memory_properties(adapter) })
    }

    fn queue_family_properties(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::QueueFamilyProperties>> {
        Ok(unsafe {
            self.instance()?
                .get_physical_device_queue_family_properties(adapter)
        })
    }

    fn device_extensions(&self, adapter: vk::PhysicalDevice) -> VkResult<Vec<String>> {
        let properties = unsafe {
            self.instance()?
                .enumerate_device_extension_properties(adapter)?
        };
        Ok(properties
            .iter()
            .map(|properties| raw_name(&properties.extension_name))
            .collect())
    }

    fn surface_support(
        &self,
        adapter: vk::PhysicalDevice,
        family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        unsafe {
            self.surface_fns()?
                .get_physical_device_surface_support(adapter, family_index, surface)
        }
    }

    fn surface_capabilities(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_fns()?
                .get_physical_device_surface_capabilities(adapter, surface)
        }
    }

    fn surface_formats(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface_fns()?
                .get_physical_device_surface_formats(adapter, surface)
        }
    }

    fn surface_present_modes(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.surface_fns()?
                .get_physical_device_surface_present_modes(adapter, surface)
        }
    }

    fn create_device(
        &self,
        adapter: vk::PhysicalDevice,
        desc: &DeviceDesc<'_>,
    ) -> VkResult<VulkanDevice> {
        let instance = self.instance()?;

        let priorities: Vec<Vec<f32>> = desc
            .queues
            .iter()
            .map(|request| vec![request.priority; request.queue_count as usize])
            .collect();
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = desc
            .queues
            .iter()
            .zip(&priorities)
            .map(|(request, priorities)| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(request.family_index)
                    .queue_priorities(priorities)
                    .build()
            })
            .collect();
        let enabled_extension_names: Vec<*const c_char> =
            desc.extensions.iter().map(|name| name.as_ptr()).collect();

        let mut dynamic_rendering_features =
            vk::PhysicalDeviceDynamicRenderingFeatures::builder().dynamic_rendering(true);
        let mut create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&enabled_extension_names)
            .enabled_features(&desc.features);
        if desc.dynamic_rendering {
            create_info = create_info.push_next(&mut dynamic_rendering_features);
        }

        let handle = unsafe { instance.create_device(adapter, &create_info, None)? };
        let dynamic_rendering = khr::DynamicRendering::new(instance, &handle);
        let push_descriptor = khr::PushDescriptor::new(instance, &handle);
        Ok(VulkanDevice {
            handle,
            dynamic_rendering,
            push_descriptor,
        })
    }
}

pub struct VulkanDevice {
    pub handle: ash::Device,
    pub dynamic_rendering: khr::DynamicRendering,
    pub push_descriptor: khr::PushDescriptor,
}

impl DeviceDriver for VulkanDevice {
    fn handle(&self) -> vk::Device {
        self.handle.handle()
    }

    fn queue(&self, family_index: u32, queue_index: u32) -> vk::Queue {
        unsafe { self.handle.get_device_queue(family_index, queue_index) }
    }

    fn destroy(&mut self) {
        unsafe { self.handle.destroy_device(None) };
    }
}

/// Reads a fixed-size, NUL-padded name as reported by the runtime.
pub(crate) fn raw_name(raw: &[c_char]) -> String {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn messenger_create_info(desc: &MessengerDesc) -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(desc.severity)
        .message_type(desc.message_type)
        .pfn_user_callback(Some(debug_callback))
        .user_data(ptr::null_mut())
        .build()
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let message = if callback_data.is_null() || (*callback_data).p_message.is_null() {
        Default::default()
    } else {
        CStr::from_ptr((*callback_data).p_message).to_string_lossy()
    };

    let kind = if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL) {
        "General"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "Unknown"
    };

    let level = if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        Level::Error
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        Level::Warn
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        Level::Info
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE) {
        Level::Debug
    } else {
        Level::Trace
    };

    log::log!(target: "vulkan", level, "[{kind}] {message}");
    vk::FALSE
}
