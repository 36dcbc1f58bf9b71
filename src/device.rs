use std::{collections::HashMap, ffi::CStr, sync::Arc};

use ash::{extensions::khr, vk};
use log::{error, info, warn};

use crate::{
    capability::{Capability, DeviceCapabilities, GraphicsApi},
    driver::{DeviceDesc, DeviceDriver, Driver},
    error::{Error, NativeResultExt, Result},
    instance::Instance,
    physical_device::{AdapterArena, AdapterId, PhysicalDevice},
    queue::{Queue, QueueRegistry},
    vulkan::VulkanDriver,
};

/// A logical device and the queues it was created with.
pub struct Device<D: Driver = VulkanDriver> {
    pub handle: D::Device,
    pub instance: Arc<Instance<D>>,
    pub adapter: AdapterId,
    pub capabilities: DeviceCapabilities,
    registry: QueueRegistry,
    queues: HashMap<Capability, Queue>,
}

impl<D: Driver> Device<D> {
    pub fn new(instance: Arc<Instance<D>>, arena: &AdapterArena, adapter: AdapterId) -> Result<Self> {
        let physical_device = arena.get(adapter).ok_or(Error::NoAdapterFound)?;
        let indices =
            physical_device
                .queue_family_indices
                .ok_or_else(|| Error::UnresolvableQueueFamily {
                    adapter: physical_device.name.clone(),
                })?;

        // Capabilities sharing a family are merged so a later one doesn't replace an earlier one.
        let mut bindings: Vec<(u32, Capability)> = Vec::new();
        let mut bind = |family_index: u32, capability: Capability| {
            match bindings.iter_mut().find(|(index, _)| *index == family_index) {
                Some((_, capabilities)) => *capabilities |= capability,
                None => bindings.push((family_index, capability)),
            }
        };
        bind(
            indices.graphics_family,
            Capability::GRAPHICS | Capability::TRANSFER,
        );
        if let Some(family_index) = indices.compute_family {
            bind(family_index, Capability::COMPUTE);
        }
        if let Some(family_index) = indices
            .transfer_family
            .filter(|&family_index| family_index != indices.graphics_family)
        {
            bind(family_index, Capability::TRANSFER);
        }

        let mut registry = QueueRegistry::default();
        for (family_index, capabilities) in bindings {
            let queue_count = physical_device
                .queue_family(family_index)
                .map_or(1, |queue_family| queue_family.queue_count);
            registry.register_family(family_index, capabilities, queue_count);
        }

        let capabilities = DeviceCapabilities {
            compute_support: indices.compute_family.is_some(),
        };
        if !capabilities.compute_support {
            warn!("{} has no compute queue family", physical_device.name);
        }

        let extensions = device_extensions(physical_device, instance.config().portability);
        let features = vk::PhysicalDeviceFeatures {
            sampler_anisotropy: physical_device.features.sampler_anisotropy,
            ..Default::default()
        };
        let queue_requests = registry.queue_requests();
        let handle = instance
            .driver()
            .create_device(
                physical_device.handle,
                &DeviceDesc {
                    queues: &queue_requests,
                    extensions: &extensions,
                    features,
                    dynamic_rendering: true,
                },
            )
            .native("vkCreateDevice")?;
        info!("Logical device created on {}", physical_device.name);

        let mut queues = HashMap::new();
        for capability in [Capability::GRAPHICS, Capability::COMPUTE, Capability::TRANSFER] {
            if let Some(family_index) = registry.family_for(capability) {
                let queue = Queue {
                    handle: handle.queue(family_index, 0),
                    family_index,
                };
                info!(
                    "{} queue taken from family {family_index}",
                    capability.names().join("|")
                );
                queues.insert(capability, queue);
            }
        }

        Ok(Self {
            handle,
            instance,
            adapter,
            capabilities,
            registry,
            queues,
        })
    }

    /// The queue bound to a single capability.
    ///
    /// A capability no family was resolved for falls back to the graphics queue.
    pub fn queue(&self, capability: Capability) -> Queue {
        if let Some(queue) = self.queues.get(&capability) {
            return *queue;
        }
        error!(
            "No queue resolved for {}, falling back to the graphics queue",
            capability.names().join("|")
        );
        self.queues
            .get(&Capability::GRAPHICS)
            .copied()
            .unwrap_or(Queue {
                handle: vk::Queue::null(),
                family_index: 0,
            })
    }

    pub fn has_queue(&self, capability: Capability) -> bool {
        self.queues.contains_key(&capability)
    }

    pub fn registry(&self) -> &QueueRegistry {
        &self.registry
    }

    pub fn graphics_api(&self) -> GraphicsApi {
        self.instance.graphics_api()
    }
}

impl<D: Driver> Drop for Device<D> {
    fn drop(&mut self) {
        self.handle.destroy();
        info!("Logical device destroyed");
    }
}

fn device_extensions(physical_device: &PhysicalDevice, portability: bool) -> Vec<&'static CStr> {
    let mut extensions = Vec::with_capacity(4);
    if physical_device.extensions_supported {
        extensions.push(khr::Swapchain::name());
    }
    if portability {
        extensions.push(vk::KhrPortabilitySubsetFn::name());
    }
    extensions.push(khr::DynamicRendering::name());
    extensions.push(khr::PushDescriptor::name());
    extensions
}
