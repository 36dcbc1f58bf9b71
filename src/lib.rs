//! Vulkan instance bootstrap, adapter selection and queue allocation.
//!
//! The usual sequence is [`Instance::new`] → [`select_best`] → [`Device::new`],
//! after which [`Device::queue`] hands out the queue for each [`Capability`].

pub mod capability;
pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod instance;
pub mod physical_device;
pub mod queue;
pub mod selector;
pub mod surface;
pub mod validation;
pub mod vulkan;

pub use capability::{Capability, DeviceCapabilities, GraphicsApi};
pub use config::InstanceConfig;
pub use device::Device;
pub use error::{ApiVersion, Error, Result};
pub use instance::Instance;
pub use physical_device::{AdapterArena, AdapterId, PhysicalDevice};
pub use queue::{Queue, QueueFamilyIndices, QueueRegistry};
pub use selector::select_best;
pub use vulkan::VulkanDriver;
