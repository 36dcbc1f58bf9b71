use ash::vk;
use bitflags::bitflags;

bitflags! {
    /// Classes of work a queue can execute.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capability: u8 {
        const GRAPHICS = 1 << 0;
        const COMPUTE  = 1 << 1;
        const TRANSFER = 1 << 2;
    }
}

impl Capability {
    pub fn from_queue_flags(flags: vk::QueueFlags) -> Self {
        let mut capabilities = Self::empty();
        capabilities.set(Self::GRAPHICS, flags.contains(vk::QueueFlags::GRAPHICS));
        capabilities.set(Self::COMPUTE, flags.contains(vk::QueueFlags::COMPUTE));
        capabilities.set(Self::TRANSFER, flags.contains(vk::QueueFlags::TRANSFER));
        capabilities
    }

    pub fn names(self) -> Vec<&'static str> {
        [
            (Self::GRAPHICS, "Graphics"),
            (Self::COMPUTE, "Compute"),
            (Self::TRANSFER, "Transfer"),
        ]
        .into_iter()
        .filter(|(capability, _)| self.contains(*capability))
        .map(|(_, name)| name)
        .collect()
    }

    /// Number of capabilities set; fewer means a more dedicated family.
    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }

    /// Transfer-only families.
    pub fn is_dedicated_transfer(self) -> bool {
        self.contains(Self::TRANSFER) && !self.intersects(Self::GRAPHICS | Self::COMPUTE)
    }
}

/// Backend kinds a driver can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsApi {
    Vulkan,
    DirectX12,
    Metal,
    WebGPU,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub compute_support: bool,
}
