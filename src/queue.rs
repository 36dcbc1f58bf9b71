use std::collections::BTreeMap;

use ash::vk;
use log::{debug, error, info};

use crate::{
    capability::Capability,
    driver::QueueRequest,
    error::Result,
    physical_device::QueueFamily,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// Also used for presentation.
    pub graphics_family: u32,
    pub compute_family: Option<u32>,
    pub transfer_family: Option<u32>,
}

/// Picks the graphics, compute and transfer families of one adapter.
///
/// The graphics family is the first one that draws and can present, as reported
/// by `present_support`. Compute takes the first compute family. Transfer
/// prefers a transfer-only family and otherwise keeps the first transfer family.
/// Returns `None` when no family can both draw and present; the adapter is then
/// unusable for presentation.
pub fn resolve_queue_families<F>(
    queue_families: &[QueueFamily],
    mut present_support: F,
) -> Result<Option<QueueFamilyIndices>>
where
    F: FnMut(u32) -> Result<bool>,
{
    let mut graphics_family = None;
    let mut compute_family = None;
    let mut transfer_family = None;

    for queue_family in queue_families {
        let capabilities = queue_family.capabilities;

        if graphics_family.is_none()
            && capabilities.contains(Capability::GRAPHICS)
            && present_support(queue_family.index)?
        {
            graphics_family = Some(queue_family.index);
        }

        if compute_family.is_none() && capabilities.contains(Capability::COMPUTE) {
            compute_family = Some(queue_family.index);
        }

        if capabilities.contains(Capability::TRANSFER)
            && (capabilities.is_dedicated_transfer() || transfer_family.is_none())
        {
            transfer_family = Some(queue_family.index);
        }
    }

    let Some(graphics_family) = graphics_family else {
        error!("No graphics queue family with presentation support found");
        return Ok(None);
    };

    Ok(Some(QueueFamilyIndices {
        graphics_family,
        compute_family,
        transfer_family,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyInfo {
    pub family_index: u32,
    pub capabilities: Capability,
    pub queue_count: u32,
}

/// Queue families the logical device will be created with.
#[derive(Debug, Default)]
pub struct QueueRegistry {
    families: BTreeMap<u32, QueueFamilyInfo>,
}

impl QueueRegistry {
    pub const QUEUE_PRIORITY: f32 = 1.0;

    /// Binds `capabilities` to a family, replacing any earlier binding for it.
    pub fn register_family(&mut self, family_index: u32, capabilities: Capability, queue_count: u32) {
        self.families.insert(
            family_index,
            QueueFamilyInfo {
                family_index,
                capabilities,
                queue_count,
            },
        );
        info!(
            "Registered queue family {family_index}: {queue_count} queues, supports [{}]",
            capabilities.names().join(", ")
        );
    }

    /// One single-queue request per registered family.
    pub fn queue_requests(&self) -> Vec<QueueRequest> {
        let requests: Vec<QueueRequest> = self
            .families
            .keys()
            .map(|&family_index| QueueRequest {
                family_index,
                queue_count: 1,
                priority: Self::QUEUE_PRIORITY,
            })
            .collect();
        info!("Creating {} unique queue families", requests.len());
        requests
    }

    /// The most dedicated registered family supporting `capability`.
    ///
    /// Families with fewer capabilities win; equal ones keep the lowest index.
    pub fn family_for(&self, capability: Capability) -> Option<u32> {
        let family = self
            .families
            .values()
            .filter(|info| info.capabilities.intersects(capability))
            .min_by_key(|info| info.capabilities.count())
            .map(|info| info.family_index);
        match family {
            Some(family_index) => debug!(
                "{} resolved to queue family {family_index}",
                capability.names().join("|")
            ),
            None => debug!(
                "No registered queue family supports {}",
                capability.names().join("|")
            ),
        }
        family
    }

    pub fn families(&self) -> &BTreeMap<u32, QueueFamilyInfo> {
        &self.families
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Queue {
    pub handle: vk::Queue,
    pub family_index: u32,
}
