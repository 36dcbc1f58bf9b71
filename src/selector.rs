use ash::vk;
use log::{info, warn};

use crate::{
    driver::Driver,
    error::{Error, NativeResultExt, Result},
    instance::Instance,
    physical_device::{AdapterArena, AdapterId, PhysicalDevice},
};

/// Evaluates every adapter into `arena` and returns the best one.
///
/// Adapters that pass every suitability check are preferred. When none does, the
/// best scoring adapter is taken anyway so the application can still start on
/// weak hardware.
pub fn select_best<D: Driver>(
    instance: &Instance<D>,
    surface: vk::SurfaceKHR,
    arena: &mut AdapterArena,
) -> Result<AdapterId> {
    let driver = instance.driver();
    let handles = driver
        .enumerate_adapters()
        .native("vkEnumeratePhysicalDevices")?;
    if handles.is_empty() {
        log::error!("Couldn't find a physical device");
        return Err(Error::NoAdapterFound);
    }

    let candidates = handles
        .into_iter()
        .map(|handle| Ok(arena.insert(PhysicalDevice::query(driver, handle, surface)?)))
        .collect::<Result<Vec<AdapterId>>>()?;
    let records: Vec<(AdapterId, &PhysicalDevice)> = candidates
        .iter()
        .filter_map(|&id| arena.get(id).map(|record| (id, record)))
        .collect();

    let (chosen, found_suitable) =
        match best_of(records.iter().copied().filter(|(_, record)| record.suitable)) {
            Some(id) => (id, true),
            None => {
                warn!("No ideal GPU found, selecting best available device with limited capabilities");
                for (_, record) in &records {
                    warn!("{}: score {}", record.name, record.score.total());
                }
                match best_of(records.iter().copied()) {
                    Some(id) => (id, false),
                    None => return Err(Error::NoAdapterFound),
                }
            }
        };

    if let Some(record) = arena.get(chosen) {
        report(record, found_suitable);
    }
    Ok(chosen)
}

/// Highest score wins; the first of equally scored adapters is kept.
fn best_of<'a>(records: impl Iterator<Item = (AdapterId, &'a PhysicalDevice)>) -> Option<AdapterId> {
    let mut best: Option<(AdapterId, &PhysicalDevice)> = None;
    for (id, record) in records {
        if best.map_or(true, |(_, current)| record.score > current.score) {
            best = Some((id, record));
        }
    }
    best.map(|(id, _)| id)
}

fn report(record: &PhysicalDevice, found_suitable: bool) {
    info!(
        "Selected GPU: {} (score {})",
        record.name,
        record.score.total()
    );

    match record.queue_family_indices {
        Some(indices) => {
            info!("Graphics queue family: {}", indices.graphics_family);
            match indices.compute_family {
                Some(family) => info!("Compute queue family: {family}"),
                None => info!("No compute queue family found (compute shaders unavailable)"),
            }
            if let Some(family) = indices.transfer_family {
                info!("Transfer queue family: {family}");
            }
        }
        None => warn!("Device has no graphics queue family that can present"),
    }

    if found_suitable {
        info!("Device has all required capabilities");
        return;
    }
    if !record.extensions_supported {
        warn!("Device doesn't support required extensions (e.g., VK_KHR_swapchain)");
    }
    if !record.swapchain_support.is_adequate() {
        warn!("Device has inadequate swapchain support");
    }
    if !record.supports_anisotropy() {
        warn!("Device doesn't support anisotropic filtering");
    }
}
