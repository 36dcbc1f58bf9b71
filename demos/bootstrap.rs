use std::sync::Arc;

use vkinit::{
    select_best, surface, AdapterArena, Capability, Device, Instance, InstanceConfig,
    VulkanDriver,
};
use winit::{
    event::{Event, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

struct Context {
    device: Device,
    surface: surface::Surface,
    adapters: AdapterArena,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("vkinit")
        .build(&event_loop)?;

    let extensions = surface::required_extensions(&window)?;
    let instance = Arc::new(Instance::new(
        VulkanDriver::load()?,
        &InstanceConfig::default().application_name("bootstrap"),
        &extensions,
    )?);
    let surface = surface::Surface::new(&window, &instance)?;
    let mut adapters = AdapterArena::default();
    let adapter = select_best(&instance, surface.handle, &mut adapters)?;
    let device = Device::new(instance, &adapters, adapter)?;

    for capability in [Capability::GRAPHICS, Capability::COMPUTE, Capability::TRANSFER] {
        let queue = device.queue(capability);
        log::info!(
            "{}: family {} ({})",
            capability.names().join("|"),
            queue.family_index,
            if device.has_queue(capability) {
                "dedicated lookup"
            } else {
                "graphics fallback"
            }
        );
    }

    let mut context = Some(Context {
        device,
        surface,
        adapters,
    });
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event:
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            ..
                        },
                    ..
                },
            ..
        } => elwt.exit(),
        Event::LoopExiting => {
            if let Some(context) = context.take() {
                if let Some(adapter) = context.adapters.get(context.device.adapter) {
                    log::info!("Shutting down {}", adapter.name);
                }
                drop(context.device);
                drop(context.surface);
            }
        }
        _ => {}
    })?;
    Ok(())
}
