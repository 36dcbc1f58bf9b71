use std::{
    ffi::{c_void, CStr},
    ptr,
    sync::Arc,
};

use ash::{extensions::khr, vk};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};

use crate::{
    error::{Error, NativeResultExt, Result},
    instance::Instance,
};

/// Instance extensions the window system needs for presentation.
pub fn required_extensions(display: &impl HasDisplayHandle) -> Result<Vec<&'static CStr>> {
    let platform = match display.display_handle()?.as_raw() {
        RawDisplayHandle::Windows(_) => khr::Win32Surface::name(),
        RawDisplayHandle::Xlib(_) => khr::XlibSurface::name(),
        RawDisplayHandle::Wayland(_) => khr::WaylandSurface::name(),
        _ => return Err(Error::UnsupportedWindow("display")),
    };
    Ok(vec![khr::Surface::name(), platform])
}

/// A presentation target. Destroyed on drop, before the instance it came from.
pub struct Surface {
    pub handle: vk::SurfaceKHR,
    pub functions: khr::Surface,
    instance: Arc<Instance>,
}

impl Surface {
    pub fn new(
        window: &(impl HasWindowHandle + HasDisplayHandle),
        instance: &Arc<Instance>,
    ) -> Result<Self> {
        let driver = instance.driver();
        let (entry, handle) = match driver.handle() {
            Some(handle) => (driver.entry(), handle),
            None => return Err(Error::UnsupportedWindow("instance")),
        };

        let surface = match (
            display_of(window)?,
            window.window_handle()?.as_raw(),
        ) {
            (_, RawWindowHandle::Win32(window_handle)) => {
                let hinstance = window_handle
                    .hinstance
                    .map_or(ptr::null(), |hinstance| hinstance.get() as *const c_void);
                let create_info = vk::Win32SurfaceCreateInfoKHR::builder()
                    .hinstance(hinstance)
                    .hwnd(window_handle.hwnd.get() as *const c_void);
                unsafe {
                    khr::Win32Surface::new(entry, handle)
                        .create_win32_surface(&create_info, None)
                        .native("vkCreateWin32SurfaceKHR")?
                }
            }
            (RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(window_handle)) => {
                let dpy = display
                    .display
                    .map_or(ptr::null_mut(), |display| display.as_ptr());
                let create_info = vk::XlibSurfaceCreateInfoKHR::builder()
                    .dpy(dpy.cast())
                    .window(window_handle.window);
                unsafe {
                    khr::XlibSurface::new(entry, handle)
                        .create_xlib_surface(&create_info, None)
                        .native("vkCreateXlibSurfaceKHR")?
                }
            }
            (RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(window_handle)) => {
                let create_info = vk::WaylandSurfaceCreateInfoKHR::builder()
                    .display(display.display.as_ptr())
                    .surface(window_handle.surface.as_ptr());
                unsafe {
                    khr::WaylandSurface::new(entry, handle)
                        .create_wayland_surface(&create_info, None)
                        .native("vkCreateWaylandSurfaceKHR")?
                }
            }
            _ => return Err(Error::UnsupportedWindow("window")),
        };

        let functions = khr::Surface::new(entry, handle);
        Ok(Self {
            handle: surface,
            functions,
            instance: instance.clone(),
        })
    }

    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe { self.functions.destroy_surface(self.handle, None) };
    }
}

fn display_of(display: &impl HasDisplayHandle) -> Result<RawDisplayHandle> {
    Ok(display.display_handle()?.as_raw())
}
