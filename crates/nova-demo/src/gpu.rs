use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Surface setup knobs, mirrored from the engine's renderer options.
#[derive(Debug, Clone, Copy)]
pub struct GpuInit {
    /// Wait for vertical blank (`Fifo`); otherwise `AutoNoVsync`.
    pub vsync: bool,
    /// Request a premultiplied-alpha surface so the clear alpha shows through.
    pub transparent: bool,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self { vsync: true, transparent: false }
    }
}

/// Device, queue and the window surface the screen passes draw into.
pub struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl Gpu {
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        // The window starts hidden; some platforms report a zero size until shown.
        let size = window.inner_size();
        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no adapter can present to this window")?;
        log::info!("adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("nova-demo device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats).context("surface reports no formats")?;
        let alpha_mode = choose_alpha_mode(&caps.alpha_modes, init.transparent);
        let present_mode = if init.vsync { wgpu::PresentMode::Fifo } else { wgpu::PresentMode::AutoNoVsync };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::debug!("surface {format:?} {alpha_mode:?} {}x{}", size.width, size.height);

        Ok(Self { surface, device, queue, config, size })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Drawing buffer size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Records the new drawing buffer size; a zero size is recorded but the
    /// surface keeps its last configuration.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size == self.size {
            return;
        }
        self.size = size;
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Next surface texture, or `Ok(None)` when this frame should be skipped.
    pub fn acquire(&self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other) => Ok(None),
            Err(e @ wgpu::SurfaceError::OutOfMemory) => Err(e).context("surface out of memory"),
        }
    }
}

/// Offscreen buffers are plain `Rgba8Unorm` and the copy pass writes their
/// texels unchanged, so the screen must not re-encode to sRGB either.
fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    [wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Rgba8Unorm]
        .into_iter()
        .find(|f| formats.contains(f))
        .or_else(|| formats.iter().copied().find(|f| !f.is_srgb()))
        .or_else(|| formats.first().copied())
}

fn choose_alpha_mode(modes: &[wgpu::CompositeAlphaMode], transparent: bool) -> wgpu::CompositeAlphaMode {
    let wanted = if transparent {
        wgpu::CompositeAlphaMode::PreMultiplied
    } else {
        wgpu::CompositeAlphaMode::Opaque
    };
    if modes.contains(&wanted) {
        wanted
    } else {
        modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, TextureFormat};

    #[test]
    fn linear_format_wins_over_srgb() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(choose_surface_format(&formats), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn srgb_only_surface_still_gets_a_format() {
        let formats = [TextureFormat::Rgba8UnormSrgb];
        assert_eq!(choose_surface_format(&formats), Some(TextureFormat::Rgba8UnormSrgb));
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn alpha_mode_falls_back_to_first_supported() {
        let modes = [CompositeAlphaMode::Opaque];
        assert_eq!(choose_alpha_mode(&modes, true), CompositeAlphaMode::Opaque);
        let modes = [CompositeAlphaMode::Inherit, CompositeAlphaMode::PreMultiplied];
        assert_eq!(choose_alpha_mode(&modes, true), CompositeAlphaMode::PreMultiplied);
        assert_eq!(choose_alpha_mode(&modes, false), CompositeAlphaMode::Inherit);
    }
}
