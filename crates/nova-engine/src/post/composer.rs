use anyhow::Result;

use crate::error::NovaError;
use crate::gfx::{SharedRenderer, StencilFunc, TargetHandle, TargetParams};
use crate::world::World;

use super::{shaders, MaskTransition, Pass, RenderPass, ShaderPass};

/// Linear chain of image-space passes over two ping-ponged offscreen buffers.
///
/// Exactly one buffer is "read" and the other "write" at any time. Both are
/// always the same size; [`swap_buffers`](Self::swap_buffers) exchanges
/// handles and never copies.
pub struct EffectComposer {
    renderer: SharedRenderer,
    target1: TargetHandle,
    target2: TargetHandle,
    read: TargetHandle,
    write: TargetHandle,
    width: u32,
    height: u32,
    passes: Vec<Box<dyn Pass>>,
    copy_pass: ShaderPass,
    stencil_warned: bool,
}

impl EffectComposer {
    /// Allocates a buffer pair at the renderer's drawing buffer size.
    pub fn new(renderer: SharedRenderer) -> Self {
        let target = {
            let mut r = renderer.borrow_mut();
            let (w, h) = r.drawing_buffer_size();
            r.create_render_target(w, h, TargetParams::rgba())
        };
        Self::with_target(renderer, target)
    }

    /// Uses `target` as the first buffer and a clone of it as the second.
    pub fn with_target(renderer: SharedRenderer, target: TargetHandle) -> Self {
        let (target2, (width, height)) = {
            let mut r = renderer.borrow_mut();
            (r.clone_render_target(target), r.target_size(target))
        };

        Self {
            renderer,
            target1: target,
            target2,
            write: target,
            read: target2,
            width,
            height,
            passes: Vec::new(),
            copy_pass: ShaderPass::new(shaders::copy()),
            stencil_warned: false,
        }
    }

    /// A composer whose first pass renders `world`'s scene through its camera.
    pub fn for_world(world: &World) -> Self {
        let mut composer = Self::new(world.stage().renderer().clone());
        let camera = world.camera().borrow().handle();
        composer.add_pass(RenderPass::new(world.scene(), camera));
        composer
    }

    pub fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    /// Appends `pass` and sizes it to the current buffers.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.add_boxed_pass(Box::new(pass));
    }

    pub fn add_boxed_pass(&mut self, mut pass: Box<dyn Pass>) {
        pass.set_size(self.width, self.height);
        self.passes.push(pass);
    }

    /// Inserts `pass` at `index` (clamped to the chain length) and sizes it.
    pub fn insert_pass(&mut self, pass: impl Pass + 'static, index: usize) {
        let mut pass: Box<dyn Pass> = Box::new(pass);
        pass.set_size(self.width, self.height);
        let index = index.min(self.passes.len());
        self.passes.insert(index, pass);
    }

    pub fn remove_pass(&mut self, index: usize) -> Option<Box<dyn Pass>> {
        (index < self.passes.len()).then(|| self.passes.remove(index))
    }

    pub fn pass_mut(&mut self, index: usize) -> Option<&mut (dyn Pass + 'static)> {
        self.passes.get_mut(index).map(|p| p.as_mut())
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Runs every enabled pass in order, swapping after passes that ask for
    /// it.
    ///
    /// Between a mask pass and its clear pass, each swap is preceded by a copy
    /// of the read buffer into the write buffer outside the mask, so unmasked
    /// content survives the swap. Mask passes need stencil support; without it
    /// they are skipped and a warning is logged once.
    pub fn render(&mut self, delta: f32) -> Result<()> {
        let mut renderer = self.renderer.borrow_mut();
        let has_stencil = renderer.supports_stencil();
        let mut mask_active = false;

        for pass in self.passes.iter_mut() {
            if !pass.flags().enabled {
                continue;
            }

            let transition = pass.mask_transition();
            if transition != MaskTransition::None && !has_stencil {
                if !self.stencil_warned {
                    self.stencil_warned = true;
                    let e = NovaError::missing("stencil buffer", "mask passes are skipped");
                    log::warn!("{e}");
                }
                continue;
            }

            pass.render(&mut *renderer, self.write, self.read, delta, mask_active)?;

            if pass.flags().needs_swap {
                if mask_active {
                    renderer.set_stencil_func(StencilFunc::NotEqual(1));
                    self.copy_pass
                        .render(&mut *renderer, self.write, self.read, delta, mask_active)?;
                    renderer.set_stencil_func(StencilFunc::Equal(1));
                }
                std::mem::swap(&mut self.read, &mut self.write);
            }

            match transition {
                MaskTransition::Enter => mask_active = true,
                MaskTransition::Exit => mask_active = false,
                MaskTransition::None => {}
            }
        }

        Ok(())
    }

    /// Replaces the buffer pair.
    ///
    /// Without `target`, a clone of the first buffer sized to the renderer's
    /// drawing buffer is used. The old buffers are disposed and the roles
    /// reset to write = first, read = second.
    pub fn reset(&mut self, target: Option<TargetHandle>) {
        let mut r = self.renderer.borrow_mut();

        let target = match target {
            Some(target) => target,
            None => {
                let target = r.clone_render_target(self.target1);
                let (w, h) = r.drawing_buffer_size();
                r.resize_render_target(target, w, h);
                target
            }
        };

        r.dispose_render_target(self.target1);
        r.dispose_render_target(self.target2);

        self.target1 = target;
        self.target2 = r.clone_render_target(target);
        self.write = self.target1;
        self.read = self.target2;
        (self.width, self.height) = r.target_size(target);

        log::debug!("composer buffers reset to {}x{}", self.width, self.height);
    }

    /// Resizes both buffers and every pass.
    pub fn set_size(&mut self, width: u32, height: u32) {
        {
            let mut r = self.renderer.borrow_mut();
            r.resize_render_target(self.target1, width, height);
            r.resize_render_target(self.target2, width, height);
        }
        self.width = width;
        self.height = height;

        self.copy_pass.set_size(width, height);
        for pass in &mut self.passes {
            pass.set_size(width, height);
        }
    }

    #[inline]
    pub fn read_buffer(&self) -> TargetHandle {
        self.read
    }

    #[inline]
    pub fn write_buffer(&self) -> TargetHandle {
        self.write
    }

    /// The two buffers in allocation order.
    #[inline]
    pub fn render_targets(&self) -> (TargetHandle, TargetHandle) {
        (self.target1, self.target2)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
