mod backend;
mod gpu;
mod layout;
mod mesh;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use glam::Vec3;
use nova_engine::app::{App, AppOptions, Capabilities};
use nova_engine::coords::{Rgb, Vec2};
use nova_engine::events::TapPanRecognizer;
use nova_engine::gfx::{MaterialHandle, Renderer, ShaderMaterial, Uniform};
use nova_engine::logging::{LoggingConfig, init_logging};
use nova_engine::post::{DotScreenPass, EffectComposer, GlitchPass, Pass, ShaderPass, shaders};
use nova_engine::window::{Runtime, RuntimeConfig, WinitHost};
use winit::dpi::LogicalSize;
use winit::window::Window;

use backend::DemoRenderer;
use gpu::{Gpu, GpuInit};

const DOT_SCREEN: usize = 1;
const GLITCH: usize = 2;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "nova demo".to_string(),
        initial_size: LogicalSize::new(1024.0, 640.0),
    };

    Runtime::run(config, build)
}

fn basic_material(color: Rgb) -> ShaderMaterial {
    let [red, green, blue] = color.to_f32();
    ShaderMaterial::new("basic", include_str!("shaders/basic.wgsl"))
        .with_uniform("red", Uniform::Float(red))
        .with_uniform("green", Uniform::Float(green))
        .with_uniform("blue", Uniform::Float(blue))
        .with_uniform("highlight", Uniform::Float(0.0))
}

fn build(window: Arc<Window>) -> Result<App> {
    let options = AppOptions { auto_start: false, ..AppOptions::default() };

    let init = GpuInit { transparent: options.renderer.alpha, ..GpuInit::default() };
    let gpu = pollster::block_on(Gpu::new(window.clone(), init))?;
    let renderer = Rc::new(RefCell::new(DemoRenderer::new(gpu, window.scale_factor())));

    let capabilities = Capabilities::none().with_gesture(TapPanRecognizer::default());
    let mut app = App::new(WinitHost::new(window), renderer.clone(), options, capabilities)?;

    let world = app.world().clone();
    let events = world.event_manager();

    // Three spheres that bob in place; clicking one toggles its highlight.
    let colors = [Rgb(0xe4572e), Rgb(0x17bebb), Rgb(0xffc914)];
    let mut spheres = Vec::new();
    for (i, color) in colors.into_iter().enumerate() {
        let material = basic_material(color);
        let mut r = renderer.borrow_mut();
        let handle = r.create_material(&material);
        let node = r.create_sphere(world.scene(), 0.8, handle);
        r.set_position(node, Vec3::new(i as f32 * 2.2 - 2.2, 0.0, -6.0));
        drop(r);

        let state = Rc::new(RefCell::new((material, false)));
        let shared = renderer.clone();
        events.on(node, "click", move |_| {
            let mut guard = state.borrow_mut();
            let (material, lit) = &mut *guard;
            *lit = !*lit;
            material.set_float("highlight", if *lit { 1.0 } else { 0.0 });
            update(&shared, handle, material);
            Ok(())
        });

        spheres.push(node);
    }

    // Backdrop: tapping it toggles the dot screen; panning across it glitches.
    let backdrop = {
        let mut r = renderer.borrow_mut();
        let handle = r.create_material(&basic_material(Rgb(0x1d2433)));
        let node = r.create_plane(world.scene(), 40.0, 24.0, handle);
        r.set_position(node, Vec3::new(0.0, 0.0, -12.0));
        node
    };

    let mut composer = EffectComposer::for_world(&world);
    let mut dots = DotScreenPass::new(Vec2::new(0.5, 0.5), 1.57, 1.2);
    dots.set_enabled(false);
    composer.add_pass(dots);
    let mut glitch = GlitchPass::new(64, false);
    glitch.set_enabled(false);
    composer.add_pass(glitch);
    let mut copy = ShaderPass::new(shaders::copy());
    copy.set_render_to_screen(true);
    composer.add_pass(copy);
    let composer = Rc::new(RefCell::new(composer));
    world.attach_composer(composer.clone());

    let toggles = composer.clone();
    events.on(backdrop, "tap", move |_| {
        if let Some(pass) = toggles.borrow_mut().pass_mut(DOT_SCREEN) {
            let on = !pass.flags().enabled;
            pass.set_enabled(on);
            log::info!("dot screen {}", if on { "on" } else { "off" });
        }
        Ok(())
    });

    let toggles = composer.clone();
    events.on(backdrop, "pan", move |_| {
        if let Some(pass) = toggles.borrow_mut().pass_mut(GLITCH) {
            pass.set_enabled(true);
        }
        Ok(())
    });
    events.on(backdrop, "mouseup", move |_| {
        if let Some(pass) = composer.borrow_mut().pass_mut(GLITCH) {
            pass.set_enabled(false);
        }
        Ok(())
    });

    let start = Instant::now();
    let shared = renderer.clone();
    world.logic_loop().add(move || {
        let t = start.elapsed().as_secs_f32();
        let mut r = shared.borrow_mut();
        for (i, node) in spheres.iter().enumerate() {
            if let Some(p) = r.position(*node) {
                let phase = t * 1.5 + i as f32 * 0.9;
                r.set_position(*node, Vec3::new(p.x, phase.sin() * 0.6, p.z));
            }
        }
        Ok(())
    });

    let shared = renderer.clone();
    app.render_loop().add_with_key("present", move || {
        shared.borrow_mut().present();
        Ok(())
    });

    app.start()?;
    Ok(app)
}

fn update(renderer: &Rc<RefCell<DemoRenderer>>, handle: MaterialHandle, material: &ShaderMaterial) {
    renderer.borrow_mut().update_material(handle, material);
}
