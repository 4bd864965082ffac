mod core;
mod playback;
mod settings;
mod ui;

use crate::core::MotionModel;
use anyhow::{anyhow, Context as _, Result};
use imgui::{Condition, Context, FontConfig, FontSource};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use playback::{Command, SimulationContext, Views};
use settings::AppSettings;
use ui::{ControlPanel, CubeScene, LineChart, ShortcutAction, ShortcutManager};
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::ModifiersState;
use winit::window::WindowBuilder;

use glutin::prelude::*;
use glutin::display::GetGlDisplay;
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasRawWindowHandle;
use glow::HasContext;

use std::ffi::CString;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct AppState {
    sim: SimulationContext,
    scene: CubeScene,
    position_chart: LineChart,
    velocity_chart: LineChart,
    controls: ControlPanel,
    shortcut_manager: ShortcutManager,
    /// Commands collected from widgets and shortcuts, applied once per frame
    pending: Vec<Command>,
    // Window visibility
    show_scene: bool,
    show_charts: bool,
    show_controls: bool,
    show_shortcuts: bool,
}

impl AppState {
    fn new(settings: &AppSettings) -> Self {
        let model = MotionModel::default();
        let samples_per_unit = model.samples_per_unit();

        let mut state = Self {
            sim: SimulationContext::new(model, settings.initial),
            scene: CubeScene::new(),
            position_chart: LineChart::new("Position", "Position (m)", samples_per_unit),
            velocity_chart: LineChart::new("Velocity", "Velocity (m/s)", samples_per_unit),
            controls: ControlPanel::new(settings.initial),
            shortcut_manager: ShortcutManager::new(),
            pending: Vec::new(),
            show_scene: settings.show_scene,
            show_charts: settings.show_charts,
            show_controls: settings.show_controls,
            show_shortcuts: settings.show_shortcuts,
        };
        // Bring every collaborator to the t = 0 state
        state.pending.push(Command::Reset);
        state.apply_commands();
        state
    }

    fn settings(&self) -> AppSettings {
        AppSettings {
            show_scene: self.show_scene,
            show_charts: self.show_charts,
            show_controls: self.show_controls,
            show_shortcuts: self.show_shortcuts,
            initial: self.sim.initial(),
        }
    }

    /// Advance the simulation by one display frame
    fn tick(&mut self) {
        let mut views = Views {
            scene: &mut self.scene,
            position_chart: &mut self.position_chart,
            velocity_chart: &mut self.velocity_chart,
        };
        self.sim.tick(1, &mut views);
    }

    fn apply_commands(&mut self) {
        let commands = std::mem::take(&mut self.pending);
        let mut views = Views {
            scene: &mut self.scene,
            position_chart: &mut self.position_chart,
            velocity_chart: &mut self.velocity_chart,
        };
        for command in commands {
            self.sim.dispatch(command, &mut views);
        }
    }

    fn handle_shortcut(&mut self, action: ShortcutAction) {
        match action.command() {
            Some(command) => self.pending.push(command),
            None => self.show_shortcuts = !self.show_shortcuts,
        }
    }

    fn render_menu(&mut self, ui: &imgui::Ui) -> bool {
        let mut exit = false;
        ui.main_menu_bar(|| {
            ui.menu("File", || {
                if ui.menu_item("Exit") {
                    exit = true;
                }
            });

            ui.menu("Simulation", || {
                if ui.menu_item_config("Play").shortcut("Space").enabled(!self.sim.is_playing()).build() {
                    self.pending.push(Command::Play);
                }
                if ui.menu_item_config("Stop").shortcut("Esc").enabled(self.sim.is_playing()).build() {
                    self.pending.push(Command::Stop);
                }
                if ui.menu_item_config("Reset").shortcut("R").build() {
                    self.pending.push(Command::Reset);
                }
            });

            ui.menu("View", || {
                ui.menu_item_config("Scene").build_with_ref(&mut self.show_scene);
                ui.menu_item_config("Charts").build_with_ref(&mut self.show_charts);
                ui.menu_item_config("Controls").build_with_ref(&mut self.show_controls);
            });

            ui.menu("Help", || {
                if ui.menu_item_config("Keyboard Shortcuts").shortcut("F1").build() {
                    self.show_shortcuts = true;
                }
            });
        });
        exit
    }

    fn render_windows(&mut self, ui: &imgui::Ui) {
        if self.show_controls {
            self.controls.sync(&self.sim);
            let mut commands = Vec::new();
            ui.window("Controls")
                .size([340.0, 190.0], Condition::FirstUseEver)
                .position([10.0, 30.0], Condition::FirstUseEver)
                .opened(&mut self.show_controls)
                .build(|| {
                    commands = self.controls.render(ui);
                });
            self.pending.extend(commands);
        }

        // Apply this frame's input before drawing the views it affects
        self.apply_commands();

        if self.show_scene {
            ui.window("Scene")
                .size([640.0, 360.0], Condition::FirstUseEver)
                .position([360.0, 30.0], Condition::FirstUseEver)
                .opened(&mut self.show_scene)
                .build(|| {
                    self.scene.render(ui);
                });
        }

        if self.show_charts {
            for chart in [&mut self.position_chart, &mut self.velocity_chart] {
                ui.window(chart.title().to_string())
                    .size([500.0, 300.0], Condition::FirstUseEver)
                    .opened(&mut self.show_charts)
                    .build(|| {
                        chart.render(ui);
                    });
            }
        }

        if self.show_shortcuts {
            self.shortcut_manager.render_help(ui, &mut self.show_shortcuts);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let event_loop = EventLoop::new().map_err(|e| anyhow!("failed to create event loop: {e}"))?;

    // Build the window and GL display using glutin-winit
    let (window, gl_config) = DisplayBuilder::new()
        .with_window_builder(Some(
            WindowBuilder::new()
                .with_title("Harmonic Motion Visualizer")
                .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 800.0))
        ))
        .build(&event_loop, glutin::config::ConfigTemplateBuilder::new(), |configs| {
            configs
                .reduce(|best, config| if config.num_samples() > best.num_samples() { config } else { best })
                .expect("glutin yields at least one matching config")
        })
        .map_err(|e| anyhow!("failed to create window and display: {e}"))?;

    let window = window.context("display builder returned no window")?;
    let gl_display = gl_config.display();

    let context = unsafe {
        gl_display.create_context(
            &gl_config,
            &glutin::context::ContextAttributesBuilder::new()
                .build(Some(window.raw_window_handle())),
        )
    }.context("failed to create GL context")?;

    let attrs = window.build_surface_attributes(
        glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new()
    );
    let surface = unsafe {
        gl_display.create_window_surface(&gl_config, &attrs)
    }.context("failed to create surface")?;

    let context = context.make_current(&surface).context("failed to make GL context current")?;

    let load_gl = || unsafe {
        glow::Context::from_loader_function(|name| {
            CString::new(name)
                .map(|name| gl_display.get_proc_address(&name) as *const _)
                .unwrap_or(std::ptr::null())
        })
    };

    // Set up imgui
    let mut imgui = Context::create();
    imgui.set_log_filename(None::<std::path::PathBuf>);

    // Window layout lives next to the settings file
    if let Some(dir) = settings::config_dir() {
        if let Err(e) = std::fs::create_dir_all(&dir) {
            error!("failed to create {}: {e}", dir.display());
        }
        imgui.set_ini_filename(Some(dir.join("layout.ini")));
    }
    imgui.io_mut().config_flags |= imgui::ConfigFlags::DOCKING_ENABLE;

    let hidpi_factor = window.scale_factor();
    let font_size = (14.0 * hidpi_factor) as f32;
    imgui.fonts().add_font(&[FontSource::DefaultFontData {
        config: Some(FontConfig {
            size_pixels: font_size,
            ..FontConfig::default()
        }),
    }]);
    imgui.io_mut().font_global_scale = (1.0 / hidpi_factor) as f32;

    let mut platform = WinitPlatform::init(&mut imgui);
    platform.attach_window(imgui.io_mut(), &window, HiDpiMode::Default);

    let mut renderer = imgui_glow_renderer::AutoRenderer::initialize(load_gl(), &mut imgui)
        .map_err(|e| anyhow!("failed to initialize renderer: {e}"))?;

    // Second glow handle for clearing (same underlying GL context)
    let gl_clear = load_gl();

    let settings = AppSettings::load();
    let mut state = AppState::new(&settings);
    let mut modifiers = ModifiersState::empty();
    let mut last_frame_time = Instant::now();
    let mut last_settings_save = Instant::now();

    info!("starting main loop");

    event_loop.run(move |event, window_target| {
        match &event {
            Event::NewEvents(_) => {
                let now = Instant::now();
                imgui.io_mut().update_delta_time(now - last_frame_time);
                last_frame_time = now;
            }
            Event::AboutToWait => {
                // Save settings periodically (every 30 seconds)
                if last_settings_save.elapsed().as_secs() >= 30 {
                    state.settings().save();
                    last_settings_save = Instant::now();
                }

                if let Err(e) = platform.prepare_frame(imgui.io_mut(), &window) {
                    error!("failed to prepare frame: {e}");
                    window_target.exit();
                    return;
                }
                window.request_redraw();
            }
            Event::WindowEvent { event: WindowEvent::ModifiersChanged(new), .. } => {
                modifiers = new.state();
            }
            Event::WindowEvent { event: WindowEvent::KeyboardInput { event: key_event, .. }, .. } => {
                if !imgui.io().want_text_input {
                    if let Some(action) = state.shortcut_manager.process_event(key_event, modifiers) {
                        state.handle_shortcut(action);
                    }
                }
            }
            Event::WindowEvent { event: WindowEvent::RedrawRequested, .. } => {
                // One simulation frame per rendered frame
                state.tick();

                let ui = imgui.new_frame();
                if state.render_menu(ui) {
                    state.settings().save();
                    window_target.exit();
                }
                ui.dockspace_over_main_viewport();
                state.render_windows(ui);

                platform.prepare_render(ui, &window);
                let draw_data = imgui.render();

                unsafe {
                    gl_clear.clear_color(0.1, 0.1, 0.1, 1.0);
                    gl_clear.clear(glow::COLOR_BUFFER_BIT);
                }

                if let Err(e) = renderer.render(draw_data) {
                    error!("rendering failed: {e}");
                    window_target.exit();
                    return;
                }
                if let Err(e) = surface.swap_buffers(&context) {
                    error!("failed to swap buffers: {e}");
                    window_target.exit();
                }
            }
            Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                state.settings().save();
                window_target.exit();
            }
            _ => {}
        }

        platform.handle_event(imgui.io_mut(), &window, &event);
    }).map_err(|e| anyhow!("event loop error: {e}"))
}
