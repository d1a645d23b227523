//! Yut scene entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_scene {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, MouseEvent, PointerEvent, WheelEvent};

    use glam::{Vec2, Vec3};
    use yut_scene::Settings;
    use yut_scene::audio::{AudioManager, SoundEffect};
    use yut_scene::consts::PHYSICS_DT;
    use yut_scene::physics::BoxWorld;
    use yut_scene::renderer::RenderState;
    use yut_scene::sim::{
        DebugAction, FrameInput, FrameTime, SceneEvent, SceneState, TransientKind, frame,
    };

    /// Scene instance holding all state
    struct Scene {
        state: SceneState,
        physics: BoxWorld,
        renderer: RenderState,
        audio: AudioManager,
        settings: Settings,
        input: FrameInput,
        /// rAF timestamp of the first frame (ms)
        start_time: Option<f64>,
        last_time: f64,
        /// Pointer position of an orbit drag in progress
        drag_from: Option<Vec2>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Scene {
        /// Canvas pixel offset to normalized device coordinates
        fn to_ndc(canvas: &HtmlCanvasElement, x: i32, y: i32) -> Vec2 {
            let w = canvas.client_width().max(1) as f32;
            let h = canvas.client_height().max(1) as f32;
            Vec2::new(x as f32 / w * 2.0 - 1.0, 1.0 - y as f32 / h * 2.0)
        }

        fn step(&mut self, time: f64) {
            let start = *self.start_time.get_or_insert(time);
            let delta = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                PHYSICS_DT
            };
            self.last_time = time;

            let frame_time = FrameTime {
                elapsed: ((time - start) / 1000.0) as f32,
                delta,
            };
            let report = frame(
                &mut self.state,
                &mut self.physics,
                &self.input,
                frame_time,
                &mut self.renderer,
            );
            self.input.consume();

            for event in &report.events {
                match *event {
                    SceneEvent::PieceImpact { speed, .. } => {
                        self.audio.play(SoundEffect::PieceImpact { speed })
                    }
                    SceneEvent::PiecesThrown => self.audio.play(SoundEffect::PiecesThrown),
                    SceneEvent::PieceDetached(_) => self.audio.play(SoundEffect::PieceDetached),
                    SceneEvent::Spawned(kind) => log::debug!("{:?} spawned", kind),
                    SceneEvent::Expired { kind, reason } => {
                        log::debug!("{:?} expired ({:?})", kind, reason)
                    }
                }
            }

            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 && time > oldest_time {
                self.fps = (60000.0 / (time - oldest_time)).round() as u32;
            }
        }

        /// Update the debug panel readouts
        fn update_panel(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let readouts = [
                ("debug-fps", self.fps.to_string()),
                ("debug-pieces", self.state.pieces.len().to_string()),
                ("debug-frame", self.state.frame_count.to_string()),
                ("debug-seed", self.state.seed.to_string()),
                (
                    "debug-spaceships",
                    self.state.collection(TransientKind::Spaceship).len().to_string(),
                ),
                (
                    "debug-shooting-stars",
                    self.state.collection(TransientKind::ShootingStar).len().to_string(),
                ),
                (
                    "debug-highlight",
                    self.state
                        .highlighted
                        .and_then(|i| self.state.tiles.get(i))
                        .map_or("-", |t| t.name())
                        .to_string(),
                ),
            ];
            for (id, text) in readouts {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&text));
                }
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Yut scene starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let (width, height) = fit_canvas(&window, &canvas);

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let gravity = Vec3::new(0.0, settings.scene.physics.gravity, 0.0);
        let mut physics = BoxWorld::new(gravity);
        let mut state = SceneState::build(settings.scene.clone(), seed, &mut physics);
        state.spawning = settings.spawning;
        state.camera.set_aspect(width, height);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let scene = Rc::new(RefCell::new(Scene {
            state,
            physics,
            renderer,
            audio: AudioManager::new(&settings),
            input: FrameInput::default(),
            start_time: None,
            last_time: 0.0,
            drag_from: None,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
            settings,
        }));

        setup_input_handlers(&canvas, scene.clone());
        setup_resize_handler(canvas, scene.clone());
        setup_debug_panel(scene.clone());

        request_animation_frame(scene);

        log::info!("Yut scene running with seed {}", seed);
        Ok(())
    }

    /// Match the canvas backing store to its CSS size
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, scene: Rc<RefCell<Scene>>) {
        // Pointer move: picking position, plus orbit drag while a button is held
        {
            let scene = scene.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut s = scene.borrow_mut();
                let ndc = Scene::to_ndc(&canvas_clone, event.offset_x(), event.offset_y());
                s.input.pointer_ndc = ndc;
                if let Some(from) = s.drag_from {
                    s.input.orbit_drag += ndc - from;
                    s.drag_from = Some(ndc);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer down starts a drag; first gesture also unlocks audio
        {
            let scene = scene.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut s = scene.borrow_mut();
                s.audio.resume();
                s.drag_from = Some(Scene::to_ndc(&canvas_clone, event.offset_x(), event.offset_y()));
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for name in ["pointerup", "pointerleave"] {
            let scene = scene.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                scene.borrow_mut().drag_from = None;
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Wheel zoom
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                let steps = event.delta_y().signum() as f32;
                scene.borrow_mut().input.zoom += steps;
            });
            let _ = canvas
                .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: HtmlCanvasElement, scene: Rc<RefCell<Scene>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = fit_canvas(&window, &canvas);
            let mut s = scene.borrow_mut();
            s.renderer.resize(width, height);
            s.state.camera.set_aspect(width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Queue a debug action when the button with `id` is clicked
    fn on_click(scene: &Rc<RefCell<Scene>>, id: &str, action: impl Fn(&Scene) -> Option<DebugAction> + 'static) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            return;
        };
        let scene = scene.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut s = scene.borrow_mut();
            s.audio.resume();
            if let Some(action) = action(&s) {
                s.input.actions.push(action);
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_debug_panel(scene: Rc<RefCell<Scene>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(panel) = document.get_element_by_id("debug-panel") {
            let class = if scene.borrow().settings.show_debug_panel { "" } else { "hidden" };
            let _ = panel.set_attribute("class", class);
        }

        on_click(&scene, "detach-btn", |s| {
            s.state.pieces.ids().first().copied().map(DebugAction::DetachPiece)
        });
        on_click(&scene, "throw-btn", |_| Some(DebugAction::ThrowPieces));
        on_click(&scene, "reset-camera-btn", |_| Some(DebugAction::ResetCamera));

        // Spawn toggle checkbox; the choice is remembered across reloads
        if let Some(toggle) = document
            .get_element_by_id("spawn-toggle")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            toggle.set_checked(scene.borrow().settings.spawning);
            let toggle_clone = toggle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let enabled = toggle_clone.checked();
                let mut s = scene.borrow_mut();
                s.input.actions.push(DebugAction::SetSpawning(enabled));
                s.settings.spawning = enabled;
                s.settings.save();
            });
            let _ = toggle.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(scene: Rc<RefCell<Scene>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            scene_loop(scene, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn scene_loop(scene: Rc<RefCell<Scene>>, time: f64) {
        {
            let mut s = scene.borrow_mut();
            s.step(time);
            s.update_panel();
        }

        request_animation_frame(scene);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_scene::run().await {
        log::error!("Failed to start: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run: drive the scene without a window and log what happened
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Yut scene (native, headless) starting...");

    if let Err(e) = native::run(std::env::args().nth(1)) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use glam::{Vec2, Vec3};
    use yut_scene::consts::PHYSICS_DT;
    use yut_scene::physics::{BoxWorld, RigidBodySim};
    use yut_scene::renderer::DrawList;
    use yut_scene::sim::{FrameInput, FrameTime, SceneEvent, SceneState, TransientKind, frame};
    use yut_scene::{Settings, SettingsError};

    const FRAMES: u32 = 600;

    pub fn run(settings_path: Option<String>) -> Result<(), SettingsError> {
        let settings = match settings_path {
            Some(path) => Settings::load_from(std::path::Path::new(&path))?,
            None => Settings::default(),
        };
        let seed = settings.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs())
        });

        let gravity = Vec3::new(0.0, settings.scene.physics.gravity, 0.0);
        let mut physics = BoxWorld::new(gravity);
        let mut state = SceneState::build(settings.scene.clone(), seed, &mut physics);
        state.spawning = settings.spawning;
        let mut draw_list = DrawList::new();
        let mut input = FrameInput::default();

        let (mut spawned, mut expired, mut impacts, mut stacked, mut highlighted) = (0, 0, 0, 0, 0);
        for n in 1..=FRAMES {
            // Sweep the pointer in a slow circle over the board
            let phase = n as f32 / FRAMES as f32 * std::f32::consts::TAU;
            input.pointer_ndc = Vec2::new(phase.cos(), phase.sin()) * 0.5;

            let time = FrameTime {
                elapsed: n as f32 * PHYSICS_DT,
                delta: PHYSICS_DT,
            };
            let report = frame(&mut state, &mut physics, &input, time, &mut draw_list);
            input.consume();

            for event in &report.events {
                match event {
                    SceneEvent::Spawned(_) => spawned += 1,
                    SceneEvent::Expired { .. } => expired += 1,
                    SceneEvent::PieceImpact { other, .. } => {
                        impacts += 1;
                        if other.is_some() {
                            stacked += 1;
                        }
                    }
                    _ => {}
                }
            }
            if report.highlighted.is_some() {
                highlighted += 1;
            }
        }

        log::info!(
            "{} frames (seed {}): {} spawned, {} expired, {} impacts ({} piece on piece), {} frames with a highlight, {} vertices in the last frame",
            state.frame_count,
            state.seed,
            spawned,
            expired,
            impacts,
            stacked,
            highlighted,
            draw_list.vertices().len()
        );
        log::info!(
            "Still in flight: {} spaceships, {} shooting stars",
            state.collection(TransientKind::Spaceship).len(),
            state.collection(TransientKind::ShootingStar).len()
        );
        for (i, body) in physics.bodies().iter().enumerate() {
            log::info!("Piece {} rests at {:?}", i, body.position);
        }
        Ok(())
    }
}
