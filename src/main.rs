//! Heart Burst entry point
//!
//! Handles platform-specific initialization and wires the page together.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_page {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use heart_burst::consts::*;
    use heart_burst::web::ExplosionView;
    use heart_burst::{BurstTuning, Celebration, PressOutcome, Settings};

    /// Page instance holding all state
    struct Page {
        celebration: Celebration,
        tuning: BurstTuning,
        settings: Settings,
        explosion: Option<ExplosionView>,
        shake_timer: Option<Timeout>,
        explosion_timer: Option<Timeout>,
    }

    impl Page {
        fn new() -> Self {
            Self {
                celebration: Celebration::new(TARGET_PRESSES),
                tuning: BurstTuning::load(),
                settings: Settings::load(),
                explosion: None,
                shake_timer: None,
                explosion_timer: None,
            }
        }

        /// Tuning with the preference-scaled particle count
        fn burst_tuning(&self) -> BurstTuning {
            let count = self.settings.particle_count(self.tuning.count);
            self.tuning.with_count(count)
        }
    }

    fn current_document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_class(document: &Document, id: &str, class: &str, on: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    /// A scheduled `setTimeout` that owns its callback. Dropping it clears the
    /// timer and frees the closure.
    struct Timeout {
        handle: i32,
        _closure: Closure<dyn FnMut()>,
    }

    impl Timeout {
        fn schedule(callback: impl FnOnce() + 'static, ms: i32) -> Option<Self> {
            let window = web_sys::window()?;
            let closure: Closure<dyn FnMut()> = Closure::once(callback);
            let handle = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    ms,
                )
                .ok()?;
            Some(Self {
                handle,
                _closure: closure,
            })
        }
    }

    impl Drop for Timeout {
        fn drop(&mut self) {
            // No-op if the timer already fired
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(self.handle);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Heart Burst starting...");

        let page = Rc::new(RefCell::new(Page::new()));
        {
            let p = page.borrow();
            log::info!(
                "Target {} presses, {} particles per burst",
                p.celebration.target(),
                p.settings.particle_count(p.tuning.count)
            );
        }

        update_meter(&page.borrow());
        setup_input_handlers(page);

        log::info!("Heart Burst ready!");
    }

    fn setup_input_handlers(page: Rc<RefCell<Page>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard - Space only
        {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() == "Space" {
                    event.prevent_default();
                    handle_press(&page);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer - mouse, pen and touch
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                handle_press(&page);
            });
            let _ = window
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn handle_press(page: &Rc<RefCell<Page>>) {
        let outcome = page.borrow_mut().celebration.press();
        match outcome {
            PressOutcome::Ignored => return,
            PressOutcome::Counted => {}
            PressOutcome::Completed => start_explosion(page),
        }
        update_meter(&page.borrow());
        shake(page);
    }

    fn update_meter(page: &Page) {
        let Some(document) = current_document() else {
            return;
        };
        if let Some(el) = document.get_element_by_id("progress-fill") {
            let percent = page.celebration.progress() * 100.0;
            let _ = el.set_attribute("style", &format!("width: {:.1}%", percent));
        }
    }

    /// Brief shake on every counted press; a new press restarts the timer
    fn shake(page: &Rc<RefCell<Page>>) {
        let Some(document) = current_document() else {
            return;
        };
        set_class(&document, "stage", "shake", true);

        // Dropping the previous timer cancels it. A fired timer stays in the
        // slot until the next press, since a closure cannot free itself.
        let previous = page.borrow_mut().shake_timer.take();
        drop(previous);

        let timer = Timeout::schedule(
            || {
                if let Some(document) = current_document() {
                    set_class(&document, "stage", "shake", false);
                }
            },
            SHAKE_DURATION_MS,
        );
        page.borrow_mut().shake_timer = timer;
    }

    fn start_explosion(page: &Rc<RefCell<Page>>) {
        let Some(document) = current_document() else {
            return;
        };
        set_class(&document, "setup", "hidden", true);

        let canvas = document
            .get_element_by_id("burst-canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
        if let Some(canvas) = canvas {
            let _ = canvas.class_list().toggle_with_force("hidden", false);
            let tuning = page.borrow().burst_tuning();
            match ExplosionView::mount(canvas, &tuning) {
                Ok(view) => page.borrow_mut().explosion = Some(view),
                Err(e) => log::warn!("Burst not shown: {}", e),
            }
        } else {
            log::warn!("No #burst-canvas element; skipping burst");
        }

        let page_for_timer = page.clone();
        let timer = Timeout::schedule(
            move || finish_explosion(&page_for_timer),
            EXPLOSION_DURATION_MS,
        );
        page.borrow_mut().explosion_timer = timer;
    }

    fn finish_explosion(page: &Rc<RefCell<Page>>) {
        if !page.borrow_mut().celebration.finish_explosion() {
            return;
        }

        // Unmount before touching the DOM so no frame paints a hidden canvas
        let view = page.borrow_mut().explosion.take();
        drop(view);

        if let Some(document) = current_document() {
            set_class(&document, "burst-canvas", "hidden", true);
            set_class(&document, "reveal", "hidden", false);
            set_class(&document, "stage", "revealed", true);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_page::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Heart Burst (native) starting...");
    log::info!("The page itself needs a browser - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(12345);
    headless_burst(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive one burst against the in-memory host and report what it did
#[cfg(not(target_arch = "wasm32"))]
fn headless_burst(seed: u64) {
    use heart_burst::headless::HeadlessHost;
    use heart_burst::{BurstTuning, ParticleEngine, Settings};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    let settings = Settings::load();
    let tuning = BurstTuning::load();
    let tuning = tuning.with_count(settings.particle_count(tuning.count));

    let host = HeadlessHost::new(800, 600);
    let ledger = host.ledger();
    let mut rng = Pcg32::seed_from_u64(seed);

    let mut engine = match ParticleEngine::mount(host, &tuning, &mut rng) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Burst failed to mount: {}", e);
            return;
        }
    };

    for frame in 0..120 {
        if frame == 60 {
            ledger.borrow_mut().viewport = (1280, 720);
            engine.on_resize();
        }
        let fired = ledger.borrow_mut().fire_next();
        if fired.is_none() {
            log::warn!("Loop stopped early at frame {}", frame);
            break;
        }
        engine.on_frame();
    }

    let origin = engine.origin();
    println!(
        "Seed {}: {} particles, {} frames, mean drift {:.1}px from ({:.0}, {:.0})",
        seed,
        engine.store().len(),
        engine.frames_rendered(),
        engine.store().mean_distance_from(origin),
        origin.x,
        origin.y
    );

    engine.unmount();
    let ledger = ledger.borrow();
    println!(
        "After unmount: {} pending frames, {} resize listeners",
        ledger.pending_frames.len(),
        ledger.resize_listeners.len()
    );
}
