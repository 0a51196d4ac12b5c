//! WebAssembly bindings for readnav.
//!
//! This crate wires the platform-agnostic components of `readnav-core` to the
//! live page: headings and classes go through the DOM, timers and frames
//! through `gloo`, heading visibility through `IntersectionObserver`, and menu
//! dismissal through document-level listeners.
//!
//! ## Module Structure
//!
//! - [`dom`] - `DomSurface`: document surface and viewport over `web-sys`
//! - [`scheduler`] - `BrowserScheduler`: `setTimeout` / `requestAnimationFrame`
//! - [`observer`] - `BrowserIntersections`: `IntersectionObserver` adapter
//! - [`events`] - `BrowserEvents`: document click and keydown listeners
//! - [`render`] - the "On this page" list
//! - [`error`] - Error types with JavaScript interop
//! - [`types`] - Constructor configuration
//!
//! # Example
//!
//! ```javascript
//! import init, { ReadingNav } from '@readnav/wasm';
//!
//! await init();
//!
//! const nav = new ReadingNav({ outline: { contentRoot: "content" } });
//! nav.mount();
//! nav.scrollTo("setup-1");
//! console.log(nav.activeId, nav.progress, nav.menuOpen);
//! nav.destroy();
//! ```

pub mod dom;
pub mod error;
pub mod events;
pub mod observer;
pub mod render;
pub mod scheduler;
pub mod types;

pub use dom::{DomSurface, NodeTable};
pub use error::{ErrorCode, ReadNavError};
pub use events::BrowserEvents;
pub use observer::BrowserIntersections;
pub use scheduler::BrowserScheduler;
pub use types::{BindingConfig, ElementIds};

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use log::{debug, info, warn};
use readnav_core::{OutlineTracker, OverlayMenu, Platform, ProgressIndicator};
use readnav_types::HeadingId;
use render::{TocList, link_target};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
///
/// This function sets up panic hooks for better error messages in the browser console.
/// It is called automatically when using wasm-pack's generated JavaScript.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(feature = "console-logging")]
    {
        console_log::init_with_level(log::Level::Debug).ok();
    }
}

/// Get the version of the readnav-wasm library.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

struct Mounted {
    tracker: Rc<OutlineTracker>,
    progress: Option<ProgressIndicator>,
    menu: Option<OverlayMenu>,
    _toc: Option<(Rc<TocList>, EventListener)>,
}

impl Mounted {
    fn teardown(&self) {
        if let Some(menu) = &self.menu {
            menu.teardown();
        }
        if let Some(progress) = &self.progress {
            progress.teardown();
        }
        self.tracker.teardown();
    }
}

/// Outline tracking, reading progress and the explore menu for one page.
#[wasm_bindgen]
pub struct ReadingNav {
    config: BindingConfig,
    mounted: Option<Mounted>,
    destroyed: bool,
}

#[wasm_bindgen]
impl ReadingNav {
    /// Create a navigator. `config` may be omitted for the default layout.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ReadingNav, JsValue> {
        let config: BindingConfig = if config.is_undefined() || config.is_null() {
            BindingConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(ReadNavError::from)?
        };
        config.nav.validate().map_err(ReadNavError::from)?;
        Ok(Self {
            config,
            mounted: None,
            destroyed: false,
        })
    }

    /// Attach to the page. Calling it again while mounted does nothing.
    #[wasm_bindgen]
    pub fn mount(&mut self) -> Result<(), JsValue> {
        if self.destroyed {
            return Err(ReadNavError::new(ErrorCode::Destroyed, "navigator was destroyed").into());
        }
        if self.mounted.is_none() {
            self.mounted = Some(self.attach()?);
        }
        Ok(())
    }

    /// Scroll to a heading and mark it active.
    #[wasm_bindgen(js_name = scrollTo)]
    pub fn scroll_to(&self, id: &str) -> Result<(), JsValue> {
        let mounted = self.mounted()?;
        mounted
            .tracker
            .scroll_to(&HeadingId::new(id))
            .map_err(ReadNavError::from)?;
        Ok(())
    }

    /// Id of the heading being read, if any.
    #[wasm_bindgen(getter, js_name = activeId)]
    pub fn active_id(&self) -> Option<String> {
        self.mounted
            .as_ref()
            .and_then(|m| m.tracker.active_id())
            .map(|id| id.to_string())
    }

    /// The outline as an array of `{ id, text, level }`.
    #[wasm_bindgen]
    pub fn outline(&self) -> Result<JsValue, JsValue> {
        let outline = self
            .mounted
            .as_ref()
            .map(|m| m.tracker.outline())
            .unwrap_or_default();
        serde_wasm_bindgen::to_value(&outline).map_err(|e| ReadNavError::from(e).into())
    }

    /// Reading progress in `[0, 1]`.
    #[wasm_bindgen(getter)]
    pub fn progress(&self) -> f64 {
        self.mounted
            .as_ref()
            .and_then(|m| m.progress.as_ref())
            .map(|p| p.current().value())
            .unwrap_or(0.0)
    }

    #[wasm_bindgen(getter, js_name = menuOpen)]
    pub fn menu_open(&self) -> bool {
        self.mounted
            .as_ref()
            .and_then(|m| m.menu.as_ref())
            .is_some_and(OverlayMenu::is_open)
    }

    #[wasm_bindgen(js_name = toggleMenu)]
    pub fn toggle_menu(&self) {
        if let Some(menu) = self.mounted.as_ref().and_then(|m| m.menu.as_ref()) {
            menu.toggle();
        }
    }

    /// Detach every listener, observer, timer and frame callback.
    #[wasm_bindgen]
    pub fn destroy(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.teardown();
            info!("[READNAV] Destroyed");
        }
        self.destroyed = true;
    }
}

impl ReadingNav {
    fn mounted(&self) -> Result<&Mounted, ReadNavError> {
        if self.destroyed {
            return Err(ReadNavError::new(ErrorCode::Destroyed, "navigator was destroyed"));
        }
        self.mounted
            .as_ref()
            .ok_or_else(|| ReadNavError::new(ErrorCode::Destroyed, "navigator is not mounted"))
    }

    fn attach(&self) -> Result<Mounted, ReadNavError> {
        let window = web_sys::window()
            .ok_or_else(|| ReadNavError::new(ErrorCode::MissingElement, "no window"))?;
        let document = window
            .document()
            .ok_or_else(|| ReadNavError::new(ErrorCode::MissingElement, "no document"))?;

        let nodes = Rc::new(NodeTable::new());
        let surface = Rc::new(DomSurface::new(window, document.clone(), Rc::clone(&nodes)));
        let platform = Platform::new(
            surface.clone(),
            surface.clone(),
            Rc::new(BrowserScheduler::new()),
            Rc::new(BrowserIntersections::new(Rc::clone(&nodes))),
            Rc::new(BrowserEvents::new(document.clone(), Rc::clone(&nodes))),
        );
        let elements = &self.config.elements;

        let tracker = Rc::new(OutlineTracker::new(&platform, self.config.nav.outline.clone()));
        let toc = match document.get_element_by_id(&elements.toc_container) {
            Some(container) => Some(attach_toc(&tracker, TocList::new(document.clone(), container))),
            None => {
                debug!("[READNAV] No '{}' container; outline list disabled", elements.toc_container);
                None
            }
        };
        tracker.start()?;

        let progress = match surface.register_by_id(&elements.progress_fill) {
            Some(fill) => {
                let progress =
                    ProgressIndicator::new(&platform, self.config.nav.progress.clone(), fill);
                progress.start()?;
                Some(progress)
            }
            None => {
                debug!("[READNAV] No '{}' element; progress bar disabled", elements.progress_fill);
                None
            }
        };

        let menu = match (
            surface.register_by_id(&elements.menu_trigger),
            surface.register_by_id(&elements.menu_panel),
        ) {
            (Some(trigger), Some(panel)) => Some(OverlayMenu::mount(
                &platform,
                self.config.nav.menu.clone(),
                trigger,
                panel,
            )?),
            (trigger, panel) => {
                if trigger.is_some() != panel.is_some() {
                    warn!(
                        "[READNAV] Menu needs both '{}' and '{}'; menu disabled",
                        elements.menu_trigger, elements.menu_panel
                    );
                }
                None
            }
        };

        info!("[READNAV] Mounted");
        Ok(Mounted {
            tracker,
            progress,
            menu,
            _toc: toc,
        })
    }
}

fn attach_toc(tracker: &Rc<OutlineTracker>, list: TocList) -> (Rc<TocList>, EventListener) {
    let list = Rc::new(list);

    let weak = Rc::downgrade(&list);
    tracker.subscribe_outline(move |rows| {
        if let Some(list) = weak.upgrade() {
            list.render(rows);
        }
    });
    let weak = Rc::downgrade(&list);
    tracker.subscribe(move |active| {
        if let Some(list) = weak.upgrade() {
            list.mark_active(active);
        }
    });

    // Not passive: the native anchor jump must be cancelled so the offset
    // scroll is the only one.
    let weak_tracker = Rc::downgrade(tracker);
    let clicks = EventListener::new_with_options(
        list.container(),
        "click",
        EventListenerOptions {
            phase: EventListenerPhase::Bubble,
            passive: false,
        },
        move |event| {
            let Some(id) = link_target(event) else {
                return;
            };
            event.prevent_default();
            if let Some(tracker) = weak_tracker.upgrade() {
                if let Err(e) = tracker.scroll_to(&id) {
                    warn!("[READNAV] Outline link to '{}' failed: {}", id, e);
                }
            }
        },
    );
    (list, clicks)
}
