//! Browser host: `web_sys` implementations of the core's collaborators and
//! the wasm entry point.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything browser-specific lives here so the rest of the crate stays
//! testable on the host target. The host owns one [`SiteCore`], forwards DOM
//! events into it, and keeps exactly one `gloo_timers` timeout armed for the
//! core's next deadline. Re-arming replaces (and so cancels) the previous one.
//!
//! Element handles are assigned lazily: the first time a lookup returns an
//! element it gets a `data-pagesync-id` attribute and a cache entry, so later
//! lookups of the same element yield the same [`NodeId`]. Event targets never
//! mint handles; they resolve to the nearest element already known.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, ErrorEvent, Event, EventTarget, HtmlButtonElement, HtmlElement, HtmlInputElement,
    HtmlTextAreaElement, KeyboardEvent, Node, PromiseRejectionEvent, ScrollBehavior as DomScrollBehavior,
    ScrollToOptions, Storage, Window,
};

use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::form::SimulatedTransport;
use crate::site::SiteCore;
use crate::theme::PreferenceStore;
use crate::viewport::{NodeId, Rect, ScrollBehavior, ViewPort, closest_known};

const HANDLE_ATTRIBUTE: &str = "data-pagesync-id";

type Core = SiteCore<DomViewPort, LocalStorage, SimulatedTransport>;

fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Log a failed browser call and turn it into `None`.
fn logged<T>(what: &str, result: std::result::Result<T, JsValue>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("dom: {what} failed: {e:?}");
            None
        }
    }
}

fn js_error(e: &SiteError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// =============================================================
// ViewPort
// =============================================================

/// [`ViewPort`] over the live document.
pub struct DomViewPort {
    window: Window,
    document: Document,
    elements: RefCell<HashMap<String, Element>>,
    next_id: Cell<u64>,
}

impl DomViewPort {
    /// # Errors
    ///
    /// [`SiteError::Js`] when there is no window or document.
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| SiteError::Js("no window".into()))?;
        let document = window.document().ok_or_else(|| SiteError::Js("no document".into()))?;
        Ok(Self { window, document, elements: RefCell::new(HashMap::new()), next_id: Cell::new(0) })
    }

    /// Stable handle for `element`, assigning one on first sight.
    pub fn handle(&self, element: &Element) -> NodeId {
        if let Some(existing) = element.get_attribute(HANDLE_ATTRIBUTE) {
            self.elements
                .borrow_mut()
                .entry(existing.clone())
                .or_insert_with(|| element.clone());
            return NodeId::new(existing);
        }
        let next = self.next_id.get() + 1;
        self.next_id.set(next);
        let raw = format!("ps{next}");
        logged("tag element", element.set_attribute(HANDLE_ATTRIBUTE, &raw));
        self.elements.borrow_mut().insert(raw.clone(), element.clone());
        NodeId::new(raw)
    }

    /// Handle for an event's target: the target itself if it is known,
    /// otherwise its closest known ancestor, otherwise the root.
    pub fn target_of(&self, event: &Event) -> Option<NodeId> {
        let target = event.target()?;
        let start = match target.dyn_ref::<Element>() {
            Some(element) => Some(element.clone()),
            None => target.dyn_ref::<Node>()?.parent_element(),
        };
        closest_known(start, |e: &Element| e.parent_element(), |e| self.known(e)).or_else(|| Some(self.root()))
    }

    /// The cached handle for `element`, without assigning one.
    fn known(&self, element: &Element) -> Option<NodeId> {
        let raw = element.get_attribute(HANDLE_ATTRIBUTE)?;
        let elements = self.elements.borrow();
        let cached = elements.get(&raw)?;
        (cached == element).then(|| NodeId::new(raw))
    }

    fn element(&self, node: &NodeId) -> Option<Element> {
        self.elements.borrow().get(node.as_str()).cloned()
    }

    fn html(&self, node: &NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_ref::<HtmlElement>().cloned()
    }

    fn collect(&self, result: std::result::Result<web_sys::NodeList, JsValue>) -> Vec<NodeId> {
        let Some(list) = logged("query", result) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_ref::<Element>().map(|element| self.handle(element)))
            .collect()
    }
}

impl ViewPort for DomViewPort {
    fn select(&self, selector: &str) -> Option<NodeId> {
        let element = logged("query", self.document.query_selector(selector))??;
        Some(self.handle(&element))
    }

    fn select_all(&self, selector: &str) -> Vec<NodeId> {
        self.collect(self.document.query_selector_all(selector))
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        let element = self.document.get_element_by_id(id)?;
        Some(self.handle(&element))
    }

    fn select_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        let scope = self.element(scope)?;
        let element = logged("query", scope.query_selector(selector))??;
        Some(self.handle(&element))
    }

    fn root(&self) -> NodeId {
        match self.document.document_element() {
            Some(root) => self.handle(&root),
            None => NodeId::new(""),
        }
    }

    fn body(&self) -> NodeId {
        match self.document.body() {
            Some(body) => self.handle(&body),
            None => NodeId::new(""),
        }
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Some(ancestor), Some(node)) => {
                let node: &Node = node.as_ref();
                ancestor.contains(Some(node))
            }
            _ => false,
        }
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        self.element(node).is_some_and(|e| e.is_connected())
    }

    fn scroll_offset(&self) -> f64 {
        logged("scrollY", self.window.scroll_y()).unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        logged("innerHeight", self.window.inner_height())
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn extent(&self, node: &NodeId) -> Rect {
        let viewport = self.bounding_rect(node);
        Rect::new(viewport.top + self.scroll_offset(), viewport.height)
    }

    fn bounding_rect(&self, node: &NodeId) -> Rect {
        self.element(node).map_or_else(Rect::default, |e| {
            let rect = e.get_bounding_client_rect();
            Rect::new(rect.top(), rect.height())
        })
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|e| e.class_list().contains(class))
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if let Some(e) = self.element(node) {
            logged("classList.add", e.class_list().add_1(class));
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        if let Some(e) = self.element(node) {
            logged("classList.remove", e.class_list().remove_1(class));
        }
    }

    fn set_class_name(&mut self, node: &NodeId, class_name: &str) {
        if let Some(e) = self.element(node) {
            e.set_class_name(class_name);
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(e) = self.element(node) {
            logged("setAttribute", e.set_attribute(name, value));
        }
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        let Some(e) = self.html(node) else {
            return;
        };
        let style = e.style();
        if value.is_empty() {
            logged("style.removeProperty", style.remove_property(property));
        } else {
            logged("style.setProperty", style.set_property(property, value));
        }
    }

    fn text(&self, node: &NodeId) -> String {
        self.element(node)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        if let Some(e) = self.element(node) {
            e.set_text_content(Some(text));
        }
    }

    fn value(&self, node: &NodeId) -> String {
        let Some(e) = self.element(node) else {
            return String::new();
        };
        if let Some(input) = e.dyn_ref::<HtmlInputElement>() {
            return input.value();
        }
        if let Some(area) = e.dyn_ref::<HtmlTextAreaElement>() {
            return area.value();
        }
        String::new()
    }

    fn set_value(&mut self, node: &NodeId, value: &str) {
        let Some(e) = self.element(node) else {
            return;
        };
        if let Some(input) = e.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = e.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        }
    }

    fn set_disabled(&mut self, node: &NodeId, disabled: bool) {
        let Some(e) = self.element(node) else {
            return;
        };
        if let Some(button) = e.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if let Some(input) = e.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
        } else if disabled {
            logged("setAttribute", e.set_attribute("disabled", ""));
        } else {
            logged("removeAttribute", e.remove_attribute("disabled"));
        }
    }

    fn append_element(&mut self, tag: &str, class_name: &str) -> Option<NodeId> {
        let body = self.document.body()?;
        let element = logged("createElement", self.document.create_element(tag))?;
        element.set_class_name(class_name);
        logged("appendChild", body.append_child(&element))?;
        Some(self.handle(&element))
    }

    fn remove(&mut self, node: &NodeId) {
        if let Some(e) = self.elements.borrow_mut().remove(node.as_str()) {
            e.remove();
        }
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => DomScrollBehavior::Smooth,
            ScrollBehavior::Instant => DomScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

// =============================================================
// PreferenceStore
// =============================================================

/// [`PreferenceStore`] over `window.localStorage`.
pub struct LocalStorage {
    window: Window,
}

impl LocalStorage {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn storage(&self) -> Result<Storage> {
        match self.window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(SiteError::StorageUnavailable("localStorage is disabled".into())),
            Err(e) => Err(SiteError::StorageUnavailable(format!("{e:?}"))),
        }
    }
}

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|e| SiteError::StorageUnavailable(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| SiteError::StorageUnavailable(format!("{e:?}")))
    }
}

// =============================================================
// Listeners
// =============================================================

/// A registered DOM listener. Dropping it removes the listener.
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    /// # Errors
    ///
    /// [`SiteError::Js`] when the browser rejects the registration.
    pub fn new(target: &EventTarget, kind: &'static str, capture: bool, f: impl FnMut(Event) + 'static) -> Result<Self> {
        let callback = Closure::<dyn FnMut(Event)>::new(f);
        target
            .add_event_listener_with_callback_and_bool(kind, callback.as_ref().unchecked_ref(), capture)
            .map_err(|e| SiteError::Js(format!("addEventListener({kind}): {e:?}")))?;
        Ok(Self { target: target.clone(), kind, capture, callback })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        logged(
            "removeEventListener",
            self.target.remove_event_listener_with_callback_and_bool(
                self.kind,
                self.callback.as_ref().unchecked_ref(),
                self.capture,
            ),
        );
    }
}

// =============================================================
// Host
// =============================================================

/// The mounted site: core, listeners and the pending timeout.
pub struct Host {
    core: Rc<RefCell<Core>>,
    timeout: Rc<RefCell<Option<Timeout>>>,
    listeners: Vec<Listener>,
}

impl Host {
    /// Build the core, initialize its features and attach listeners.
    ///
    /// # Errors
    ///
    /// [`SiteError::Js`] when the window/document is missing or a listener
    /// cannot be registered.
    pub fn mount(config: SiteConfig) -> Result<Self> {
        let vp = DomViewPort::new()?;
        let store = LocalStorage::new(vp.window.clone());
        let window: EventTarget = vp.window.clone().into();
        let document: EventTarget = vp.document.clone().into();

        let mut core = SiteCore::new(vp, store, SimulatedTransport::default(), config);
        let failures = core.init();
        log::info!("pagesync: mounted with {} disabled features", failures.len());

        let core = Rc::new(RefCell::new(core));
        let timeout = Rc::new(RefCell::new(None));
        let mut host = Self { core, timeout, listeners: Vec::new() };

        host.listen(&window, "scroll", false, |core, _| core.on_scroll(now_ms()))?;
        host.listen(&document, "click", false, |core, event| {
            if let Some(target) = core.viewport().target_of(event) {
                if core.on_click(now_ms(), &target) {
                    event.prevent_default();
                }
            }
        })?;
        // `blur` does not bubble; capture it at the document instead.
        host.listen(&document, "blur", true, |core, event| {
            if let Some(target) = core.viewport().target_of(event) {
                core.on_blur(&target);
            }
        })?;
        host.listen(&document, "input", false, |core, event| {
            if let Some(target) = core.viewport().target_of(event) {
                core.on_input(&target);
            }
        })?;
        host.listen(&document, "submit", false, |core, event| {
            if let Some(target) = core.viewport().target_of(event) {
                if core.on_submit(now_ms(), &target) {
                    event.prevent_default();
                }
            }
        })?;
        host.listen(&document, "keydown", false, |core, event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) {
                core.on_key_down(&key);
            }
        })?;
        host.install_fault_handlers(&window)?;
        arm(&host.core, &host.timeout);
        Ok(host)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Register `handler` for `kind` on `target`, re-arming the timer afterwards.
    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        capture: bool,
        handler: impl Fn(&mut Core, &Event) + 'static,
    ) -> Result<()> {
        let core = Rc::clone(&self.core);
        let timeout = Rc::clone(&self.timeout);
        let listener = Listener::new(target, kind, capture, move |event: Event| {
            match core.try_borrow_mut() {
                Ok(mut core) => handler(&mut core, &event),
                Err(_) => {
                    log::warn!("pagesync: {kind} event dropped, core busy");
                    return;
                }
            }
            arm(&core, &timeout);
        })?;
        self.listeners.push(listener);
        Ok(())
    }

    /// Log uncaught errors and rejected promises instead of letting them surface.
    fn install_fault_handlers(&mut self, window: &EventTarget) -> Result<()> {
        self.listeners.push(Listener::new(window, "error", false, |event: Event| {
            match event.dyn_ref::<ErrorEvent>() {
                Some(e) => log::error!("uncaught error: {} ({}:{})", e.message(), e.filename(), e.lineno()),
                None => log::error!("uncaught error: {event:?}"),
            }
        })?);
        self.listeners.push(Listener::new(window, "unhandledrejection", false, |event: Event| {
            match event.dyn_ref::<PromiseRejectionEvent>() {
                Some(e) => log::error!("unhandled promise rejection: {:?}", e.reason()),
                None => log::error!("unhandled promise rejection: {event:?}"),
            }
            event.prevent_default();
        })?);
        Ok(())
    }
}

/// Arm one timeout for the core's next deadline, replacing any pending one.
fn arm(core: &Rc<RefCell<Core>>, slot: &Rc<RefCell<Option<Timeout>>>) {
    let Ok(borrowed) = core.try_borrow() else {
        return;
    };
    let Some(deadline) = borrowed.next_deadline() else {
        slot.borrow_mut().take();
        return;
    };
    drop(borrowed);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let delay = (deadline - now_ms()).ceil().max(0.0) as u32;
    let core_cb = Rc::clone(core);
    let slot_cb = Rc::clone(slot);
    let timeout = Timeout::new(delay, move || {
        // This timeout is running; hand it to the JS GC rather than dropping
        // it from inside its own callback.
        if let Some(spent) = slot_cb.borrow_mut().take() {
            drop(spent.forget());
        }
        if let Ok(mut core) = core_cb.try_borrow_mut() {
            core.tick(now_ms());
        }
        arm(&core_cb, &slot_cb);
    });
    slot.borrow_mut().replace(timeout);
}

// =============================================================
// Entry points
// =============================================================

thread_local! {
    static HOST: RefCell<Option<Host>> = const { RefCell::new(None) };
}

/// Mount the site. `config` is an optional JSON override of [`SiteConfig`].
///
/// Call once the document has been parsed (module scripts and `defer`
/// scripts already run at that point).
///
/// # Errors
///
/// Returns a JS error string when the page cannot be mounted at all.
#[wasm_bindgen]
pub fn start(config: Option<String>) -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    if let Err(e) = console_log::init_with_level(level) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("pagesync: logger already set: {e}")));
    }

    let config = match config.as_deref().map(SiteConfig::from_json) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            log::warn!("pagesync: {e}; using defaults");
            SiteConfig::default()
        }
        None => SiteConfig::default(),
    };
    let host = Host::mount(config).map_err(|e| js_error(&e))?;
    log::debug!("pagesync: {} listeners attached", host.listener_count());
    HOST.with(|slot| slot.borrow_mut().replace(host));
    Ok(())
}

/// Detach every listener and cancel the pending timer.
#[wasm_bindgen]
pub fn stop() {
    HOST.with(|slot| {
        if slot.borrow_mut().take().is_some() {
            log::info!("pagesync: unmounted");
        }
    });
}
