#![forbid(unsafe_code)]

//! `wasm-bindgen` binding over the live document.
//!
//! Clicks, keys and focus changes are delegated to `document`; hover uses
//! `mouseenter`/`mouseleave` on each item that owns a submenu. Every listener is kept
//! in a registry and removed again by `destroy()`. One `setTimeout` is kept
//! armed for the controller's next deadline.
//!
//! Moving focus from inside an op dispatches `focusin`/`focusout`
//! synchronously while the controller is borrowed; such events are queued and
//! handled right after the current one.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use navkit_core::event::KeyEvent;
use navkit_core::surface::{ItemLayout, SubmenuLayout};
use navkit_core::{
    DomOp, EventOutcome, ItemId, MenuPhase, NavController, NavEvent, NavLayout, NavSurface, Node,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, KeyboardEvent, Window};
use web_time::Instant;

use crate::input::{Selectors, modifiers_from_flags, normalize_dom_key, options_from_json};

/// Class given to an overlay the binding creates itself.
const OVERLAY_CLASS: &str = "nav-overlay";

fn console_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn console_warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

fn non_empty_id(el: &Element) -> Option<String> {
    let id = el.id();
    (!id.is_empty()).then_some(id)
}

fn query(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn contains(el: &Element, target: &Element) -> bool {
    let target: &web_sys::Node = target.as_ref();
    el.contains(Some(target))
}

// ---------------------------------------------------------------------------
// Anchors and surface
// ---------------------------------------------------------------------------

struct ItemRefs {
    item: Element,
    link: Option<Element>,
    submenu: Option<Element>,
    submenu_links: Vec<Element>,
}

/// Element handles found at attach. Shared between the surface and the
/// listeners so targets resolve even while the controller is borrowed.
struct Anchors {
    window: Window,
    document: Document,
    body: HtmlElement,
    trigger: Option<Element>,
    panel: Option<Element>,
    close_button: Option<Element>,
    overlay: RefCell<Option<Element>>,
    items: Vec<ItemRefs>,
}

impl Anchors {
    fn query(window: Window, selectors: &Selectors) -> Option<Self> {
        let document = window.document()?;
        let body = document.body()?;
        let root = document.document_element()?;
        let trigger = query(&root, &selectors.trigger);
        let panel = query(&root, &selectors.panel);
        let close_button = query(&root, &selectors.close_button);
        let overlay = query(&root, &selectors.overlay);
        let items = panel
            .as_ref()
            .map(|panel| {
                query_all(panel, &selectors.item)
                    .into_iter()
                    .map(|item| {
                        let link = query(&item, &selectors.link);
                        let submenu = query(&item, &selectors.submenu);
                        let submenu_links = submenu
                            .as_ref()
                            .map(|s| query_all(s, &selectors.submenu_link))
                            .unwrap_or_default();
                        ItemRefs {
                            item,
                            link,
                            submenu,
                            submenu_links,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            window,
            document,
            body,
            trigger,
            panel,
            close_button,
            overlay: RefCell::new(overlay),
            items,
        })
    }

    fn layout(&self) -> NavLayout {
        NavLayout {
            trigger: self.trigger.is_some(),
            panel: self.panel.is_some(),
            panel_id: self.panel.as_ref().and_then(non_empty_id),
            close_button: self.close_button.is_some(),
            overlay: self.overlay.borrow().is_some(),
            items: self
                .items
                .iter()
                .map(|refs| ItemLayout {
                    link: refs.link.is_some(),
                    link_id: refs.link.as_ref().and_then(non_empty_id),
                    submenu: refs.submenu.as_ref().map(|s| SubmenuLayout {
                        id: non_empty_id(s),
                        links: refs.submenu_links.len(),
                    }),
                })
                .collect(),
        }
    }

    fn viewport_width(&self) -> u32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .map_or(0, |w| w.max(0.0) as u32)
    }

    fn element(&self, node: Node) -> Option<Element> {
        let item = |id: ItemId| self.items.get(id.index());
        match node {
            Node::Trigger => self.trigger.clone(),
            Node::Panel => self.panel.clone(),
            Node::CloseButton => self.close_button.clone(),
            Node::Overlay => self.overlay.borrow().clone(),
            Node::Body => Some(self.body.clone().into()),
            Node::Item(id) => item(id).map(|r| r.item.clone()),
            Node::ItemLink(id) => item(id).and_then(|r| r.link.clone()),
            Node::Submenu(id) => item(id).and_then(|r| r.submenu.clone()),
            Node::SubmenuLink(id, n) => item(id).and_then(|r| r.submenu_links.get(n).cloned()),
            Node::Document => None,
        }
    }

    /// Innermost navigation node containing `target`.
    fn resolve(&self, target: &Element) -> Node {
        if let Some(overlay) = self.overlay.borrow().as_ref()
            && contains(overlay, target)
        {
            return Node::Overlay;
        }
        if self.trigger.as_ref().is_some_and(|t| contains(t, target)) {
            return Node::Trigger;
        }
        if self.close_button.as_ref().is_some_and(|c| contains(c, target)) {
            return Node::CloseButton;
        }
        for (idx, refs) in self.items.iter().enumerate() {
            if !contains(&refs.item, target) {
                continue;
            }
            let id = ItemId(idx);
            if let Some(n) = refs.submenu_links.iter().position(|l| contains(l, target)) {
                return Node::SubmenuLink(id, n);
            }
            if refs.submenu.as_ref().is_some_and(|s| contains(s, target)) {
                return Node::Submenu(id);
            }
            if refs.link.as_ref().is_some_and(|l| contains(l, target)) {
                return Node::ItemLink(id);
            }
            return Node::Item(id);
        }
        if self.panel.as_ref().is_some_and(|p| contains(p, target)) {
            return Node::Panel;
        }
        Node::Document
    }

    fn resolve_event(&self, event: &Event) -> Node {
        event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .map_or(Node::Document, |el| self.resolve(&el))
    }

    fn apply(&self, op: DomOp) -> Result<(), JsValue> {
        match op {
            DomOp::SetClass {
                node,
                class,
                present,
            } => {
                if let Some(el) = self.element(node) {
                    el.class_list().toggle_with_force(&class, present)?;
                }
            }
            DomOp::SetAttr { node, attr, value } => {
                if let Some(el) = self.element(node) {
                    el.set_attribute(attr.as_str(), &value)?;
                }
            }
            DomOp::SetHidden { node, hidden } => {
                if let Some(el) = self.element(node) {
                    if hidden {
                        el.set_attribute("hidden", "")?;
                    } else {
                        el.remove_attribute("hidden")?;
                    }
                }
            }
            DomOp::Focus { node } => {
                if let Some(el) = self
                    .element(node)
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                {
                    el.focus()?;
                }
            }
            DomOp::CreateOverlay => {
                let el = self.document.create_element("div")?;
                el.set_class_name(OVERLAY_CLASS);
                self.body.append_child(&el)?;
                *self.overlay.borrow_mut() = Some(el);
            }
            DomOp::LockScroll { offset } => {
                let style = self.body.style();
                style.set_property("position", "fixed")?;
                style.set_property("top", &format!("{}px", -offset))?;
                style.set_property("width", "100%")?;
            }
            DomOp::UnlockScroll { restore } => {
                let style = self.body.style();
                style.remove_property("position")?;
                style.remove_property("top")?;
                style.remove_property("width")?;
                self.window.scroll_to_with_x_and_y(0.0, f64::from(restore));
            }
        }
        Ok(())
    }
}

struct DomSurface {
    anchors: Rc<Anchors>,
}

impl NavSurface for DomSurface {
    fn layout(&self) -> NavLayout {
        self.anchors.layout()
    }

    fn viewport_width(&self) -> u32 {
        self.anchors.viewport_width()
    }

    fn scroll_offset(&self) -> i32 {
        self.anchors
            .window
            .scroll_y()
            .map_or(0, |y| y.round() as i32)
    }

    fn apply(&mut self, op: DomOp) {
        if let Err(err) = self.anchors.apply(op) {
            console_warn(&format!("navkit: DOM update failed: {err:?}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Controller state
// ---------------------------------------------------------------------------

struct State {
    nav: Option<NavController<DomSurface>>,
    epoch: Instant,
    timer_fn: Option<js_sys::Function>,
    timer_handle: Option<i32>,
}

impl State {
    fn sync_time(&mut self) {
        let now = self.epoch.elapsed();
        if let Some(nav) = self.nav.as_mut() {
            nav.set_time(now);
        }
    }

    fn step(&mut self, event: NavEvent) -> EventOutcome {
        self.sync_time();
        self.nav
            .as_mut()
            .map_or(EventOutcome::IGNORED, |nav| nav.handle(event))
    }

    fn rearm(&mut self, window: &Window) {
        if let Some(handle) = self.timer_handle.take() {
            window.clear_timeout_with_handle(handle);
        }
        let (Some(nav), Some(timer_fn)) = (self.nav.as_ref(), self.timer_fn.as_ref()) else {
            return;
        };
        let Some(deadline) = nav.next_deadline() else {
            return;
        };
        let delay = deadline.saturating_sub(self.epoch.elapsed()).as_millis();
        let delay = i32::try_from(delay).unwrap_or(i32::MAX);
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(timer_fn, delay) {
            Ok(handle) => self.timer_handle = Some(handle),
            Err(err) => console_warn(&format!("navkit: setTimeout failed: {err:?}")),
        }
    }
}

struct Shared {
    anchors: Rc<Anchors>,
    state: RefCell<State>,
    queue: RefCell<VecDeque<NavEvent>>,
}

impl Shared {
    /// Handle `event`, or queue it if the controller is already busy.
    fn dispatch(&self, event: NavEvent) -> EventOutcome {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            self.queue.borrow_mut().push_back(event);
            return EventOutcome::IGNORED;
        };
        let outcome = state.step(event);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(next) = next else { break };
            state.step(next);
        }
        state.rearm(&self.anchors.window);
        outcome
    }

    fn tick(&self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.timer_handle = None;
            state.sync_time();
            state.rearm(&self.anchors.window);
        }
    }

    fn with_nav<R>(
        &self,
        default: R,
        f: impl FnOnce(&mut NavController<DomSurface>) -> R,
    ) -> R {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return default;
        };
        state.sync_time();
        let result = state.nav.as_mut().map_or(default, f);
        state.rearm(&self.anchors.window);
        result
    }
}

fn apply_outcome(event: &Event, outcome: EventOutcome) {
    if outcome.prevent_default {
        event.prevent_default();
    }
    if outcome.stop_propagation {
        event.stop_propagation();
    }
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

// ---------------------------------------------------------------------------
// JS API
// ---------------------------------------------------------------------------

/// Responsive navigation bound to the current document.
#[wasm_bindgen]
pub struct NavMenuWeb {
    shared: Option<Rc<Shared>>,
    listeners: Vec<Listener>,
    timer_callback: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl NavMenuWeb {
    /// Find the navigation markup and take over its behavior.
    ///
    /// `options` is an optional object of config keys (`breakpoint`,
    /// `hoverOpenDelayMs`, ..) plus `selectors`. Returns `undefined` and logs
    /// to the console when the markup or options are unusable.
    pub fn attach(options: JsValue) -> Option<NavMenuWeb> {
        match Self::try_attach(&options) {
            Ok(menu) => Some(menu),
            Err(msg) => {
                console_error(&format!("navkit: navigation not enhanced: {msg}"));
                None
            }
        }
    }

    pub fn open(&self) -> bool {
        self.with_nav(false, |nav| nav.open())
    }

    pub fn close(&self) -> bool {
        self.with_nav(false, |nav| nav.close())
    }

    pub fn toggle(&self) -> bool {
        self.with_nav(false, |nav| nav.toggle())
    }

    #[wasm_bindgen(js_name = closeAllDropdowns)]
    pub fn close_all_dropdowns(&self) {
        self.with_nav((), |nav| nav.close_all_dropdowns());
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.with_nav(false, |nav| nav.is_open())
    }

    #[wasm_bindgen(js_name = isMobile)]
    pub fn is_mobile(&self) -> bool {
        self.with_nav(false, |nav| nav.is_mobile())
    }

    #[wasm_bindgen(js_name = isTransitioning)]
    pub fn is_transitioning(&self) -> bool {
        self.with_nav(false, |nav| nav.is_transitioning())
    }

    #[wasm_bindgen(js_name = isExpanded)]
    pub fn is_expanded(&self, index: usize) -> bool {
        self.with_nav(false, |nav| nav.is_expanded(ItemId(index)))
    }

    /// `"closed"`, `"opening"`, `"open"` or `"closing"`.
    pub fn phase(&self) -> String {
        let phase = self.with_nav(MenuPhase::Closed, |nav| nav.phase());
        match phase {
            MenuPhase::Closed => "closed",
            MenuPhase::Opening => "opening",
            MenuPhase::Open => "open",
            MenuPhase::Closing => "closing",
        }
        .to_owned()
    }

    /// Remove every listener, cancel the timer and restore the static page.
    pub fn destroy(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        let Some(shared) = self.shared.take() else {
            return;
        };
        if let Ok(mut state) = shared.state.try_borrow_mut() {
            if let Some(handle) = state.timer_handle.take() {
                shared.anchors.window.clear_timeout_with_handle(handle);
            }
            state.timer_fn = None;
            if let Some(nav) = state.nav.take() {
                nav.detach();
            }
        }
        self.timer_callback = None;
    }
}

impl NavMenuWeb {
    fn with_nav<R>(&self, default: R, f: impl FnOnce(&mut NavController<DomSurface>) -> R) -> R {
        match &self.shared {
            Some(shared) => shared.with_nav(default, f),
            None => default,
        }
    }

    fn try_attach(options: &JsValue) -> Result<Self, String> {
        let json = if options.is_undefined() || options.is_null() {
            String::new()
        } else {
            js_sys::JSON::stringify(options)
                .map(String::from)
                .map_err(|err| format!("options are not serializable: {err:?}"))?
        };
        let options = options_from_json(&json).map_err(|err| format!("bad options: {err}"))?;
        let window = web_sys::window().ok_or("no window")?;
        let anchors =
            Rc::new(Anchors::query(window, &options.selectors).ok_or("no document body")?);

        let surface = DomSurface {
            anchors: Rc::clone(&anchors),
        };
        let nav = NavController::attach(surface, options.config).map_err(|err| err.to_string())?;
        for missing in nav.degraded() {
            console_warn(&format!("navkit: optional element missing: {missing:?}"));
        }

        let shared = Rc::new(Shared {
            anchors,
            state: RefCell::new(State {
                nav: Some(nav),
                epoch: Instant::now(),
                timer_fn: None,
                timer_handle: None,
            }),
            queue: RefCell::new(VecDeque::new()),
        });

        let timer_shared = Rc::clone(&shared);
        let timer_callback = Closure::<dyn FnMut()>::new(move || timer_shared.tick());
        shared.state.borrow_mut().timer_fn =
            Some(timer_callback.as_ref().unchecked_ref::<js_sys::Function>().clone());

        let mut menu = Self {
            shared: Some(Rc::clone(&shared)),
            listeners: Vec::new(),
            timer_callback: Some(timer_callback),
        };
        menu.register_listeners(&shared)?;
        Ok(menu)
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), String> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|err| format!("addEventListener({kind}) failed: {err:?}"))?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            callback,
        });
        Ok(())
    }

    fn register_listeners(&mut self, shared: &Rc<Shared>) -> Result<(), String> {
        let document: EventTarget = shared.anchors.document.clone().into();
        let window: EventTarget = shared.anchors.window.clone().into();

        let s = Rc::clone(shared);
        self.listen(&document, "click", move |event| {
            let target = s.anchors.resolve_event(&event);
            apply_outcome(&event, s.dispatch(NavEvent::Click { target }));
        })?;

        let s = Rc::clone(shared);
        self.listen(&document, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let mods =
                modifiers_from_flags(key.shift_key(), key.alt_key(), key.ctrl_key(), key.meta_key());
            let code = normalize_dom_key(&key.key(), &key.code(), mods);
            let target = s.anchors.resolve_event(&event);
            let nav_event = NavEvent::Key(KeyEvent::new(code, target).with_modifiers(mods));
            apply_outcome(&event, s.dispatch(nav_event));
        })?;

        let s = Rc::clone(shared);
        self.listen(&document, "focusin", move |event| {
            let target = s.anchors.resolve_event(&event);
            s.dispatch(NavEvent::FocusIn { target });
        })?;

        let s = Rc::clone(shared);
        self.listen(&document, "focusout", move |event| {
            let target = s.anchors.resolve_event(&event);
            s.dispatch(NavEvent::FocusOut { target });
        })?;

        for kind in ["resize", "orientationchange"] {
            let s = Rc::clone(shared);
            self.listen(&window, kind, move |_event| {
                let width = s.anchors.viewport_width();
                let nav_event = if kind == "resize" {
                    NavEvent::Resize { width }
                } else {
                    NavEvent::OrientationChange { width }
                };
                s.dispatch(nav_event);
            })?;
        }

        // Submenus are queried inside their item; the item's enter/leave
        // covers the whole subtree.
        let hover_targets: Vec<(EventTarget, Node)> = shared
            .anchors
            .items
            .iter()
            .enumerate()
            .filter(|(_, refs)| refs.submenu.is_some())
            .map(|(idx, refs)| (EventTarget::from(refs.item.clone()), Node::Item(ItemId(idx))))
            .collect();
        for (target, node) in hover_targets {
            let s = Rc::clone(shared);
            self.listen(&target, "mouseenter", move |_event| {
                s.dispatch(NavEvent::PointerEnter { target: node });
            })?;
            let s = Rc::clone(shared);
            self.listen(&target, "mouseleave", move |_event| {
                s.dispatch(NavEvent::PointerLeave { target: node });
            })?;
        }
        Ok(())
    }
}
