#![forbid(unsafe_code)]

//! Navigation controller: input routing and side-effect orchestration.
//!
//! [`NavController`] owns every piece of navigation state for one page and a
//! handle to its [`NavSurface`]. The host drives it:
//!
//! 1. [`NavController::attach`] once, after the markup is available.
//! 2. [`NavController::set_time`] / [`NavController::advance_time`] whenever
//!    the host clock moves; due timers fire here.
//! 3. [`NavController::handle`] for every resolved input event.
//! 4. Optionally re-arm a platform timer for [`NavController::next_deadline`].
//!
//! State is always mutated before the resulting [`DomOp`]s are flushed to the
//! surface, and all ops of one call are flushed before it returns.
//!
//! # Example
//!
//! ```ignore
//! let mut nav = NavController::attach(surface, NavConfig::default())?;
//! nav.handle(NavEvent::click(Node::Trigger));
//! nav.advance_time(Duration::from_millis(350));
//! assert!(nav.is_open());
//! ```

use core::time::Duration;

use crate::clock::DeterministicClock;
use crate::config::NavConfig;
use crate::dropdown::{DropdownRegistry, HoverPart};
use crate::error::{Anchor, NavError, OptionalAnchor};
use crate::event::{KeyCode, KeyEvent, NavEvent};
use crate::menu::{MenuMachine, MenuPhase};
use crate::overlay::{Overlay, OverlayState};
use crate::scroll_lock::ScrollLock;
use crate::surface::{
    Aria, DomOp, ItemId, NavSurface, Node, PANEL_OPEN_CLASS, TRIGGER_ACTIVE_CLASS,
};
use crate::timer::{Scheduler, TimerKind};
use crate::viewport::{Mode, Viewport};

/// What the host should do with the browser event it just routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// The controller acted on the event.
    pub handled: bool,
    /// Call `preventDefault()` (e.g. a submenu trigger must not navigate).
    pub prevent_default: bool,
    /// Call `stopPropagation()` so the document-level handler does not see
    /// the same click as an outside click.
    pub stop_propagation: bool,
}

impl EventOutcome {
    pub const IGNORED: Self = Self {
        handled: false,
        prevent_default: false,
        stop_propagation: false,
    };

    pub const HANDLED: Self = Self {
        handled: true,
        prevent_default: false,
        stop_propagation: false,
    };

    pub const PREVENT: Self = Self {
        handled: true,
        prevent_default: true,
        stop_propagation: false,
    };

    pub const CONSUME: Self = Self {
        handled: true,
        prevent_default: true,
        stop_propagation: true,
    };
}

/// Why the panel is closing. Decides where focus goes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    /// Trigger, close control or programmatic `close()`.
    Request,
    Escape,
    /// Overlay or document click.
    Outside,
    /// A plain link was followed; focus is left to the navigation.
    LinkActivated,
    /// Viewport became desktop; the trigger is no longer shown.
    ModeChange,
}

impl CloseReason {
    const fn returns_focus(self) -> bool {
        matches!(self, Self::Request | Self::Escape | Self::Outside)
    }
}

/// Responsive navigation controller for one page.
#[derive(Debug)]
pub struct NavController<S: NavSurface> {
    surface: S,
    config: NavConfig,
    clock: DeterministicClock,
    viewport: Viewport,
    menu: MenuMachine,
    dropdowns: DropdownRegistry,
    overlay: Overlay,
    scroll: ScrollLock,
    timers: Scheduler,
    close_button: bool,
    /// Element believed to hold focus, from focus events and our own moves.
    focus: Option<Node>,
    /// Programmatic focus on this link must not reopen its submenu.
    suppress_focus_open: Option<ItemId>,
    degraded: Vec<OptionalAnchor>,
    ops: Vec<DomOp>,
}

impl<S: NavSurface> NavController<S> {
    /// Validate the markup, apply the initial ARIA contract and classify the
    /// viewport.
    ///
    /// Fails without touching the surface when a required anchor is missing
    /// or the configuration is invalid, leaving the page in its static state.
    pub fn attach(surface: S, config: NavConfig) -> Result<Self, NavError> {
        if let Err(err) = config.validate() {
            crate::error!(%err, "navigation not enhanced");
            return Err(err);
        }
        let layout = surface.layout();
        for (present, anchor) in [(layout.trigger, Anchor::Trigger), (layout.panel, Anchor::Panel)] {
            if !present {
                let err = NavError::MissingAnchor(anchor);
                crate::error!(%err, "navigation not enhanced");
                return Err(err);
            }
        }

        let mut degraded = Vec::new();
        if !layout.close_button {
            degraded.push(OptionalAnchor::CloseButton);
        }
        if !layout.overlay && !config.create_overlay {
            degraded.push(OptionalAnchor::Overlay);
        }
        for (idx, item) in layout.items.iter().enumerate() {
            if !item.link {
                degraded.push(OptionalAnchor::ItemLink(ItemId(idx)));
            }
        }
        #[cfg(feature = "tracing")]
        for missing in &degraded {
            tracing::warn!(?missing, "optional navigation element missing; feature skipped");
        }

        let viewport = Viewport::new(surface.viewport_width(), config.breakpoint);
        let dropdowns = DropdownRegistry::from_layout(&layout);
        let overlay = Overlay::new(layout.overlay, config.create_overlay);

        let mut ops = Vec::new();
        ops.push(DomOp::flag(Node::Trigger, Aria::Expanded, false));
        if let Some(panel_id) = layout.panel_id.as_deref() {
            ops.push(DomOp::id_ref(Node::Trigger, Aria::Controls, panel_id));
        }
        ops.push(DomOp::flag(
            Node::Panel,
            Aria::Hidden,
            viewport.mode() == Mode::Mobile,
        ));
        overlay.prepare(&mut ops);
        dropdowns.prepare(&layout, &mut ops);

        let mut nav = Self {
            surface,
            config,
            clock: DeterministicClock::new(),
            viewport,
            menu: MenuMachine::new(),
            dropdowns,
            overlay,
            scroll: ScrollLock::new(),
            timers: Scheduler::new(),
            close_button: layout.close_button,
            focus: None,
            suppress_focus_open: None,
            degraded,
            ops,
        };
        nav.flush();
        crate::info!(
            items = nav.dropdowns.len(),
            width = nav.viewport.width(),
            mobile = nav.is_mobile(),
            "navigation controller attached"
        );
        Ok(nav)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Panel fully open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.menu.is_open()
    }

    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.viewport.mode() == Mode::Mobile
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.viewport.mode()
    }

    #[must_use]
    pub fn phase(&self) -> MenuPhase {
        self.menu.phase()
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.menu.is_transitioning()
    }

    #[must_use]
    pub fn is_expanded(&self, id: ItemId) -> bool {
        self.dropdowns.is_expanded(id)
    }

    /// Expanded items in markup order.
    #[must_use]
    pub fn expanded_items(&self) -> Vec<ItemId> {
        self.dropdowns.expanded().collect()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.dropdowns.len()
    }

    #[must_use]
    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.state()
    }

    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.scroll.is_locked()
    }

    /// Scroll offset captured by the current lock.
    #[must_use]
    pub fn saved_scroll_offset(&self) -> Option<i32> {
        self.scroll.saved_offset()
    }

    /// Element the controller believes holds focus.
    #[must_use]
    pub fn focus(&self) -> Option<Node> {
        self.focus
    }

    /// Optional elements found missing at attach.
    #[must_use]
    pub fn degraded(&self) -> &[OptionalAnchor] {
        &self.degraded
    }

    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to update host-side scroll state.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Earliest pending timer deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Move the clock to `now` (never backwards) and fire due timers.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
        self.run_due_timers();
    }

    /// Advance the clock by `dt` and fire due timers.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
        self.run_due_timers();
    }

    // -----------------------------------------------------------------------
    // Public control surface
    // -----------------------------------------------------------------------

    /// Start opening the panel. Ignored on desktop and unless `Closed`.
    pub fn open(&mut self) -> bool {
        let accepted = self.begin_open();
        self.flush();
        accepted
    }

    /// Start closing the panel. Ignored unless `Open`.
    pub fn close(&mut self) -> bool {
        let accepted = self.begin_close(CloseReason::Request);
        self.flush();
        accepted
    }

    /// Open when closed, close when open, ignore mid-transition.
    pub fn toggle(&mut self) -> bool {
        let accepted = self.toggle_panel();
        self.flush();
        accepted
    }

    /// Collapse every submenu.
    pub fn close_all_dropdowns(&mut self) {
        self.dropdowns.close_all(&mut self.ops, &mut self.timers);
        self.flush();
    }

    /// Route one input event.
    pub fn handle(&mut self, event: NavEvent) -> EventOutcome {
        if !matches!(event, NavEvent::FocusIn { .. } | NavEvent::FocusOut { .. }) {
            self.suppress_focus_open = None;
        }
        let outcome = match event {
            NavEvent::Click { target } => self.on_click(target),
            NavEvent::PointerEnter { target } => self.on_pointer(target, true),
            NavEvent::PointerLeave { target } => self.on_pointer(target, false),
            NavEvent::Key(key) => self.on_key(key),
            NavEvent::FocusIn { target } => self.on_focus_in(target),
            NavEvent::FocusOut { target } => self.on_focus_out(target),
            NavEvent::Resize { width } => {
                self.viewport.note_resize(width);
                let at = self.now().saturating_add(self.config.resize_debounce());
                self.timers.schedule(TimerKind::ResizeSettle, at);
                EventOutcome::HANDLED
            }
            NavEvent::OrientationChange { width } => {
                self.timers.cancel(TimerKind::ResizeSettle);
                if self.viewport.apply(width).is_some() {
                    self.on_mode_change();
                }
                EventOutcome::HANDLED
            }
        };
        self.flush();
        outcome
    }

    /// Cancel all timers, return the page to its closed static state and hand
    /// the surface back.
    pub fn detach(mut self) -> S {
        self.timers.clear();
        self.dropdowns.close_all(&mut self.ops, &mut self.timers);
        if self.menu.phase() != MenuPhase::Closed {
            self.push_panel_state(false);
        }
        self.overlay.hide_now(&mut self.ops, &mut self.timers);
        self.scroll.unlock(&mut self.ops);
        self.menu.reset();
        self.flush();
        crate::info!("navigation controller detached");
        self.surface
    }

    // -----------------------------------------------------------------------
    // Panel transitions
    // -----------------------------------------------------------------------

    fn toggle_panel(&mut self) -> bool {
        match self.menu.phase() {
            MenuPhase::Closed => self.begin_open(),
            MenuPhase::Open => self.begin_close(CloseReason::Request),
            MenuPhase::Opening | MenuPhase::Closing => {
                crate::debug!(phase = ?self.menu.phase(), "toggle ignored mid-transition");
                false
            }
        }
    }

    fn begin_open(&mut self) -> bool {
        if !self.is_mobile() {
            crate::debug!("open ignored in desktop layout");
            return false;
        }
        if !self.menu.begin_open() {
            crate::debug!(phase = ?self.menu.phase(), "open request ignored");
            return false;
        }
        self.overlay.show(&mut self.ops, &mut self.timers);
        let offset = self.surface.scroll_offset();
        self.scroll.lock(offset, &mut self.ops);
        self.push_panel_state(true);

        let first_link = self.dropdowns.live_items().next().map(Node::ItemLink);
        let target = if self.close_button {
            Some(Node::CloseButton)
        } else {
            first_link
        };
        if let Some(node) = target {
            self.move_focus(node);
        }

        self.schedule_transition_end();
        crate::debug!(offset, "panel opening");
        true
    }

    fn begin_close(&mut self, reason: CloseReason) -> bool {
        if !self.menu.begin_close() {
            crate::debug!(phase = ?self.menu.phase(), ?reason, "close request ignored");
            return false;
        }
        self.dropdowns.close_all(&mut self.ops, &mut self.timers);
        let now = self.now();
        let fade = self.config.transition();
        self.overlay.hide(&mut self.ops, &mut self.timers, now, fade);
        self.scroll.unlock(&mut self.ops);
        self.push_panel_state(false);
        if reason.returns_focus() && self.is_mobile() {
            self.move_focus(Node::Trigger);
        }
        self.schedule_transition_end();
        crate::debug!(?reason, "panel closing");
        true
    }

    fn push_panel_state(&mut self, open: bool) {
        self.ops
            .push(DomOp::class(Node::Trigger, TRIGGER_ACTIVE_CLASS, open));
        self.ops
            .push(DomOp::flag(Node::Trigger, Aria::Expanded, open));
        self.ops.push(DomOp::class(Node::Panel, PANEL_OPEN_CLASS, open));
        let hidden = !open && self.is_mobile();
        self.ops.push(DomOp::flag(Node::Panel, Aria::Hidden, hidden));
    }

    fn schedule_transition_end(&mut self) {
        let at = self.now().saturating_add(self.config.transition());
        self.timers.schedule(TimerKind::TransitionEnd, at);
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    fn run_due_timers(&mut self) {
        while let Some(kind) = self.timers.pop_due(self.now()) {
            self.on_timer(kind);
            self.flush();
        }
    }

    fn on_timer(&mut self, kind: TimerKind) {
        crate::trace!(?kind, "timer fired");
        match kind {
            TimerKind::TransitionEnd => match self.menu.complete() {
                Some(MenuPhase::Open) => {
                    crate::debug!("panel open");
                    if self.menu.take_deferred_close() {
                        self.begin_close(CloseReason::ModeChange);
                    }
                }
                Some(MenuPhase::Closed) => {
                    crate::debug!("panel closed");
                }
                _ => {}
            },
            TimerKind::OverlayFade => self.overlay.finish_fade(&mut self.ops),
            TimerKind::ResizeSettle => {
                if self.viewport.settle().is_some() {
                    self.on_mode_change();
                }
            }
            TimerKind::HoverOpen(id) => {
                if !self.is_mobile() && self.can_expand() {
                    let exclusive = self.exclusive();
                    self.dropdowns
                        .open(id, exclusive, &mut self.ops, &mut self.timers);
                }
            }
            TimerKind::HoverClose(id) => {
                self.dropdowns.close(id, &mut self.ops, &mut self.timers);
            }
            TimerKind::BlurClose(id) => {
                let focus_inside = self.focus.and_then(Node::item) == Some(id);
                if !focus_inside {
                    self.dropdowns.close(id, &mut self.ops, &mut self.timers);
                }
            }
        }
    }

    fn on_mode_change(&mut self) {
        let mode = self.viewport.mode();
        crate::info!(?mode, width = self.viewport.width(), "layout mode changed");
        self.dropdowns.close_all(&mut self.ops, &mut self.timers);
        match (mode, self.menu.phase()) {
            (Mode::Desktop, MenuPhase::Open) => {
                self.begin_close(CloseReason::ModeChange);
            }
            (Mode::Desktop, MenuPhase::Opening) => self.menu.defer_close(),
            // Back on mobile before the open finished: keep the panel.
            (Mode::Mobile, MenuPhase::Opening) => self.menu.cancel_deferred_close(),
            _ => {}
        }
        let showing = matches!(self.menu.phase(), MenuPhase::Opening | MenuPhase::Open);
        let hidden = mode == Mode::Mobile && !showing;
        self.ops.push(DomOp::flag(Node::Panel, Aria::Hidden, hidden));
    }

    // -----------------------------------------------------------------------
    // Policies
    // -----------------------------------------------------------------------

    /// Whether opening a submenu closes its siblings in the current mode.
    fn exclusive(&self) -> bool {
        match self.viewport.mode() {
            Mode::Mobile => self.config.accordion_on_mobile,
            Mode::Desktop => self.config.exclusive_on_desktop,
        }
    }

    /// Whether a submenu may be expanded right now. On mobile the panel must
    /// be fully open, so a closed panel never hides an expanded item.
    fn can_expand(&self) -> bool {
        match self.viewport.mode() {
            Mode::Mobile => self.menu.is_open(),
            Mode::Desktop => !self.menu.is_transitioning(),
        }
    }

    fn toggle_item(&mut self, id: ItemId) {
        if !self.dropdowns.is_expanded(id) && !self.can_expand() {
            crate::debug!(item = id.index(), "submenu toggle ignored");
            return;
        }
        let exclusive = self.exclusive();
        let now = self.now();
        let debounce = self.config.toggle_debounce();
        self.dropdowns
            .toggle(id, exclusive, now, debounce, &mut self.ops, &mut self.timers);
    }

    fn move_focus(&mut self, node: Node) {
        self.focus = Some(node);
        self.ops.push(DomOp::Focus { node });
    }

    // -----------------------------------------------------------------------
    // Input routing
    // -----------------------------------------------------------------------

    fn on_click(&mut self, target: Node) -> EventOutcome {
        match target {
            Node::Trigger => {
                self.toggle_panel();
                EventOutcome::CONSUME
            }
            Node::CloseButton => {
                self.begin_close(CloseReason::Request);
                EventOutcome::PREVENT
            }
            Node::Overlay => {
                self.begin_close(CloseReason::Outside);
                EventOutcome::HANDLED
            }
            Node::ItemLink(id) => self.on_item_link_click(id),
            Node::SubmenuLink(..) => {
                if self.is_mobile() && self.menu.is_open() {
                    self.begin_close(CloseReason::LinkActivated);
                    EventOutcome::HANDLED
                } else {
                    EventOutcome::IGNORED
                }
            }
            Node::Document | Node::Body => {
                if self.is_mobile() {
                    if self.menu.is_open() {
                        self.begin_close(CloseReason::Outside);
                        return EventOutcome::HANDLED;
                    }
                } else if self.dropdowns.expanded_count() > 0 {
                    self.dropdowns.close_all(&mut self.ops, &mut self.timers);
                    return EventOutcome::HANDLED;
                }
                EventOutcome::IGNORED
            }
            Node::Panel | Node::Item(_) | Node::Submenu(_) => EventOutcome::IGNORED,
        }
    }

    fn on_item_link_click(&mut self, id: ItemId) -> EventOutcome {
        if !self.dropdowns.is_live(id) {
            return EventOutcome::IGNORED;
        }
        if !self.dropdowns.has_submenu(id) {
            if self.is_mobile() && self.menu.is_open() {
                self.begin_close(CloseReason::LinkActivated);
                return EventOutcome::HANDLED;
            }
            return EventOutcome::IGNORED;
        }
        match self.viewport.mode() {
            Mode::Mobile => self.toggle_item(id),
            Mode::Desktop => {
                if self.can_expand() {
                    let exclusive = self.exclusive();
                    self.dropdowns
                        .open(id, exclusive, &mut self.ops, &mut self.timers);
                }
            }
        }
        EventOutcome::CONSUME
    }

    fn on_pointer(&mut self, target: Node, entered: bool) -> EventOutcome {
        let (id, part) = match target {
            Node::Item(id) => (id, HoverPart::Item),
            Node::Submenu(id) => (id, HoverPart::Submenu),
            _ => return EventOutcome::IGNORED,
        };
        self.dropdowns.track_pointer(id, part, entered);
        if self.is_mobile() || !self.dropdowns.has_submenu(id) {
            return EventOutcome::IGNORED;
        }
        let now = self.now();
        if entered {
            if !self.can_expand() {
                return EventOutcome::IGNORED;
            }
            let exclusive = self.exclusive();
            let delay = self.config.hover_open_delay();
            self.dropdowns
                .hover_enter(id, exclusive, now, delay, &mut self.ops, &mut self.timers);
        } else {
            let delay = self.config.hover_close_delay();
            self.dropdowns.hover_leave(id, now, delay, &mut self.timers);
        }
        EventOutcome::HANDLED
    }

    fn on_focus_in(&mut self, target: Node) -> EventOutcome {
        self.focus = Some(target);
        let Some(id) = target.item() else {
            return EventOutcome::IGNORED;
        };
        self.timers.cancel(TimerKind::BlurClose(id));
        if self.suppress_focus_open.take() == Some(id) {
            return EventOutcome::HANDLED;
        }
        if !self.is_mobile() && self.dropdowns.has_submenu(id) && self.can_expand() {
            let exclusive = self.exclusive();
            self.dropdowns
                .focus_enter(id, exclusive, &mut self.ops, &mut self.timers);
        }
        EventOutcome::HANDLED
    }

    fn on_focus_out(&mut self, target: Node) -> EventOutcome {
        if self.focus == Some(target) {
            self.focus = None;
        }
        if self.is_mobile() {
            return EventOutcome::IGNORED;
        }
        let Some(id) = target.item() else {
            return EventOutcome::IGNORED;
        };
        let now = self.now();
        let grace = self.config.focus_grace();
        self.dropdowns.focus_leave(id, now, grace, &mut self.timers);
        EventOutcome::HANDLED
    }

    fn on_key(&mut self, key: KeyEvent) -> EventOutcome {
        if key.has_command_modifier() {
            return EventOutcome::IGNORED;
        }
        if key.is_activation() {
            return self.on_activation_key(key.target);
        }
        match key.code {
            KeyCode::Escape => self.on_escape(key.target),
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                self.on_arrow(key.code, key.target)
            }
            _ => EventOutcome::IGNORED,
        }
    }

    fn on_activation_key(&mut self, target: Node) -> EventOutcome {
        match target {
            Node::Trigger => {
                self.toggle_panel();
                EventOutcome::PREVENT
            }
            Node::CloseButton => {
                self.begin_close(CloseReason::Request);
                EventOutcome::PREVENT
            }
            Node::ItemLink(id) if self.dropdowns.has_submenu(id) => {
                self.toggle_item(id);
                EventOutcome::PREVENT
            }
            // Plain links keep their default action; the click that follows
            // Enter closes the panel.
            _ => EventOutcome::IGNORED,
        }
    }

    fn on_escape(&mut self, target: Node) -> EventOutcome {
        let owner = target.item().filter(|id| self.dropdowns.is_expanded(*id));
        match self.viewport.mode() {
            Mode::Mobile => {
                if !self.menu.is_open() {
                    return EventOutcome::IGNORED;
                }
                if let Some(id) = owner {
                    self.dropdowns.close(id, &mut self.ops, &mut self.timers);
                    self.move_focus(Node::ItemLink(id));
                } else {
                    self.begin_close(CloseReason::Escape);
                }
                EventOutcome::HANDLED
            }
            Mode::Desktop => {
                if self.dropdowns.expanded_count() == 0 {
                    return EventOutcome::IGNORED;
                }
                self.dropdowns.close_all(&mut self.ops, &mut self.timers);
                if let (Some(id), Node::Submenu(_) | Node::SubmenuLink(..)) = (owner, target) {
                    self.suppress_focus_open = Some(id);
                    self.move_focus(Node::ItemLink(id));
                }
                EventOutcome::HANDLED
            }
        }
    }

    fn on_arrow(&mut self, code: KeyCode, target: Node) -> EventOutcome {
        if !self.is_mobile() || !self.menu.is_open() {
            return EventOutcome::IGNORED;
        }
        match target {
            Node::ItemLink(id) if self.dropdowns.is_live(id) => match code {
                KeyCode::Down | KeyCode::Up => {
                    let items: Vec<ItemId> = self.dropdowns.live_items().collect();
                    let Some(pos) = items.iter().position(|other| *other == id) else {
                        return EventOutcome::IGNORED;
                    };
                    let next = if code == KeyCode::Down {
                        (pos + 1) % items.len()
                    } else {
                        (pos + items.len() - 1) % items.len()
                    };
                    self.move_focus(Node::ItemLink(items[next]));
                    EventOutcome::PREVENT
                }
                KeyCode::Right => {
                    if self.dropdowns.is_expanded(id) && self.dropdowns.submenu_links(id) > 0 {
                        self.move_focus(Node::SubmenuLink(id, 0));
                        EventOutcome::PREVENT
                    } else {
                        EventOutcome::IGNORED
                    }
                }
                KeyCode::Left => {
                    if self.dropdowns.close(id, &mut self.ops, &mut self.timers) {
                        EventOutcome::PREVENT
                    } else {
                        // Top-level items have no parent to move to.
                        EventOutcome::IGNORED
                    }
                }
                _ => EventOutcome::IGNORED,
            },
            Node::SubmenuLink(id, n) => {
                let links = self.dropdowns.submenu_links(id);
                if links == 0 {
                    return EventOutcome::IGNORED;
                }
                let next = match code {
                    KeyCode::Down => Node::SubmenuLink(id, (n + 1) % links),
                    KeyCode::Up => Node::SubmenuLink(id, (n + links - 1) % links),
                    KeyCode::Left => Node::ItemLink(id),
                    _ => return EventOutcome::IGNORED,
                };
                self.move_focus(next);
                EventOutcome::PREVENT
            }
            _ => EventOutcome::IGNORED,
        }
    }

    fn flush(&mut self) {
        for op in self.ops.drain(..) {
            self.surface.apply(op);
        }
    }
}
