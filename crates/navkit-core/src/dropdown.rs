#![forbid(unsafe_code)]

//! Per-item submenu expansion.
//!
//! The registry owns the `expanded` flag of every item and is the only code
//! that changes it. Whether opening an item closes its siblings is decided by
//! the caller (`exclusive`), which derives it from the layout mode and the
//! configured accordion/desktop policies.
//!
//! # Hover protocol (desktop)
//!
//! - enter: cancel a pending close, schedule an open after the hover delay
//! - leave: cancel a pending open, schedule a close after the close delay
//!
//! An item and its submenu panel count as one hover region, so crossing the
//! gap between the two cancels the close before it fires. Presence over each
//! part is tracked separately: when the submenu is nested inside the item,
//! leaving the submenu for the item's own link reports only the submenu
//! leave, and the item is still hovered.

use core::time::Duration;

use crate::surface::{Aria, DomOp, ITEM_OPEN_CLASS, ItemId, NavLayout, Node};
use crate::timer::{Scheduler, TimerKind};

/// Part of an item's hover region an enter/leave event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverPart {
    Item,
    Submenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    /// Has a link that receives events.
    live: bool,
    has_submenu: bool,
    submenu_links: usize,
    expanded: bool,
    pointer_on_item: bool,
    pointer_on_submenu: bool,
}

/// Expansion state of all navigation items, in markup order.
#[derive(Debug, Clone, Default)]
pub struct DropdownRegistry {
    entries: Vec<Entry>,
    last_toggle: Option<(ItemId, Duration)>,
}

impl DropdownRegistry {
    /// Enumerate items from the markup description.
    #[must_use]
    pub fn from_layout(layout: &NavLayout) -> Self {
        let entries = layout
            .items
            .iter()
            .map(|item| Entry {
                live: item.link,
                has_submenu: item.link && item.has_submenu(),
                submenu_links: item.submenu.as_ref().map_or(0, |s| s.links),
                expanded: false,
                pointer_on_item: false,
                pointer_on_submenu: false,
            })
            .collect();
        Self {
            entries,
            last_toggle: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Item exists and has a link.
    #[must_use]
    pub fn is_live(&self, id: ItemId) -> bool {
        self.entries.get(id.0).is_some_and(|e| e.live)
    }

    #[must_use]
    pub fn has_submenu(&self, id: ItemId) -> bool {
        self.entries.get(id.0).is_some_and(|e| e.has_submenu)
    }

    #[must_use]
    pub fn submenu_links(&self, id: ItemId) -> usize {
        self.entries.get(id.0).map_or(0, |e| e.submenu_links)
    }

    #[must_use]
    pub fn is_expanded(&self, id: ItemId) -> bool {
        self.entries.get(id.0).is_some_and(|e| e.expanded)
    }

    /// Pointer is over the item or its submenu.
    #[must_use]
    pub fn is_hovered(&self, id: ItemId) -> bool {
        self.entries
            .get(id.0)
            .is_some_and(|e| e.pointer_on_item || e.pointer_on_submenu)
    }

    /// Record pointer presence over one part of the item's hover region.
    ///
    /// Tracked in every layout mode so the state is current after a flip.
    pub fn track_pointer(&mut self, id: ItemId, part: HoverPart, inside: bool) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            match part {
                HoverPart::Item => entry.pointer_on_item = inside,
                HoverPart::Submenu => entry.pointer_on_submenu = inside,
            }
        }
    }

    /// Expanded items in markup order.
    pub fn expanded(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.expanded)
            .map(|(idx, _)| ItemId(idx))
    }

    #[must_use]
    pub fn expanded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.expanded).count()
    }

    /// Live items in markup order (Arrow navigation order).
    pub fn live_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.live)
            .map(|(idx, _)| ItemId(idx))
    }

    /// Initial ARIA wiring for every item with a submenu.
    pub fn prepare(&self, layout: &NavLayout, ops: &mut Vec<DomOp>) {
        for (idx, (entry, item)) in self.entries.iter().zip(&layout.items).enumerate() {
            if !entry.has_submenu {
                continue;
            }
            let id = ItemId(idx);
            ops.push(DomOp::flag(Node::ItemLink(id), Aria::HasPopup, true));
            ops.push(DomOp::flag(Node::ItemLink(id), Aria::Expanded, false));
            ops.push(DomOp::flag(Node::Submenu(id), Aria::Hidden, true));
            if let Some(submenu_id) = item.submenu.as_ref().and_then(|s| s.id.as_deref()) {
                ops.push(DomOp::id_ref(Node::ItemLink(id), Aria::Controls, submenu_id));
            }
            if let Some(link_id) = item.link_id.as_deref() {
                ops.push(DomOp::id_ref(Node::Submenu(id), Aria::LabelledBy, link_id));
            }
        }
    }

    /// Expand `id`. With `exclusive`, every other expanded item closes first.
    /// Returns whether the item changed state.
    pub fn open(
        &mut self,
        id: ItemId,
        exclusive: bool,
        ops: &mut Vec<DomOp>,
        sched: &mut Scheduler,
    ) -> bool {
        if !self.has_submenu(id) {
            return false;
        }
        sched.cancel(TimerKind::HoverOpen(id));
        if self.is_expanded(id) {
            return false;
        }
        if exclusive {
            let others: Vec<ItemId> = self.expanded().filter(|other| *other != id).collect();
            for other in others {
                self.close(other, ops, sched);
            }
        }
        self.set_expanded(id, true, ops);
        crate::debug!(item = id.index(), "submenu opened");
        true
    }

    /// Collapse `id` and cancel its pending timers.
    pub fn close(&mut self, id: ItemId, ops: &mut Vec<DomOp>, sched: &mut Scheduler) -> bool {
        sched.cancel(TimerKind::HoverOpen(id));
        sched.cancel(TimerKind::HoverClose(id));
        sched.cancel(TimerKind::BlurClose(id));
        if !self.is_expanded(id) {
            return false;
        }
        self.set_expanded(id, false, ops);
        crate::debug!(item = id.index(), "submenu closed");
        true
    }

    /// Flip `id`. A repeat activation of the same item within `debounce` of the
    /// previous one is ignored (duplicate touch + click).
    pub fn toggle(
        &mut self,
        id: ItemId,
        exclusive: bool,
        now: Duration,
        debounce: Duration,
        ops: &mut Vec<DomOp>,
        sched: &mut Scheduler,
    ) -> bool {
        if !self.has_submenu(id) {
            return false;
        }
        if let Some((last, at)) = self.last_toggle
            && last == id
            && now.saturating_sub(at) < debounce
        {
            crate::trace!(item = id.index(), "toggle debounced");
            return false;
        }
        self.last_toggle = Some((id, now));
        if self.is_expanded(id) {
            self.close(id, ops, sched)
        } else {
            self.open(id, exclusive, ops, sched)
        }
    }

    /// Collapse everything and cancel all per-item timers.
    pub fn close_all(&mut self, ops: &mut Vec<DomOp>, sched: &mut Scheduler) {
        sched.cancel_where(|kind| kind.item().is_some());
        let open: Vec<ItemId> = self.expanded().collect();
        for id in open {
            self.set_expanded(id, false, ops);
        }
    }

    /// Pointer entered the item or its submenu.
    pub fn hover_enter(
        &mut self,
        id: ItemId,
        exclusive: bool,
        now: Duration,
        delay: Duration,
        ops: &mut Vec<DomOp>,
        sched: &mut Scheduler,
    ) {
        if !self.has_submenu(id) {
            return;
        }
        sched.cancel(TimerKind::HoverClose(id));
        if self.is_expanded(id) {
            return;
        }
        if delay.is_zero() {
            self.open(id, exclusive, ops, sched);
        } else if !sched.is_pending(TimerKind::HoverOpen(id)) {
            sched.schedule(TimerKind::HoverOpen(id), now.saturating_add(delay));
        }
    }

    /// Pointer left the item or its submenu. Nothing happens while the
    /// other part of the region is still hovered.
    pub fn hover_leave(&mut self, id: ItemId, now: Duration, delay: Duration, sched: &mut Scheduler) {
        if !self.has_submenu(id) || self.is_hovered(id) {
            return;
        }
        sched.cancel(TimerKind::HoverOpen(id));
        if self.is_expanded(id) {
            sched.schedule(TimerKind::HoverClose(id), now.saturating_add(delay));
        }
    }

    /// Keyboard focus entered the item: open at once.
    pub fn focus_enter(
        &mut self,
        id: ItemId,
        exclusive: bool,
        ops: &mut Vec<DomOp>,
        sched: &mut Scheduler,
    ) {
        sched.cancel(TimerKind::BlurClose(id));
        sched.cancel(TimerKind::HoverClose(id));
        self.open(id, exclusive, ops, sched);
    }

    /// Keyboard focus left the item: close after the grace period.
    pub fn focus_leave(&mut self, id: ItemId, now: Duration, grace: Duration, sched: &mut Scheduler) {
        if self.is_expanded(id) {
            sched.schedule(TimerKind::BlurClose(id), now.saturating_add(grace));
        }
    }

    fn set_expanded(&mut self, id: ItemId, expanded: bool, ops: &mut Vec<DomOp>) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.expanded = expanded;
        }
        ops.push(DomOp::class(Node::Item(id), ITEM_OPEN_CLASS, expanded));
        ops.push(DomOp::flag(Node::ItemLink(id), Aria::Expanded, expanded));
        ops.push(DomOp::flag(Node::Submenu(id), Aria::Hidden, !expanded));
    }
}
