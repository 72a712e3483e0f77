#![forbid(unsafe_code)]

//! Headless DOM model.
//!
//! [`DomModel`] is an in-memory [`NavSurface`]: it applies every [`DomOp`] to
//! a small attribute/class/focus store and keeps the op log. Native hosts,
//! session replay and tests drive a controller against it and compare
//! [`DomModel::checksum`]s instead of a real document.

use std::collections::{BTreeMap, BTreeSet};

use navkit_core::surface::Aria;
use navkit_core::{DomOp, NavLayout, NavSurface, Node};

// FNV-1a, 64-bit.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub(crate) fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Chain a checksum onto the previous chain value.
pub(crate) fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = fnv1a64_bytes(FNV_OFFSET_BASIS, &prev.to_le_bytes());
    fnv1a64_bytes(hash, &next.to_le_bytes())
}

/// Stable textual key for a node, used for ordering and snapshots.
#[must_use]
pub fn node_key(node: Node) -> String {
    match node {
        Node::Trigger => "trigger".to_owned(),
        Node::Panel => "panel".to_owned(),
        Node::CloseButton => "close".to_owned(),
        Node::Overlay => "overlay".to_owned(),
        Node::Body => "body".to_owned(),
        Node::Document => "document".to_owned(),
        Node::Item(id) => format!("item[{}]", id.index()),
        Node::ItemLink(id) => format!("item[{}]>link", id.index()),
        Node::Submenu(id) => format!("item[{}]>submenu", id.index()),
        Node::SubmenuLink(id, n) => format!("item[{}]>submenu>link[{n}]", id.index()),
    }
}

/// In-memory document holding the state the controller writes.
#[derive(Debug, Clone)]
pub struct DomModel {
    layout: NavLayout,
    width: u32,
    scroll: i32,
    classes: BTreeSet<(String, String)>,
    attrs: BTreeMap<(String, &'static str), String>,
    hidden: BTreeMap<String, bool>,
    focused: Option<Node>,
    locked_at: Option<i32>,
    overlays_created: u32,
    log: Vec<DomOp>,
}

impl DomModel {
    #[must_use]
    pub fn new(layout: NavLayout, width: u32) -> Self {
        Self {
            layout,
            width,
            scroll: 0,
            classes: BTreeSet::new(),
            attrs: BTreeMap::new(),
            hidden: BTreeMap::new(),
            focused: None,
            locked_at: None,
            overlays_created: 0,
            log: Vec::new(),
        }
    }

    /// Start at a scroll offset.
    #[must_use]
    pub fn with_scroll(mut self, offset: i32) -> Self {
        self.scroll = offset;
        self
    }

    /// Host-side viewport change. Pair it with a `Resize` event.
    pub fn set_viewport_width(&mut self, width: u32) {
        self.width = width;
    }

    /// Host-side scroll. Ignored while the body is locked.
    pub fn scroll_to(&mut self, offset: i32) {
        if self.locked_at.is_none() {
            self.scroll = offset;
        }
    }

    #[must_use]
    pub fn has_class(&self, node: Node, class: &str) -> bool {
        self.classes.contains(&(node_key(node), class.to_owned()))
    }

    #[must_use]
    pub fn attr(&self, node: Node, attr: Aria) -> Option<&str> {
        self.attrs
            .get(&(node_key(node), attr.as_str()))
            .map(String::as_str)
    }

    /// Value of the `hidden` attribute, if it was ever set.
    #[must_use]
    pub fn is_hidden(&self, node: Node) -> Option<bool> {
        self.hidden.get(&node_key(node)).copied()
    }

    #[must_use]
    pub fn focused(&self) -> Option<Node> {
        self.focused
    }

    #[must_use]
    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.locked_at.is_some()
    }

    /// How many times the overlay element was inserted.
    #[must_use]
    pub fn overlays_created(&self) -> u32 {
        self.overlays_created
    }

    /// Every op applied so far, in order.
    #[must_use]
    pub fn ops(&self) -> &[DomOp] {
        &self.log
    }

    /// Drain the op log.
    pub fn take_ops(&mut self) -> Vec<DomOp> {
        std::mem::take(&mut self.log)
    }

    /// Sorted, human-readable dump of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (node, class) in &self.classes {
            lines.push(format!("{node} .{class}"));
        }
        for ((node, attr), value) in &self.attrs {
            lines.push(format!("{node} {attr}={value}"));
        }
        for (node, hidden) in &self.hidden {
            if *hidden {
                lines.push(format!("{node} hidden"));
            }
        }
        if let Some(node) = self.focused {
            lines.push(format!("focus {}", node_key(node)));
        }
        if let Some(offset) = self.locked_at {
            lines.push(format!("body locked@{offset}"));
        }
        lines.push(format!("scroll {}", self.scroll));
        lines.sort();
        lines
    }

    /// FNV-1a over [`Self::snapshot`].
    #[must_use]
    pub fn checksum(&self) -> u64 {
        self.snapshot().iter().fold(FNV_OFFSET_BASIS, |hash, line| {
            fnv1a64_bytes(fnv1a64_bytes(hash, line.as_bytes()), b"\n")
        })
    }
}

impl NavSurface for DomModel {
    fn layout(&self) -> NavLayout {
        self.layout.clone()
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }

    fn scroll_offset(&self) -> i32 {
        self.scroll
    }

    fn apply(&mut self, op: DomOp) {
        match &op {
            DomOp::SetClass {
                node,
                class,
                present,
            } => {
                let key = (node_key(*node), class.clone());
                if *present {
                    self.classes.insert(key);
                } else {
                    self.classes.remove(&key);
                }
            }
            DomOp::SetAttr { node, attr, value } => {
                self.attrs
                    .insert((node_key(*node), attr.as_str()), value.clone());
            }
            DomOp::SetHidden { node, hidden } => {
                self.hidden.insert(node_key(*node), *hidden);
            }
            DomOp::Focus { node } => self.focused = Some(*node),
            DomOp::CreateOverlay => self.overlays_created += 1,
            DomOp::LockScroll { offset } => self.locked_at = Some(*offset),
            DomOp::UnlockScroll { restore } => {
                self.locked_at = None;
                self.scroll = *restore;
            }
        }
        self.log.push(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navkit_core::ItemId;
    use pretty_assertions::assert_eq;

    fn model() -> DomModel {
        DomModel::new(NavLayout::default(), 500)
    }

    #[test]
    fn class_add_and_remove() {
        let mut dom = model();
        dom.apply(DomOp::class(Node::Trigger, "active", true));
        assert!(dom.has_class(Node::Trigger, "active"));
        dom.apply(DomOp::class(Node::Trigger, "active", false));
        assert!(!dom.has_class(Node::Trigger, "active"));
        assert_eq!(dom.ops().len(), 2);
    }

    #[test]
    fn lock_freezes_host_scroll() {
        let mut dom = model().with_scroll(300);
        dom.apply(DomOp::LockScroll { offset: 300 });
        dom.scroll_to(0);
        assert_eq!(dom.scroll(), 300);
        dom.apply(DomOp::UnlockScroll { restore: 300 });
        dom.scroll_to(10);
        assert_eq!(dom.scroll(), 10);
    }

    #[test]
    fn snapshot_is_sorted_and_readable() {
        let mut dom = model();
        dom.apply(DomOp::flag(Node::ItemLink(ItemId(0)), Aria::Expanded, true));
        dom.apply(DomOp::class(Node::Item(ItemId(0)), "open", true));
        dom.apply(DomOp::Focus {
            node: Node::Trigger,
        });
        assert_eq!(
            dom.snapshot(),
            vec![
                "focus trigger".to_owned(),
                "item[0] .open".to_owned(),
                "item[0]>link aria-expanded=true".to_owned(),
                "scroll 0".to_owned(),
            ]
        );
    }

    #[test]
    fn checksum_ignores_op_order_for_same_state() {
        let mut a = model();
        a.apply(DomOp::class(Node::Panel, "x", true));
        a.apply(DomOp::class(Node::Trigger, "y", true));
        let mut b = model();
        b.apply(DomOp::class(Node::Trigger, "y", true));
        b.apply(DomOp::class(Node::Panel, "x", true));
        assert_eq!(a.checksum(), b.checksum());
        b.apply(DomOp::class(Node::Panel, "x", false));
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn pair_chaining_depends_on_order() {
        assert_ne!(fnv1a64_pair(1, 2), fnv1a64_pair(2, 1));
    }
}
