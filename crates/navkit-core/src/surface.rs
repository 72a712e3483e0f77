#![forbid(unsafe_code)]

//! The DOM as an external interface.
//!
//! The controller only sees the page through [`NavSurface`]: a one-time
//! [`NavLayout`] description of the markup, two live queries (viewport width
//! and scroll offset) and a stream of [`DomOp`] mutations. Class names and
//! ARIA attributes produced here are the styling contract.

/// Class toggled on the trigger while the panel is open.
pub const TRIGGER_ACTIVE_CLASS: &str = "active";
/// Class toggled on the panel while it is open.
pub const PANEL_OPEN_CLASS: &str = "nav__list--open";
/// Class toggled on an item while its submenu is expanded.
pub const ITEM_OPEN_CLASS: &str = "open";
/// Class toggled on the overlay while it is shown (drives the fade).
pub const OVERLAY_VISIBLE_CLASS: &str = "nav-overlay--visible";
/// Class toggled on the body while scrolling is locked.
pub const BODY_LOCKED_CLASS: &str = "nav-scroll-locked";

/// Index of a navigation item in markup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub usize);

impl ItemId {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Addressable element of the navigation markup.
///
/// Used both as the resolved target of an input event and as the receiver of
/// a [`DomOp`]. `Document` stands for anything outside the navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Node {
    Trigger,
    Panel,
    CloseButton,
    Overlay,
    Body,
    /// The `<li>`-level container of an item.
    Item(ItemId),
    /// The top-level link (or button) of an item.
    ItemLink(ItemId),
    /// The submenu / mega-menu panel of an item.
    Submenu(ItemId),
    /// The `n`th link inside an item's submenu.
    SubmenuLink(ItemId, usize),
    Document,
}

impl Node {
    /// The item this node belongs to, if any.
    #[must_use]
    pub const fn item(self) -> Option<ItemId> {
        match self {
            Self::Item(id) | Self::ItemLink(id) | Self::Submenu(id) | Self::SubmenuLink(id, _) => {
                Some(id)
            }
            _ => None,
        }
    }
}

/// Submenu description captured at attach time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SubmenuLayout {
    /// DOM id of the submenu panel, used for `aria-controls`.
    pub id: Option<String>,
    /// Number of focusable links inside the submenu.
    pub links: usize,
}

/// Item description captured at attach time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemLayout {
    /// Whether the item has a link/button to activate.
    pub link: bool,
    /// DOM id of the link, used for `aria-labelledby`.
    pub link_id: Option<String>,
    pub submenu: Option<SubmenuLayout>,
}

impl Default for ItemLayout {
    fn default() -> Self {
        Self {
            link: true,
            link_id: None,
            submenu: None,
        }
    }
}

impl ItemLayout {
    /// A plain link without a submenu.
    #[must_use]
    pub fn link() -> Self {
        Self::default()
    }

    /// A link that owns a submenu with `links` entries.
    #[must_use]
    pub fn with_submenu(links: usize) -> Self {
        Self {
            submenu: Some(SubmenuLayout { id: None, links }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_submenu(&self) -> bool {
        self.submenu.is_some()
    }
}

/// Markup description reported once by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavLayout {
    pub trigger: bool,
    pub panel: bool,
    /// DOM id of the panel, used for the trigger's `aria-controls`.
    pub panel_id: Option<String>,
    pub close_button: bool,
    /// Whether the markup already contains an overlay element.
    pub overlay: bool,
    pub items: Vec<ItemLayout>,
}

impl Default for NavLayout {
    fn default() -> Self {
        Self {
            trigger: true,
            panel: true,
            panel_id: None,
            close_button: false,
            overlay: false,
            items: Vec::new(),
        }
    }
}

/// ARIA attributes the controller maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Aria {
    Expanded,
    Hidden,
    HasPopup,
    Controls,
    LabelledBy,
}

impl Aria {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expanded => "aria-expanded",
            Self::Hidden => "aria-hidden",
            Self::HasPopup => "aria-haspopup",
            Self::Controls => "aria-controls",
            Self::LabelledBy => "aria-labelledby",
        }
    }
}

/// One DOM mutation requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum DomOp {
    /// Add (`present`) or remove a class.
    SetClass {
        node: Node,
        class: String,
        present: bool,
    },
    /// Set an ARIA attribute. Boolean attributes use `"true"`/`"false"`.
    SetAttr {
        node: Node,
        attr: Aria,
        value: String,
    },
    /// Toggle the `hidden` attribute.
    SetHidden { node: Node, hidden: bool },
    /// Move keyboard focus.
    Focus { node: Node },
    /// Insert the overlay element into the document (emitted at most once).
    CreateOverlay,
    /// Fix the body at `offset`, making background content inert.
    LockScroll { offset: i32 },
    /// Release the body and scroll back to `restore`.
    UnlockScroll { restore: i32 },
}

impl DomOp {
    /// Add or remove `class` on `node`.
    #[must_use]
    pub fn class(node: Node, class: &str, present: bool) -> Self {
        Self::SetClass {
            node,
            class: class.to_owned(),
            present,
        }
    }

    #[must_use]
    pub fn flag(node: Node, attr: Aria, on: bool) -> Self {
        Self::SetAttr {
            node,
            attr,
            value: if on { "true" } else { "false" }.to_owned(),
        }
    }

    /// Point an id-reference attribute at `id`.
    #[must_use]
    pub fn id_ref(node: Node, attr: Aria, id: &str) -> Self {
        Self::SetAttr {
            node,
            attr,
            value: id.to_owned(),
        }
    }
}

/// Host DOM seen by the controller.
pub trait NavSurface {
    /// Describe the navigation markup. Called once, at attach.
    fn layout(&self) -> NavLayout;

    /// Current viewport width in logical pixels.
    fn viewport_width(&self) -> u32;

    /// Current vertical scroll offset.
    fn scroll_offset(&self) -> i32;

    /// Apply one mutation.
    fn apply(&mut self, op: DomOp);
}

impl<S: NavSurface + ?Sized> NavSurface for &mut S {
    fn layout(&self) -> NavLayout {
        (**self).layout()
    }

    fn viewport_width(&self) -> u32 {
        (**self).viewport_width()
    }

    fn scroll_offset(&self) -> i32 {
        (**self).scroll_offset()
    }

    fn apply(&mut self, op: DomOp) {
        (**self).apply(op);
    }
}
