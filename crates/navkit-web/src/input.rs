#![forbid(unsafe_code)]

//! Web input schema.
//!
//! The JS glue resolves each DOM event to a navigation [`Node`] and hands it
//! over as a small JSON object:
//!
//! ```json
//! {"kind":"keydown","key":"ArrowDown","code":"ArrowDown","target":{"item_link":0}}
//! {"kind":"click","target":"trigger"}
//! {"kind":"resize","width":1280}
//! ```
//!
//! [`DomEventJson`] is that wire shape; converting it to a [`NavEvent`]
//! normalizes DOM `key`/`code` pairs into [`KeyCode`]s. Options passed to the
//! binding are parsed with [`options_from_json`].

use navkit_core::NavConfig;
use navkit_core::event::{KeyCode, KeyEvent, Modifiers, NavEvent};
use navkit_core::surface::Node;
use serde::{Deserialize, Serialize};

/// Normalize a DOM `KeyboardEvent` `key`/`code` pair.
///
/// The logical `key` wins for printable characters; `code` is the fallback
/// for wrappers that only report physical keys.
#[must_use]
pub fn normalize_dom_key(dom_key: &str, dom_code: &str, mods: Modifiers) -> KeyCode {
    if dom_key == "Tab" && mods.contains(Modifiers::SHIFT) {
        return KeyCode::BackTab;
    }

    let mut chars = dom_key.chars();
    if let Some(first) = chars.next()
        && chars.next().is_none()
    {
        return KeyCode::Char(first);
    }

    match dom_key {
        "Enter" => KeyCode::Enter,
        "Escape" | "Esc" => KeyCode::Escape,
        "Tab" => KeyCode::Tab,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "ArrowUp" | "Up" => KeyCode::Up,
        "ArrowDown" | "Down" => KeyCode::Down,
        "ArrowLeft" | "Left" => KeyCode::Left,
        "ArrowRight" | "Right" => KeyCode::Right,
        "Spacebar" => KeyCode::Char(' '),
        _ => key_code_from_dom_code(dom_code, mods).unwrap_or(KeyCode::Other),
    }
}

fn key_code_from_dom_code(dom_code: &str, mods: Modifiers) -> Option<KeyCode> {
    if dom_code == "Tab" && mods.contains(Modifiers::SHIFT) {
        return Some(KeyCode::BackTab);
    }

    Some(match dom_code {
        "Enter" | "NumpadEnter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "Space" => KeyCode::Char(' '),
        "Tab" => KeyCode::Tab,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "ArrowUp" => KeyCode::Up,
        "ArrowDown" => KeyCode::Down,
        "ArrowLeft" => KeyCode::Left,
        "ArrowRight" => KeyCode::Right,
        _ => return None,
    })
}

/// Fold the four DOM modifier booleans into [`Modifiers`].
#[must_use]
pub fn modifiers_from_flags(shift: bool, alt: bool, ctrl: bool, meta: bool) -> Modifiers {
    let mut mods = Modifiers::NONE;
    mods.set(Modifiers::SHIFT, shift);
    mods.set(Modifiers::ALT, alt);
    mods.set(Modifiers::CTRL, ctrl);
    mods.set(Modifiers::SUPER, meta);
    mods
}

/// JSON encoding of a resolved DOM event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomEventJson {
    Click {
        target: Node,
    },
    #[serde(alias = "mouseenter")]
    PointerEnter {
        target: Node,
    },
    #[serde(alias = "mouseleave")]
    PointerLeave {
        target: Node,
    },
    Keydown {
        key: String,
        #[serde(default)]
        code: String,
        target: Node,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
    },
    #[serde(alias = "focusin")]
    FocusIn {
        target: Node,
    },
    #[serde(alias = "focusout")]
    FocusOut {
        target: Node,
    },
    Resize {
        width: u32,
    },
    #[serde(alias = "orientationchange")]
    OrientationChange {
        width: u32,
    },
}

impl From<DomEventJson> for NavEvent {
    fn from(value: DomEventJson) -> Self {
        match value {
            DomEventJson::Click { target } => Self::Click { target },
            DomEventJson::PointerEnter { target } => Self::PointerEnter { target },
            DomEventJson::PointerLeave { target } => Self::PointerLeave { target },
            DomEventJson::Keydown {
                key,
                code,
                target,
                shift,
                alt,
                ctrl,
                meta,
            } => {
                let mods = modifiers_from_flags(shift, alt, ctrl, meta);
                let code = normalize_dom_key(&key, &code, mods);
                Self::Key(KeyEvent::new(code, target).with_modifiers(mods))
            }
            DomEventJson::FocusIn { target } => Self::FocusIn { target },
            DomEventJson::FocusOut { target } => Self::FocusOut { target },
            DomEventJson::Resize { width } => Self::Resize { width },
            DomEventJson::OrientationChange { width } => Self::OrientationChange { width },
        }
    }
}

/// Decode one DOM event JSON string into a canonical event.
pub fn event_from_json_str(s: &str) -> Result<NavEvent, serde_json::Error> {
    let json: DomEventJson = serde_json::from_str(s)?;
    Ok(json.into())
}

/// CSS selectors used to locate the navigation anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    pub trigger: String,
    pub panel: String,
    pub close_button: String,
    pub overlay: String,
    /// Items, queried inside the panel.
    pub item: String,
    /// An item's top-level link, queried inside the item.
    pub link: String,
    /// An item's submenu, queried inside the item.
    pub submenu: String,
    /// Focusable links, queried inside a submenu.
    pub submenu_link: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            trigger: "#hamburger".to_owned(),
            panel: "#navList".to_owned(),
            close_button: ".nav__close".to_owned(),
            overlay: ".nav-overlay".to_owned(),
            item: ".nav__item".to_owned(),
            link: ".nav__link".to_owned(),
            submenu: ".dropdown, .mega-menu".to_owned(),
            submenu_link: "a[href], button".to_owned(),
        }
    }
}

/// Options object accepted by the web binding: controller config plus
/// selectors, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebOptions {
    #[serde(flatten)]
    pub config: NavConfig,
    pub selectors: Selectors,
}

/// Parse a JS options object. Missing keys take their defaults; an empty
/// string means "all defaults".
pub fn options_from_json(s: &str) -> Result<WebOptions, serde_json::Error> {
    if s.trim().is_empty() {
        return Ok(WebOptions::default());
    }
    serde_json::from_str(s)
}

/// Parse only the controller configuration.
pub fn config_from_json(s: &str) -> Result<NavConfig, serde_json::Error> {
    options_from_json(s).map(|options| options.config)
}
