//! End-to-end navigation scenarios against the headless DOM model.
//!
//! Each scenario drives a controller through resolved DOM events and checks
//! the resulting document state the way a stylesheet and a screen reader
//! would see it.

use std::time::Duration;

use navkit_core::surface::{
    Aria, BODY_LOCKED_CLASS, ITEM_OPEN_CLASS, ItemLayout, OVERLAY_VISIBLE_CLASS, PANEL_OPEN_CLASS,
    SubmenuLayout, TRIGGER_ACTIVE_CLASS,
};
use navkit_core::{
    DomOp, ItemId, MenuPhase, NavConfig, NavController, NavEvent, NavLayout, Node,
};
use navkit_web::DomModel;
use navkit_web::input::event_from_json_str;
use pretty_assertions::assert_eq;

const PRODUCTS: ItemId = ItemId(0);
const ABOUT: ItemId = ItemId(1);
const SERVICES: ItemId = ItemId(2);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn site_layout() -> NavLayout {
    let submenu = |id: &str, links| SubmenuLayout {
        id: Some(id.to_owned()),
        links,
    };
    NavLayout {
        panel_id: Some("navList".to_owned()),
        close_button: true,
        items: vec![
            ItemLayout {
                link_id: Some("products-link".to_owned()),
                submenu: Some(submenu("products-menu", 4)),
                ..ItemLayout::default()
            },
            ItemLayout::link(),
            ItemLayout {
                link_id: Some("services-link".to_owned()),
                submenu: Some(submenu("services-menu", 2)),
                ..ItemLayout::default()
            },
        ],
        ..NavLayout::default()
    }
}

fn attach(width: u32) -> NavController<DomModel> {
    let dom = DomModel::new(site_layout(), width).with_scroll(640);
    NavController::attach(dom, NavConfig::default()).expect("site markup attaches")
}

/// Feed a JSON event the way the browser glue does.
fn send(nav: &mut NavController<DomModel>, json: &str) {
    let event = event_from_json_str(json).expect("valid event json");
    nav.handle(event);
}

#[test]
fn attach_wires_aria_contract() {
    let nav = attach(1280);
    let dom = nav.surface();
    assert_eq!(dom.attr(Node::Trigger, Aria::Expanded), Some("false"));
    assert_eq!(dom.attr(Node::Trigger, Aria::Controls), Some("navList"));
    assert_eq!(dom.attr(Node::Panel, Aria::Hidden), Some("false"));
    assert_eq!(dom.attr(Node::ItemLink(PRODUCTS), Aria::HasPopup), Some("true"));
    assert_eq!(
        dom.attr(Node::ItemLink(PRODUCTS), Aria::Controls),
        Some("products-menu")
    );
    assert_eq!(
        dom.attr(Node::Submenu(PRODUCTS), Aria::LabelledBy),
        Some("products-link")
    );
    assert_eq!(dom.attr(Node::Submenu(SERVICES), Aria::Hidden), Some("true"));
    assert_eq!(dom.attr(Node::ItemLink(ABOUT), Aria::HasPopup), None);
    assert!(nav.degraded().is_empty());
}

#[test]
fn scenario_a_desktop_hover() {
    let mut nav = attach(1280);

    send(&mut nav, r#"{"kind":"pointer_enter","target":{"item":0}}"#);
    nav.advance_time(ms(199));
    assert!(!nav.is_expanded(PRODUCTS));
    nav.advance_time(ms(1));
    assert!(nav.is_expanded(PRODUCTS));
    let dom = nav.surface();
    assert!(dom.has_class(Node::Item(PRODUCTS), ITEM_OPEN_CLASS));
    assert_eq!(dom.attr(Node::ItemLink(PRODUCTS), Aria::Expanded), Some("true"));
    assert_eq!(dom.attr(Node::Submenu(PRODUCTS), Aria::Hidden), Some("false"));

    send(&mut nav, r#"{"kind":"pointer_leave","target":{"item":0}}"#);
    nav.advance_time(ms(300));
    assert!(!nav.is_expanded(PRODUCTS));
    let dom = nav.surface();
    assert!(!dom.has_class(Node::Item(PRODUCTS), ITEM_OPEN_CLASS));
    assert_eq!(dom.attr(Node::ItemLink(PRODUCTS), Aria::Expanded), Some("false"));
}

#[test]
fn hover_item_to_submenu_and_back_stays_open() {
    let mut nav = attach(1280);

    send(&mut nav, r#"{"kind":"mouseenter","target":{"item":0}}"#);
    nav.advance_time(ms(200));
    send(&mut nav, r#"{"kind":"mouseenter","target":{"submenu":0}}"#);
    nav.advance_time(ms(400));
    // Back onto the item's own link: only the nested submenu reports a leave.
    send(&mut nav, r#"{"kind":"mouseleave","target":{"submenu":0}}"#);
    nav.advance_time(ms(300));
    assert!(nav.is_expanded(PRODUCTS));
    assert!(nav.surface().has_class(Node::Item(PRODUCTS), ITEM_OPEN_CLASS));

    send(&mut nav, r#"{"kind":"mouseleave","target":{"item":0}}"#);
    nav.advance_time(ms(200));
    assert!(!nav.is_expanded(PRODUCTS));
}

#[test]
fn scenario_b_mobile_toggle() {
    let mut nav = attach(375);
    assert!(nav.is_mobile());
    assert_eq!(nav.surface().attr(Node::Panel, Aria::Hidden), Some("true"));

    send(&mut nav, r#"{"kind":"click","target":"trigger"}"#);
    assert_eq!(nav.phase(), MenuPhase::Opening);
    let dom = nav.surface();
    assert!(dom.has_class(Node::Overlay, OVERLAY_VISIBLE_CLASS));
    assert!(dom.has_class(Node::Body, BODY_LOCKED_CLASS));
    assert!(dom.is_scroll_locked());
    assert_eq!(nav.saved_scroll_offset(), Some(640));
    assert_eq!(dom.overlays_created(), 1);

    nav.advance_time(ms(350));
    assert_eq!(nav.phase(), MenuPhase::Open);
    let dom = nav.surface();
    assert!(dom.has_class(Node::Trigger, TRIGGER_ACTIVE_CLASS));
    assert!(dom.has_class(Node::Panel, PANEL_OPEN_CLASS));
    assert_eq!(dom.attr(Node::Trigger, Aria::Expanded), Some("true"));
    assert_eq!(dom.attr(Node::Panel, Aria::Hidden), Some("false"));
    assert_eq!(dom.focused(), Some(Node::CloseButton));

    send(&mut nav, r#"{"kind":"click","target":"overlay"}"#);
    nav.advance_time(ms(350));
    assert_eq!(nav.phase(), MenuPhase::Closed);
    let dom = nav.surface();
    assert!(!dom.is_scroll_locked());
    assert_eq!(dom.scroll(), 640);
    assert_eq!(dom.is_hidden(Node::Overlay), Some(true));

    // The overlay is reused on the next open.
    nav.advance_time(ms(100));
    nav.open();
    assert_eq!(nav.surface().overlays_created(), 1);
}

#[test]
fn scenario_c_mobile_accordion() {
    let mut nav = attach(375);
    nav.open();
    nav.advance_time(ms(350));

    send(&mut nav, r#"{"kind":"click","target":{"item_link":0}}"#);
    assert_eq!(nav.expanded_items(), vec![PRODUCTS]);

    nav.advance_time(ms(100));
    send(&mut nav, r#"{"kind":"click","target":{"item_link":2}}"#);
    assert_eq!(nav.expanded_items(), vec![SERVICES]);
    let dom = nav.surface();
    assert!(!dom.has_class(Node::Item(PRODUCTS), ITEM_OPEN_CLASS));
    assert!(dom.has_class(Node::Item(SERVICES), ITEM_OPEN_CLASS));
}

#[test]
fn scenario_d_flip_to_desktop_while_open() {
    let mut nav = attach(375);
    nav.open();
    nav.advance_time(ms(350));
    send(&mut nav, r#"{"kind":"click","target":{"item_link":0}}"#);
    assert!(nav.is_expanded(PRODUCTS));

    nav.surface_mut().set_viewport_width(1280);
    send(&mut nav, r#"{"kind":"resize","width":1280}"#);
    nav.advance_time(ms(150));

    assert!(!nav.is_mobile());
    assert_eq!(nav.phase(), MenuPhase::Closing);
    assert!(nav.expanded_items().is_empty());
    let dom = nav.surface();
    assert!(!dom.is_scroll_locked());
    assert_eq!(dom.scroll(), 640);
    assert_eq!(dom.attr(Node::Panel, Aria::Hidden), Some("false"));

    nav.advance_time(ms(350));
    assert_eq!(nav.phase(), MenuPhase::Closed);
    assert!(!nav.is_open());
}

#[test]
fn scenario_e_escape_returns_focus() {
    let mut nav = attach(375);
    nav.open();
    nav.advance_time(ms(350));

    send(
        &mut nav,
        r#"{"kind":"keydown","key":"Escape","code":"Escape","target":"close_button"}"#,
    );
    assert_eq!(nav.phase(), MenuPhase::Closing);
    assert_eq!(nav.surface().focused(), Some(Node::Trigger));
    assert_eq!(
        nav.surface().ops().last(),
        Some(&DomOp::Focus {
            node: Node::Trigger
        })
    );
}

#[test]
fn plain_link_click_navigates_and_closes() {
    let mut nav = attach(375);
    nav.open();
    nav.advance_time(ms(350));
    let outcome = nav.handle(NavEvent::click(Node::ItemLink(ABOUT)));
    assert!(!outcome.prevent_default);
    assert_eq!(nav.phase(), MenuPhase::Closing);
}

#[test]
fn desktop_click_on_submenu_trigger_only_opens() {
    let mut nav = attach(1280);
    let first = nav.handle(NavEvent::click(Node::ItemLink(SERVICES)));
    assert!(first.prevent_default);
    nav.advance_time(ms(500));
    nav.handle(NavEvent::click(Node::ItemLink(SERVICES)));
    assert!(nav.is_expanded(SERVICES));
}

#[test]
fn keyboard_walk_through_mobile_menu() {
    let mut nav = attach(375);
    nav.open();
    nav.advance_time(ms(350));

    let key = |nav: &mut NavController<DomModel>, key: &str, target: &str| {
        send(
            nav,
            &format!(r#"{{"kind":"keydown","key":"{key}","target":{target}}}"#),
        );
    };
    key(&mut nav, " ", r#"{"item_link":0}"#);
    assert!(nav.is_expanded(PRODUCTS));
    key(&mut nav, "ArrowRight", r#"{"item_link":0}"#);
    assert_eq!(nav.surface().focused(), Some(Node::SubmenuLink(PRODUCTS, 0)));
    key(&mut nav, "ArrowUp", r#"{"submenu_link":[0,0]}"#);
    assert_eq!(nav.surface().focused(), Some(Node::SubmenuLink(PRODUCTS, 3)));
    key(&mut nav, "ArrowLeft", r#"{"submenu_link":[0,3]}"#);
    assert_eq!(nav.surface().focused(), Some(Node::ItemLink(PRODUCTS)));
    key(&mut nav, "ArrowDown", r#"{"item_link":0}"#);
    assert_eq!(nav.surface().focused(), Some(Node::ItemLink(ABOUT)));
}

#[test]
fn detach_returns_clean_document() {
    let mut nav = attach(375);
    nav.open();
    nav.advance_time(ms(100));
    let dom = nav.detach();
    assert!(!dom.is_scroll_locked());
    assert!(!dom.has_class(Node::Panel, PANEL_OPEN_CLASS));
    assert!(!dom.has_class(Node::Trigger, TRIGGER_ACTIVE_CLASS));
    assert!(!dom.has_class(Node::Overlay, OVERLAY_VISIBLE_CLASS));
    assert_eq!(dom.attr(Node::Trigger, Aria::Expanded), Some("false"));
}
