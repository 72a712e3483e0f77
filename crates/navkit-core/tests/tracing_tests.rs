#![forbid(unsafe_code)]
#![cfg(feature = "tracing")]

//! Structured logging integration tests.
//!
//!   cargo test -p navkit-core --features tracing --test tracing_tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use navkit_core::surface::ItemLayout;
use navkit_core::{DomOp, NavConfig, NavController, NavEvent, NavLayout, NavSurface, Node};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    message: String,
    fields: Vec<(String, String)>,
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCapture {
    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|e| e.message == message)
    }
}

struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor {
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> EventCapture {
    let capture = EventCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

struct NullSurface {
    layout: NavLayout,
    width: u32,
}

impl NavSurface for NullSurface {
    fn layout(&self) -> NavLayout {
        self.layout.clone()
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }

    fn scroll_offset(&self) -> i32 {
        0
    }

    fn apply(&mut self, _op: DomOp) {}
}

fn surface(layout: NavLayout, width: u32) -> NullSurface {
    NullSurface { layout, width }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn missing_trigger_logs_error() {
    let capture = with_captured_events(|| {
        let layout = NavLayout {
            trigger: false,
            ..NavLayout::default()
        };
        assert!(NavController::attach(surface(layout, 500), NavConfig::default()).is_err());
    });
    let event = capture.find("navigation not enhanced").expect("error logged");
    assert_eq!(event.level, Level::ERROR);
    assert!(
        event.fields.iter().any(|(k, v)| k == "err" && v.contains("toggle control")),
        "fields: {:?}",
        event.fields
    );
}

#[test]
fn missing_close_button_logs_warning() {
    let capture = with_captured_events(|| {
        let nav = NavController::attach(surface(NavLayout::default(), 500), NavConfig::default());
        assert!(nav.is_ok());
    });
    let warn = capture
        .find("optional navigation element missing; feature skipped")
        .expect("warning logged");
    assert_eq!(warn.level, Level::WARN);
    assert!(capture.find("navigation controller attached").is_some());
}

#[test]
fn mode_change_is_logged() {
    let capture = with_captured_events(|| {
        let layout = NavLayout {
            close_button: true,
            items: vec![ItemLayout::link()],
            ..NavLayout::default()
        };
        let mut nav = NavController::attach(surface(layout, 500), NavConfig::default()).unwrap();
        nav.handle(NavEvent::Resize { width: 1200 });
        nav.advance_time(Duration::from_millis(150));
        assert!(!nav.is_mobile());
    });
    let event = capture.find("layout mode changed").expect("mode change logged");
    assert_eq!(event.level, Level::INFO);
    assert!(event.fields.iter().any(|(k, v)| k == "mode" && v == "Desktop"));
}

#[test]
fn panel_transitions_log_at_debug() {
    let capture = with_captured_events(|| {
        let layout = NavLayout {
            close_button: true,
            ..NavLayout::default()
        };
        let mut nav = NavController::attach(surface(layout, 500), NavConfig::default()).unwrap();
        nav.handle(NavEvent::click(Node::Trigger));
        nav.advance_time(Duration::from_millis(350));
        nav.handle(NavEvent::click(Node::Trigger));
        nav.advance_time(Duration::from_millis(350));
    });
    let messages: Vec<String> = capture
        .events()
        .into_iter()
        .filter(|e| e.level == Level::DEBUG)
        .map(|e| e.message)
        .collect();
    for expected in ["panel opening", "panel open", "panel closing", "panel closed"] {
        assert!(
            messages.iter().any(|m| m == expected),
            "missing {expected:?} in {messages:?}"
        );
    }
}
