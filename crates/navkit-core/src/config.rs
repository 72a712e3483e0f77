#![forbid(unsafe_code)]

//! Controller configuration.
//!
//! All durations are stored in whole milliseconds so the struct maps directly
//! onto a JS options object (`{ breakpoint: 900, hoverOpenDelayMs: 200, .. }`).

use core::time::Duration;

use crate::error::NavError;

/// Default viewport width (logical px) at or below which the layout is mobile.
pub const DEFAULT_BREAKPOINT: u32 = 900;

/// Configuration for a [`NavController`](crate::NavController).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct NavConfig {
    /// Mobile when `width <= breakpoint`.
    /// Default: 900
    pub breakpoint: u32,

    /// Delay before a hovered desktop item opens. `0` opens immediately.
    /// Default: 200ms
    pub hover_open_delay_ms: u64,

    /// Delay before a desktop item closes after the pointer leaves it.
    /// Default: 200ms
    pub hover_close_delay_ms: u64,

    /// Grace period after focus leaves an item before its submenu closes.
    /// Default: 100ms
    pub focus_grace_ms: u64,

    /// Panel open/close animation length; also the overlay fade.
    /// Default: 350ms
    pub transition_ms: u64,

    /// Window in which a repeated toggle of the same item is ignored.
    /// Default: 50ms
    pub toggle_debounce_ms: u64,

    /// Trailing debounce applied to resize events.
    /// Default: 150ms
    pub resize_debounce_ms: u64,

    /// At most one expanded submenu in mobile mode.
    /// Default: true
    pub accordion_on_mobile: bool,

    /// Opening a desktop submenu closes its siblings.
    /// Default: true
    pub exclusive_on_desktop: bool,

    /// Create an overlay element when the markup does not provide one.
    /// Default: true
    pub create_overlay: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            breakpoint: DEFAULT_BREAKPOINT,
            hover_open_delay_ms: 200,
            hover_close_delay_ms: 200,
            focus_grace_ms: 100,
            transition_ms: 350,
            toggle_debounce_ms: 50,
            resize_debounce_ms: 150,
            accordion_on_mobile: true,
            exclusive_on_desktop: true,
            create_overlay: true,
        }
    }
}

impl NavConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mobile/desktop breakpoint.
    #[must_use]
    pub const fn with_breakpoint(mut self, px: u32) -> Self {
        self.breakpoint = px;
        self
    }

    /// Set both hover delays.
    #[must_use]
    pub const fn with_hover_delays(mut self, open_ms: u64, close_ms: u64) -> Self {
        self.hover_open_delay_ms = open_ms;
        self.hover_close_delay_ms = close_ms;
        self
    }

    /// Set the panel transition duration.
    #[must_use]
    pub const fn with_transition_ms(mut self, ms: u64) -> Self {
        self.transition_ms = ms;
        self
    }

    /// Enable or disable the mobile accordion policy.
    #[must_use]
    pub const fn with_accordion_on_mobile(mut self, on: bool) -> Self {
        self.accordion_on_mobile = on;
        self
    }

    /// Enable or disable desktop sibling exclusion.
    #[must_use]
    pub const fn with_exclusive_on_desktop(mut self, on: bool) -> Self {
        self.exclusive_on_desktop = on;
        self
    }

    /// Enable or disable lazy overlay creation.
    #[must_use]
    pub const fn with_create_overlay(mut self, on: bool) -> Self {
        self.create_overlay = on;
        self
    }

    pub fn hover_open_delay(&self) -> Duration {
        Duration::from_millis(self.hover_open_delay_ms)
    }

    pub fn hover_close_delay(&self) -> Duration {
        Duration::from_millis(self.hover_close_delay_ms)
    }

    pub fn focus_grace(&self) -> Duration {
        Duration::from_millis(self.focus_grace_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn toggle_debounce(&self) -> Duration {
        Duration::from_millis(self.toggle_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Reject values that would make the controller misbehave.
    ///
    /// A zero transition would let a close and an open land in the same
    /// instant, which breaks the one-transition-at-a-time guarantee.
    pub fn validate(&self) -> Result<(), NavError> {
        if self.breakpoint == 0 {
            return Err(NavError::InvalidConfig("breakpoint must be positive"));
        }
        if self.transition_ms == 0 {
            return Err(NavError::InvalidConfig("transition duration must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = NavConfig::default();
        assert_eq!(config.breakpoint, 900);
        assert_eq!(config.hover_open_delay(), Duration::from_millis(200));
        assert_eq!(config.hover_close_delay(), Duration::from_millis(200));
        assert_eq!(config.focus_grace(), Duration::from_millis(100));
        assert_eq!(config.transition(), Duration::from_millis(350));
        assert_eq!(config.toggle_debounce(), Duration::from_millis(50));
        assert_eq!(config.resize_debounce(), Duration::from_millis(150));
        assert!(config.accordion_on_mobile);
        assert!(config.exclusive_on_desktop);
        assert!(config.create_overlay);
    }

    #[test]
    fn builders_chain() {
        let config = NavConfig::new()
            .with_breakpoint(768)
            .with_hover_delays(0, 300)
            .with_transition_ms(400)
            .with_accordion_on_mobile(false);
        assert_eq!(config.breakpoint, 768);
        assert_eq!(config.hover_open_delay_ms, 0);
        assert_eq!(config.hover_close_delay_ms, 300);
        assert_eq!(config.transition_ms, 400);
        assert!(!config.accordion_on_mobile);
    }

    #[test]
    fn validate_rejects_zero_breakpoint() {
        let err = NavConfig::new().with_breakpoint(0).validate().unwrap_err();
        assert_eq!(err, NavError::InvalidConfig("breakpoint must be positive"));
    }

    #[test]
    fn validate_rejects_zero_transition() {
        assert!(NavConfig::new().with_transition_ms(0).validate().is_err());
        assert!(NavConfig::default().validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let config: NavConfig =
            serde_json::from_str(r#"{"breakpoint":768,"accordionOnMobile":false}"#).unwrap();
        assert_eq!(config.breakpoint, 768);
        assert!(!config.accordion_on_mobile);
        assert_eq!(config.transition_ms, 350);
    }
}
