//! Layout configuration.
//!
//! Everything a [`LayoutSession`](crate::LayoutSession) needs to know that
//! does not come from the document: the viewport, the fallback font, and
//! the trial width used for max-content measurement.

use koala_css::{CascadeOptions, DEFAULT_FONT_SIZE_PX};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`LayoutConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON text did not describe a configuration.
    #[error("invalid layout configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session-wide layout settings.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of the initial containing block.
    pub viewport_width: f32,
    /// Height of the initial containing block.
    pub viewport_height: f32,
    /// Family used when a style names none the metrics provider knows.
    pub default_font_family: String,
    /// Font size for the root element when no rule sets one.
    pub default_font_size: f32,
    /// Available width for max-content trial layouts.
    pub unbounded_width: f32,
    /// Whether the HTML default stylesheet takes part in the cascade.
    pub user_agent_stylesheet: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            default_font_family: "sans-serif".to_string(),
            default_font_size: DEFAULT_FONT_SIZE_PX,
            unbounded_width: 1.0e7,
            user_agent_stylesheet: true,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] if `text` is not valid JSON or a field has the
    /// wrong type.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Same viewport, for a fixed-size test page.
    #[must_use]
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// The cascade settings implied by this configuration.
    #[must_use]
    pub const fn cascade_options(&self) -> CascadeOptions {
        CascadeOptions {
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            user_agent_stylesheet: self.user_agent_stylesheet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LayoutConfig::from_json(r#"{ "viewport_width": 1024 }"#).unwrap();
        assert!((config.viewport_width - 1024.0).abs() < f32::EPSILON);
        assert!((config.viewport_height - 600.0).abs() < f32::EPSILON);
        assert!(config.user_agent_stylesheet);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = LayoutConfig::from_json(r#"{ "viewport_width": "wide" }"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid layout configuration"));
    }

    #[test]
    fn test_round_trip() {
        let config = LayoutConfig::default().with_viewport(320.0, 480.0);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(LayoutConfig::from_json(&json).unwrap(), config);
    }
}
