//! Errors raised while interpreting raw declaration values.
//!
//! None of these reach callers of the cascade: the resolver reports them
//! through its diagnostics sink and keeps the previous value.

use thiserror::Error;

/// A declaration value the cascade could not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Neither a longhand nor a supported shorthand.
    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    /// A dimension with a unit this engine does not know.
    #[error("unknown unit '{unit}' in '{value}'")]
    UnknownUnit {
        /// The unrecognised unit suffix.
        unit: String,
        /// The full raw value.
        value: String,
    },

    /// Not a hex, named, or `rgb()` colour.
    #[error("unknown color '{0}'")]
    UnknownColor(String),

    /// Syntactically fine, but not valid for this property.
    #[error("invalid value '{value}' for '{property}'")]
    InvalidValue {
        /// Property name as written.
        property: String,
        /// The raw value.
        value: String,
    },

    /// The value is recognised CSS that layout does not implement
    /// (`display: flex`, `float`, ...).
    #[error("unsupported value '{value}' for '{property}'")]
    Unsupported {
        /// Property name as written.
        property: String,
        /// The raw value.
        value: String,
    },

    /// Nothing after the colon.
    #[error("empty value for '{0}'")]
    Empty(String),
}

impl ValueError {
    pub(crate) fn invalid(property: &str, value: &str) -> Self {
        Self::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}
