//! Selector matching, cascade, and style computation for the Koala renderer.
//!
//! # Scope
//!
//! This crate implements:
//! - **Stylesheet input model**: rules as (selector group, media, raw
//!   declarations) per origin, plus a small parser for trusted CSS text
//!
//! - **CSS Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, class, ID, universal and attribute selectors
//!   - Structural pseudo-classes
//!   - Complex selectors with combinators (descendant, child, sibling)
//!   - Specificity calculation
//!   - Backtracking right-to-left matching with a per-pass memo
//!
//! - **CSS Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Origin, importance and specificity ordering
//!   - Inline style and presentational hints
//!   - Property inheritance and the `inherit`/`initial`/`unset` keywords
//!   - Media expressions against the configured viewport
//!
//! - **Computed Styles** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/))
//!   - An enum-keyed property table
//!   - Color values (hex, named colors, `rgb()`)
//!   - Lengths in px, em, rem, %, vw, vh and absolute units
//!   - Shorthand property expansion (margin, padding, border, font, background)
//!
//! # Not Yet Implemented
//!
//! - Flex, grid, float and positioning properties (rejected with a warning)
//! - Dynamic pseudo-classes and pseudo-elements (parsed, never match)
//! - `hsl()` and other color functions

/// CSS cascade and style computation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Errors raised while interpreting declaration values.
pub mod error;
/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Computed style representation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod style;
/// Stylesheets, origins, declaration blocks and media expressions.
pub mod stylesheet;
/// The default stylesheet per [HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html).
pub mod ua_stylesheet;

pub use cascade::{StyleMap, StyleResolver, compute_styles};
pub use error::ValueError;
pub use selector::{
    ParsedSelector, SelectorError, SelectorMatcher, Specificity, parse_selector,
    parse_selector_list,
};
pub use style::{
    BorderCollapse, BorderStyle, ColorValue, ComputedStyle, DEFAULT_FONT_SIZE_PX, DisplayValue,
    FontStyle, InnerDisplayType, Length, OuterDisplayType, Property, Side, StyleEntry, TextAlign,
    Value, ValueSource, VerticalAlign, Visibility, WhiteSpace,
};
pub use stylesheet::{CascadeOptions, DeclarationError, Origin, StyleRule, Stylesheet};
pub use ua_stylesheet::ua_stylesheet;
