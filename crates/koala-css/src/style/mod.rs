//! CSS values, the property table and computed style
//!
//! This module implements CSS value types and computed style representation per:
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//! - [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! - [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)

mod color;
pub mod computed;
pub mod declaration;
mod display;
mod keywords;
mod length;
mod property;
mod value;

// Re-export all public types
pub use color::{ColorValue, parse_color};
pub use computed::{ComputedStyle, StyleEntry, ValueSource};
pub use declaration::{Declaration, DeclaredValue, parse_declaration};
pub use display::{DisplayValue, InnerDisplayType, OuterDisplayType, parse_display};
pub use keywords::{
    BorderCollapse, BorderStyle, FontStyle, Side, TextAlign, VerticalAlign, Visibility, WhiteSpace,
};
pub use length::{DEFAULT_FONT_SIZE_PX, Length, LengthContext, parse_length};
pub use property::Property;
pub use value::Value;
