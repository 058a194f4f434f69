//! Stylesheet input model.
//!
//! [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
//!
//! The cascade consumes stylesheets as an ordered list of rules, each a raw
//! selector group, an optional media expression and raw `name: value`
//! pairs. Values are left unvalidated; the cascade parses them per property.
//!
//! [`Stylesheet::parse`] understands plain rule blocks, comments and one
//! level of `@media`, which is enough for the UA sheet and for tests. Full
//! CSS syntax belongs to the document's stylesheet parser.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a stylesheet came from. Variants are in ascending precedence: the
/// cascade applies them in this order and later applications win ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Origin {
    /// The built-in default sheet.
    UserAgent,
    /// `<link rel="stylesheet">` sheets, in document order.
    External,
    /// `<style>` elements, in document order.
    Embedded,
    /// `style="..."` attributes.
    Inline,
    /// Legacy presentational attributes (`width`, `bgcolor`, ...).
    Presentational,
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-a-qualified-rule)
///
/// One selector group with its declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Comma-separated selector group, unparsed.
    pub selectors: String,
    /// Media expression from an enclosing `@media`, if any.
    pub media: Option<String>,
    /// `name: value` pairs in source order; `!important` is still inside the value.
    pub declarations: Vec<(String, String)>,
}

impl StyleRule {
    /// A rule with no media condition.
    #[must_use]
    pub fn new(selectors: &str, declarations: &[(&str, &str)]) -> Self {
        Self {
            selectors: selectors.to_string(),
            media: None,
            declarations: declarations
                .iter()
                .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Attach a media expression.
    #[must_use]
    pub fn with_media(mut self, media: &str) -> Self {
        self.media = Some(media.to_string());
        self
    }
}

/// An ordered list of rules from one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    /// The source this sheet came from.
    pub origin: Origin,
    /// Rules in source order.
    pub rules: Vec<StyleRule>,
}

/// A malformed entry in a declaration block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// `name value` with no colon.
    #[error("expected ':' in declaration '{0}'")]
    MissingColon(String),
    /// `: value` with no property name.
    #[error("missing property name in declaration '{0}'")]
    MissingName(String),
}

/// Settings the cascade needs from its environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeOptions {
    /// Viewport width for media queries and `vw`.
    pub viewport_width: f32,
    /// Viewport height for media queries and `vh`.
    pub viewport_height: f32,
    /// Whether to start from the built-in UA stylesheet.
    pub user_agent_stylesheet: bool,
}

impl Default for CascadeOptions {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            user_agent_stylesheet: true,
        }
    }
}

impl Stylesheet {
    /// An empty sheet.
    #[must_use]
    pub const fn new(origin: Origin) -> Self {
        Self {
            origin,
            rules: Vec::new(),
        }
    }

    /// Builder-style rule append.
    #[must_use]
    pub fn with_rule(mut self, rule: StyleRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parse simple CSS text: rule blocks, `/* */` comments and `@media`
    /// blocks one level deep. Other at-rules are skipped; malformed
    /// declarations inside a block are dropped.
    #[must_use]
    pub fn parse(origin: Origin, css: &str) -> Self {
        let css = strip_comments(css);
        let mut rules = Vec::new();
        parse_rules(&css, None, &mut rules);
        Self { origin, rules }
    }
}

/// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comments)
fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        // "If the input stream ends without a closing */, the comment runs to EOF"
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Byte index of the `}` matching the `{` that opened at `open`.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_rules(mut css: &str, media: Option<&str>, rules: &mut Vec<StyleRule>) {
    loop {
        css = css.trim_start();
        if css.is_empty() {
            return;
        }
        let Some(open) = css.find('{') else {
            return;
        };
        let prelude = css[..open].trim();
        let close = matching_brace(css, open).unwrap_or(css.len());
        let body = css.get(open + 1..close).unwrap_or_default();

        if let Some(at_rule) = prelude.strip_prefix('@') {
            // Statement at-rules (`@import ...;`) end before the block.
            if let Some(semi) = prelude.find(';') {
                css = &css[semi + 1..];
                continue;
            }
            if let Some(condition) = at_rule.strip_prefix("media") {
                if media.is_none() {
                    parse_rules(body, Some(condition.trim()), rules);
                }
            }
        } else if !prelude.is_empty() {
            rules.push(StyleRule {
                selectors: prelude.to_string(),
                media: media.map(str::to_string),
                declarations: parse_declaration_block(body)
                    .into_iter()
                    .filter_map(Result::ok)
                    .collect(),
            });
        }
        css = css.get(close + 1..).unwrap_or_default();
    }
}

/// Split on `;` outside parentheses and quotes.
fn split_declarations(block: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (i, c) in block.char_indices() {
        match (c, quote) {
            ('"' | '\'', None) => quote = Some(c),
            (c, Some(q)) if c == q => quote = None,
            (_, Some(_)) => {}
            ('(', None) => depth += 1,
            (')', None) => depth = depth.saturating_sub(1),
            (';', None) if depth == 0 => {
                parts.push(&block[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&block[start..]);
    parts
}

/// [§ 5.3.6 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
///
/// Split a declaration block (the inside of `{}` or a `style` attribute)
/// into `(name, value)` pairs. Empty entries are skipped; each malformed
/// entry yields an error without affecting its neighbours.
#[must_use]
pub fn parse_declaration_block(block: &str) -> Vec<Result<(String, String), DeclarationError>> {
    split_declarations(block)
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, value) = entry
                .split_once(':')
                .ok_or_else(|| DeclarationError::MissingColon(entry.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(DeclarationError::MissingName(entry.to_string()));
            }
            Ok((name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// [Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/)
///
/// Evaluate a media expression for a screen of the configured viewport.
/// Supports media types `all`/`screen`/`print`, `min-width`/`max-width`/
/// `min-height`/`max-height` in px or em, `and`, `not`, `only`, and
/// comma-separated lists. Unknown features never match.
#[must_use]
pub fn media_matches(expression: &str, options: &CascadeOptions) -> bool {
    let expression = expression.trim();
    if expression.is_empty() {
        return true;
    }
    expression
        .split(',')
        .any(|query| media_query_matches(query, options))
}

fn media_query_matches(query: &str, options: &CascadeOptions) -> bool {
    let lower = query.trim().to_ascii_lowercase();
    let (negated, rest) = match lower.strip_prefix("not ") {
        Some(rest) => (true, rest),
        None => (false, lower.strip_prefix("only ").unwrap_or(&lower)),
    };
    let result = rest
        .split(" and ")
        .map(str::trim)
        .all(|part| media_condition_matches(part, options));
    result != negated
}

fn media_condition_matches(part: &str, options: &CascadeOptions) -> bool {
    match part {
        "all" | "screen" => return true,
        "print" | "speech" => return false,
        _ => {}
    }
    let Some(feature) = part.strip_prefix('(').and_then(|p| p.strip_suffix(')')) else {
        return false;
    };
    let Some((name, value)) = feature.split_once(':') else {
        return false;
    };
    let value = value.trim();
    let px = value
        .strip_suffix("px")
        .and_then(|v| v.trim().parse::<f32>().ok())
        .or_else(|| {
            value
                .strip_suffix("em")
                .and_then(|v| v.trim().parse::<f32>().ok())
                .map(|em| em * crate::style::DEFAULT_FONT_SIZE_PX)
        });
    let Some(px) = px else {
        return false;
    };
    match name.trim() {
        "min-width" => options.viewport_width >= px,
        "max-width" => options.viewport_width <= px,
        "min-height" => options.viewport_height >= px,
        "max-height" => options.viewport_height <= px,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rules_and_comments() {
        let sheet = Stylesheet::parse(
            Origin::Embedded,
            "/* lead */ p, div { color: red; margin: 0 } /* x */ span{width:10px;}",
        );
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0].selectors, "p, div");
        assert_eq!(
            sheet.rules[0].declarations,
            vec![
                ("color".to_string(), "red".to_string()),
                ("margin".to_string(), "0".to_string()),
            ]
        );
        assert_eq!(sheet.rules[1].selectors, "span");
    }

    #[test]
    fn test_parse_media_block() {
        let sheet = Stylesheet::parse(
            Origin::External,
            "@media (max-width: 600px) { p { color: blue } } @import url(x.css); div { color: red }",
        );
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0].media.as_deref(), Some("(max-width: 600px)"));
        assert_eq!(sheet.rules[1].selectors, "div");
        assert_eq!(sheet.rules[1].media, None);
    }

    #[test]
    fn test_declaration_block_errors_are_local() {
        let parsed = parse_declaration_block("color: red; nonsense; : 3px; width: 1px;");
        assert_eq!(parsed.len(), 4);
        assert!(parsed[0].is_ok());
        assert_eq!(
            parsed[1],
            Err(DeclarationError::MissingColon("nonsense".to_string()))
        );
        assert!(matches!(parsed[2], Err(DeclarationError::MissingName(_))));
        assert_eq!(parsed[3], Ok(("width".to_string(), "1px".to_string())));
    }

    #[test]
    fn test_semicolon_inside_quotes() {
        let parsed = parse_declaration_block("font-family: \"a;b\", serif");
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_media_matches() {
        let options = CascadeOptions {
            viewport_width: 800.0,
            viewport_height: 600.0,
            ..CascadeOptions::default()
        };
        assert!(media_matches("", &options));
        assert!(media_matches("screen", &options));
        assert!(!media_matches("print", &options));
        assert!(media_matches("screen and (min-width: 700px)", &options));
        assert!(!media_matches("(max-width: 700px)", &options));
        assert!(media_matches("print, (max-height: 40em)", &options));
        assert!(media_matches("not print", &options));
        assert!(!media_matches("(orientation: landscape)", &options));
    }
}
