//! CSS Cascading and Style Computation
//!
//! This module implements style computation per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/).
//!
//! Resolution runs in two passes over the document:
//!
//! 1. every element collects its cascaded value per property from the UA
//!    sheet, author sheets, its `style` attribute and its presentational
//!    attributes, in that order;
//! 2. a top-down walk turns cascaded values into computed values, filling
//!    inherited properties from the parent and resolving relative lengths.

mod hints;

use std::collections::{BTreeMap, HashMap};

use koala_common::warning::Diagnostics;
use koala_dom::{DomTree, NodeId};
use strum::IntoEnumIterator;

use crate::selector::{ParsedSelector, SelectorMatcher, Specificity, parse_selector_list};
use crate::style::{
    ComputedStyle, DEFAULT_FONT_SIZE_PX, Declaration, DeclaredValue, Length, LengthContext,
    Property, StyleEntry, Value, ValueSource, parse_declaration,
};
use crate::stylesheet::{CascadeOptions, Origin, Stylesheet, media_matches, parse_declaration_block};
use crate::ua_stylesheet::ua_stylesheet;

/// Computed styles keyed by element.
pub type StyleMap = HashMap<NodeId, ComputedStyle>;

/// [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// The winning declaration for one property on one element so far.
#[derive(Debug, Clone)]
struct CascadedEntry {
    value: DeclaredValue,
    specificity: Specificity,
    important: bool,
    user_agent: bool,
}

impl CascadedEntry {
    /// Whether a new declaration replaces this one.
    ///
    /// Importance dominates: a stored important value only yields to another
    /// important declaration. Then origin: author beats user agent, except
    /// that the order flips for important declarations. Then the later
    /// declaration wins unless the stored one is strictly more specific.
    fn yields_to(&self, specificity: Specificity, important: bool, user_agent: bool) -> bool {
        if self.important != important {
            return important;
        }
        if self.user_agent != user_agent {
            // "Important user agent declarations" outrank "Important author
            // declarations".
            return if important { user_agent } else { self.user_agent };
        }
        specificity >= self.specificity
    }
}

/// All cascaded values for one element.
#[derive(Debug, Default)]
struct Cascaded {
    entries: BTreeMap<Property, CascadedEntry>,
}

impl Cascaded {
    fn apply(&mut self, declaration: &Declaration, specificity: Specificity, user_agent: bool) {
        let wins = self.entries.get(&declaration.property).is_none_or(|existing| {
            existing.yields_to(specificity, declaration.important, user_agent)
        });
        if wins {
            let _ = self.entries.insert(
                declaration.property,
                CascadedEntry {
                    value: declaration.value.clone(),
                    specificity,
                    important: declaration.important,
                    user_agent,
                },
            );
        }
    }
}

/// A stylesheet rule with its selectors and declarations parsed once per pass.
struct CompiledRule {
    /// Memo key and selector for each member of the group.
    selectors: Vec<(usize, ParsedSelector)>,
    declarations: Vec<Declaration>,
    user_agent: bool,
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
///
/// Owns everything one resolution pass needs: the options, the selector
/// match memo, and the warning sink. Reuse one resolver across passes; the
/// memo is cleared at the start of every [`StyleResolver::resolve`].
#[derive(Debug, Default)]
pub struct StyleResolver {
    options: CascadeOptions,
    matcher: SelectorMatcher,
    diagnostics: Diagnostics,
}

impl StyleResolver {
    /// Create a resolver.
    #[must_use]
    pub fn new(options: CascadeOptions) -> Self {
        Self {
            options,
            matcher: SelectorMatcher::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The options this resolver was created with.
    #[must_use]
    pub const fn options(&self) -> &CascadeOptions {
        &self.options
    }

    /// Warnings raised so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Mutable access to the warning sink, e.g. to clear it between documents.
    pub const fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Number of memoized selector matches from the last pass.
    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.matcher.memo_len()
    }

    /// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
    /// "The cascade takes an unordered list of declared values for a given
    /// property on a given element, sorts them by their declaration's
    /// precedence..."
    ///
    /// Compute a style for every element in `tree`. `sheets` are applied
    /// after the UA sheet, ordered by [`Origin`] and then by position in the
    /// slice. Never fails: unusable selectors and values are reported through
    /// [`StyleResolver::diagnostics`] and skipped.
    pub fn resolve(&mut self, tree: &DomTree, sheets: &[Stylesheet]) -> StyleMap {
        self.matcher.clear();

        let mut ordered: Vec<&Stylesheet> = sheets.iter().collect();
        ordered.sort_by_key(|sheet| sheet.origin);
        if self.options.user_agent_stylesheet {
            ordered.insert(0, ua_stylesheet());
        }
        let rules = self.compile(&ordered);

        // Pass 1: cascaded values per element.
        let mut cascaded: HashMap<NodeId, Cascaded> = HashMap::new();
        for id in tree.preorder() {
            if tree.as_element(id).is_some() {
                let values = self.cascade_element(tree, id, &rules);
                let _ = cascaded.insert(id, values);
            }
        }

        // Pass 2: computed values, parents before children.
        let mut styles = StyleMap::with_capacity(cascaded.len());
        let root_font_size = tree
            .document_element()
            .and_then(|root| {
                cascaded
                    .get(&root)
                    .map(|c| self.compute(c, None, DEFAULT_FONT_SIZE_PX))
            })
            .map_or(DEFAULT_FONT_SIZE_PX, |style| style.font_size_px());

        for id in tree.preorder() {
            let Some(values) = cascaded.get(&id) else {
                continue;
            };
            let parent = tree
                .parent(id)
                .filter(|&p| tree.as_element(p).is_some())
                .and_then(|p| styles.get(&p));
            let style = self.compute(values, parent, root_font_size);
            let _ = styles.insert(id, style);
        }

        log::debug!(
            "resolved {} element styles from {} rules ({} memoized matches)",
            styles.len(),
            rules.len(),
            self.matcher.memo_len()
        );
        styles
    }

    /// Parse selectors and declarations for every applicable rule.
    fn compile(&mut self, sheets: &[&Stylesheet]) -> Vec<CompiledRule> {
        let mut rules = Vec::new();
        let mut next_key = 0usize;

        for sheet in sheets {
            let user_agent = sheet.origin == Origin::UserAgent;
            for rule in &sheet.rules {
                if let Some(media) = &rule.media {
                    if !media_matches(media, &self.options) {
                        continue;
                    }
                }

                let mut selectors = Vec::new();
                for parsed in parse_selector_list(&rule.selectors) {
                    match parsed {
                        Ok(selector) => {
                            selectors.push((next_key, selector));
                            next_key += 1;
                        }
                        Err(err) => {
                            let _ = self.diagnostics.warn_once(
                                "CSS",
                                &format!("failed to parse selector '{}': {err}", rule.selectors),
                            );
                        }
                    }
                }
                if selectors.is_empty() {
                    continue;
                }

                let declarations = rule
                    .declarations
                    .iter()
                    .flat_map(|(name, raw)| self.parse_or_warn(name, raw))
                    .collect();
                rules.push(CompiledRule {
                    selectors,
                    declarations,
                    user_agent,
                });
            }
        }
        rules
    }

    fn parse_or_warn(&mut self, name: &str, raw: &str) -> Vec<Declaration> {
        match parse_declaration(name, raw) {
            Ok(declarations) => declarations,
            Err(err) => {
                let _ = self.diagnostics.warn_once("CSS", &err.to_string());
                Vec::new()
            }
        }
    }

    /// Pass 1 for one element.
    fn cascade_element(&mut self, tree: &DomTree, id: NodeId, rules: &[CompiledRule]) -> Cascaded {
        let mut cascaded = Cascaded::default();

        // [§ 6.4.3 Specificity](https://www.w3.org/TR/css-cascade-4/#cascade-specificity)
        // A rule whose group matches through several selectors applies once,
        // with the highest specificity among them.
        for rule in rules {
            let specificity = rule
                .selectors
                .iter()
                .filter(|(key, selector)| self.matcher.matches(*key, selector, tree, id))
                .map(|(_, selector)| selector.specificity)
                .max();
            if let Some(specificity) = specificity {
                for declaration in &rule.declarations {
                    cascaded.apply(declaration, specificity, rule.user_agent);
                }
            }
        }

        let Some(element) = tree.as_element(id) else {
            return cascaded;
        };

        // [§ 6.1 Style attributes](https://www.w3.org/TR/css-style-attr/#interpret)
        if let Some(style_attr) = element.attr("style") {
            for entry in parse_declaration_block(style_attr) {
                match entry {
                    Ok((name, raw)) => {
                        for declaration in self.parse_or_warn(&name, &raw) {
                            cascaded.apply(&declaration, Specificity::INLINE, false);
                        }
                    }
                    Err(err) => {
                        let _ = self.diagnostics.warn_once("CSS", &err.to_string());
                    }
                }
            }
        }

        // [HTML § 15.3 Presentational hints](https://html.spec.whatwg.org/multipage/rendering.html#presentational-hints)
        for declaration in hints::presentational_hints(tree, id, element) {
            cascaded.apply(&declaration, Specificity::ZERO, false);
        }

        cascaded
    }

    /// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
    ///
    /// Pass 2 for one element.
    fn compute(
        &self,
        cascaded: &Cascaded,
        parent: Option<&ComputedStyle>,
        root_font_size: f32,
    ) -> ComputedStyle {
        let mut style = ComputedStyle::initial();

        for property in Property::iter() {
            let parent_value = || {
                parent
                    .and_then(|p| p.value(property).cloned())
                    .unwrap_or_else(|| property.initial_value())
            };
            let entry = match cascaded.entries.get(&property) {
                Some(winner) => StyleEntry {
                    value: match &winner.value {
                        DeclaredValue::Value(value) => value.clone(),
                        DeclaredValue::Inherit => parent_value(),
                        DeclaredValue::Initial => property.initial_value(),
                    },
                    specificity: winner.specificity,
                    important: winner.important,
                    source: ValueSource::Declared,
                },
                // [§ 7.2](https://www.w3.org/TR/css-cascade-4/#inheriting)
                // "the inherited value of a property on an element is the
                // computed value of the property on the element's parent"
                None if property.is_inherited() && parent.is_some() => StyleEntry {
                    value: parent_value(),
                    specificity: Specificity::ZERO,
                    important: false,
                    source: ValueSource::Inherited,
                },
                None => continue,
            };
            style.insert(property, entry);
        }

        let parent_font_size = parent.map_or(DEFAULT_FONT_SIZE_PX, ComputedStyle::font_size_px);
        let viewport = (self.options.viewport_width, self.options.viewport_height);

        // [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
        // "em and ex units refer to the computed font metrics of the parent element"
        // and percentages are "relative to the parent element's font size".
        let font_ctx = LengthContext {
            font_size: parent_font_size,
            root_font_size: if parent.is_some() {
                root_font_size
            } else {
                DEFAULT_FONT_SIZE_PX
            },
            viewport_width: viewport.0,
            viewport_height: viewport.1,
        };
        if let Some(entry) = style.entry(Property::FontSize).cloned() {
            if entry.source == ValueSource::Declared {
                let px = match entry.value {
                    Value::Length(Length::Percent(pct)) => {
                        Value::Length(Length::Px(parent_font_size * pct / 100.0))
                    }
                    other => other.absolutize(&font_ctx),
                };
                style.insert(Property::FontSize, StyleEntry { value: px, ..entry });
            }
        }

        let ctx = LengthContext {
            font_size: style.font_size_px(),
            ..font_ctx
        };
        let declared: Vec<(Property, StyleEntry)> = style
            .entries()
            .filter(|(p, e)| *p != Property::FontSize && e.source == ValueSource::Declared)
            .map(|(p, e)| (p, e.clone()))
            .collect();
        for (property, entry) in declared {
            let value = entry.value.clone().absolutize(&ctx);
            style.insert(property, StyleEntry { value, ..entry });
        }

        style
    }
}

/// Convenience wrapper: resolve with default options and a throwaway resolver.
#[must_use]
pub fn compute_styles(tree: &DomTree, sheets: &[Stylesheet]) -> StyleMap {
    StyleResolver::new(CascadeOptions::default()).resolve(tree, sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::parse_declaration;

    fn decl(name: &str, raw: &str) -> Declaration {
        parse_declaration(name, raw).unwrap().remove(0)
    }

    #[test]
    fn test_important_is_sticky() {
        let mut cascaded = Cascaded::default();
        cascaded.apply(&decl("color", "red !important"), Specificity::new(0, 0, 1), false);
        cascaded.apply(&decl("color", "blue"), Specificity::INLINE, false);
        assert_eq!(
            cascaded.entries[&Property::Color].value,
            decl("color", "red").value
        );
    }

    #[test]
    fn test_equal_specificity_later_wins() {
        let mut cascaded = Cascaded::default();
        cascaded.apply(&decl("color", "red"), Specificity::new(0, 1, 0), false);
        cascaded.apply(&decl("color", "blue"), Specificity::new(0, 1, 0), false);
        assert_eq!(
            cascaded.entries[&Property::Color].value,
            decl("color", "blue").value
        );
        cascaded.apply(&decl("color", "green"), Specificity::new(0, 0, 5), false);
        assert_eq!(
            cascaded.entries[&Property::Color].value,
            decl("color", "blue").value
        );
    }

    #[test]
    fn test_author_beats_user_agent() {
        let mut cascaded = Cascaded::default();
        cascaded.apply(&decl("display", "block"), Specificity::new(1, 0, 0), true);
        cascaded.apply(&decl("display", "inline"), Specificity::ZERO, false);
        assert_eq!(
            cascaded.entries[&Property::Display].value,
            decl("display", "inline").value
        );
    }
}
