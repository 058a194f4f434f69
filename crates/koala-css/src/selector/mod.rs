//! CSS Selector parsing and matching
//!
//! This module implements selector parsing and matching per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
//!
//! Matching runs right to left: the subject compound is tested against the
//! element first, then each combinator walks to its candidate nodes. A
//! descendant or subsequent-sibling combinator may have several candidates;
//! when the rest of the chain fails from one of them the next is tried.
//! Intermediate results are memoized in a [`SelectorMatcher`] that lives for
//! one resolution pass.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use koala_dom::{DomTree, ElementData, NodeId, NodeType};
use serde::Serialize;
use thiserror::Error;

/// Why a selector failed to parse. The cascade drops the selector and warns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Nothing but whitespace.
    #[error("empty selector")]
    Empty,
    /// A character that starts no selector production.
    #[error("unexpected character '{0}' in selector")]
    UnexpectedChar(char),
    /// `>`, `+` or `~` with no compound on one side.
    #[error("combinator '{0}' is missing an operand")]
    DanglingCombinator(char),
    /// `[attr` without a closing bracket, or a malformed operator.
    #[error("malformed attribute selector")]
    MalformedAttribute,
    /// `:` or `::` not followed by a name.
    #[error("missing pseudo-class name")]
    MissingPseudoName,
    /// Functional pseudo-class with unbalanced parentheses.
    #[error("unbalanced parentheses in selector")]
    UnbalancedParens,
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Examples: `div`, `p`, `span`, `body`, `h1`
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Examples: `.highlight`, `.btn`, `.nav-item`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Examples: `#main`, `#header`
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,

    /// Dynamic pseudo-class or pseudo-element. Layout is static, so these
    /// never match, but their presence does not invalidate the rule.
    ///
    /// Examples: `:hover`, `:focus`, `::before`, `:nth-child(2)`
    NeverMatch,

    /// Structural pseudo-class that needs tree context to match.
    PseudoClass(PseudoClass),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
}

/// Structural pseudo-classes per [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// `:root`: the document element.
    Root,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-child`
    OnlyChild,
    /// `:empty`: no element children and no non-whitespace text.
    Empty,
    /// `:link`: `<a>`/`<area>` with `href`; every link is unvisited here.
    Link,
    /// `:disabled`
    Disabled,
    /// `:enabled`
    Enabled,
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Boolean attributes (present with no value) compare as the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`
    Exists(String),
    /// `[attr=value]`
    Equals(String, String),
    /// `[attr~=value]`: whitespace-separated word match.
    Includes(String, String),
    /// `[attr|=value]`: exact, or prefix followed by `-`.
    DashMatch(String, String),
    /// `[attr^=value]`
    PrefixMatch(String, String),
    /// `[attr$=value]`
    SuffixMatch(String, String),
    /// `[attr*=value]`
    SubstringMatch(String, String),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The list of simple selectors that make up this compound selector.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`: any ancestor.
    Descendant,
    /// `A > B`: the immediate parent.
    Child,
    /// `A + B`: the immediately preceding element sibling.
    NextSibling,
    /// `A ~ B`: any earlier element sibling.
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Example: `div.container > ul.nav li a.active` is stored as
/// ```text
/// subject: [a.active]
/// combinators: [(Descendant, [li]), (Descendant, [ul.nav]), (Child, [div.container])]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector (the subject of the selector).
    pub subject: CompoundSelector,

    /// Chain of (combinator, compound) pairs going left from the subject.
    /// Empty if this is a single compound selector.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// Four components compared lexicographically:
/// `(inline, id, class/attribute/pseudo-class, type)`. The first component is
/// only ever set for declarations from a `style` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize)]
pub struct Specificity(pub u32, pub u32, pub u32, pub u32);

impl Specificity {
    /// Specificity of a `style` attribute declaration.
    pub const INLINE: Self = Self(1, 0, 0, 0);

    /// Zero specificity, used for presentational hints.
    pub const ZERO: Self = Self(0, 0, 0, 0);

    /// Create a selector specificity with (id, class, type) components.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self(0, a, b, c)
    }
}

/// A parsed CSS selector ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// The complex selector (compound selectors with combinators).
    pub complex: ComplexSelector,
    /// The specificity of this selector.
    pub specificity: Specificity,
}

impl ParsedSelector {
    /// Check if this is a simple selector (no combinators).
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        self.complex.combinators.is_empty()
    }

    /// Match without memoization. Convenient for one-off checks and tests;
    /// the cascade goes through [`SelectorMatcher`].
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        SelectorMatcher::new().matches(0, self, tree, node_id)
    }
}

/// Memo key: which selector, how far along its combinator chain, which node.
type MatchKey = (usize, usize, NodeId);

/// Right-to-left selector matcher with a per-pass memo.
///
/// The memo is keyed by node id, and ids are reused when a tree is rebuilt, so
/// [`SelectorMatcher::clear`] must run before every resolution pass.
#[derive(Debug, Default)]
pub struct SelectorMatcher {
    memo: HashMap<MatchKey, bool>,
}

impl SelectorMatcher {
    /// Create a matcher with an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all memoized results.
    pub fn clear(&mut self) {
        self.memo.clear();
    }

    /// Number of memoized (selector, step, node) results.
    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// `key` identifies the selector within the current pass; two different
    /// selectors must never share a key.
    pub fn matches(
        &mut self,
        key: usize,
        selector: &ParsedSelector,
        tree: &DomTree,
        node_id: NodeId,
    ) -> bool {
        if !compound_matches_in_tree(&selector.complex.subject, tree, node_id) {
            return false;
        }
        self.matches_chain(key, &selector.complex.combinators, 0, tree, node_id)
    }

    /// Whether `chain[step..]` is satisfied, given that `node_id` matched the
    /// compound to the right of `chain[step]`.
    fn matches_chain(
        &mut self,
        key: usize,
        chain: &[(Combinator, CompoundSelector)],
        step: usize,
        tree: &DomTree,
        node_id: NodeId,
    ) -> bool {
        let Some((combinator, compound)) = chain.get(step) else {
            return true;
        };
        if let Some(&cached) = self.memo.get(&(key, step, node_id)) {
            return cached;
        }

        let rest_matches = |candidate: NodeId, this: &mut Self| {
            compound_matches_in_tree(compound, tree, candidate)
                && this.matches_chain(key, chain, step + 1, tree, candidate)
        };

        let matched = match combinator {
            // [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators)
            // "an element B that is an arbitrary descendant of some ancestor element A"
            Combinator::Descendant => tree
                .ancestors(node_id)
                .any(|ancestor| rest_matches(ancestor, self)),

            // [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators)
            Combinator::Child => tree
                .parent(node_id)
                .is_some_and(|parent| rest_matches(parent, self)),

            // [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
            Combinator::NextSibling => find_previous_element_sibling(tree, node_id)
                .is_some_and(|sibling| rest_matches(sibling, self)),

            // [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
            Combinator::SubsequentSibling => tree
                .preceding_siblings(node_id)
                .filter(|&sibling| tree.as_element(sibling).is_some())
                .any(|sibling| rest_matches(sibling, self)),
        };

        let _ = self.memo.insert((key, step, node_id), matched);
        matched
    }
}

/// Check if a compound selector matches an element, with tree context for
/// structural pseudo-classes.
fn compound_matches_in_tree(compound: &CompoundSelector, tree: &DomTree, node_id: NodeId) -> bool {
    let Some(element) = tree.as_element(node_id) else {
        return false;
    };
    compound.simple_selectors.iter().all(|simple| match simple {
        SimpleSelector::PseudoClass(pc) => pseudo_class_matches(*pc, tree, node_id, element),
        _ => simple.matches(element),
    })
}

fn element_children(tree: &DomTree, parent: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
    tree.children(parent)
        .iter()
        .copied()
        .filter(|&c| tree.as_element(c).is_some())
}

fn same_type_siblings<'a>(
    tree: &'a DomTree,
    parent: NodeId,
    element: &'a ElementData,
) -> impl DoubleEndedIterator<Item = NodeId> + 'a {
    element_children(tree, parent)
        .filter(move |&c| tree.as_element(c).is_some_and(|e| e.is(&element.tag_name)))
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
fn pseudo_class_matches(
    pc: PseudoClass,
    tree: &DomTree,
    node_id: NodeId,
    element: &ElementData,
) -> bool {
    let parent = tree.parent(node_id);
    match pc {
        PseudoClass::Root => tree.document_element() == Some(node_id),
        PseudoClass::FirstChild => {
            parent.is_some_and(|p| element_children(tree, p).next() == Some(node_id))
        }
        PseudoClass::LastChild => {
            parent.is_some_and(|p| element_children(tree, p).next_back() == Some(node_id))
        }
        PseudoClass::FirstOfType => {
            parent.is_some_and(|p| same_type_siblings(tree, p, element).next() == Some(node_id))
        }
        PseudoClass::LastOfType => parent
            .is_some_and(|p| same_type_siblings(tree, p, element).next_back() == Some(node_id)),
        PseudoClass::OnlyChild => parent.is_some_and(|p| element_children(tree, p).count() == 1),

        // [§ 4.5 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
        PseudoClass::Empty => {
            tree.children(node_id)
                .iter()
                .all(|&c| match tree.get(c).map(|n| &n.node_type) {
                    Some(NodeType::Text(t)) => t.trim().is_empty(),
                    Some(NodeType::Comment(_)) => true,
                    _ => false,
                })
        }

        PseudoClass::Link => (element.is("a") || element.is("area")) && element.has_attr("href"),
        PseudoClass::Disabled => element.has_attr("disabled"),
        PseudoClass::Enabled => !element.has_attr("disabled"),
    }
}

/// Find the immediately preceding element sibling (skipping text/comment nodes).
fn find_previous_element_sibling(tree: &DomTree, node_id: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node_id)
        .find(|&sibling_id| tree.as_element(sibling_id).is_some())
}

impl ComplexSelector {
    /// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
    ///
    /// Sum of the specificity of every compound in the chain.
    #[must_use]
    pub fn calculate_specificity(&self) -> Specificity {
        std::iter::once(&self.subject)
            .chain(self.combinators.iter().map(|(_, compound)| compound))
            .map(calculate_compound_specificity)
            .fold(Specificity::default(), |acc, s| {
                Specificity(acc.0, acc.1 + s.1, acc.2 + s.2, acc.3 + s.3)
            })
    }
}

/// Calculate specificity for a single compound selector.
fn calculate_compound_specificity(compound: &CompoundSelector) -> Specificity {
    let mut spec = Specificity::default();

    for simple in &compound.simple_selectors {
        match simple {
            // "count the number of ID selectors in the selector (= A)"
            SimpleSelector::Id(_) => spec.1 += 1,

            // "count the number of class selectors, attributes selectors,
            // and pseudo-classes in the selector (= B)"
            SimpleSelector::Class(_)
            | SimpleSelector::PseudoClass(_)
            | SimpleSelector::Attribute(_) => spec.2 += 1,

            // "count the number of type selectors and pseudo-elements
            // in the selector (= C)"
            SimpleSelector::Type(_) => spec.3 += 1,

            // "ignore the universal selector"
            SimpleSelector::Universal | SimpleSelector::NeverMatch => {}
        }
    }

    spec
}

impl SimpleSelector {
    /// Check if this simple selector matches the given element.
    ///
    /// Structural pseudo-classes need tree context and return `false` here.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Type(name) => element.is(name),
            Self::Class(class_name) => element.classes().contains(class_name.as_str()),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Universal => true,
            Self::NeverMatch | Self::PseudoClass(_) => false,
            Self::Attribute(attr_sel) => attr_sel.matches(element),
        }
    }
}

impl AttributeSelector {
    fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Exists(name) => element.has_attr(name),
            Self::Equals(name, val) => element.attr(name) == Some(val.as_str()),
            Self::Includes(name, val) => element
                .attr(name)
                .is_some_and(|v| v.split_ascii_whitespace().any(|w| w == val)),
            Self::DashMatch(name, val) => element.attr(name).is_some_and(|v| {
                v == val || v.strip_prefix(val.as_str()).is_some_and(|r| r.starts_with('-'))
            }),
            Self::PrefixMatch(name, val) => element
                .attr(name)
                .is_some_and(|v| !val.is_empty() && v.starts_with(val.as_str())),
            Self::SuffixMatch(name, val) => element
                .attr(name)
                .is_some_and(|v| !val.is_empty() && v.ends_with(val.as_str())),
            Self::SubstringMatch(name, val) => element
                .attr(name)
                .is_some_and(|v| !val.is_empty() && v.contains(val.as_str())),
        }
    }
}

/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(char::is_ascii_whitespace).is_some() {}
}

fn take_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(ch) = chars.next_if(|&ch| is_ident_char(ch)) {
        ident.push(ch);
    }
    ident
}

/// Parse an attribute value inside `[attr=value]`, quoted or bare.
fn parse_attr_value(chars: &mut Peekable<Chars<'_>>) -> Result<String, SelectorError> {
    skip_whitespace(chars);

    match chars.peek() {
        Some(&q @ ('"' | '\'')) => {
            let _ = chars.next();
            let mut val = String::new();
            for ch in chars.by_ref() {
                if ch == q {
                    return Ok(val);
                }
                val.push(ch);
            }
            Err(SelectorError::MalformedAttribute)
        }
        Some(_) => {
            let mut val = String::new();
            while let Some(ch) = chars.next_if(|&ch| is_ident_char(ch) || ch == '.') {
                val.push(ch);
            }
            if val.is_empty() {
                Err(SelectorError::MalformedAttribute)
            } else {
                Ok(val)
            }
        }
        None => Err(SelectorError::MalformedAttribute),
    }
}

/// Parse the body of `[...]`; the opening bracket has been consumed.
fn parse_attribute_selector(
    chars: &mut Peekable<Chars<'_>>,
) -> Result<AttributeSelector, SelectorError> {
    skip_whitespace(chars);
    let name = take_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err(SelectorError::MalformedAttribute);
    }
    skip_whitespace(chars);

    let constructor: fn(String, String) -> AttributeSelector = match chars.next() {
        Some(']') => return Ok(AttributeSelector::Exists(name)),
        Some('=') => AttributeSelector::Equals,
        Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
            if chars.next() != Some('=') {
                return Err(SelectorError::MalformedAttribute);
            }
            match op {
                '~' => AttributeSelector::Includes,
                '|' => AttributeSelector::DashMatch,
                '^' => AttributeSelector::PrefixMatch,
                '$' => AttributeSelector::SuffixMatch,
                _ => AttributeSelector::SubstringMatch,
            }
        }
        _ => return Err(SelectorError::MalformedAttribute),
    };

    let value = parse_attr_value(chars)?;
    skip_whitespace(chars);
    if chars.next() != Some(']') {
        return Err(SelectorError::MalformedAttribute);
    }
    Ok(constructor(name, value))
}

/// Parse `:name` / `::name` / `:name(...)`; the first colon has been consumed.
fn parse_pseudo(chars: &mut Peekable<Chars<'_>>) -> Result<SimpleSelector, SelectorError> {
    let is_pseudo_element = chars.next_if_eq(&':').is_some();

    let pseudo_name = take_ident(chars);
    if pseudo_name.is_empty() {
        return Err(SelectorError::MissingPseudoName);
    }

    // Functional pseudo-classes (:nth-child(...), :not(...)) are consumed whole.
    if chars.next_if_eq(&'(').is_some() {
        let mut depth = 1u32;
        for ch in chars.by_ref() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(SelectorError::UnbalancedParens);
        }
        return Ok(SimpleSelector::NeverMatch);
    }

    if is_pseudo_element {
        return Ok(SimpleSelector::NeverMatch);
    }

    let pseudo = match pseudo_name.to_ascii_lowercase().as_str() {
        "root" => PseudoClass::Root,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-child" => PseudoClass::OnlyChild,
        "empty" => PseudoClass::Empty,
        "link" => PseudoClass::Link,
        "disabled" => PseudoClass::Disabled,
        "enabled" => PseudoClass::Enabled,
        // :hover, :focus, :visited, legacy :before/:after, ...
        _ => return Ok(SimpleSelector::NeverMatch),
    };
    Ok(SimpleSelector::PseudoClass(pseudo))
}

/// Parse a raw selector string into a `ParsedSelector`.
///
/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
///
/// Supports type, class, id, universal, attribute and pseudo-class simple
/// selectors, compounds of them, and the four combinators. A comma-separated
/// group must be split first with [`parse_selector_list`].
///
/// # Errors
///
/// Returns a [`SelectorError`] describing the first unsupported or malformed
/// piece of syntax.
pub fn parse_selector(raw: &str) -> Result<ParsedSelector, SelectorError> {
    fn flush_compound(
        compound: &mut Vec<SimpleSelector>,
        compounds: &mut Vec<CompoundSelector>,
    ) -> bool {
        if compound.is_empty() {
            return false;
        }
        compounds.push(CompoundSelector {
            simple_selectors: std::mem::take(compound),
        });
        true
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SelectorError::Empty);
    }

    // Parse left to right collecting compounds and the combinators between
    // them, then reverse into subject-first order.
    let mut compounds: Vec<CompoundSelector> = Vec::new();
    let mut combinators_between: Vec<Combinator> = Vec::new();
    let mut current_compound = Vec::new();

    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                let class = take_ident(&mut chars);
                if class.is_empty() {
                    return Err(SelectorError::UnexpectedChar('.'));
                }
                current_compound.push(SimpleSelector::Class(class));
            }
            '#' => {
                let id = take_ident(&mut chars);
                if id.is_empty() {
                    return Err(SelectorError::UnexpectedChar('#'));
                }
                current_compound.push(SimpleSelector::Id(id));
            }
            '*' => current_compound.push(SimpleSelector::Universal),
            '[' => current_compound.push(SimpleSelector::Attribute(parse_attribute_selector(
                &mut chars,
            )?)),
            ':' => current_compound.push(parse_pseudo(&mut chars)?),

            // Whitespace is a descendant combinator unless an explicit
            // combinator follows it.
            c if c.is_ascii_whitespace() => {
                skip_whitespace(&mut chars);
                match chars.peek() {
                    None | Some('>' | '+' | '~') => {}
                    Some(_) => {
                        if flush_compound(&mut current_compound, &mut compounds) {
                            combinators_between.push(Combinator::Descendant);
                        }
                    }
                }
            }

            '>' | '+' | '~' => {
                if !flush_compound(&mut current_compound, &mut compounds) {
                    return Err(SelectorError::DanglingCombinator(c));
                }
                skip_whitespace(&mut chars);
                if chars.peek().is_none() {
                    return Err(SelectorError::DanglingCombinator(c));
                }
                combinators_between.push(match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::NextSibling,
                    _ => Combinator::SubsequentSibling,
                });
            }

            c if is_ident_start_char(c) || c == '-' => {
                let mut name = String::from(c);
                name.push_str(&take_ident(&mut chars));
                current_compound.push(SimpleSelector::Type(name.to_ascii_lowercase()));
            }

            other => return Err(SelectorError::UnexpectedChar(other)),
        }
    }

    let _ = flush_compound(&mut current_compound, &mut compounds);

    // One more compound than combinators: "A B C" has 3 and 2.
    if compounds.len() != combinators_between.len() + 1 {
        return Err(SelectorError::Empty);
    }

    let subject = compounds.pop().ok_or(SelectorError::Empty)?;

    // For "A > B C": compounds [A, B], combinators [Child, Descendant]
    // become [(Descendant, B), (Child, A)] so matching walks up from C.
    let combinators = compounds
        .into_iter()
        .zip(combinators_between)
        .rev()
        .map(|(compound, combinator)| (combinator, compound))
        .collect();

    let complex = ComplexSelector {
        subject,
        combinators,
    };
    let specificity = complex.calculate_specificity();

    Ok(ParsedSelector {
        complex,
        specificity,
    })
}

/// Split a selector group (`h1, .title > a`) on top-level commas and parse
/// each member. Commas inside brackets, parentheses or quotes do not split.
#[must_use]
pub fn parse_selector_list(group: &str) -> Vec<Result<ParsedSelector, SelectorError>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in group.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(&group[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&group[start..]);

    parts.into_iter().map(parse_selector).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut DomTree, parent: NodeId, tag: &str, class: Option<&str>) -> NodeId {
        let mut data = ElementData::new(tag);
        if let Some(class) = class {
            data = data.with_attr("class", Some(class));
        }
        tree.append_element(parent, data)
    }

    #[test]
    fn test_specificity_is_four_components() {
        let selector = parse_selector("#nav .item a").unwrap();
        assert_eq!(selector.specificity, Specificity(0, 1, 1, 1));
        assert!(Specificity::INLINE > Specificity(0, 100, 0, 0));
    }

    #[test]
    fn test_descendant_backtracks_past_first_candidate() {
        // .a > .b .c : the nearest .b ancestor of .c sits under a non-.a
        // parent, but a farther .b does sit under .a.
        let mut tree = DomTree::new();
        let a = element(&mut tree, NodeId::ROOT, "div", Some("a"));
        let outer_b = element(&mut tree, a, "div", Some("b"));
        let x = element(&mut tree, outer_b, "div", Some("x"));
        let inner_b = element(&mut tree, x, "div", Some("b"));
        let c = element(&mut tree, inner_b, "span", Some("c"));

        let selector = parse_selector(".a > .b .c").unwrap();
        assert!(selector.matches_in_tree(&tree, c));
    }

    #[test]
    fn test_subsequent_sibling_backtracks() {
        let mut tree = DomTree::new();
        let wrapper = element(&mut tree, NodeId::ROOT, "div", Some("w"));
        let h1 = element(&mut tree, wrapper, "h1", None);
        let _p1 = element(&mut tree, wrapper, "p", None);
        let _span = element(&mut tree, wrapper, "span", None);
        let _p_mid = element(&mut tree, wrapper, "p", None);
        let p2 = element(&mut tree, wrapper, "p", None);

        // The nearest earlier <p> follows a <span>; only the first <p>
        // directly follows the <h1>.
        let selector = parse_selector("h1 + p ~ p").unwrap();
        assert!(selector.matches_in_tree(&tree, p2));
        assert!(!selector.matches_in_tree(&tree, h1));
    }

    #[test]
    fn test_matcher_memo_and_clear() {
        let mut tree = DomTree::new();
        let div = element(&mut tree, NodeId::ROOT, "div", None);
        let p = element(&mut tree, div, "p", None);
        let selector = parse_selector("div p").unwrap();

        let mut matcher = SelectorMatcher::new();
        assert!(matcher.matches(7, &selector, &tree, p));
        assert!(matcher.memo_len() > 0);
        assert!(matcher.matches(7, &selector, &tree, p));
        matcher.clear();
        assert_eq!(matcher.memo_len(), 0);
    }

    #[test]
    fn test_parse_selector_errors() {
        assert_eq!(parse_selector("   "), Err(SelectorError::Empty));
        assert_eq!(
            parse_selector("> p"),
            Err(SelectorError::DanglingCombinator('>'))
        );
        assert_eq!(
            parse_selector("a[href"),
            Err(SelectorError::MalformedAttribute)
        );
        assert_eq!(parse_selector("p!"), Err(SelectorError::UnexpectedChar('!')));
    }

    #[test]
    fn test_selector_list_respects_brackets() {
        let list = parse_selector_list("a[title='x,y'], p:not(.a, .b), h1");
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(Result::is_ok));
    }
}
