//! Text measurement and line splitting.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//! [§ 5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! The [`DimensionCalculator`] turns `(font, string)` into a size through a
//! [`FontMetrics`] provider, caching measured strings per font. The free
//! functions at the bottom break a run into width-fitting fragments on word
//! boundaries.

use std::collections::HashMap;
use std::ops::Range;

use koala_css::ComputedStyle;

/// Font metrics provider.
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
///
/// Implementations return the rendered `(width, height)` of `text` set in
/// the given family, size and weight. The height of an empty string is the
/// font's line height.
pub trait FontMetrics {
    /// Measure `text`.
    fn measure(&self, family: &str, size: f32, weight: u16, text: &str) -> (f32, f32);
}

/// Approximate font metrics using fixed ratios.
///
/// Without font data, the average advance of Latin glyphs in a proportional
/// face is taken as 0.6× the font size (Helvetica/Arial body text), bold
/// adds a tenth, and line height is 1.2×, the upper end of the recommended
/// range for `line-height: normal`. Used headless and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    fn measure(&self, _family: &str, size: f32, weight: u16, text: &str) -> (f32, f32) {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        const LINE_HEIGHT_RATIO: f32 = 1.2;
        let ratio = if weight >= 600 {
            CHAR_WIDTH_RATIO * 1.1
        } else {
            CHAR_WIDTH_RATIO
        };
        (
            text.chars().count() as f32 * size * ratio,
            size * LINE_HEIGHT_RATIO,
        )
    }
}

/// Cache key: the style properties that affect measurement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    family: String,
    size_bits: u32,
    weight: u16,
}

impl FontKey {
    /// Key for an explicit font description.
    #[must_use]
    pub fn new(family: &str, size: f32, weight: u16) -> Self {
        Self {
            family: family.to_string(),
            size_bits: size.to_bits(),
            weight,
        }
    }

    /// Key for the font a computed style selects.
    #[must_use]
    pub fn for_style(style: &ComputedStyle) -> Self {
        Self::new(style.font_family(), style.font_size_px(), style.font_weight())
    }

    /// Font size in pixels.
    #[must_use]
    pub fn size(&self) -> f32 {
        f32::from_bits(self.size_bits)
    }
}

/// Per-font measurement state.
#[derive(Debug, Default)]
struct FontFace {
    widths: HashMap<String, f32>,
    line_height: Option<f32>,
}

/// Text measurer with a per-font cache.
///
/// Owned by the [`LayoutSession`](crate::LayoutSession); nothing is shared
/// between sessions.
pub struct DimensionCalculator {
    metrics: Box<dyn FontMetrics>,
    faces: HashMap<FontKey, FontFace>,
}

impl std::fmt::Debug for DimensionCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimensionCalculator")
            .field("cached_fonts", &self.faces.len())
            .finish_non_exhaustive()
    }
}

impl DimensionCalculator {
    /// Wrap a metrics provider.
    #[must_use]
    pub fn new(metrics: Box<dyn FontMetrics>) -> Self {
        Self {
            metrics,
            faces: HashMap::new(),
        }
    }

    /// Number of fonts with cached measurements.
    #[must_use]
    pub fn cached_fonts(&self) -> usize {
        self.faces.len()
    }

    /// Advance width of `text`.
    ///
    /// The provider always sees the whole string, so kerning and shaping
    /// are kept; results are remembered per font.
    pub fn width(&mut self, key: &FontKey, text: &str) -> f32 {
        let face = self.faces.entry(key.clone()).or_default();
        if let Some(&width) = face.widths.get(text) {
            return width;
        }
        let width = self
            .metrics
            .measure(&key.family, key.size(), key.weight, text)
            .0;
        let _ = face.widths.insert(text.to_string(), width);
        width
    }

    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// The font's `line-height: normal`.
    pub fn line_height(&mut self, key: &FontKey) -> f32 {
        let metrics = &self.metrics;
        let face = self.faces.entry(key.clone()).or_default();
        *face.line_height.get_or_insert_with(|| {
            metrics.measure(&key.family, key.size(), key.weight, "").1
        })
    }

    /// `(width, height)` of `text` in the style's font, honouring a
    /// specified `line-height`.
    pub fn measure(&mut self, style: &ComputedStyle, text: &str) -> (f32, f32) {
        let key = FontKey::for_style(style);
        let width = self.width(&key, text);
        let height = style
            .line_height()
            .unwrap_or_else(|| self.line_height(&key));
        (width, height)
    }
}

/// Byte ranges of the whitespace-delimited words in `text`.
fn words(text: &str) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                out.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push(s..text.len());
    }
    out
}

/// [§ 5.5.2 Word Breaking Rules](https://www.w3.org/TR/css-text-3/#word-breaking)
///
/// Where the first line of `text` ends when it is set `available` wide.
///
/// Words are accumulated while the text up to the end of the next word
/// still fits; the break falls at the start of the first word that does
/// not. The first word is always taken, so a word wider than the line is
/// kept whole. Returns `None` when the whole run fits or there is no word
/// boundary to break at.
#[must_use]
pub fn split_point(text: &str, available: f32, mut measure: impl FnMut(&str) -> f32) -> Option<usize> {
    // The inter-word space before the overflowing word stays on the first
    // line.
    words(text)
        .into_iter()
        .skip(1)
        .find(|word| measure(&text[..word.end]) > available)
        .map(|word| word.start)
}

/// Break `text` into consecutive ranges, each fitting `available` except
/// where a single word is wider than the line.
///
/// Leading and trailing whitespace stays inside the fragments, so joining
/// the pieces reproduces `text` exactly.
#[must_use]
pub fn split_text(text: &str, available: f32, mut measure: impl FnMut(&str) -> f32) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let rest = &text[start..];
        match split_point(rest, available, &mut measure) {
            Some(at) => {
                out.push(start..start + at);
                start += at;
            }
            None => {
                out.push(start..text.len());
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    /// Every character is 10px wide.
    fn mono(text: &str) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    fn pieces<'a>(text: &'a str, ranges: &[Range<usize>]) -> Vec<&'a str> {
        ranges.iter().map(|r| &text[r.clone()]).collect()
    }

    #[test]
    fn test_split_at_last_fitting_word() {
        // "aaa bbb" is 70 wide; "aaa bbb ccc" would be 110.
        assert_eq!(split_point("aaa bbb ccc", 100.0, mono), Some(8));
        assert_eq!(split_point("aaa bbb", 100.0, mono), None);
    }

    #[test]
    fn test_overlong_word_is_kept_whole() {
        let text = "abcdefghijkl mn";
        assert_eq!(pieces(text, &split_text(text, 50.0, mono)), ["abcdefghijkl ", "mn"]);
        assert_eq!(split_point("abcdefghijkl", 50.0, mono), None);
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let text = " one two  three ";
        let ranges = split_text(text, 60.0, mono);
        assert_eq!(pieces(text, &ranges), [" one ", "two  ", "three "]);
    }

    #[test]
    fn test_dimension_cache_is_per_font() {
        let mut calc = DimensionCalculator::new(Box::new(ApproximateFontMetrics));
        let regular = FontKey::new("serif", 10.0, 400);
        let bold = FontKey::new("serif", 10.0, 700);
        assert!((calc.width(&regular, "abcd") - 24.0).abs() < 0.001);
        assert!((calc.width(&regular, "dcba") - 24.0).abs() < 0.001);
        assert!(calc.width(&bold, "abcd") > 24.0);
        assert!((calc.line_height(&regular) - 12.0).abs() < 0.001);
        assert_eq!(calc.cached_fonts(), 2);
    }

    /// Five pixels a character plus a fixed 3px of side bearing per run.
    struct Bearing;

    impl FontMetrics for Bearing {
        fn measure(&self, _family: &str, _size: f32, _weight: u16, text: &str) -> (f32, f32) {
            (5.0 * text.chars().count() as f32 + 3.0, 10.0)
        }
    }

    #[test]
    fn test_width_measures_whole_string() {
        let mut calc = DimensionCalculator::new(Box::new(Bearing));
        let key = FontKey::new("serif", 10.0, 400);
        assert_eq!(calc.width(&key, "hello"), 28.0);
        assert_eq!(calc.width(&key, "hello"), 28.0);
        assert_eq!(calc.width(&key, "he"), 13.0);
        assert_eq!(calc.cached_fonts(), 1);
    }

    /// Joining the fragments gives back the original text.
    #[quickcheck]
    fn prop_fragments_concatenate(words: Vec<u8>, width: u8) -> bool {
        let text: String = words
            .iter()
            .map(|w| "x".repeat(usize::from(w % 7)) + if w % 3 == 0 { "  " } else { " " })
            .collect();
        let ranges = split_text(&text, f32::from(width), mono);
        let joined: String = pieces(&text, &ranges).concat();
        joined == text
    }

    /// A fragment only exceeds the width when it holds a single word.
    #[quickcheck]
    fn prop_fragments_fit_or_hold_one_word(words: Vec<u8>, width: u8) -> bool {
        let text: String = words
            .iter()
            .map(|w| "y".repeat(usize::from(w % 9) + 1) + " ")
            .collect();
        split_text(&text, f32::from(width), mono).into_iter().all(|range| {
            let piece = text[range].trim_end();
            mono(piece) <= f32::from(width) || piece.split_whitespace().count() == 1
        })
    }
}
