//! # Text Normalization
//!
//! Cleans raw text before it is counted or encoded: drops non-printable and
//! emoji characters, applies NFKC compatibility composition, collapses
//! whitespace runs, and lowercases.

use unicode_general_category::{GeneralCategory, get_general_category};
use unicode_normalization::UnicodeNormalization;

/// Emoji and pictograph blocks dropped by [`normalize`]. Inclusive bounds.
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F), // Emoticons
    (0x1F300, 0x1F5FF), // Misc symbols and pictographs
    (0x1F680, 0x1F6FF), // Transport and map
    (0x2600, 0x26FF),   // Misc symbols
    (0x2700, 0x27BF),   // Dingbats
    (0x1F900, 0x1F9FF), // Supplemental symbols and pictographs
    (0x1FA70, 0x1FAFF), // Symbols and pictographs extended-A
];

/// Variation selector blocks (skin tone and glyph-variant modifiers).
const VARIATION_SELECTOR_RANGES: &[(u32, u32)] = &[
    (0x180B, 0x180D),
    (0xFE00, 0xFE0F),
    (0xE0100, 0xE01EF),
];

fn in_ranges(
    c: char,
    ranges: &[(u32, u32)],
) -> bool {
    let cp = c as u32;
    ranges.iter().any(|&(lo, hi)| lo <= cp && cp <= hi)
}

fn is_emoji(c: char) -> bool {
    in_ranges(c, EMOJI_RANGES) || in_ranges(c, VARIATION_SELECTOR_RANGES)
}

/// Graphic characters: letters, marks, numbers, punctuation, and symbols.
fn is_printable(c: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(c),
        UppercaseLetter
            | LowercaseLetter
            | TitlecaseLetter
            | ModifierLetter
            | OtherLetter
            | NonspacingMark
            | SpacingMark
            | EnclosingMark
            | DecimalNumber
            | LetterNumber
            | OtherNumber
            | ConnectorPunctuation
            | DashPunctuation
            | OpenPunctuation
            | ClosePunctuation
            | InitialPunctuation
            | FinalPunctuation
            | OtherPunctuation
            | MathSymbol
            | CurrencySymbol
            | ModifierSymbol
            | OtherSymbol
    )
}

/// Normalize a raw string for training or encoding.
///
/// Steps, in order:
/// 1. drop every character that is neither printable nor whitespace, and
///    every emoji or variation selector;
/// 2. apply NFKC compatibility composition;
/// 3. collapse each whitespace run to a single ASCII space and trim;
/// 4. lowercase.
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`. Does not fail.
pub fn normalize(text: &str) -> String {
    let filtered: String = text
        .chars()
        .filter(|&c| (is_printable(c) || c.is_whitespace()) && !is_emoji(c))
        .collect();

    let composed: String = filtered.nfkc().collect();

    let collapsed = composed.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_emoji_and_collapses_whitespace() {
        assert_eq!(normalize("  Héllo 😀  Wörld\t"), "héllo wörld");
    }

    #[test]
    fn test_drops_control_and_variation_selectors() {
        assert_eq!(normalize("a\u{0000}b"), "ab");
        assert_eq!(normalize("snow\u{2603}\u{FE0F} day"), "snow day");
        assert_eq!(normalize("x\u{200B}y"), "xy");
    }

    #[test]
    fn test_compatibility_composition() {
        // Ligature fi and fullwidth A both decompose under NFKC.
        assert_eq!(normalize("\u{FB01}re"), "fire");
        assert_eq!(normalize("\u{FF21}"), "a");
        // NBSP is whitespace, collapsed like any other run.
        assert_eq!(normalize("a\u{00A0}\u{00A0}b"), "a b");
    }

    #[test]
    fn test_lowercases_multilingual_text() {
        // Trailing sigma takes its final form under Unicode lowercasing.
        assert_eq!(normalize("ΣΟΦΟΣ"), "σοφος");
        assert!(normalize("İstanbul").starts_with('i'));
        // Scripts without case are untouched.
        assert_eq!(normalize("నేను ఒక టోకనైజర్"), "నేను ఒక టోకనైజర్");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "  Héllo 😀  Wörld\t",
            "\u{FB01}re \u{FF21}\u{FF22}\u{FF23}",
            "MIXED case\nand\twhitespace",
            "నేను ఒక టోకనైజర్ రాయబోతున్నాను.",
            "emoji 🚀🧪🪐 gone",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\r\n "), "");
        assert_eq!(normalize("😀"), "");
    }
}
