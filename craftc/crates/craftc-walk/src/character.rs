//! Character classes of the CraftLang grammar.
//!
//! These predicates are defined over Unicode general categories, not ASCII.
//! Newlines and whitespace are disjoint sets: the parser treats line breaks
//! as structure, so no whitespace predicate ever matches one.

use unicode_categories::UnicodeCategories;

/// Returns true for any line-terminating character: LF, CR, VT, FF, NEL,
/// LINE SEPARATOR and PARAGRAPH SEPARATOR.
///
/// A CR LF pair counts as a single newline; that pairing is handled by the
/// [`Walker`](crate::Walker), not here.
///
/// # Example
///
/// ```
/// use craftc_walk::character::is_newline;
///
/// assert!(is_newline('\n'));
/// assert!(is_newline('\r'));
/// assert!(!is_newline(' '));
/// ```
pub fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Returns true for horizontal whitespace: TAB, SPACE, NBSP and the Unicode
/// space characters. Never true for a newline character.
///
/// # Example
///
/// ```
/// use craftc_walk::character::is_whitespace;
///
/// assert!(is_whitespace(' '));
/// assert!(is_whitespace('\t'));
/// assert!(!is_whitespace('\n'));
/// ```
pub fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\x11'
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
    )
}

/// Returns true if `c` may start an identifier: general categories
/// `Lu | Ll | Lt | Lm | Lo | Pc`.
pub fn is_identifier_start(c: char) -> bool {
    c.is_letter_uppercase()
        || c.is_letter_lowercase()
        || c.is_letter_titlecase()
        || c.is_letter_modifier()
        || c.is_letter_other()
        || c.is_punctuation_connector()
}

/// Returns true if `c` may continue an identifier: any start character, or
/// general categories `Mn | Mc | Nd | Nl`.
pub fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c)
        || c.is_mark_nonspacing()
        || c.is_mark_spacing_combining()
        || c.is_number_decimal_digit()
        || c.is_number_letter()
}

/// Returns true for the ASCII digits `0`-`9`.
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Returns true if `c` occupies a column when rendered.
///
/// A character is printable unless it falls in the `C` (other) or `Z`
/// (separator) groups; ASCII SPACE is the one separator that still counts.
/// The walker only advances its column counter over printable characters.
pub fn is_printable(c: char) -> bool {
    c == ' ' || !(c.is_other() || c.is_separator())
}
