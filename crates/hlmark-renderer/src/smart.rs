//! Typographic substitutions applied to text after parsing.
//!
//! Quotes, dashes and ellipses are handled by the parser's smart punctuation
//! option. This module adds what the parser leaves alone:
//!
//! - fractions: `3/16` → `<sup>3</sup>&frasl;<sub>16</sub>`
//! - symbols: `(c)` → `©`, `(r)` → `®`, `(tm)` → `™`
//!
//! Output is HTML: everything that is not substituted is escaped.

use crate::state::push_escaped_char;

/// U+2044, accepted in place of `/` between numerator and denominator.
const FRACTION_SLASH: char = '\u{2044}';

const SYMBOLS: [(&str, char); 3] = [("(c)", '©'), ("(r)", '®'), ("(tm)", '™')];

/// Escape `text` into `out`, applying fraction and symbol substitutions.
pub(crate) fn push_smart_text(out: &mut String, text: &str) {
    let mut prev = None;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        let consumed = match c {
            '0'..='9' => fraction(out, prev, rest),
            '(' => symbol(out, rest),
            _ => None,
        };

        let len = match consumed {
            Some(len) => len,
            None => {
                push_escaped_char(out, c);
                c.len_utf8()
            }
        };
        prev = rest[..len].chars().next_back();
        rest = &rest[len..];
    }
}

fn is_boundary(c: Option<char>) -> bool {
    c.is_none_or(|c| c.is_whitespace() || c.is_ascii_punctuation())
}

/// Try to render a fraction at the start of `text`.
///
/// Matches `\d+/\d+` bounded by word boundaries on both sides. A `/` on
/// either side disqualifies the match so dates like `1/23/2005` stay intact.
fn fraction(out: &mut String, prev: Option<char>, text: &str) -> Option<usize> {
    if !is_boundary(prev) || prev == Some('/') {
        return None;
    }

    let num_end = digits_len(text);
    let after_num = &text[num_end..];
    let slash_len = if after_num.starts_with('/') {
        1
    } else if after_num.starts_with(FRACTION_SLASH) {
        FRACTION_SLASH.len_utf8()
    } else {
        return None;
    };

    let den_start = num_end + slash_len;
    let den_end = den_start + digits_len(&text[den_start..]);
    if den_end == den_start {
        return None;
    }

    let next = text[den_end..].chars().next();
    if !is_boundary(next) || next == Some('/') {
        return None;
    }

    out.push_str("<sup>");
    out.push_str(&text[..num_end]);
    out.push_str("</sup>&frasl;<sub>");
    out.push_str(&text[den_start..den_end]);
    out.push_str("</sub>");
    Some(den_end)
}

fn digits_len(text: &str) -> usize {
    text.find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len())
}

fn symbol(out: &mut String, text: &str) -> Option<usize> {
    let (pattern, glyph) = SYMBOLS.iter().find(|(pattern, _)| {
        text.get(..pattern.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(pattern))
    })?;
    out.push(*glyph);
    Some(pattern.len())
}
