//! Intraword superscript and subscript.
//!
//! The parser only opens `^x^` and `~x~` spans at word boundaries, so
//! `2^10^` and `H~2~O` arrive as plain text. Text runs are scanned for those
//! spans here. A span's content is non-empty and contains no whitespace;
//! `~~` is never a subscript delimiter.

/// Append `text` to `out`, wrapping script spans in `<sup>`/`<sub>`.
///
/// Everything outside the delimiters, and the span contents themselves, go
/// through `push_plain`.
pub(crate) fn push_scripted_text(out: &mut String, text: &str, push_plain: fn(&mut String, &str)) {
    let bytes = text.as_bytes();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let delim = bytes[i];
        if delim != b'^' && delim != b'~' {
            i += 1;
            continue;
        }
        if delim == b'~' && bytes.get(i + 1) == Some(&b'~') {
            while bytes.get(i) == Some(&b'~') {
                i += 1;
            }
            continue;
        }

        let content_start = i + 1;
        let Some(len) = span_len(&text[content_start..], delim) else {
            i += 1;
            continue;
        };

        let (open, close) = if delim == b'^' {
            ("<sup>", "</sup>")
        } else {
            ("<sub>", "</sub>")
        };
        push_plain(out, &text[plain_start..i]);
        out.push_str(open);
        push_plain(out, &text[content_start..content_start + len]);
        out.push_str(close);

        i = content_start + len + 1;
        plain_start = i;
    }

    push_plain(out, &text[plain_start..]);
}

/// Length of the span content before the closing `delim`, if there is one.
fn span_len(rest: &str, delim: u8) -> Option<usize> {
    let end = rest.bytes().position(|b| b == delim)?;
    let content = &rest[..end];
    if content.is_empty() || content.contains(char::is_whitespace) {
        return None;
    }
    if delim == b'~' && rest.as_bytes().get(end + 1) == Some(&b'~') {
        return None;
    }
    Some(end)
}
