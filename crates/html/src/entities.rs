//! Character reference decoding and the escaping used by the serializer.
//!
//! Decoding is deliberately narrow: the six named references below plus well-formed,
//! semicolon-terminated numeric references. Anything else is copied through unchanged.

use memchr::memchr;

const NAMED: &[(&str, char)] = &[
    ("amp;", '&'),
    ("lt;", '<'),
    ("gt;", '>'),
    ("quot;", '"'),
    ("apos;", '\''),
    ("nbsp;", '\u{00A0}'),
];

// 0x10FFFF / 1114111
const MAX_HEX_DIGITS: usize = 6;
const MAX_DEC_DIGITS: usize = 7;

pub(crate) fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return s.to_string();
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;
    while i < bytes.len() {
        if bytes[i] != b'&' {
            let next = memchr(b'&', &bytes[i..]).map_or(bytes.len(), |rel| i + rel);
            out.push_str(&s[i..next]);
            i = next;
            continue;
        }
        match decode_reference(&s[i + 1..]) {
            Some((ch, consumed)) => {
                out.push(ch);
                i += 1 + consumed;
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
    }
    out
}

/// Decode one reference starting right after `&`; returns the char and the bytes consumed.
fn decode_reference(rest: &str) -> Option<(char, usize)> {
    if let Some(numeric) = rest.strip_prefix('#') {
        let (digits, radix, max, prefix) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, MAX_HEX_DIGITS, 2),
            None => (numeric, 10, MAX_DEC_DIGITS, 1),
        };
        let len = digits
            .bytes()
            .take(max + 1)
            .take_while(|b| b.is_ascii_hexdigit() && (radix == 16 || b.is_ascii_digit()))
            .count();
        if len == 0 || len > max || digits.as_bytes().get(len) != Some(&b';') {
            return None;
        }
        let value = u32::from_str_radix(&digits[..len], radix).ok()?;
        let ch = char::from_u32(value)?;
        return Some((ch, prefix + len + 1));
    }
    NAMED
        .iter()
        .find(|(name, _)| rest.starts_with(name))
        .map(|(name, ch)| (*ch, name.len()))
}

pub(crate) fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}
