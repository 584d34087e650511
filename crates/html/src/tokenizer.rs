//! Simplified HTML tokenizer with a constrained, practical tag-name character set.
//!
//! Supported tag-name and attribute-name characters (ASCII only): `[A-Za-z0-9:_-]`.
//! Names are lowercased. The tokenizer never fails: a `<` that does not start a
//! recognizable construct is skipped, and unterminated comments/rawtext run to the end
//! of input.
//!
//! Known limitations:
//! - Not a full HTML5 tokenizer state machine (no WHATWG parse-error recovery).
//! - Rawtext close-tag scanning accepts only ASCII whitespace before `>`.
//! - Only `script` and `style` switch to rawtext; `textarea`/`title` are tokenized normally.
use crate::entities::decode_entities;
use crate::types::{Token, is_rawtext_element};
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack
        .get(start..start + needle.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(needle))
}

/// Find `</name` followed by optional ASCII whitespace and `>`; returns (start, end) offsets.
fn find_rawtext_close_tag(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        if bytes.get(i + 1) == Some(&b'/')
            && starts_with_ignore_ascii_case_at(bytes, i + 2, name.as_bytes())
        {
            let mut k = i + 2 + name.len();
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if bytes.get(k) == Some(&b'>') {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Cursor over the input; every slice boundary it produces sits on an ASCII byte, so
/// all offsets stay on UTF-8 char boundaries.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    out: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: Vec::new(),
        }
    }

    pub fn run(mut self) -> Vec<Token> {
        while self.pos < self.input.len() {
            if self.bytes()[self.pos] != b'<' {
                self.text();
            } else if self.rest().starts_with(COMMENT_START) {
                self.comment();
            } else if starts_with_ignore_ascii_case_at(self.bytes(), self.pos, b"<!doctype") {
                if !self.doctype() {
                    break;
                }
            } else if self.bytes().get(self.pos + 1) == Some(&b'/') {
                self.end_tag();
            } else if self.bytes().get(self.pos + 1).copied().is_some_and(is_name_byte) {
                if !self.start_tag() {
                    break;
                }
            } else if matches!(self.bytes().get(self.pos + 1), Some(b'!' | b'?')) {
                self.bogus_comment();
            } else {
                // Stray `<`: keep it as text, like the platform parser does.
                self.push_text("<".to_string());
                self.pos += 1;
            }
        }
        self.out
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn push_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(Token::Text(prev)) = self.out.last_mut() {
            prev.push_str(&text);
        } else {
            self.out.push(Token::Text(text));
        }
    }

    fn text(&mut self) {
        let start = self.pos;
        let end = memchr(b'<', &self.bytes()[start..]).map_or(self.input.len(), |rel| start + rel);
        debug_assert!(self.input.is_char_boundary(end));
        let decoded = decode_entities(&self.input[start..end]);
        self.push_text(decoded);
        self.pos = end;
    }

    fn comment(&mut self) {
        let body_start = self.pos + COMMENT_START.len();
        match self.input[body_start..].find(COMMENT_END) {
            Some(rel) => {
                let body = &self.input[body_start..body_start + rel];
                self.out.push(Token::Comment(body.to_string()));
                self.pos = body_start + rel + COMMENT_END.len();
            }
            None => {
                self.out
                    .push(Token::Comment(self.input[body_start..].to_string()));
                self.pos = self.input.len();
            }
        }
    }

    // `<!x>` and `<?x>` are comments with everything up to the next `>` as body;
    // the `!` is dropped, the `?` kept.
    fn bogus_comment(&mut self) {
        let body_start = if self.bytes()[self.pos + 1] == b'!' {
            self.pos + 2
        } else {
            self.pos + 1
        };
        let end = memchr(b'>', &self.bytes()[body_start..])
            .map_or(self.input.len(), |rel| body_start + rel);
        self.out
            .push(Token::Comment(self.input[body_start..end].to_string()));
        self.pos = (end + 1).min(self.input.len());
    }

    fn doctype(&mut self) -> bool {
        let rest = &self.input[self.pos + 2..];
        let Some(end) = rest.find('>') else {
            return false;
        };
        self.out.push(Token::Doctype(rest[..end].trim().to_string()));
        self.pos += 2 + end + 1;
        true
    }

    fn scan_name(&self, start: usize) -> usize {
        let bytes = self.bytes();
        let mut j = start;
        while j < bytes.len() && is_name_byte(bytes[j]) {
            j += 1;
        }
        j
    }

    fn skip_whitespace(&self, mut k: usize) -> usize {
        let bytes = self.bytes();
        while k < bytes.len() && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        k
    }

    fn end_tag(&mut self) {
        let start = self.pos + 2;
        let end = self.scan_name(start);
        let name = self.input[start..end].to_ascii_lowercase();
        let close = memchr(b'>', &self.bytes()[end..]).map_or(self.input.len(), |rel| end + rel + 1);
        if !name.is_empty() {
            self.out.push(Token::EndTag(name));
        }
        self.pos = close;
    }

    /// Returns `false` when the rest of the input was consumed as rawtext.
    fn start_tag(&mut self) -> bool {
        let bytes = self.bytes();
        let len = bytes.len();
        let name_end = self.scan_name(self.pos + 1);
        let name = self.input[self.pos + 1..name_end].to_ascii_lowercase();
        let mut attributes: Vec<(String, Option<String>)> = Vec::new();
        let mut self_closing = false;
        let mut k = name_end;

        loop {
            k = self.skip_whitespace(k);
            if k >= len {
                break;
            }
            match bytes[k] {
                b'>' => {
                    k += 1;
                    break;
                }
                b'/' if bytes.get(k + 1) == Some(&b'>') => {
                    self_closing = true;
                    k += 2;
                    break;
                }
                _ => {}
            }
            let attr_start = k;
            k = self.scan_name(k);
            if attr_start == k {
                k += 1;
                continue;
            }
            let attr_name = self.input[attr_start..k].to_ascii_lowercase();
            k = self.skip_whitespace(k);
            let value = if bytes.get(k) == Some(&b'=') {
                k = self.skip_whitespace(k + 1);
                let (value, next) = self.attribute_value(k);
                k = next;
                Some(value)
            } else {
                None
            };
            if !attributes.iter().any(|(existing, _)| *existing == attr_name) {
                attributes.push((attr_name, value));
            }
        }

        let rawtext = is_rawtext_element(&name) && !self_closing;
        self.out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });
        self.pos = k;

        if !rawtext {
            return true;
        }
        let body = &self.input[k..];
        match find_rawtext_close_tag(body, &name) {
            Some((close_start, close_end)) => {
                if close_start > 0 {
                    self.out.push(Token::Text(body[..close_start].to_string()));
                }
                self.out.push(Token::EndTag(name));
                self.pos = k + close_end;
                true
            }
            None => {
                if !body.is_empty() {
                    self.out.push(Token::Text(body.to_string()));
                }
                self.out.push(Token::EndTag(name));
                self.pos = self.input.len();
                false
            }
        }
    }

    fn attribute_value(&self, start: usize) -> (String, usize) {
        let bytes = self.bytes();
        let len = bytes.len();
        let mut k = start;
        if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
            let quote = bytes[k];
            k += 1;
            let value_start = k;
            k = memchr(quote, &bytes[k..]).map_or(len, |rel| k + rel);
            let value = decode_entities(&self.input[value_start..k]);
            return (value, (k + 1).min(len));
        }
        while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
            if bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>') {
                break;
            }
            k += 1;
        }
        (decode_entities(&self.input[start..k]), k)
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attributes: &[(&str, Option<&str>)], self_closing: bool) -> Token {
        Token::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect(),
            self_closing,
        }
    }

    #[test]
    fn tokenize_preserves_utf8_text_nodes() {
        let tokens = tokenize("<p>120×32</p>");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t, Token::Text(s) if s == "120×32")),
            "expected UTF-8 text token, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_handles_mixed_case_doctype() {
        let tokens = tokenize("<!DoCtYpE html>");
        assert_eq!(tokens, vec![Token::Doctype("DoCtYpE html".to_string())]);
    }

    #[test]
    fn tokenize_lowercases_names_and_reads_all_attribute_forms() {
        let tokens = tokenize("<DiV ID=one data-x='a b' hidden title=\"&amp;\"></DIV>");
        assert_eq!(
            tokens,
            vec![
                start(
                    "div",
                    &[
                        ("id", Some("one")),
                        ("data-x", Some("a b")),
                        ("hidden", None),
                        ("title", Some("&")),
                    ],
                    false
                ),
                Token::EndTag("div".to_string()),
            ]
        );
    }

    #[test]
    fn tokenize_reports_self_closing_syntax() {
        let tokens = tokenize("<div foo='x'/><br/><img src=a.png/>");
        assert_eq!(
            tokens,
            vec![
                start("div", &[("foo", Some("x"))], true),
                start("br", &[], true),
                start("img", &[("src", Some("a.png"))], true),
            ]
        );
    }

    #[test]
    fn tokenize_keeps_first_duplicate_attribute() {
        let tokens = tokenize("<a href=1 HREF=2>");
        assert_eq!(tokens, vec![start("a", &[("href", Some("1"))], false)]);
    }

    #[test]
    fn tokenize_finds_script_end_tag_case_insensitive() {
        let tokens = tokenize("<script>if (a < b) {}</ScRiPt >x");
        assert_eq!(
            tokens,
            vec![
                start("script", &[], false),
                Token::Text("if (a < b) {}".to_string()),
                Token::EndTag("script".to_string()),
                Token::Text("x".to_string()),
            ]
        );
    }

    #[test]
    fn rawtext_close_tag_does_not_accept_near_matches() {
        let tokens = tokenize("<style>ok</stylex >no</style>");
        assert_eq!(
            tokens,
            vec![
                start("style", &[], false),
                Token::Text("ok</stylex >no".to_string()),
                Token::EndTag("style".to_string()),
            ]
        );
    }

    #[test]
    fn tokenize_handles_rawtext_without_close_tag() {
        let tokens = tokenize("<script>x<y>");
        assert_eq!(
            tokens,
            vec![
                start("script", &[], false),
                Token::Text("x<y>".to_string()),
                Token::EndTag("script".to_string()),
            ]
        );
    }

    #[test]
    fn tokenize_reads_comments_including_unterminated() {
        let tokens = tokenize("<!-- a --><!--b");
        assert_eq!(
            tokens,
            vec![
                Token::Comment(" a ".to_string()),
                Token::Comment("b".to_string()),
            ]
        );
    }

    #[test]
    fn markup_declarations_and_processing_instructions_become_comments() {
        let tokens = tokenize("<!x>a<?xml v?><!unterminated");
        assert_eq!(
            tokens,
            vec![
                Token::Comment("x".to_string()),
                Token::Text("a".to_string()),
                Token::Comment("?xml v?".to_string()),
                Token::Comment("unterminated".to_string()),
            ]
        );
    }

    #[test]
    fn stray_angle_brackets_become_text() {
        let tokens = tokenize("a < b <> c");
        assert_eq!(tokens, vec![Token::Text("a < b <> c".to_string())]);
    }

    #[test]
    fn tokenize_allows_custom_element_and_namespaced_tags() {
        let tokens = tokenize("<my-component></my-component><svg:rect/>");
        assert_eq!(
            tokens,
            vec![
                start("my-component", &[], false),
                Token::EndTag("my-component".to_string()),
                start("svg:rect", &[], true),
            ]
        );
    }

    #[test]
    fn tokenize_handles_tons_of_angle_brackets() {
        let input = "<".repeat(200_000);
        let tokens = tokenize(&input);
        assert_eq!(tokens, vec![Token::Text(input)]);
    }

    #[test]
    fn tokenize_handles_many_simple_tags_linearly() {
        let input = "<a></a>".repeat(20_000);
        assert_eq!(tokenize(&input).len(), 40_000);
    }
}
