//! Markup sniffing: is a string a fragment, a bare single tag, or does it contain
//! self-closed non-void tags that need expanding before parsing.
//!
//! Every matcher returns its captures as a value; no match state is kept between calls.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

// `\w` is spelled out as ASCII so word characters agree with the tag name rules of the
// tokenizer.
static FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<([0-9A-Za-z_]+|!)[^>]*>").expect("fragment pattern is valid")
});

// The closing tag has to repeat the opening name; checked after matching.
static SINGLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([0-9A-Za-z_]+)\s*/?>(?:</([0-9A-Za-z_]+)>)?$")
        .expect("single tag pattern is valid")
});

static SELF_CLOSING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(([0-9A-Za-z_:]+)[^>]*)/>").expect("self-closing pattern is valid")
});

/// Tags the host parser already treats as void; a self-closed tag whose name starts with
/// one of these (ASCII case-insensitive) is left alone.
pub const VOID_PREFIXES: [&str; 10] = [
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
];

/// Leading tag of a markup string. `name` is `"!"` for comments and doctypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentStart<'a> {
    pub name: &'a str,
}

impl FragmentStart<'_> {
    pub fn is_comment(&self) -> bool {
        self.name == "!"
    }
}

/// Markup consisting of exactly one attribute-less, childless tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SingleTag<'a> {
    pub name: &'a str,
}

pub fn sniff_fragment(markup: &str) -> Option<FragmentStart<'_>> {
    let caps = FRAGMENT_RE.captures(markup)?;
    let name = caps.get(1)?.as_str();
    Some(FragmentStart { name })
}

pub fn match_single_tag(markup: &str) -> Option<SingleTag<'_>> {
    let caps = SINGLE_TAG_RE.captures(markup)?;
    let name = caps.get(1)?.as_str();
    match caps.get(2) {
        Some(close) if close.as_str() != name => None,
        _ => Some(SingleTag { name }),
    }
}

fn starts_with_void_name(rest: &str) -> bool {
    VOID_PREFIXES.iter().any(|prefix| {
        rest.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Rewrite `<tag attrs/>` to `<tag attrs></tag>` for every tag that is not void.
/// Returns the input untouched (borrowed) when nothing was rewritten.
pub fn expand_self_closing(markup: &str) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    let mut copied_to = 0;
    let mut search_from = 0;
    while let Some(caps) = SELF_CLOSING_RE.captures_at(markup, search_from) {
        let (Some(whole), Some(body), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            break;
        };
        if starts_with_void_name(body.as_str()) {
            // A later tag may still start inside this match.
            search_from = whole.start() + 1;
            continue;
        }
        let buf = out.get_or_insert_with(|| String::with_capacity(markup.len() + 16));
        buf.push_str(&markup[copied_to..whole.start()]);
        buf.push('<');
        buf.push_str(body.as_str());
        buf.push_str("></");
        buf.push_str(name.as_str());
        buf.push('>');
        copied_to = whole.end();
        search_from = whole.end();
    }
    match out {
        Some(mut buf) => {
            buf.push_str(&markup[copied_to..]);
            log::trace!(target: "query.fragment", "expanded self-closing tags: {buf:?}");
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(markup),
    }
}
