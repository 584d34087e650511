use std::fmt;

// A single CSS property: "color: red"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

/// One simple selector inside a compound selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Universal,
    Type(String),  // element/tag selector, stored lowercase
    Id(String),    // #id selector
    Class(String), // .class selector
    Attribute {
        name: String,
        matcher: Option<(AttrOperator, String)>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrOperator {
    Equals,    // [a=v]
    Includes,  // [a~=v]
    DashMatch, // [a|=v]
    Prefix,    // [a^=v]
    Suffix,    // [a$=v]
    Substring, // [a*=v]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

/// Simple selectors that all have to match the same element, e.g. `div.note[title]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub parts: Vec<Selector>,
}

/// Compounds joined by combinators; `combinators[i]` sits between `compounds[i]` and
/// `compounds[i + 1]`, so the subject of the selector is the last compound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

// input: "ul > li.item, #main a[href^='http']"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorError {
    pub position: usize,
    pub message: String,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid selector at byte {}: {}", self.position, self.message)
    }
}

impl std::error::Error for SelectorError {}

pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let mut parser = SelectorParser { input, pos: 0 };
    let mut selectors = Vec::new();
    loop {
        parser.skip_whitespace();
        selectors.push(parser.complex()?);
        parser.skip_whitespace();
        match parser.peek() {
            Some(',') => parser.bump(),
            None => break,
            Some(c) => return Err(parser.error(format!("unexpected {c:?}"))),
        }
    }
    Ok(SelectorList { selectors })
}

struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

impl SelectorParser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, message: impl Into<String>) -> SelectorError {
        SelectorError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        let ident = &self.input[start..self.pos];
        let mut chars = ident.chars();
        let starts_badly = match chars.next() {
            None => true,
            Some(c) if c.is_ascii_digit() => true,
            Some('-') => chars.next().is_none_or(|c| c.is_ascii_digit()),
            Some(_) => false,
        };
        if starts_badly {
            self.pos = start;
            return Err(self.error("expected identifier"));
        }
        Ok(ident.to_string())
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(',') | None => break,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected {c:?}"))),
            };
            if combinator != Combinator::Descendant {
                self.bump();
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut parts = Vec::new();
        match self.peek() {
            Some('*') => {
                self.bump();
                parts.push(Selector::Universal);
            }
            Some(c) if is_ident_char(c) => {
                parts.push(Selector::Type(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    parts.push(Selector::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    parts.push(Selector::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    parts.push(self.attribute()?);
                }
                Some(':') => return Err(self.error("pseudo-classes are not supported")),
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(self.error("expected selector"));
        }
        Ok(CompoundSelector { parts })
    }

    fn attribute(&mut self) -> Result<Selector, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let operator = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(Selector::Attribute {
                    name,
                    matcher: None,
                });
            }
            Some('=') => AttrOperator::Equals,
            Some('~') => AttrOperator::Includes,
            Some('|') => AttrOperator::DashMatch,
            Some('^') => AttrOperator::Prefix,
            Some('$') => AttrOperator::Suffix,
            Some('*') => AttrOperator::Substring,
            _ => return Err(self.error("expected attribute operator or ']'")),
        };
        self.bump();
        if operator != AttrOperator::Equals {
            if self.peek() != Some('=') {
                return Err(self.error("expected '='"));
            }
            self.bump();
        }
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                let Some(len) = self.input[start..].find(quote) else {
                    return Err(self.error("unterminated string"));
                };
                self.pos = start + len + 1;
                self.input[start..start + len].to_string()
            }
            _ => self.ident()?,
        };
        self.skip_whitespace();
        if self.peek() != Some(']') {
            return Err(self.error("expected ']'"));
        }
        self.bump();
        Ok(Selector::Attribute {
            name,
            matcher: Some((operator, value)),
        })
    }
}

// input: "color: red; font-size: 12px;"
// output: vec![Declaration { name: "color", value: "red" }, Declaration { name: "font-size", value: "12px" }]
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    input
        .split(';')
        .filter_map(|pair| {
            let (n, v) = pair.split_once(':')?;
            let name = n.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            let value = v.trim().to_string();
            Some(Declaration { name, value })
        })
        .collect()
}

// inverse of parse_declarations: "color: red; font-size: 12px;"
pub fn serialize_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|d| format!("{}: {};", d.name, d.value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Set (or with `None`, remove) one property, keeping the position of an existing entry.
pub fn set_declaration(declarations: &mut Vec<Declaration>, name: &str, value: Option<&str>) {
    let name = name.trim().to_ascii_lowercase();
    match value {
        Some(value) => match declarations.iter_mut().find(|d| d.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => declarations.push(Declaration {
                name,
                value: value.to_string(),
            }),
        },
        None => declarations.retain(|d| d.name != name),
    }
}
