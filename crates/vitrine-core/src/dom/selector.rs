//! Simple CSS selector subset for the in-memory DOM.
//!
//! Grammar: selector lists (`,`) of descendant chains (whitespace) of
//! compounds built from `tag`, `*`, `#id`, `.class`, `[attr]` and
//! `[attr=value]` (value an ident or a quoted string). Tokens come from
//! `cssparser`; anything outside the subset fails to parse and matches
//! nothing.

use cssparser::{BasicParseErrorKind, ParseError, Parser, ParserInput, Token};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

/// What the matcher needs to know about an element.
pub(crate) trait Subject {
    fn tag(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
}

impl Compound {
    fn matches(&self, el: &dyn Subject) -> bool {
        if let Some(tag) = &self.tag
            && !tag.eq_ignore_ascii_case(el.tag())
        {
            return false;
        }
        if let Some(id) = &self.id
            && el.attr("id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match value {
            None => el.attr(name).is_some(),
            Some(v) => el.attr(name) == Some(v.as_str()),
        })
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList {
    chains: Vec<Vec<Compound>>,
}

impl SelectorList {
    pub(crate) fn parse(source: &str) -> Option<Self> {
        let mut input = ParserInput::new(source);
        let mut parser = Parser::new(&mut input);
        let chains = parser.parse_comma_separated(parse_chain).ok()?;
        Some(Self { chains })
    }

    /// Match `node` given its ancestor chain (nearest first).
    pub(crate) fn matches(&self, node: &dyn Subject, ancestors: &[&dyn Subject]) -> bool {
        self.chains.iter().any(|chain| {
            let Some((last, rest)) = chain.split_last() else {
                return false;
            };
            if !last.matches(node) {
                return false;
            }
            // Greedy right-to-left: each remaining compound must match some
            // strictly higher ancestor.
            let mut pending = rest.iter().rev().peekable();
            for ancestor in ancestors {
                match pending.peek() {
                    Some(compound) if compound.matches(*ancestor) => {
                        pending.next();
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            pending.peek().is_none()
        })
    }
}

type ParseResult<'i, T> = Result<T, ParseError<'i, ()>>;

/// One comma-separated item: compounds split by whitespace.
fn parse_chain<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Vec<Compound>> {
    let mut chain = Vec::new();
    let mut current: Option<Compound> = None;

    while let Ok(token) = parser.next_including_whitespace() {
        match token.clone() {
            Token::WhiteSpace(_) => chain.extend(current.take()),
            Token::Ident(tag) if current.is_none() => {
                current = Some(Compound {
                    tag: Some(tag.to_ascii_lowercase()),
                    ..Compound::default()
                });
            }
            Token::Delim('*') if current.is_none() => current = Some(Compound::default()),
            Token::IDHash(id) => {
                current.get_or_insert_with(Compound::default).id = Some(id.to_string());
            }
            Token::Delim('.') => {
                let class = match parser.next_including_whitespace()? {
                    Token::Ident(class) => class.to_string(),
                    other => {
                        let other = other.clone();
                        return Err(parser.new_unexpected_token_error(other));
                    }
                };
                current.get_or_insert_with(Compound::default).classes.push(class);
            }
            Token::SquareBracketBlock => {
                let attr = parser.parse_nested_block(parse_attribute)?;
                current.get_or_insert_with(Compound::default).attrs.push(attr);
            }
            other => return Err(parser.new_unexpected_token_error(other)),
        }
    }
    chain.extend(current);

    if chain.is_empty() {
        return Err(parser.new_error(BasicParseErrorKind::EndOfInput));
    }
    Ok(chain)
}

/// Body of `[...]`.
fn parse_attribute<'i>(block: &mut Parser<'i, '_>) -> ParseResult<'i, (String, Option<String>)> {
    let name = block.expect_ident()?.to_string();
    if block.is_exhausted() {
        return Ok((name, None));
    }
    block.expect_delim('=')?;
    let value = block.expect_ident_or_string()?.to_string();
    Ok((name, Some(value)))
}
