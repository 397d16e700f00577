//! A small CSS selector subset for locating fill targets and templates.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`
//! (value bare or quoted), compounds of those, and the descendant (whitespace)
//! and child (`>`) combinators. Queries return matches in document order and
//! never look inside `<template>` content.

use std::fmt;
use std::str::FromStr;

use stencil_core::{dom, Handle};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at byte {position}")]
pub struct SelectorError {
    pub reason: String,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, element: &Handle) -> bool {
        let Some(name) = dom::local_name(element) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|tag| !tag.eq_ignore_ascii_case(name)) {
            return false;
        }
        if let Some(id) = &self.id {
            if dom::attribute(element, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class = dom::attribute(element, "class").unwrap_or_default();
            let present: Vec<&str> = class.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }
        self.attributes.iter().all(|(name, expected)| {
            match (dom::attribute(element, name), expected) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == *expected,
            }
        })
    }
}

/// A parsed selector. Steps run left to right; each step's combinator
/// relates it to the step before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    steps: Vec<(Combinator, Compound)>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser { input, pos: 0 };
        parser.skip_whitespace();
        let mut steps = vec![(Combinator::Descendant, parser.compound()?)];

        loop {
            let spaced = parser.skip_whitespace();
            match parser.peek() {
                None => break,
                Some('>') => {
                    parser.bump();
                    parser.skip_whitespace();
                    steps.push((Combinator::Child, parser.compound()?));
                }
                Some(_) if spaced => steps.push((Combinator::Descendant, parser.compound()?)),
                Some(c) => return Err(parser.error(format!("unexpected `{c}`"))),
            }
        }

        Ok(Self {
            source: input.trim().to_string(),
            steps,
        })
    }

    pub fn matches(&self, element: &Handle) -> bool {
        matches_steps(&self.steps, element)
    }

    /// First matching element under `root`, in document order.
    pub fn first(&self, root: &Handle) -> Option<Handle> {
        dom::elements(root).into_iter().find(|e| self.matches(e))
    }

    pub fn all(&self, root: &Handle) -> Vec<Handle> {
        dom::elements(root)
            .into_iter()
            .filter(|e| self.matches(e))
            .collect()
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// `Selector::parse(selector)?.first(root)`.
pub fn query(root: &Handle, selector: &str) -> Result<Option<Handle>, SelectorError> {
    Ok(Selector::parse(selector)?.first(root))
}

fn matches_steps(steps: &[(Combinator, Compound)], element: &Handle) -> bool {
    let Some(((combinator, compound), rest)) = steps.split_last() else {
        return true;
    };
    if !compound.matches(element) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match combinator {
        Combinator::Child => parent_element(element).is_some_and(|p| matches_steps(rest, &p)),
        Combinator::Descendant => {
            let mut ancestor = parent_element(element);
            while let Some(current) = ancestor {
                if matches_steps(rest, &current) {
                    return true;
                }
                ancestor = parent_element(&current);
            }
            false
        }
    }
}

fn parent_element(node: &Handle) -> Option<Handle> {
    dom::parent(node).filter(dom::is_element)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn error(&self, reason: impl Into<String>) -> SelectorError {
        SelectorError {
            reason: reason.into(),
            position: self.pos,
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut universal = false;
        match self.peek() {
            Some('*') => {
                self.bump();
                universal = true;
            }
            Some(c) if is_ident_char(c) => compound.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    let attribute = self.attribute()?;
                    compound.attributes.push(attribute);
                }
                _ => break,
            }
        }

        if !universal && compound == Compound::default() {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<(String, Option<String>), SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = if self.peek() == Some('=') {
            self.bump();
            self.skip_whitespace();
            Some(self.attribute_value()?)
        } else {
            None
        };
        self.skip_whitespace();
        if self.bump() != Some(']') {
            return Err(self.error("expected `]`"));
        }
        Ok((name, value))
    }

    fn attribute_value(&mut self) -> Result<String, SelectorError> {
        let Some(quote @ ('"' | '\'')) = self.peek() else {
            return self.ident();
        };
        self.bump();
        let start = self.pos;
        while let Some(c) = self.bump() {
            if c == quote {
                return Ok(self.input[start..self.pos - 1].to_string());
            }
        }
        Err(self.error("unterminated string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PAGE: &str = r#"
        <main id="app">
          <ul class="list primary"><li class="item">a</li><li class="item" data-x="1">b</li></ul>
          <section><div><p id="deep">d</p></div></section>
          <template id="tpl"><p id="inside">hidden</p></template>
        </main>"#;

    fn first_text(selector: &str) -> Option<String> {
        let doc = dom::parse_document(PAGE);
        query(&doc, selector)
            .expect("valid selector")
            .map(|e| dom::text_content(&e))
    }

    #[rstest]
    #[case("li", Some("a"))]
    #[case("LI.item", Some("a"))]
    #[case("li[data-x]", Some("b"))]
    #[case("li[data-x=\"1\"]", Some("b"))]
    #[case("li[data-x=1]", Some("b"))]
    #[case("ul.primary.list > li", Some("a"))]
    #[case("#app p", Some("d"))]
    #[case("section > p", None)]
    #[case("section  >  div > #deep", Some("d"))]
    #[case("#inside", None)]
    #[case("li[data-x='2']", None)]
    fn selector_cases(#[case] selector: &str, #[case] expected: Option<&str>) {
        assert_eq!(first_text(selector).as_deref(), expected);
    }

    #[test]
    fn universal_matches_first_element() {
        let doc = dom::parse_document("<p>x</p>");
        let found = query(&doc, "*").unwrap().unwrap();
        assert_eq!(dom::local_name(&found), Some("html"));
    }

    #[test]
    fn all_returns_document_order() {
        let doc = dom::parse_document(PAGE);
        let selector: Selector = ".item".parse().unwrap();
        let texts: Vec<_> = selector.all(&doc).iter().map(dom::text_content).collect();
        assert_eq!(texts, ["a", "b"]);
    }

    #[rstest]
    #[case("")]
    #[case("li >")]
    #[case("li[")]
    #[case("li[x='open]")]
    #[case("li, p")]
    #[case("#")]
    fn invalid_selectors(#[case] selector: &str) {
        assert!(Selector::parse(selector).is_err(), "{selector:?} should not parse");
    }
}
