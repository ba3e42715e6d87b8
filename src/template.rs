use std::collections::BTreeMap;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_until},
    combinator::{map, rest, verify},
    sequence::delimited,
};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::qr::QrTag;

/// A tag that can appear in a template as `{% name markup %}`.
pub trait Tag {
    fn render(&self, ctx: &Value) -> Result<String>;
}

impl Tag for QrTag {
    fn render(&self, ctx: &Value) -> Result<String> {
        QrTag::render(self, ctx)
    }
}

// Builds a tag from the text following its name.
pub type TagFactory = fn(&str) -> Box<dyn Tag>;

/// The set of tags a template may use. Populated once by whoever hosts
/// the templates, then shared read-only between renders.
#[derive(Default)]
pub struct Registry {
    tags: BTreeMap<String, TagFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("qr", |markup| Box::new(QrTag::new(markup)));
        registry
    }

    pub fn register(&mut self, name: &str, factory: TagFactory) {
        self.tags.insert(name.to_string(), factory);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    fn build(&self, name: &str, markup: &str) -> Result<Box<dyn Tag>> {
        self.tags
            .get(name)
            .map(|factory| factory(markup))
            .ok_or_else(|| Error::UnknownTag(name.to_string()))
    }
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Text(&'a str),
    Tag { name: &'a str, markup: &'a str },
}

/// A template split into literal text and tag invocations.
#[derive(Debug)]
pub struct Template<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> Template<'a> {
    pub fn parse(source: &'a str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut input = source;

        while !input.is_empty() {
            match segment(input) {
                Ok((remaining, parsed)) => {
                    segments.push(parsed);
                    input = remaining;
                }
                Err(_) => {
                    return Err(Error::Syntax {
                        offset: source.len() - input.len(),
                        message: "unterminated tag, expected '%}'".to_string(),
                    });
                }
            }
        }

        Ok(Template { segments })
    }

    // Nothing is returned unless every tag renders.
    pub fn render(&self, registry: &Registry, ctx: &Value) -> Result<String> {
        let mut output = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Tag { name, markup } => {
                    tracing::debug!("rendering tag '{}' with '{}'", name, markup);
                    let rendered = registry.build(name, markup)?.render(ctx)?;
                    output.push_str(&rendered);
                }
            }
        }

        Ok(output)
    }
}

// Either a tag or the text up to the next tag (or the end of input).
fn segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        tag_segment,
        map(
            verify(take_until("{%"), |s: &str| !s.is_empty()),
            Segment::Text,
        ),
        map(
            verify(rest, |s: &str| !s.is_empty() && !s.contains("{%")),
            Segment::Text,
        ),
    ))(input)
}

// Parse `{% name markup %}`. The markup is everything after the name.
fn tag_segment(input: &str) -> IResult<&str, Segment<'_>> {
    map(
        delimited(tag("{%"), take_until("%}"), tag("%}")),
        |inner: &str| {
            let inner = inner.trim();
            let (name, markup) = inner
                .split_once(char::is_whitespace)
                .unwrap_or((inner, ""));
            Segment::Tag { name, markup }
        },
    )(input)
}
