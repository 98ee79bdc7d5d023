//! Tokens borrow the input bytes they were read from.

use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    StartTag(Tag<'a>),
    EndTag(Tag<'a>),
    SelfClosingTag(Tag<'a>),
    Text(&'a [u8]),
    /// Comments, doctypes and processing instructions.
    Other(&'a [u8]),
}

impl<'a> Token<'a> {
    pub fn raw(&self) -> &'a [u8] {
        match self {
            Token::StartTag(tag) | Token::EndTag(tag) | Token::SelfClosingTag(tag) => tag.raw,
            Token::Text(raw) | Token::Other(raw) => *raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// ASCII-lowercased tag name.
    pub name: Cow<'a, str>,
    pub attributes: Vec<Attribute<'a>>,
    pub raw: &'a [u8],
}

impl Tag<'_> {
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Prefix of a `prefix:key` attribute name, empty for plain HTML attributes.
    pub namespace: Cow<'a, str>,
    pub key: Cow<'a, str>,
    /// Value with character references decoded; empty for valueless attributes.
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    pub fn plain(key: &'a str, value: &'a str) -> Self {
        Self {
            namespace: Cow::Borrowed(""),
            key: Cow::Borrowed(key),
            value: Cow::Borrowed(value),
        }
    }

    pub fn is_plain(&self, key: &str) -> bool {
        self.namespace.is_empty() && self.key == key
    }
}
