//! Permissive HTML tokenizer that keeps each token's raw bytes. An unterminated tag or
//! comment ends the stream.

use std::borrow::Cow;

use memchr::{memchr, memmem};

use crate::token::{Attribute, Tag, Token};

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &[u8] = b"-->";
const EMPTY_COMMENTS: &[&[u8]] = &[b"<!-->", b"<!--->"];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script",
    "style",
    "textarea",
    "title",
    "noscript",
    "noembed",
    "noframes",
    "iframe",
    "xmp",
    "plaintext",
];
// Never closed: its body runs to the end of input.
const PLAINTEXT: &str = "plaintext";

pub struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    raw_text_element: Option<&'static str>,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            raw_text_element: None,
            done: false,
        }
    }

    fn text(&mut self) -> Token<'a> {
        let input = self.input;
        let start = self.pos;
        let mut i = start + 1;
        let end = loop {
            match memchr(b'<', &input[i.min(input.len())..]) {
                Some(rel) if starts_markup(input, i + rel) => break i + rel,
                Some(rel) => i += rel + 1,
                None => break input.len(),
            }
        };
        self.pos = end;
        Token::Text(&input[start..end])
    }

    fn raw_text(&mut self, element: &str) -> Option<Token<'a>> {
        let input = self.input;
        let rest = &input[self.pos..];
        let len = if element == PLAINTEXT {
            rest.len()
        } else {
            find_raw_text_end(rest, element.as_bytes()).unwrap_or(rest.len())
        };
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(Token::Text(&rest[..len]))
    }

    fn markup(&mut self) -> Option<Token<'a>> {
        let input = self.input;
        let start = self.pos;
        let rest = &input[start..];

        if let Some(empty) = EMPTY_COMMENTS.iter().find(|empty| rest.starts_with(empty)) {
            self.pos += empty.len();
            return Some(Token::Other(&rest[..empty.len()]));
        }
        if rest.starts_with(COMMENT_START) {
            let end = memmem::find(&rest[COMMENT_START.len()..], COMMENT_END)?
                + COMMENT_START.len()
                + COMMENT_END.len();
            self.pos += end;
            return Some(Token::Other(&rest[..end]));
        }

        match rest[1] {
            b'/' if rest[2].is_ascii_alphabetic() => {
                let (tag, end) = parse_tag(input, start, start + 2)?;
                self.pos = end;
                Some(Token::EndTag(tag))
            }
            b'!' | b'?' | b'/' => {
                let end = memchr(b'>', &rest[2..])? + 3;
                self.pos += end;
                Some(Token::Other(&rest[..end]))
            }
            _ => {
                let (tag, end) = parse_tag(input, start, start + 1)?;
                self.pos = end;
                if tag_closes_itself(&input[start..end]) {
                    return Some(Token::SelfClosingTag(tag));
                }
                self.raw_text_element = RAW_TEXT_ELEMENTS
                    .iter()
                    .copied()
                    .find(|element| tag.is(element));
                Some(Token::StartTag(tag))
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.done {
            return None;
        }
        if let Some(element) = self.raw_text_element.take() {
            if let Some(text) = self.raw_text(element) {
                return Some(text);
            }
        }
        if self.pos >= self.input.len() {
            self.done = true;
            return None;
        }

        let token = if starts_markup(self.input, self.pos) {
            self.markup()
        } else {
            Some(self.text())
        };
        if token.is_none() {
            self.done = true;
        }
        token
    }
}

/// Whether a `<` at `at` opens a tag, comment, doctype or processing instruction.
fn starts_markup(input: &[u8], at: usize) -> bool {
    if input.get(at) != Some(&b'<') {
        return false;
    }
    match input.get(at + 1) {
        Some(b'!' | b'?') => true,
        Some(b'/') => input.get(at + 2).is_some(),
        Some(next) => next.is_ascii_alphabetic(),
        None => false,
    }
}

fn tag_closes_itself(raw: &[u8]) -> bool {
    raw.ends_with(b"/>")
}

/// Parses the tag starting at `start` whose name begins at `name_start`. Returns the tag
/// and the offset just past its closing `>`, or `None` if the input ends first.
fn parse_tag(input: &[u8], start: usize, name_start: usize) -> Option<(Tag<'_>, usize)> {
    let len = input.len();
    let mut i = name_start;
    while i < len && !is_tag_name_end(input[i]) {
        i += 1;
    }
    let name = lowercase(&input[name_start..i]);
    let mut attributes = Vec::new();

    loop {
        while i < len && input[i].is_ascii_whitespace() {
            i += 1;
        }
        match *input.get(i)? {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                if input.get(i + 1) == Some(&b'>') {
                    i += 2;
                    break;
                }
                i += 1;
                continue;
            }
            _ => {}
        }

        let key_start = i;
        // A leading '=' belongs to the attribute name.
        i += 1;
        while i < len && !is_attribute_name_end(input[i]) {
            i += 1;
        }
        let key = &input[key_start..i];
        while i < len && input[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value: &[u8] = b"";
        if input.get(i) == Some(&b'=') {
            i += 1;
            while i < len && input[i].is_ascii_whitespace() {
                i += 1;
            }
            match *input.get(i)? {
                quote @ (b'"' | b'\'') => {
                    let close = memchr(quote, &input[i + 1..])?;
                    value = &input[i + 1..i + 1 + close];
                    i += close + 2;
                }
                b'>' => {}
                _ => {
                    let value_start = i;
                    while i < len && !input[i].is_ascii_whitespace() && input[i] != b'>' {
                        i += 1;
                    }
                    value = &input[value_start..i];
                }
            }
        }
        attributes.push(attribute(key, value));
    }

    let tag = Tag {
        name,
        attributes,
        raw: &input[start..i],
    };
    Some((tag, i))
}

fn is_tag_name_end(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'/' || byte == b'>'
}

fn is_attribute_name_end(byte: u8) -> bool {
    is_tag_name_end(byte) || byte == b'='
}

/// Finds the offset of the `</element` that closes a raw text body.
fn find_raw_text_end(haystack: &[u8], element: &[u8]) -> Option<usize> {
    let mut i = 0;
    while let Some(rel) = memchr(b'<', &haystack[i..]) {
        i += rel;
        let name_start = i + 2;
        let name_end = name_start + element.len();
        if haystack.get(i + 1) == Some(&b'/')
            && haystack.len() > name_end
            && haystack[name_start..name_end].eq_ignore_ascii_case(element)
            && is_tag_name_end(haystack[name_end])
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn lowercase(bytes: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(bytes);
    if text.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(text.to_ascii_lowercase())
    } else {
        text
    }
}

fn attribute<'a>(key: &'a [u8], value: &'a [u8]) -> Attribute<'a> {
    let (namespace, key) = split_namespace(lowercase(key));
    Attribute {
        namespace,
        key,
        value: decode_value(value),
    }
}

fn split_namespace(key: Cow<'_, str>) -> (Cow<'_, str>, Cow<'_, str>) {
    match key.find(':') {
        Some(colon) if colon > 0 && colon + 1 < key.len() => match key {
            Cow::Borrowed(key) => (Cow::Borrowed(&key[..colon]), Cow::Borrowed(&key[colon + 1..])),
            Cow::Owned(key) => (
                Cow::Owned(key[..colon].to_owned()),
                Cow::Owned(key[colon + 1..].to_owned()),
            ),
        },
        _ => (Cow::Borrowed(""), key),
    }
}

fn decode_value(bytes: &[u8]) -> Cow<'_, str> {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => html_escape::decode_html_entities(text),
        Cow::Owned(text) => Cow::Owned(html_escape::decode_html_entities(&text).into_owned()),
    }
}
