use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// A scholarly article identifier found in a text block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Doi(String),
    Arxiv(String),
}

impl Identifier {
    /// The bare identifier without its kind prefix.
    pub fn value(&self) -> &str {
        match self {
            Identifier::Doi(v) | Identifier::Arxiv(v) => v,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Identifier::Doi(_) => "doi",
            Identifier::Arxiv(_) => "arxiv",
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix(), self.value())
    }
}

/// `doi`, an optional `:` or `/`, optional whitespace, then `prefix/suffix`.
static DOI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)doi[:/]?\s*(\d+\.\d+/[a-z0-9\-._;()/]+)").unwrap());

static DOI_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)doi\.org/(\d+\.\d+/[a-z0-9\-._;()/]+)").unwrap());

static ARXIV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)arxiv:(\d+\.\d+)").unwrap());

/// Glyph sequences produced by broken font encodings, and what they stand for.
pub const DEFAULT_MOJIBAKES: &[(&str, &str)] = &[("\u{e5}\u{2026}\u{be}", "/")];

/// Junk that sticks to the end of an identifier once inter-word spaces are lost.
pub const DEFAULT_GARBAGE_PATTERNS: &[&str] = &[
    r"\.$",
    r";publishedonline.*$",
    r"availableonlineathttp$",
];

static DEFAULT_GARBAGE: Lazy<Vec<Regex>> = Lazy::new(|| {
    DEFAULT_GARBAGE_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

static DEFAULT_EXTRACTOR: Lazy<IdentifierExtractor> = Lazy::new(IdentifierExtractor::default);

/// Find identifiers in `block` using the built-in tables.
pub fn extract_identifiers(block: &str) -> Identifiers<'static> {
    DEFAULT_EXTRACTOR.extract(block)
}

/// Repairs mis-decoded text and pulls DOI / arXiv identifiers out of it.
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    mojibakes: Vec<(String, String)>,
    garbage: Vec<Regex>,
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self {
            mojibakes: DEFAULT_MOJIBAKES
                .iter()
                .map(|(bad, good)| (bad.to_string(), good.to_string()))
                .collect(),
            garbage: DEFAULT_GARBAGE.clone(),
        }
    }
}

impl IdentifierExtractor {
    pub(crate) fn default_garbage() -> &'static [Regex] {
        &DEFAULT_GARBAGE
    }

    pub fn new(mojibakes: Vec<(String, String)>, garbage: Vec<Regex>) -> Self {
        Self { mojibakes, garbage }
    }

    /// Lazily yield every identifier in `block`.
    ///
    /// All plain DOI matches come first, then `doi.org/` URLs, then arXiv
    /// IDs; each pass runs left to right over the whole normalized block.
    /// The same identifier may be yielded by more than one pass.
    pub fn extract(&self, block: &str) -> Identifiers<'_> {
        Identifiers {
            extractor: self,
            text: self.normalize(block),
            pass: 0,
            pos: 0,
        }
    }

    /// Replace every known mojibake sequence with the text it stands for.
    pub fn normalize(&self, text: &str) -> String {
        let mut text = text.to_string();
        for (bad, good) in &self.mojibakes {
            if text.contains(bad.as_str()) {
                text = text.replace(bad.as_str(), good);
            }
        }
        text
    }

    /// Strip trailing garbage from a raw match.
    ///
    /// Each pattern is tried once, in order, against the result of the
    /// previous removals; only its first match is excised.
    pub fn cleanup(&self, raw: &str) -> String {
        let mut id = raw.to_string();
        for garbage in &self.garbage {
            let span = garbage.find(&id).map(|m| m.range());
            if let Some(span) = span {
                id.replace_range(span, "");
            }
        }
        id
    }
}

type Pass = (&'static Regex, fn(String) -> Identifier);

fn pass(index: usize) -> Option<Pass> {
    match index {
        0 => Some((&*DOI_RE, Identifier::Doi)),
        1 => Some((&*DOI_URL_RE, Identifier::Doi)),
        2 => Some((&*ARXIV_RE, Identifier::Arxiv)),
        _ => None,
    }
}

/// Iterator returned by [`IdentifierExtractor::extract`].
#[derive(Debug)]
pub struct Identifiers<'a> {
    extractor: &'a IdentifierExtractor,
    text: String,
    pass: usize,
    pos: usize,
}

impl Iterator for Identifiers<'_> {
    type Item = Identifier;

    fn next(&mut self) -> Option<Identifier> {
        while let Some((re, make)) = pass(self.pass) {
            if let Some(caps) = re.captures_at(&self.text, self.pos) {
                let end = caps.get(0).map_or(self.text.len(), |m| m.end());
                let raw = caps.get(1).map_or("", |m| m.as_str());
                let id = make(self.extractor.cleanup(raw));
                self.pos = end;
                return Some(id);
            }
            self.pass += 1;
            self.pos = 0;
        }
        None
    }
}
