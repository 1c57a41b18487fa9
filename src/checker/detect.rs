// src/checker/detect.rs
// =============================================================================
// This module looks at ONE fetched page and finds exclusion directives.
//
// There are two places a page can say "don't index me":
// 1. The X-Robots-Tag response header (may appear several times!)
// 2. <meta name="robots" content="..."> or <meta name="googlebot" ...>
//
// We check both and return every piece of evidence we find (a "Finding").
//
// We use the `scraper` crate for the HTML part:
// - Parses HTML into a DOM
// - Lets us query it with CSS selectors ("meta")
//
// Pages are not always UTF-8. The body is decoded with `encoding_rs`, using
// the byte order mark, then the Content-Type charset, then a `chardetng`
// guess. Bytes that don't fit the encoding become U+FFFD, they never fail
// the check.
//
// Rust concepts:
// - Result<T, E> with early returns
// - Enums with data (FindingSource::MetaTag { name })
// - Borrowing: the detector only reads the headers and body
// =============================================================================

use super::error::CheckError;
use super::normalize::{directives, has_exclusion, normalize, Directive};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use scraper::{Html, Selector};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

// Meta tag names that carry crawler directives
const ROBOTS_META_NAMES: [&str; 2] = ["robots", "googlebot"];

// Where a finding came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingSource {
    /// The X-Robots-Tag response header
    Header,
    /// A <meta> tag, `name` is lower-cased and trimmed
    MetaTag { name: String },
}

impl fmt::Display for FindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingSource::Header => write!(f, "X-Robots-Tag"),
            FindingSource::MetaTag { name } => write!(f, "Meta {}", name),
        }
    }
}

// One piece of evidence that a page excludes itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub source: FindingSource,
    /// The value exactly as the server sent it
    pub raw_value: String,
    /// The value after normalize()
    pub normalized_value: String,
    /// Which of noindex / nofollow matched
    pub directives: Vec<Directive>,
}

impl Finding {
    // Builds a finding if `raw` carries noindex or nofollow
    //
    // Returns None when the value is clean.
    fn from_value(source: FindingSource, raw: &str) -> Option<Finding> {
        let normalized_value = normalize(raw);
        if !has_exclusion(&normalized_value) {
            return None;
        }
        Some(Finding {
            source,
            raw_value: raw.to_string(),
            directives: directives(&normalized_value),
            normalized_value,
        })
    }
}

// What the detector learned about a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Header findings first, then meta tags in document order
    pub findings: Vec<Finding>,
    /// False when the body was unusable but header evidence was kept
    pub html_parsed: bool,
}

// Inspects headers and body of one page
//
// Parameters:
//   header_values: every X-Robots-Tag value, in the order received
//   body: the raw body bytes, or the error that stopped us reading them
//   charset: the charset label from Content-Type, if the server sent one
//
// Returns:
//   Ok(Detection) when we could decide (possibly with zero findings)
//   Err(CheckError::Parse) when the body never arrived in full AND no header
//   said anything, so we have no evidence at all
pub fn detect(
    header_values: &[String],
    body: Result<&[u8], &CheckError>,
    charset: Option<&str>,
) -> Result<Detection, CheckError> {
    // Step 1: every header instance, not just the first one.
    // CDNs and proxies sometimes append a second X-Robots-Tag.
    let mut findings: Vec<Finding> = header_values
        .iter()
        .filter(|value| !value.trim().is_empty())
        .filter_map(|value| Finding::from_value(FindingSource::Header, value))
        .collect();

    // Step 2: the HTML document
    let document = match parse_html(body, charset) {
        Ok(document) => document,
        Err(error) => {
            // Header evidence stands on its own even without a usable document
            if !findings.is_empty() {
                tracing::debug!(%error, "body unusable, keeping header findings");
                return Ok(Detection {
                    findings,
                    html_parsed: false,
                });
            }
            return Err(error);
        }
    };

    // Step 3: meta tags, in document order
    findings.extend(scan_meta_tags(&document));

    Ok(Detection {
        findings,
        html_parsed: true,
    })
}

// Turns body bytes into a DOM
//
// html5ever never rejects markup (it repairs it like a browser does) and the
// decoder never rejects bytes, so the only way this fails is a body that
// never arrived in full.
fn parse_html(body: Result<&[u8], &CheckError>, charset: Option<&str>) -> Result<Html, CheckError> {
    let bytes = body.map_err(|e| CheckError::Parse(format!("body could not be read: {}", e)))?;
    Ok(Html::parse_document(&decode_body(bytes, charset)))
}

// Decodes body bytes to text, replacing anything malformed
//
// Order of trust: byte order mark, Content-Type charset, content sniffing.
// encoding_rs strips the byte order mark itself.
fn decode_body<'a>(bytes: &'a [u8], charset: Option<&str>) -> Cow<'a, str> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| charset.and_then(|label| Encoding::for_label(label.trim().as_bytes())))
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = used.name(), "body had malformed bytes, replaced");
    }
    text
}

// Collects findings from <meta name="robots|googlebot" content="...">
fn scan_meta_tags(document: &Html) -> Vec<Finding> {
    // This selector is a constant and known to be valid
    let selector = Selector::parse("meta").expect("'meta' is a valid selector");

    document
        .select(&selector)
        .filter_map(|element| {
            let name = element.value().attr("name")?.trim().to_lowercase();
            if !ROBOTS_META_NAMES.contains(&name.as_str()) {
                return None;
            }
            let content = element.value().attr("content").unwrap_or("");
            Finding::from_value(FindingSource::MetaTag { name }, content)
        })
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `Result<&[u8], &CheckError>` for the body?
//    - The fetcher may get the headers but fail halfway through the body
//    - We still want to look at the headers in that case
//    - So the detector receives "either the bytes or why we don't have them"
//
// 2. What does filter_map do?
//    - It's filter + map in one step
//    - Return Some(x) to keep x, None to drop the item
//
// 3. Why Cow<str> from decode_body?
//    - Cow = "clone on write": borrowed when the bytes were already UTF-8,
//      owned when encoding_rs had to build a new String
//    - Callers just see something that derefs to &str
//
// 4. What is the `?` inside the closure in scan_meta_tags?
//    - attr("name") returns Option<&str>
//    - Inside a closure that returns Option, `?` returns None early
//    - So tags without a name attribute are skipped
// -----------------------------------------------------------------------------
