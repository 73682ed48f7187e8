// src/checker/html.rs
// =============================================================================
// This module extracts image references and crawlable links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), so broken markup is fine
//
// Images come from three places:
// 1. <img src="...">
// 2. srcset="a.png 1x, b.png 2x" on <img> and <source>
// 3. CSS: background / background-image url(...) in style="" attributes
//    and in <style> blocks
//
// Which elements, attributes and CSS properties count is plain data (the
// tables below), so new cases are a one-line change.
// =============================================================================

use super::resolve::resolve;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

// How to read the value of a matched attribute (or element text)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// The value is one URL reference
    Reference,
    /// Comma-separated candidates, each "url [descriptor]"
    SrcSet,
    /// CSS declarations ("a: b; c: d") or a whole stylesheet
    Css,
}

// One place where images can hide
#[derive(Debug, Clone, Copy)]
pub struct ImageRule {
    /// CSS selector for the elements to look at
    pub selector: &'static str,
    /// Attribute to read; None means the element's text content
    pub attribute: Option<&'static str>,
    pub kind: ValueKind,
}

pub const IMAGE_RULES: &[ImageRule] = &[
    ImageRule { selector: "img[src]", attribute: Some("src"), kind: ValueKind::Reference },
    ImageRule { selector: "[srcset]", attribute: Some("srcset"), kind: ValueKind::SrcSet },
    ImageRule { selector: "[style]", attribute: Some("style"), kind: ValueKind::Css },
    ImageRule { selector: "style", attribute: None, kind: ValueKind::Css },
];

// CSS properties whose url(...) values are images
pub const CSS_IMAGE_PROPERTIES: &[&str] = &["background", "background-image"];

// Links to these are assets, not pages, and never enter the crawl frontier
pub const NON_PAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "pdf", "css", "js", "ico", "woff", "woff2",
    "ttf", "eot",
];

// Everything one page refers to
//
// Both lists are free of duplicates and keep document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub images: Vec<Url>,
    pub links: Vec<Url>,
}

// A Vec that refuses duplicates
#[derive(Default)]
struct OrderedSet {
    items: Vec<Url>,
    seen: HashSet<Url>,
}

impl OrderedSet {
    fn insert(&mut self, url: Url) {
        if self.seen.insert(url.clone()) {
            self.items.push(url);
        }
    }
}

// Extracts images and same-host page links from one HTML document
//
// Parameters:
//   html: the page body
//   page_url: where the page lives (relative references resolve against it)
//   site: the crawl's base URL (decides which links stay on the site)
pub fn extract(html: &str, page_url: &Url, site: &Url) -> Extracted {
    let document = Html::parse_document(html);

    Extracted {
        images: extract_images(&document, page_url),
        links: extract_links(&document, page_url, site),
    }
}

fn extract_images(document: &Html, page_url: &Url) -> Vec<Url> {
    let mut images = OrderedSet::default();

    for rule in IMAGE_RULES {
        // The selectors are constants from the table above
        let selector = Selector::parse(rule.selector).expect("image rule selector");

        for element in document.select(&selector) {
            let value = match rule.attribute {
                Some(attribute) => match element.value().attr(attribute) {
                    Some(value) => value.to_string(),
                    None => continue,
                },
                None => element.text().collect::<String>(),
            };

            for reference in references(rule.kind, &value) {
                if let Some(url) = resolve(&reference, page_url) {
                    images.insert(url);
                }
            }
        }
    }

    images.items
}

fn extract_links(document: &Html, page_url: &Url, site: &Url) -> Vec<Url> {
    let mut links = OrderedSet::default();
    let selector = Selector::parse("a[href]").expect("anchor selector");

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        // resolve() already drops the fragment
        let Some(url) = resolve(href, page_url) else {
            continue;
        };
        if is_crawlable(&url, site) {
            links.insert(url);
        }
    }

    links.items
}

// Raw references inside one attribute/element value
fn references(kind: ValueKind, value: &str) -> Vec<String> {
    match kind {
        ValueKind::Reference => vec![value.to_string()],
        ValueKind::SrcSet => srcset_urls(value),
        ValueKind::Css => css_image_urls(value),
    }
}

// Splits a srcset into its candidate URLs, ignoring "2x" / "640w" descriptors
//
// A candidate URL runs up to the next whitespace, so the comma inside
// "data:image/png;base64,AAAA 1x" does not start a new candidate.
fn srcset_urls(srcset: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut rest = srcset;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (candidate, after) = rest.split_at(end);
        let url = candidate.trim_end_matches(',');
        if !url.is_empty() {
            urls.push(url.to_string());
        }

        rest = if candidate.ends_with(',') {
            after
        } else {
            // Skip the descriptor up to the next candidate
            after.find(',').map_or("", |comma| &after[comma + 1..])
        };
    }

    urls
}

// Finds url(...) arguments of image-carrying CSS declarations
//
// Works on a style attribute ("background: url(a.png); color: red") and on a
// whole stylesheet ("div { background-image: url(b.png) }") alike: selectors
// and braces just end up in text we skip.
fn css_image_urls(css: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let css = strip_css_comments(css);

    for declaration in css_declarations(&css) {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        if CSS_IMAGE_PROPERTIES.contains(&property.as_str()) {
            urls.extend(url_arguments(value));
        }
    }

    urls
}

// Replaces /* ... */ comments outside of quotes with a space
//
// "/* hero */ background: url(a.png)" must still read as a background
// declaration. An unterminated comment runs to the end of the text.
fn strip_css_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut quote: Option<char> = None;
    let mut chars = css.chars().peekable();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                out.push(ch);
            }
            None if ch == '/' && chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for inner in chars.by_ref() {
                    if previous == '*' && inner == '/' {
                        break;
                    }
                    previous = inner;
                }
                out.push(' ');
            }
            None => {
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                }
                out.push(ch);
            }
        }
    }

    out
}

// Splits CSS text on ; { } outside of quotes and parentheses
//
// A naive split(';') would cut url("data:image/png;base64,...") in half.
fn css_declarations(css: &str) -> Vec<&str> {
    let mut declarations = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in css.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';' | '{' | '}') if depth == 0 => {
                declarations.push(&css[start..i]);
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    declarations.push(&css[start..]);

    declarations
}

// Every url(...) argument in a CSS value, quotes removed
fn url_arguments(value: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let lower = value.to_ascii_lowercase();
    let mut rest = 0;

    while let Some(offset) = lower[rest..].find("url(") {
        let open = rest + offset + "url(".len();
        let close = value[open..].find(')').map_or(value.len(), |end| open + end);
        let argument = value[open..close].trim().trim_matches(|c| c == '"' || c == '\'');
        if !argument.is_empty() {
            urls.push(argument.to_string());
        }
        rest = close;
    }

    urls
}

// A link is worth crawling if it is http(s), on the site's host, and not an
// obvious static asset
fn is_crawlable(url: &Url, site: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some()
        && url.host_str() == site.host_str()
        && !has_asset_extension(url)
}

fn has_asset_extension(url: &Url) -> bool {
    let Some(last_segment) = url.path_segments().and_then(|mut segments| segments.next_back())
    else {
        return false;
    };
    let Some((_, extension)) = last_segment.rsplit_once('.') else {
        return false;
    };
    let extension = extension.to_ascii_lowercase();
    NON_PAGE_EXTENSIONS.contains(&extension.as_str())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is `let ... else`?
//    - let Some(x) = maybe else { continue; };
//    - Binds x if the pattern matches, otherwise runs the else block
//    - The else block must leave the scope (return, continue, break)
//
// 2. Why char_indices() in css_declarations?
//    - It gives byte positions we can slice with, and never splits a
//      multi-byte character in half
//
// 3. Why &'static str in the rule tables?
//    - The tables are compiled into the binary; nothing is allocated
// -----------------------------------------------------------------------------
