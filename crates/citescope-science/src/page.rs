use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScienceError};
use crate::http::HttpClient;
use crate::identifiers::{ExtractedIdentifiers, extract_identifiers};

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "caption", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Readable text of a page plus the targets of its links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    pub text: String,
    pub hrefs: Vec<String>,
}

impl PageContent {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hrefs: Vec::new(),
        }
    }

    pub fn from_html(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let body_selector = parse_selector("body")?;
        let link_selector = parse_selector("a[href]")?;

        let root = document
            .select(&body_selector)
            .next()
            .unwrap_or_else(|| document.root_element());

        let hrefs = document
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .map(ToOwned::to_owned)
            .collect();

        Ok(Self {
            text: visible_text(root),
            hrefs,
        })
    }

    pub async fn fetch(client: &HttpClient, url: &str) -> Result<Self> {
        let html = client.get_text(url, Some("text/html")).await?;
        Self::from_html(&html)
    }

    pub fn identifiers(&self) -> ExtractedIdentifiers {
        extract_identifiers(&self.text, &self.hrefs)
    }
}

fn parse_selector(input: &str) -> Result<Selector> {
    Selector::parse(input).map_err(|e| ScienceError::Parse(format!("invalid selector {input}: {e}")))
}

/// Approximates `innerText`: inline text runs together, block elements and
/// `<br>` start a new line, whitespace inside a line collapses to one space.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(root, &mut raw);
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.extend(text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();
        if HIDDEN_TAGS.contains(&name) {
            continue;
        }
        if name == "br" {
            out.push('\n');
            continue;
        }
        let block = BLOCK_TAGS.contains(&name);
        if block {
            out.push('\n');
        }
        collect_text(child, out);
        if block {
            out.push('\n');
        }
    }
}
