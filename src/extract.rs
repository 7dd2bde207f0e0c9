//! Reference extraction from parsed documents.

use scraper::Selector;

use crate::error::Error;
use crate::site::Document;
use crate::types::{Reference, ReferenceKind};

/// CSS selectors compiled once per run and shared by every check.
pub struct Selectors {
    /// `a[href]`
    pub anchor: Selector,
    /// `link[href]`
    pub link: Selector,
    /// `script`, inline or not.
    pub script: Selector,
    /// `script[src]`
    pub script_src: Selector,
    /// `[src]`
    pub source: Selector,
    /// `title`
    pub title: Selector,
}

impl Selectors {
    /// Compile every selector used for extraction.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSelector` if a selector fails to parse.
    pub fn new() -> Result<Self, Error> {
        return Ok(Self {
            anchor: compile("a[href]")?,
            link: compile("link[href]")?,
            script: compile("script")?,
            script_src: compile("script[src]")?,
            source: compile("[src]")?,
            title: compile("title")?,
        });
    }
}

/// Parse one selector, keeping the selector text in the error.
///
/// # Errors
///
/// Returns `Error::InvalidSelector` on parse failure.
fn compile(selector: &str) -> Result<Selector, Error> {
    return Selector::parse(selector).map_err(|e| {
        return Error::InvalidSelector {
            reason: format!("{e:?}"),
            selector: selector.to_string(),
        };
    });
}

/// Every reference in a document: anchor hrefs, then `src` attributes, then
/// `<link>` hrefs, each group in document order.
///
/// Lazy and side-effect free; call again to restart.
pub fn references<'a>(
    document: &'a Document,
    selectors: &'a Selectors,
) -> impl Iterator<Item = Reference> + 'a {
    let anchors = attribute_values(document, &selectors.anchor, "href", ReferenceKind::Anchor);
    let sources = attribute_values(document, &selectors.source, "src", ReferenceKind::Source);
    let links = attribute_values(document, &selectors.link, "href", ReferenceKind::Link);
    return anchors.chain(sources).chain(links);
}

/// Map each element matching `selector` to a reference built from `attr`.
fn attribute_values<'a>(
    document: &'a Document,
    selector: &'a Selector,
    attr: &'static str,
    kind: ReferenceKind,
) -> impl Iterator<Item = Reference> + 'a {
    return document.html.select(selector).filter_map(move |element| {
        let target = element.value().attr(attr)?;
        return Some(Reference {
            kind,
            source: document.path.clone(),
            target: target.to_string(),
        });
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use super::*;
    use crate::types::Scope;

    const PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Post</title>
  <link rel="stylesheet" href="/css/site.css">
  <script src="../../js/app.js"></script>
</head>
<body>
  <a href="/about/">About</a>
  <a href="#comments">Comments</a>
  <img src="../../img/logo.png">
  <img src="data:image/png;base64,AAAA">
  <a href="https://example.com/x">Elsewhere</a>
</body>
</html>"##;

    fn targets(document: &Document, selectors: &Selectors) -> Vec<(ReferenceKind, String)> {
        return references(document, selectors).map(|r| (r.kind, r.target)).collect();
    }

    #[test]
    fn extracts_in_group_then_document_order() {
        let selectors = Selectors::new().unwrap();
        let document = Document::parse("blog/post/index.html", PAGE.to_string());

        assert_eq!(
            targets(&document, &selectors),
            vec![
                (ReferenceKind::Anchor, "/about/".to_string()),
                (ReferenceKind::Anchor, "#comments".to_string()),
                (ReferenceKind::Anchor, "https://example.com/x".to_string()),
                (ReferenceKind::Source, "../../js/app.js".to_string()),
                (ReferenceKind::Source, "../../img/logo.png".to_string()),
                (ReferenceKind::Source, "data:image/png;base64,AAAA".to_string()),
                (ReferenceKind::Link, "/css/site.css".to_string()),
            ]
        );
    }

    #[test]
    fn sequence_is_restartable() {
        let selectors = Selectors::new().unwrap();
        let document = Document::parse("blog/post/index.html", PAGE.to_string());
        assert_eq!(targets(&document, &selectors), targets(&document, &selectors));
    }

    #[test]
    fn internal_references_exclude_fragments_urls_and_data() {
        let selectors = Selectors::new().unwrap();
        let document = Document::parse("blog/post/index.html", PAGE.to_string());

        let internal: Vec<String> = references(&document, &selectors)
            .filter(|r| r.scope() == Scope::Internal)
            .map(|r| r.target)
            .collect();
        assert_eq!(internal, ["/about/", "../../js/app.js", "../../img/logo.png", "/css/site.css"]);
    }

    #[test]
    fn references_carry_their_source_document() {
        let selectors = Selectors::new().unwrap();
        let document = Document::parse("blog/post/index.html", PAGE.to_string());
        assert!(references(&document, &selectors).all(|r| r.source == "blog/post/index.html"));
    }
}
