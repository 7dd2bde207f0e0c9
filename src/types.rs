/// Core domain types for references, their scope, and collected violations.
use std::fmt;

use serde::Serialize;

/// Prefixes that mark a target as living outside the build output.
const EXTERNAL_PREFIXES: [&str; 4] = ["http://", "https://", "//", "mailto:"];

/// Which attribute a reference was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `href` on an `<a>` element.
    Anchor,
    /// `href` on a `<link>` element (stylesheets, icons, feeds).
    Link,
    /// `src` on any element (images, scripts, frames).
    Source,
}

/// Whether a reference is checked against the build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Points outside the tree (URL, protocol-relative, mail, fragment-only anchor, data URI).
    External,
    /// Resolved within the build output tree.
    Internal,
}

/// One collected problem. Checks gather every violation across all documents
/// and fail once with the full list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Violation {
    /// An internal reference matched none of its candidate paths.
    BrokenLink {
        /// Document containing the reference.
        document: String,
        /// Raw attribute value.
        href: String,
        /// Root-relative path the target normalized to.
        normalized: String,
    },
    /// A `<script src>` with an empty or placeholder value.
    InvalidScriptSrc {
        /// Document containing the script tag.
        document: String,
        /// Raw `src` value.
        src: String,
    },
    /// A document declares a doctype but has no `<html>` element.
    MissingHtmlElement {
        /// Offending document.
        document: String,
    },
    /// A required page is absent from the build output.
    MissingPage {
        /// Description of the expected page.
        expected: String,
    },
    /// A local script file referenced by `<script src>` does not exist.
    MissingScript {
        /// Document containing the script tag.
        document: String,
        /// Root-relative path that was probed.
        resolved: String,
        /// Raw `src` value.
        src: String,
    },
    /// A non-partial document has no title text.
    MissingTitle {
        /// Offending document.
        document: String,
    },
    /// No anchor links were found in any checked document.
    NoLinks,
    /// An inline script body matched an error signature.
    SuspiciousInlineScript {
        /// Document containing the script.
        document: String,
        /// The signature that matched.
        pattern: String,
        /// First characters of the script body.
        snippet: String,
    },
}

/// Extracted from an element attribute by the reference extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Attribute the target was read from.
    pub kind: ReferenceKind,
    /// Root-relative path of the document containing the reference.
    pub source: String,
    /// Raw attribute value, untouched.
    pub target: String,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReferenceKind::Anchor => "a[href]",
            ReferenceKind::Link => "link[href]",
            ReferenceKind::Source => "[src]",
        };
        return f.write_str(label);
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Violation::BrokenLink { document, href, normalized } => {
                write!(f, "{document}: {href} (resolved to {normalized})")
            },
            Violation::InvalidScriptSrc { document, src } => write!(f, "{document}: src=\"{src}\""),
            Violation::MissingHtmlElement { document } => write!(f, "{document}: missing <html> tag"),
            Violation::MissingPage { expected } => write!(f, "missing {expected}"),
            Violation::MissingScript { document, src, resolved } => {
                write!(f, "{document}: {src} (looked for {resolved})")
            },
            Violation::MissingTitle { document } => f.write_str(document),
            Violation::NoLinks => f.write_str("no <a href> links found"),
            Violation::SuspiciousInlineScript { document, pattern, snippet } => {
                write!(f, "{document}: /{pattern}/ in `{snippet}`")
            },
        };
    }
}

impl Reference {
    /// Classify the reference. Only internal references reach the resolver.
    pub fn scope(&self) -> Scope {
        let target = self.target.as_str();
        if EXTERNAL_PREFIXES.iter().any(|p| return target.starts_with(p)) {
            return Scope::External;
        }

        let kind_specific = match self.kind {
            ReferenceKind::Anchor => target.starts_with('#'),
            ReferenceKind::Link => false,
            ReferenceKind::Source => target.starts_with("data:"),
        };
        if kind_specific {
            return Scope::External;
        }

        return Scope::Internal;
    }
}
