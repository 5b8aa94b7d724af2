//! Document rewriting: replace role occurrences with hyperlink markup of the
//! document's own format.

use std::collections::BTreeMap;
use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::registry::RoleRegistry;
use crate::scanner::{self, DocFormat};
use crate::types::{ReferenceNode, SystemMessage};

/// A rewritten document and what happened along the way.
#[derive(Debug)]
pub struct Rewritten {
    /// Number of occurrences replaced by links.
    pub links: usize,
    /// Messages for occurrences left untouched.
    pub messages: Vec<SystemMessage>,
    /// The rewritten document.
    pub text: String,
}

/// Bytes that end or split a link destination in either markup. `%` is left
/// alone so targets that are already encoded pass through.
const DESTINATION_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Escape characters that would end a markdown link label early.
fn escape_markdown_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        if matches!(ch, '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    return out;
}

/// Escape characters that would end a reST hyperlink label early.
fn escape_rst_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        if matches!(ch, '<' | '`' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    return out;
}

/// Render one reference node as link markup. An empty label shows the URL.
/// Whitespace, quotes, parentheses, angle brackets and backticks in the URL
/// are percent-encoded.
pub fn link_markup(node: &ReferenceNode, format: DocFormat) -> String {
    let label = if node.text.is_empty() { node.refuri.as_str() } else { node.text.as_str() };
    let url = utf8_percent_encode(&node.refuri, DESTINATION_ENCODE_SET);
    return match format {
        DocFormat::Markdown => format!("[{}]({url})", escape_markdown_label(label)),
        // Anonymous target so repeated labels do not clash.
        DocFormat::Rst => format!("`{} <{url}>`__", escape_rst_label(label)),
    };
}

/// Replace every registered role occurrence in `content` with link markup.
/// Unregistered roles are left as written and reported. Line endings and
/// all text outside occurrences are preserved byte for byte.
pub fn rewrite_document(
    content: &str,
    source: &Path,
    format: DocFormat,
    registry: &RoleRegistry,
) -> Rewritten {
    let options = BTreeMap::new();
    let mut out = String::with_capacity(content.len());
    let mut links = 0_usize;
    let mut messages = Vec::new();

    for (line, line_no) in content.split_inclusive('\n').zip(1_u32..) {
        let mut cursor = 0_usize;
        for (span, occurrence) in scanner::scan_line(line, source, line_no) {
            let (nodes, mut notes) = registry.render(&occurrence, &options);
            messages.append(&mut notes);
            if nodes.is_empty() {
                continue;
            }

            out.push_str(line.get(cursor..span.start).unwrap_or_default());
            for node in &nodes {
                out.push_str(&link_markup(node, format));
            }
            cursor = span.end;
            links = links.saturating_add(1);
        }
        out.push_str(line.get(cursor..).unwrap_or_default());
    }

    return Rewritten { links, messages, text: out };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Settings, setup};
    use crate::types::Revision;

    const BASE: &str = "https://github.com/PocketSprite/8bkc-sdk";

    fn registry() -> RoleRegistry {
        let mut roles = BTreeMap::new();
        roles.insert("component".to_string(), "components/%s".to_string());
        let settings = Settings {
            base_url: BASE.to_string(),
            revision: Revision::new("v1.0").unwrap(),
            roles,
        };
        let mut registry = RoleRegistry::default();
        setup(&mut registry, &settings).unwrap();
        registry
    }

    #[test]
    fn markdown_gets_inline_links() {
        let doc = "# HAL\n\nSee :component:`the HAL <8bkc-hal>` here.\n";
        let out = rewrite_document(doc, Path::new("a.md"), DocFormat::Markdown, &registry());

        assert_eq!(out.links, 1);
        assert_eq!(
            out.text,
            format!("# HAL\n\nSee [the HAL]({BASE}/tree/v1.0/components/8bkc-hal) here.\n")
        );
    }

    #[test]
    fn rst_gets_anonymous_hyperlinks() {
        let doc = "Uses :component:`appfs`.";
        let out = rewrite_document(doc, Path::new("a.rst"), DocFormat::Rst, &registry());
        assert_eq!(out.text, format!("Uses `appfs <{BASE}/tree/v1.0/components/appfs>`__."));
    }

    #[test]
    fn unknown_roles_are_left_alone() {
        let doc = "See :ref:`intro` and :component:`x`\r\nend";
        let out = rewrite_document(doc, Path::new("a.rst"), DocFormat::Rst, &registry());

        assert_eq!(out.links, 1);
        assert_eq!(out.messages.len(), 1);
        assert!(out.text.starts_with("See :ref:`intro` and `x <"));
        assert!(out.text.ends_with(">`__\r\nend"));
    }

    #[test]
    fn text_without_roles_is_unchanged() {
        let doc = "plain\n\n  indented `code`\n";
        let out = rewrite_document(doc, Path::new("a.md"), DocFormat::Markdown, &registry());
        assert_eq!(out.text, doc);
        assert_eq!(out.links, 0);
    }

    #[test]
    fn labels_are_escaped() {
        let node = ReferenceNode {
            attributes: BTreeMap::new(),
            rawtext: String::new(),
            refuri: "u".to_string(),
            text: "a[1]".to_string(),
        };
        assert_eq!(link_markup(&node, DocFormat::Markdown), "[a\\[1\\]](u)");
    }

    #[test]
    fn empty_label_shows_url() {
        let node = ReferenceNode {
            attributes: BTreeMap::new(),
            rawtext: String::new(),
            refuri: "https://x/y".to_string(),
            text: String::new(),
        };
        assert_eq!(link_markup(&node, DocFormat::Rst), "`https://x/y <https://x/y>`__");
    }

    #[test]
    fn targets_with_spaces_and_parens_stay_links() {
        let doc = "See :component:`x <a b (v2)>` and :component:`y <c%20d>`.\n";
        let md = rewrite_document(doc, Path::new("a.md"), DocFormat::Markdown, &registry());
        assert_eq!(
            md.text,
            format!(
                "See [x]({BASE}/tree/v1.0/components/a%20b%20%28v2%29) and \
                 [y]({BASE}/tree/v1.0/components/c%20d).\n"
            )
        );

        let rst = rewrite_document(doc, Path::new("a.rst"), DocFormat::Rst, &registry());
        assert!(rst.text.contains(&format!("`x <{BASE}/tree/v1.0/components/a%20b%20%28v2%29>`__")));
    }
}
