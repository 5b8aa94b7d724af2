//! The link role: turns `label <target>` text into a reference node
//! pointing at a revision-pinned URL.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::pattern::LinkPattern;
use crate::types::{ReferenceNode, SystemMessage};

/// Permissive `label <target>` split. Not a grammar: anything else is a bare target.
static LABEL_TARGET: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(.*)\s*<(.*)>").expect("valid regex"));

/// Output of a role renderer: nodes to insert, messages to report.
pub type RoleOutput = (Vec<ReferenceNode>, Vec<SystemMessage>);

/// An inline markup handler, invoked once per occurrence of its role.
pub trait Role {
    /// The URL template this role resolves against, if it has one.
    fn pattern(&self) -> Option<&LinkPattern> {
        return None;
    }

    /// Render one occurrence.
    fn render(
        &self,
        name: &str,
        rawtext: &str,
        text: &str,
        lineno: u32,
        options: &BTreeMap<String, String>,
    ) -> RoleOutput;
}

/// Renderer closed over one link pattern.
pub struct AutoLink {
    /// Template every target is substituted into.
    pattern: LinkPattern,
}

impl Role for AutoLink {
    fn pattern(&self) -> Option<&LinkPattern> {
        return Some(&self.pattern);
    }

    fn render(
        &self,
        _name: &str,
        rawtext: &str,
        text: &str,
        _lineno: u32,
        options: &BTreeMap<String, String>,
    ) -> RoleOutput {
        let (label, target) = split_label_target(text);
        let node = ReferenceNode {
            attributes: options.clone(),
            rawtext: rawtext.to_string(),
            refuri: self.pattern.format(target),
            text: label.to_string(),
        };
        return (vec![node], Vec::new());
    }
}

/// Build the renderer for a link pattern.
pub const fn autolink(pattern: LinkPattern) -> AutoLink {
    return AutoLink { pattern };
}

/// Split role text into (label, target).
///
/// `Display Name <some/path>` gives `("Display Name", "some/path")`; text
/// without an angle-bracketed target is used as both. The match is searched
/// anywhere in the text, the label loses trailing whitespace, and malformed
/// input is never rejected.
pub fn split_label_target(text: &str) -> (&str, &str) {
    let Some(caps) = LABEL_TARGET.captures(text) else {
        return (text, text);
    };
    let (Some(label), Some(target)) = (caps.get(1), caps.get(2)) else {
        return (text, text);
    };
    return (label.as_str().trim_end(), target.as_str());
}
