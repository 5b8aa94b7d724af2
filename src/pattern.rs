//! Revision-pinned URL templates with a single `%s` substitution slot.

use crate::error::Error;
use crate::types::Revision;

/// A URL template containing exactly one `%s` slot. `%%` renders as `%`.
/// Constructed only via `LinkPattern::new()` or `LinkPattern::parse()`,
/// both of which validate the slot count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPattern {
    /// Template text, validated.
    template: String,
}

impl LinkPattern {
    /// Substitute `target` into the slot.
    pub fn format(&self, target: &str) -> String {
        let mut out = String::with_capacity(self.template.len().saturating_add(target.len()));
        let mut chars = self.template.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                out.push(ch);
                continue;
            }
            // Validated at construction: the next char is `s` or `%`.
            match chars.next() {
                Some('s') => out.push_str(target),
                Some(other) => out.push(other),
                None => {},
            }
        }
        return out;
    }

    /// Build `base_url/tree/<revision>/<role_path>`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the combined template does not hold
    /// exactly one `%s` slot.
    pub fn new(base_url: &str, revision: &Revision, role_path: &str) -> Result<Self, Error> {
        let base = base_url.trim_end_matches('/');
        let path = role_path.trim_start_matches('/');
        return Self::parse(&format!("{base}/tree/{revision}/{path}"));
    }

    /// Validate a raw template.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` on a stray `%` specifier or a slot
    /// count other than one.
    pub fn parse(template: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| {
            return Error::InvalidPattern {
                pattern: template.to_string(),
                reason: reason.to_string(),
            };
        };

        let mut slots = 0_usize;
        let mut chars = template.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                continue;
            }
            match chars.next() {
                Some('s') => slots = slots.saturating_add(1),
                Some('%') => {},
                Some(other) => return Err(invalid(&format!("unsupported specifier `%{other}`"))),
                None => return Err(invalid("trailing `%`")),
            }
        }

        if slots != 1 {
            return Err(invalid(&format!("expected one `%s` slot, found {slots}")));
        }
        return Ok(Self { template: template.to_string() });
    }

    /// The validated template text.
    pub fn template(&self) -> &str {
        return &self.template;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://github.com/PocketSprite/8bkc-sdk";

    #[test]
    fn builds_tree_url_for_revision() {
        let rev = Revision::new("abc1234").unwrap();
        let pattern = LinkPattern::new(BASE, &rev, "components/%s").unwrap();
        assert_eq!(pattern.template(), format!("{BASE}/tree/abc1234/components/%s"));
        assert_eq!(
            pattern.format("8bkc-hal"),
            format!("{BASE}/tree/abc1234/components/8bkc-hal")
        );
    }

    #[test]
    fn trailing_slash_on_base_is_dropped() {
        let rev = Revision::new("v1.0").unwrap();
        let pattern = LinkPattern::new("https://example.com/repo/", &rev, "/src/%s").unwrap();
        assert_eq!(pattern.format("x"), "https://example.com/repo/tree/v1.0/src/x");
    }

    #[test]
    fn escaped_percent_survives() {
        let pattern = LinkPattern::parse("https://example.com/100%%/%s").unwrap();
        assert_eq!(pattern.format("a"), "https://example.com/100%/a");
    }

    #[test]
    fn rejects_missing_slot() {
        let err = LinkPattern::parse("https://example.com/fixed").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_two_slots() {
        assert!(LinkPattern::parse("%s/%s").is_err());
    }

    #[test]
    fn rejects_stray_specifier() {
        assert!(LinkPattern::parse("%d/%s").is_err());
        assert!(LinkPattern::parse("%s/%").is_err());
    }

    #[test]
    fn target_percent_is_not_reinterpreted() {
        let pattern = LinkPattern::parse("x/%s").unwrap();
        assert_eq!(pattern.format("%s"), "x/%s");
    }
}
