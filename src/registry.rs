//! Role registry and the setup hook that wires link roles into it.

use std::collections::{BTreeMap, HashMap};

use crate::autolink::{Role, RoleOutput, autolink};
use crate::error::Error;
use crate::pattern::LinkPattern;
use crate::types::{MarkupOccurrence, Revision, SystemMessage};

/// Named inline markup handlers, as a documentation engine keeps them.
#[derive(Default)]
pub struct RoleRegistry {
    /// Registered renderers keyed by role name.
    roles: HashMap<String, Box<dyn Role>>,
}

/// Everything `setup` needs, passed in rather than read from globals.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Source-hosting address of the project, e.g. `https://github.com/org/repo`.
    pub base_url: String,
    /// Revision every link is pinned to.
    pub revision: Revision,
    /// Role name to path template below `tree/<revision>/`, one `%s` slot each.
    pub roles: BTreeMap<String, String>,
}

impl RoleRegistry {
    /// Register (or replace) the handler for `name`.
    pub fn add_role(&mut self, name: &str, role: Box<dyn Role>) {
        tracing::debug!(role = name, "registered role");
        self.roles.insert(name.to_string(), role);
    }

    /// Whether a handler for `name` is registered.
    pub fn has_role(&self, name: &str) -> bool {
        return self.roles.contains_key(name);
    }

    /// The link pattern behind `name`, if it is a link role.
    pub fn pattern_of(&self, name: &str) -> Option<&LinkPattern> {
        return self.roles.get(name).and_then(|r| return r.pattern());
    }

    /// Unregister `name`. Returns whether a handler was removed.
    pub fn remove_role(&mut self, name: &str) -> bool {
        return self.roles.remove(name).is_some();
    }

    /// Dispatch a role occurrence to its handler.
    ///
    /// An unregistered role yields no nodes and one error message, the way
    /// a documentation engine reports an unknown interpreted-text role.
    pub fn render(
        &self,
        occurrence: &MarkupOccurrence,
        options: &BTreeMap<String, String>,
    ) -> RoleOutput {
        let Some(role) = self.roles.get(&occurrence.role) else {
            let message = SystemMessage {
                line: occurrence.line,
                message: format!("unknown interpreted text role `{}`", occurrence.role),
            };
            return (Vec::new(), vec![message]);
        };
        return role.render(
            &occurrence.role,
            &occurrence.rawtext,
            &occurrence.text,
            occurrence.line,
            options,
        );
    }

    /// Registered role names, sorted.
    pub fn role_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        names.sort_unstable();
        return names;
    }
}

/// Build a link pattern per configured role and register its renderer.
///
/// # Errors
///
/// Returns `Error::InvalidPattern` if any role path template is unusable.
/// Nothing is registered in that case.
pub fn setup(registry: &mut RoleRegistry, settings: &Settings) -> Result<(), Error> {
    let mut built = Vec::with_capacity(settings.roles.len());
    for (name, path) in &settings.roles {
        let pattern = LinkPattern::new(&settings.base_url, &settings.revision, path)?;
        built.push((name, pattern));
    }

    for (name, pattern) in built {
        registry.add_role(name, Box::new(autolink(pattern)));
    }
    return Ok(());
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const BASE: &str = "https://github.com/PocketSprite/8bkc-sdk";

    fn settings(revision: &str) -> Settings {
        let mut roles = BTreeMap::new();
        roles.insert("component".to_string(), "components/%s".to_string());
        Settings {
            base_url: BASE.to_string(),
            revision: Revision::new(revision).unwrap(),
            roles,
        }
    }

    fn occurrence(role: &str, text: &str) -> MarkupOccurrence {
        MarkupOccurrence {
            line: 7,
            rawtext: format!(":{role}:`{text}`"),
            role: role.to_string(),
            source: PathBuf::from("docs/index.rst"),
            text: text.to_string(),
        }
    }

    #[test]
    fn setup_registers_component_role() {
        let mut registry = RoleRegistry::default();
        setup(&mut registry, &settings("v1.0")).unwrap();

        assert_eq!(registry.role_names(), vec!["component"]);
        let pattern = registry.pattern_of("component").unwrap();
        assert_eq!(pattern.template(), format!("{BASE}/tree/v1.0/components/%s"));
    }

    #[test]
    fn renders_through_registry() {
        let mut registry = RoleRegistry::default();
        setup(&mut registry, &settings("abc1234")).unwrap();

        let (nodes, messages) =
            registry.render(&occurrence("component", "HAL <8bkc-hal>"), &BTreeMap::new());
        assert!(messages.is_empty());
        assert_eq!(nodes[0].text, "HAL");
        assert_eq!(nodes[0].refuri, format!("{BASE}/tree/abc1234/components/8bkc-hal"));
    }

    #[test]
    fn unknown_role_reports_error_message() {
        let registry = RoleRegistry::default();
        let (nodes, messages) = registry.render(&occurrence("module", "x"), &BTreeMap::new());
        assert!(nodes.is_empty());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].line, 7);
        assert!(messages[0].message.contains("module"));
    }

    #[test]
    fn remove_role_unregisters() {
        let mut registry = RoleRegistry::default();
        setup(&mut registry, &settings("v1.0")).unwrap();

        assert!(registry.remove_role("component"));
        assert!(!registry.has_role("component"));
        assert!(!registry.remove_role("component"));
    }

    #[test]
    fn bad_template_registers_nothing() {
        let mut cfg = settings("v1.0");
        cfg.roles.insert("broken".to_string(), "no-slot".to_string());

        let mut registry = RoleRegistry::default();
        assert!(setup(&mut registry, &cfg).is_err());
        assert!(registry.role_names().is_empty());
    }
}
