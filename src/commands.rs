//! Core CLI commands for revlink: revision, resolve, check, render.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::config::Config;
use crate::error;
use crate::registry::{RoleRegistry, Settings, setup};
use crate::revision::{self, GitCli};
use crate::rewrite;
use crate::scanner::{self, DocFormat};
use crate::types::{MarkupOccurrence, ReferenceNode, Revision};

/// Values given on the command line that take precedence over `.revlink.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replaces `base_url`.
    pub base_url: Option<String>,
    /// Roles to unregister after setup; their occurrences are left as written.
    pub disabled: Vec<String>,
    /// Replaces `revision` and skips git.
    pub revision: Option<String>,
}

/// One occurrence as reported by `check --json`.
#[derive(Serialize)]
struct CheckEntry {
    /// One-based line in the document.
    line: u32,
    /// Resolved URL, absent unless linked.
    refuri: Option<String>,
    /// Role name.
    role: String,
    /// Document path relative to the root.
    source: PathBuf,
    /// What happened to the occurrence.
    status: CheckStatus,
    /// Visible label, absent unless linked.
    text: Option<String>,
}

/// Outcome for one occurrence in `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    /// Role switched off with `--disable`; left as written.
    Disabled,
    /// Rendered to a link.
    Link,
    /// Role not configured.
    Unknown,
}

/// Totals from one `render` pass.
#[derive(Debug, Default)]
pub struct RenderSummary {
    /// Documents written.
    pub files: usize,
    /// Occurrences replaced by links.
    pub links: usize,
    /// Occurrences left untouched because their role is unknown.
    pub skipped: usize,
}

/// Build the setup settings from config, overrides, and the working copy.
///
/// # Errors
///
/// Returns `Error::MissingBaseUrl` without a base URL, or revision lookup errors.
fn build_settings(root: &Path, config: &Config, overrides: &Overrides) -> Result<Settings, error::Error> {
    let base_url = overrides
        .base_url
        .clone()
        .or_else(|| return config.base_url.clone())
        .ok_or(error::Error::MissingBaseUrl)?;

    return Ok(Settings {
        base_url,
        revision: pinned_revision(root, config, overrides)?,
        roles: config.roles.clone(),
    });
}

/// Scan documents and report where every role occurrence links to.
/// Exits 1 under `strict` when any occurrence uses an unknown role; roles
/// switched off with `--disable` do not count.
///
/// # Errors
///
/// Returns errors from config loading, revision lookup, scanning, or JSON output.
pub fn check(overrides: &Overrides, json: bool, strict: bool) -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let (config, registry, _) = prepare(&root, overrides)?;
    let occurrences = scanner::scan(&root, &config)?;

    let options = BTreeMap::new();
    let mut entries = Vec::with_capacity(occurrences.len());
    let mut unknown = 0_usize;

    for occurrence in &occurrences {
        let (nodes, _) = registry.render(occurrence, &options);
        let entry = check_entry(occurrence, nodes.first(), &overrides.disabled);
        if entry.status == CheckStatus::Unknown {
            unknown = unknown.saturating_add(1);
        }
        entries.push(entry);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            let location = format!("{}:{}", entry.source.display(), entry.line);
            match (entry.status, &entry.refuri) {
                (CheckStatus::Link, Some(url)) => println!("LINK     {location}  :{}:  {url}", entry.role),
                (CheckStatus::Disabled, _) => println!("DISABLED {location}  :{}:", entry.role),
                _ => println!("UNKNOWN  {location}  :{}:", entry.role),
            }
        }
        println!();
        println!("{} occurrences, {unknown} with unknown roles", entries.len());
    }

    if strict && unknown > 0 {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Flatten an occurrence and its rendered node for reporting. An occurrence
/// without a node is disabled when its role is in `disabled`, else unknown.
fn check_entry(
    occurrence: &MarkupOccurrence,
    node: Option<&ReferenceNode>,
    disabled: &[String],
) -> CheckEntry {
    let status = match node {
        Some(_) => CheckStatus::Link,
        None if disabled.contains(&occurrence.role) => CheckStatus::Disabled,
        None => CheckStatus::Unknown,
    };
    return CheckEntry {
        line: occurrence.line,
        refuri: node.map(|n| return n.refuri.clone()),
        role: occurrence.role.clone(),
        source: occurrence.source.clone(),
        status,
        text: node.map(|n| return n.text.clone()),
    };
}

/// Where `out_dir` sits inside `root`, relative to it, or `None` when it is
/// outside the tree. Both must exist.
///
/// # Errors
///
/// Returns `Error::Io` if either path cannot be canonicalized.
fn output_within(root: &Path, out_dir: &Path) -> Result<Option<PathBuf>, error::Error> {
    let root_abs = std::fs::canonicalize(root)?;
    let out_abs = std::fs::canonicalize(out_dir)?;
    return Ok(out_abs.strip_prefix(&root_abs).ok().map(Path::to_path_buf));
}

/// The fixed revision from the command line or config, else the one git reports.
///
/// # Errors
///
/// Returns `Error::EmptyRevision` for a blank fixed revision, or revision lookup errors.
fn pinned_revision(root: &Path, config: &Config, overrides: &Overrides) -> Result<Revision, error::Error> {
    return match overrides.revision.as_deref().or(config.revision.as_deref()) {
        Some(fixed) => Revision::new(fixed),
        None => revision::resolve(&GitCli::new(root, config.lightweight_tags)),
    };
}

/// Load config, resolve the revision, register every configured role, then
/// unregister the disabled ones.
///
/// # Errors
///
/// Returns errors from config loading, revision lookup, or pattern validation.
pub fn prepare(root: &Path, overrides: &Overrides) -> Result<(Config, RoleRegistry, Revision), error::Error> {
    let config = Config::load(root)?;
    let settings = build_settings(root, &config, overrides)?;
    let mut registry = RoleRegistry::default();
    setup(&mut registry, &settings)?;

    for name in &overrides.disabled {
        if !registry.remove_role(name) {
            return Err(error::Error::UnknownRole { name: name.clone() });
        }
    }
    for name in registry.role_names() {
        if let Some(pattern) = registry.pattern_of(name) {
            tracing::debug!(role = name, pattern = pattern.template(), "link role ready");
        }
    }
    return Ok((config, registry, settings.revision));
}

/// Rewrite every scanned document into `out_dir`, replacing role occurrences with links.
///
/// # Errors
///
/// Returns errors from config loading, revision lookup, or file I/O.
pub fn render(root: &Path, overrides: &Overrides, out_dir: &Path) -> Result<RenderSummary, error::Error> {
    let (config, registry, revision) = prepare(root, overrides)?;
    let mut summary = RenderSummary::default();

    std::fs::create_dir_all(out_dir)?;
    let own_output = output_within(root, out_dir)?;

    for relative in scanner::doc_files(root, &config, own_output.as_deref()) {
        let Some(format) = DocFormat::from_path(&relative) else {
            continue;
        };
        let content = std::fs::read_to_string(root.join(&relative))?;
        let rewritten = rewrite::rewrite_document(&content, &relative, format, &registry);

        for message in &rewritten.messages {
            tracing::warn!(file = %relative.display(), line = message.line, "{}", message.message);
        }

        let dest = out_dir.join(&relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, rewritten.text)?;

        summary.files = summary.files.saturating_add(1);
        summary.links = summary.links.saturating_add(rewritten.links);
        summary.skipped = summary.skipped.saturating_add(rewritten.messages.len());
    }

    eprintln!(
        "Rendered {} files ({} links, {} skipped) at {revision} into {}",
        summary.files,
        summary.links,
        summary.skipped,
        out_dir.display()
    );
    return Ok(summary);
}

/// Render one role occurrence given on the command line.
///
/// # Errors
///
/// Returns `Error::UnknownRole` if `role` is not configured, or setup errors.
pub fn resolve(overrides: &Overrides, role: &str, text: &str, json: bool) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let (_, registry, _) = prepare(&root, overrides)?;
    if !registry.has_role(role) {
        return Err(error::Error::UnknownRole { name: role.to_string() });
    }

    let occurrence = MarkupOccurrence {
        line: 1,
        rawtext: format!(":{role}:`{text}`"),
        role: role.to_string(),
        source: PathBuf::from("<command line>"),
        text: text.to_string(),
    };
    let (nodes, _) = registry.render(&occurrence, &BTreeMap::new());

    for node in &nodes {
        if json {
            println!("{}", serde_json::to_string_pretty(node)?);
        } else {
            println!("{}  {}", node.text, node.refuri);
        }
    }
    return Ok(());
}

/// Print the revision links would be pinned to.
///
/// # Errors
///
/// Returns errors from config loading or revision lookup.
pub fn revision(overrides: &Overrides) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    println!("{}", pinned_revision(&root, &config, overrides)?);
    return Ok(());
}
