use std::path::{Path, PathBuf};

use crate::config::{Config, default_roles};
use crate::error;
use crate::pattern::LinkPattern;

// ── CLI commands ──────────────────────────────────────────────────────

/// List all configured roles, sorted alphabetically.
///
/// # Errors
///
/// Returns errors from config loading.
pub fn cmd_list() -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;

    if config.roles.is_empty() {
        println!("No roles configured.");
        return Ok(());
    }

    let base = config.base_url.as_deref().unwrap_or("<base_url>");
    for (name, path) in &config.roles {
        println!("{name} -> {}/tree/<revision>/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    }

    Ok(())
}

/// Add (or replace) a role in the config file.
///
/// # Errors
///
/// Returns `Error::InvalidPattern` if `path` lacks exactly one `%s`,
/// or errors from config reading and writing.
pub fn cmd_add(name: &str, path: &str) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    LinkPattern::parse(path)?;
    add_to_config(&root, name, path)?;
    println!("Added role: {name} -> {path}");
    Ok(())
}

/// Remove a role from the config file.
///
/// # Errors
///
/// Returns `Error::ConfigNotFound` if there is no config file,
/// `Error::UnknownRole` if the role isn't configured,
/// or errors from config reading and writing.
pub fn cmd_remove(name: &str) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config_path = Config::path_in(&root);
    if !config_path.exists() {
        return Err(error::Error::ConfigNotFound { path: config_path });
    }

    remove_from_config(&root, name)?;
    println!("Removed role: {name}");
    Ok(())
}

// ── Config file editing ───────────────────────────────────────────────

/// Parse a `.revlink.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ParseFailed` on parse failure.
fn read_config_doc(root: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), error::Error> {
    let config_path = Config::path_in(root);
    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(error::Error::Io(e)),
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        error::Error::ParseFailed {
            file: config_path.clone(),
            reason: e.to_string(),
        }
    })?;

    Ok((config_path, doc))
}

/// Return the `[roles]` table, creating it if needed. A new table starts
/// from the roles the config currently implies, so the implicit `component`
/// role survives the first edit.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if `roles` exists but is not a table.
fn roles_table<'a>(
    doc: &'a mut toml_edit::DocumentMut,
    config_path: &Path,
) -> Result<&'a mut toml_edit::Table, error::Error> {
    if !doc.contains_key("roles") {
        let mut table = toml_edit::Table::new();
        for (name, path) in default_roles() {
            table.insert(&name, toml_edit::value(path));
        }
        doc["roles"] = toml_edit::Item::Table(table);
    }

    doc.get_mut("roles")
        .and_then(toml_edit::Item::as_table_mut)
        .ok_or_else(|| error::Error::ParseFailed {
            file: config_path.to_path_buf(),
            reason: "`roles` must be a table".to_string(),
        })
}

/// Add a role mapping to `.revlink.toml`.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the config can't be parsed,
/// or `Error::Io` if writing fails.
fn add_to_config(root: &Path, name: &str, role_path: &str) -> Result<(), error::Error> {
    let (config_path, mut doc) = read_config_doc(root)?;
    roles_table(&mut doc, &config_path)?.insert(name, toml_edit::value(role_path));
    std::fs::write(&config_path, doc.to_string())?;
    Ok(())
}

/// Remove a role key from `.revlink.toml`.
///
/// # Errors
///
/// Returns `Error::UnknownRole` if the name isn't configured.
fn remove_from_config(root: &Path, name: &str) -> Result<(), error::Error> {
    let (config_path, mut doc) = read_config_doc(root)?;

    if roles_table(&mut doc, &config_path)?.remove(name).is_none() {
        return Err(error::Error::UnknownRole {
            name: name.to_string(),
        });
    }

    std::fs::write(&config_path, doc.to_string())?;
    Ok(())
}
