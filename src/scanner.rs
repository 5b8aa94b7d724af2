use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::Error;
use crate::types::MarkupOccurrence;

/// Inline interpreted-text role: `:name:`text``. Single line only.
static ROLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r":([A-Za-z0-9_+.-]+):`([^`\n]+)`").expect("valid regex"));

/// Build output directories never hold sources.
const SKIPPED_DIRS: &[&str] = &["_build", "target"];

/// Markup flavour of a document, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    /// `.md` / `.markdown`
    Markdown,
    /// `.rst`
    Rst,
}

impl DocFormat {
    /// Classify a path, or `None` for files that are not documents.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| return e.to_str())?;
        return match ext {
            "md" | "markdown" => Some(Self::Markdown),
            "rst" => Some(Self::Rst),
            _ => None,
        };
    }
}

/// List document files under `root`, relative to it, sorted.
/// Applies the config's include/exclude filters and skips hidden and build
/// directories, plus everything below `skip` (relative to `root`).
pub fn doc_files(root: &Path, config: &Config, skip: Option<&Path>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| return e.depth() == 0 || !is_skipped_dir(e))
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file() && DocFormat::from_path(e.path()).is_some())
        .map(|e| return e.path().strip_prefix(root).unwrap_or(e.path()).to_path_buf())
        .filter(|rel| return skip.is_none_or(|s| return !rel.starts_with(s)))
        .filter(|rel| return config.should_scan(&rel.to_string_lossy()))
        .collect();
    files.sort();
    return files;
}

/// Hidden directories and build output.
fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    return name.starts_with('.') || SKIPPED_DIRS.contains(&&*name);
}

/// Scan all document files under `root` and extract role occurrences,
/// ordered by file then line.
///
/// # Errors
///
/// Returns `Error::Io` if any document cannot be read.
pub fn scan(root: &Path, config: &Config) -> Result<Vec<MarkupOccurrence>, Error> {
    let mut occurrences = Vec::new();
    for relative in doc_files(root, config, None) {
        let content = std::fs::read_to_string(root.join(&relative))?;
        let found = scan_content(&content, &relative);
        tracing::debug!(file = %relative.display(), count = found.len(), "scanned");
        occurrences.extend(found);
    }
    return Ok(occurrences);
}

/// Extract every role occurrence from document content.
pub fn scan_content(content: &str, source: &Path) -> Vec<MarkupOccurrence> {
    return content
        .lines()
        .zip(1_u32..)
        .flat_map(|(line, line_no)| return scan_line(line, source, line_no))
        .map(|(_, occurrence)| return occurrence)
        .collect();
}

/// Extract role occurrences from one line, with their byte spans in it.
pub fn scan_line(line: &str, source: &Path, line_no: u32) -> Vec<(Range<usize>, MarkupOccurrence)> {
    let mut found = Vec::new();
    for cap in ROLE_PATTERN.captures_iter(line) {
        let (Some(whole), Some(role), Some(text)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        found.push((
            whole.range(),
            MarkupOccurrence {
                line: line_no,
                rawtext: whole.as_str().to_string(),
                role: role.as_str().to_string(),
                source: source.to_path_buf(),
                text: text.as_str().to_string(),
            },
        ));
    }
    return found;
}
