//! Revision resolution: short commit hash, or the exact tag covering HEAD.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Error;
use crate::types::Revision;

/// The two lookups revision resolution needs from version control.
pub trait Vcs {
    /// The tag name exactly covering HEAD, or `None` when HEAD is untagged.
    ///
    /// # Errors
    ///
    /// Returns errors that mean the lookup could not run at all.
    fn exact_tag(&self) -> Result<Option<String>, Error>;

    /// The abbreviated commit hash of HEAD.
    ///
    /// # Errors
    ///
    /// Returns errors when HEAD cannot be read.
    fn short_revision(&self) -> Result<String, Error>;
}

/// `git` on the `PATH`, run inside a working copy.
pub struct GitCli {
    /// Also match lightweight tags (`describe --tags`).
    lightweight_tags: bool,
    /// Working directory for every invocation.
    root: PathBuf,
}

impl GitCli {
    /// Create a resolver for the working copy at `root`.
    pub fn new(root: &Path, lightweight_tags: bool) -> Self {
        return Self {
            lightweight_tags,
            root: root.to_path_buf(),
        };
    }
}

impl Vcs for GitCli {
    fn exact_tag(&self) -> Result<Option<String>, Error> {
        let mut args = vec!["describe", "--exact-match"];
        if self.lightweight_tags {
            args.push("--tags");
        }
        // An untagged HEAD makes `describe` exit non-zero; that is the normal case.
        return match run_git(&self.root, &args) {
            Err(Error::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
            Ok(tag) if tag.is_empty() => Ok(None),
            Ok(tag) => Ok(Some(tag)),
        };
    }

    fn short_revision(&self) -> Result<String, Error> {
        return run_git(&self.root, &["rev-parse", "--short", "HEAD"]);
    }
}

/// Resolve the revision to pin links to: the exact tag if HEAD has one,
/// otherwise the short commit hash.
///
/// # Errors
///
/// Propagates failures of the commit lookup, or `Error::EmptyRevision`
/// if it printed nothing.
pub fn resolve(vcs: &dyn Vcs) -> Result<Revision, Error> {
    let commit = vcs.short_revision()?;
    tracing::info!(commit = %commit, "git commit ID");

    let tag = vcs.exact_tag()?;
    if let Some(tag) = tag.filter(|t| return !t.trim().is_empty()) {
        tracing::info!(tag = %tag, "git tag");
        return Revision::new(&tag);
    }

    return Revision::new(&commit);
}

/// Run `git` with `args` in `root`, returning trimmed stdout.
///
/// # Errors
///
/// Returns `Error::Io` if git cannot be spawned, or `Error::CommandFailed`
/// if it exits unsuccessfully.
fn run_git(root: &Path, args: &[&str]) -> Result<String, Error> {
    let output = Command::new("git").args(args).current_dir(root).output()?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: format!("git {}", args.join(" ")),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeVcs {
        commit: &'static str,
        tag: Option<&'static str>,
    }

    impl Vcs for FakeVcs {
        fn exact_tag(&self) -> Result<Option<String>, Error> {
            return Ok(self.tag.map(String::from));
        }

        fn short_revision(&self) -> Result<String, Error> {
            return Ok(self.commit.to_string());
        }
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git").args(args).current_dir(dir).output().unwrap();
        assert!(status.status.success(), "git {args:?} failed");
    }

    fn repo_with_commit() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["config", "user.name", "Test"]);
        git(dir.path(), &["config", "user.email", "test@test.com"]);
        git(dir.path(), &["commit", "-q", "--allow-empty", "-m", "init"]);
        dir
    }

    #[test]
    fn untagged_head_uses_commit() {
        let vcs = FakeVcs { commit: "abc1234", tag: None };
        assert_eq!(resolve(&vcs).unwrap().as_str(), "abc1234");
    }

    #[test]
    fn tagged_head_prefers_tag() {
        let vcs = FakeVcs { commit: "abc1234", tag: Some("v1.0") };
        assert_eq!(resolve(&vcs).unwrap().as_str(), "v1.0");
    }

    #[test]
    fn blank_tag_falls_back_to_commit() {
        let vcs = FakeVcs { commit: "abc1234", tag: Some("  ") };
        assert_eq!(resolve(&vcs).unwrap().as_str(), "abc1234");
    }

    #[test]
    fn empty_commit_is_an_error() {
        let vcs = FakeVcs { commit: "", tag: None };
        assert!(matches!(resolve(&vcs), Err(Error::EmptyRevision)));
    }

    #[test]
    fn git_untagged_checkout_resolves_to_short_hash() {
        let repo = repo_with_commit();
        let vcs = GitCli::new(repo.path(), false);
        let expected = run_git(repo.path(), &["rev-parse", "--short", "HEAD"]).unwrap();

        assert_eq!(vcs.exact_tag().unwrap(), None);
        assert_eq!(resolve(&vcs).unwrap().as_str(), expected);
    }

    #[test]
    fn git_annotated_tag_wins() {
        let repo = repo_with_commit();
        git(repo.path(), &["tag", "-a", "v1.0", "-m", "release"]);
        let vcs = GitCli::new(repo.path(), false);
        assert_eq!(resolve(&vcs).unwrap().as_str(), "v1.0");
    }

    #[test]
    fn git_lightweight_tag_needs_opt_in() {
        let repo = repo_with_commit();
        git(repo.path(), &["tag", "nightly"]);

        let strict = GitCli::new(repo.path(), false);
        assert_eq!(strict.exact_tag().unwrap(), None);

        let relaxed = GitCli::new(repo.path(), true);
        assert_eq!(resolve(&relaxed).unwrap().as_str(), "nightly");
    }

    #[test]
    fn outside_a_checkout_fails_loudly() {
        let dir = tempfile::TempDir::new().unwrap();
        let vcs = GitCli::new(dir.path(), false);
        assert!(matches!(resolve(&vcs), Err(Error::CommandFailed { .. })));
    }
}
