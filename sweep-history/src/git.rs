//! `git`-backed [`HistorySource`].
//!
//! A small, explicit wrapper around `git` subprocess calls. Every call runs in
//! the configured root, which may be a subdirectory of the work tree. Path
//! lists are read NUL-separated (`-z`) so names git would otherwise quote
//! (quotes, backslashes, tabs, newlines) come back verbatim, and `git log`
//! runs with `--relative` so its paths match `ls-files` run from the same
//! directory.
//!
//! Commit order comes from `git log --reverse --topo-order`, which depends only
//! on the commit graph and never on committer clocks.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::error::{io_err, HistoryError};
use crate::source::{CommitTouch, HistorySource};

/// Separates commits in `git log` output (`%x1e`).
const RECORD_MARKER: char = '\u{1e}';

/// Wrapper for reading history from a git working tree.
#[derive(Debug, Clone)]
pub struct GitHistory {
    root: PathBuf,
}

impl GitHistory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run_capture(&self, args: &[&str]) -> Result<String, HistoryError> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output, HistoryError> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HistoryError::Git {
                args: args.join(" "),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output, HistoryError> {
        Command::new("git")
            .args(["-c", "core.quotePath=false"])
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| HistoryError::Spawn {
                args: args.join(" "),
                source,
            })
    }
}

impl HistorySource for GitHistory {
    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn tracked_paths(&self) -> Result<Vec<String>, HistoryError> {
        let out = self.run_capture(&["ls-files", "-z"])?;
        let mut paths: Vec<String> = out
            .split('\0')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        paths.sort();
        paths.dedup();
        debug!(count = paths.len(), "listed tracked files");
        Ok(paths)
    }

    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn commits(&self) -> Result<Vec<CommitTouch>, HistoryError> {
        let out = self.run_capture(&[
            "log",
            "--reverse",
            "--topo-order",
            "--no-renames",
            "--relative",
            "--name-status",
            "-z",
            "--format=%x1e%H%x09%cI",
        ])?;
        let commits = parse_log(&out)?;
        debug!(count = commits.len(), "read commit history");
        Ok(commits)
    }

    fn is_shallow(&self) -> Result<bool, HistoryError> {
        let out = self.run_capture(&["rev-parse", "--is-shallow-repository"])?;
        Ok(out.trim() == "true")
    }

    fn working_tree_paths(&self) -> Result<Vec<String>, HistoryError> {
        std::fs::metadata(&self.root).map_err(|e| io_err(&self.root, e))?;
        let mut paths = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                paths.push(to_repo_path(rel));
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn to_repo_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse `git log --name-status -z --format=%x1e%H%x09%cI` output.
///
/// Each record is `<id>\t<date>\0`, then for commits touching files a
/// newline and `<status>\0<path>\0` pairs. Only `M` (content) and `T` (type
/// change) entries count as modifications.
fn parse_log(out: &str) -> Result<Vec<CommitTouch>, HistoryError> {
    let mut commits = Vec::new();
    for record in out.split(RECORD_MARKER) {
        if record.trim().is_empty() {
            continue;
        }
        let (header, body) = record.split_once('\0').unwrap_or((record, ""));
        let (id, date) = header.split_once('\t').ok_or_else(|| HistoryError::Parse {
            line: header.to_string(),
        })?;
        let committed_at = DateTime::parse_from_rfc3339(date.trim())
            .ok()
            .map(|d| d.with_timezone(&Utc));

        let body = body.strip_prefix('\n').unwrap_or(body);
        let mut fields = body.split('\0');
        let mut modified = Vec::new();
        while let Some(status) = fields.next() {
            if status.trim().is_empty() {
                continue;
            }
            let path = fields.next().filter(|p| !p.is_empty()).ok_or_else(|| {
                HistoryError::Parse {
                    line: format!("{id}: status {status} without a path"),
                }
            })?;
            if matches!(status.chars().next(), Some('M' | 'T')) {
                modified.push(path.to_string());
            }
        }

        commits.push(CommitTouch {
            id: id.trim().to_string(),
            committed_at,
            modified,
        });
    }
    Ok(commits)
}
