//! Land command - commit file edits, open a PR, wait, merge, wait

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, CROSS, Stylize};
use anstream::{eprintln, println};
use prland::RepoName;
use prland::error::{Error, Result};
use prland::land::{LandRequest, Lander};
use prland::types::{Author, CommitRequest};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A single file change applied to the worktree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEdit {
    /// Write `content` to `path`, creating parent directories
    Write {
        /// Path relative to the repository root
        path: PathBuf,
        /// New file content
        content: String,
    },
    /// Delete `path`
    Delete {
        /// Path relative to the repository root
        path: PathBuf,
    },
}

impl FileEdit {
    /// Parse a `PATH=CONTENT` write argument
    pub fn parse_write(arg: &str) -> Result<Self> {
        let (path, content) = arg.split_once('=').ok_or_else(|| {
            Error::Config(format!("--write expects PATH=CONTENT, got '{arg}'"))
        })?;
        Ok(Self::Write {
            path: relative_path(path)?,
            content: content.to_string(),
        })
    }

    /// Parse a delete argument
    pub fn parse_delete(arg: &str) -> Result<Self> {
        Ok(Self::Delete {
            path: relative_path(arg)?,
        })
    }

    /// Apply the edit inside `root`
    pub fn apply(&self, root: &Path) -> std::io::Result<()> {
        match self {
            Self::Write { path, content } => {
                let target = root.join(path);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(target, content)
            }
            Self::Delete { path } => fs::remove_file(root.join(path)),
        }
    }
}

/// Reject paths that would leave the worktree or touch `.git`
fn relative_path(raw: &str) -> Result<PathBuf> {
    let path = PathBuf::from(raw);
    let mut components = path.components().peekable();
    if components.peek().is_none() {
        return Err(Error::Config("empty path".to_string()));
    }

    for component in components {
        match component {
            Component::Normal(part) if part == ".git" => {
                return Err(Error::Config(format!("refusing to edit .git: '{raw}'")));
            }
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(Error::Config(format!(
                    "path must be relative to the repository root: '{raw}'"
                )));
            }
        }
    }
    Ok(path)
}

/// Options for the land command
#[derive(Debug, Clone)]
pub struct LandOptions {
    /// Branch to create
    pub branch: String,
    /// Branch to merge into
    pub base: String,
    /// PR title (defaults to the commit message's first line)
    pub title: Option<String>,
    /// PR body
    pub body: Option<String>,
    /// Status check on the PR head
    pub check: String,
    /// Status check on the merge commit (defaults to `check`)
    pub merge_check: Option<String>,
    /// `--write` arguments
    pub writes: Vec<String>,
    /// `--delete` arguments
    pub deletes: Vec<String>,
    /// Commit message
    pub message: String,
    /// Commit author name
    pub author_name: String,
    /// Commit author email
    pub author_email: String,
    /// Override wait timeout
    pub timeout_secs: Option<u64>,
    /// Override poll interval
    pub poll_interval_secs: Option<u64>,
    /// GitHub Enterprise host override
    pub host: Option<String>,
    /// Workspace parent directory override
    pub work_dir: Option<PathBuf>,
}

/// Run the land command
pub async fn run_land(repo: &str, config_path: Option<&Path>, options: LandOptions) -> Result<()> {
    // Validate everything local before touching the network
    let repo = RepoName::parse(repo)?;

    let mut edits = options
        .writes
        .iter()
        .map(|arg| FileEdit::parse_write(arg))
        .collect::<Result<Vec<_>>>()?;
    for arg in &options.deletes {
        edits.push(FileEdit::parse_delete(arg)?);
    }
    if edits.is_empty() {
        return Err(Error::Config(
            "nothing to land: pass at least one --write or --delete".to_string(),
        ));
    }

    let ctx = CommandContext::new(&repo, config_path, options.host.clone()).await?;

    let mut wait_section = ctx.config.wait.clone();
    if let Some(secs) = options.timeout_secs {
        wait_section.timeout_secs = secs;
    }
    if let Some(secs) = options.poll_interval_secs {
        wait_section.poll_interval_secs = secs;
    }
    let wait = wait_section.to_wait_config()?;
    let work_dir = options
        .work_dir
        .clone()
        .or_else(|| ctx.config.work_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let title = options.title.clone().unwrap_or_else(|| {
        options
            .message
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });
    let mut request = LandRequest::new(&options.branch, &options.base, title, &options.check);
    if let Some(body) = &options.body {
        request = request.with_body(body);
    }
    if let Some(check) = &options.merge_check {
        request = request.with_merge_check(check);
    }

    println!(
        "{} {} {} {}",
        "Landing".emphasis(),
        options.branch.accent(),
        "into".muted(),
        format!("{repo}:{}", options.base).accent()
    );
    println!(
        "{}",
        format!(
            "Timeout {}s per check, polling every {}s",
            wait.timeout.as_secs(),
            wait.poll_interval.as_secs()
        )
        .muted()
    );

    let progress = Arc::new(CliProgress::new());
    let lander = Lander::new(ctx.platform, ctx.transport, ctx.credentials)
        .with_progress(progress.clone())
        .with_wait_config(wait)
        .with_work_dir(work_dir);

    let commit = CommitRequest::new(
        &options.message,
        Author::new(&options.author_name, &options.author_email),
    );
    let report = lander
        .land(&repo, &request, move |worktree: &Path| {
            for edit in &edits {
                edit.apply(worktree)?;
            }
            Ok(commit)
        })
        .await;
    progress.finish();

    if let Some(e) = &report.teardown_error {
        eprintln!("{}", format!("warning: {e}").warn());
    }

    match report.into_result() {
        Ok(pr) => {
            println!();
            println!(
                "{} PR #{} merged as {}",
                format!("{CHECK} Landed:").success(),
                pr.number().accent(),
                pr.merge_sha().unwrap_or_default().accent()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", CROSS.error(), "Landing aborted".error());
            Err(e)
        }
    }
}
