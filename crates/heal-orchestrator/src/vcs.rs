//! Git commit of healed files

use std::path::{Path, PathBuf};

use git2::{Commit, Repository, Signature};
use tracing::{info, warn};

use crate::config::CommitConfig;
use crate::errors::VcsError;
use crate::result::{CommitInfo, HealingResult};

/// Commit message: a summary line, then one detail line per healed selector.
pub fn commit_message(prefix: &str, healed: &[&HealingResult]) -> String {
    let noun = if healed.len() == 1 { "selector" } else { "selectors" };
    let mut message = format!("{prefix}: healed {} {noun}\n", healed.len());
    for result in healed {
        let Some(update) = result.update.as_ref() else {
            continue;
        };
        let confidence = result
            .best_match
            .as_ref()
            .map_or(0.0, |m| m.combined_confidence);
        message.push_str(&format!(
            "\n- {} [{}]: {} -> {} (confidence {:.2}, {})",
            update.file.display(),
            result.failure.symbol().unwrap_or("unknown"),
            update.old_selector.display_tuple(),
            update.new_selector.display_tuple(),
            confidence,
            update.new_selector.strategy
        ));
    }
    message
}

/// Stage `files` and commit them on HEAD, or on the configured branch.
pub fn commit_files(
    repo_root: &Path,
    files: &[PathBuf],
    message: &str,
    selectors_healed: usize,
    config: &CommitConfig,
) -> Result<CommitInfo, VcsError> {
    let repo = Repository::open(repo_root)?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| VcsError::BareRepository(repo_root.to_path_buf()))?
        .canonicalize()
        .map_err(|source| VcsError::Io {
            path: repo_root.to_path_buf(),
            source,
        })?;

    if let Some(branch) = config.branch.as_deref() {
        switch_to_branch(&repo, branch)?;
    }

    let mut index = repo.index()?;
    let mut relative_files = Vec::with_capacity(files.len());
    for file in files {
        let absolute = file.canonicalize().map_err(|source| VcsError::Io {
            path: file.clone(),
            source,
        })?;
        let relative = absolute
            .strip_prefix(&workdir)
            .map_err(|_| VcsError::OutsideRepository(file.clone()))?
            .to_path_buf();
        index.add_path(&relative)?;
        relative_files.push(relative);
    }
    index.write()?;
    let tree = repo.find_tree(index.write_tree()?)?;

    let signature = Signature::now(&config.author_name, &config.author_email)?;
    let parent = head_commit(&repo);
    let parents: Vec<&Commit<'_>> = parent.iter().collect();
    let commit_id = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

    let branch = repo
        .head()
        .ok()
        .and_then(|head| head.shorthand().map(str::to_string));
    info!(
        commit = %commit_id,
        branch = branch.as_deref().unwrap_or("HEAD"),
        files = relative_files.len(),
        "healing committed"
    );
    Ok(CommitInfo {
        commit_id: commit_id.to_string(),
        branch,
        files_changed: relative_files,
        selectors_healed,
    })
}

fn head_commit(repo: &Repository) -> Option<Commit<'_>> {
    repo.head().ok().and_then(|head| head.peel_to_commit().ok())
}

/// Point HEAD at `branch`, creating it at the current HEAD commit when missing.
///
/// The working tree is not checked out, so the patched files stay as they are.
fn switch_to_branch(repo: &Repository, branch: &str) -> Result<(), VcsError> {
    if repo.find_branch(branch, git2::BranchType::Local).is_err() {
        match head_commit(repo) {
            Some(commit) => {
                repo.branch(branch, &commit, false)?;
            }
            None => warn!(branch, "repository has no commits, branch starts unborn"),
        }
    }
    repo.set_head(&format!("refs/heads/{branch}"))?;
    Ok(())
}
