//! Notebook store
//!
//! One JSON file per notebook, `notebook_data/<id>.json`. Saving rewrites the
//! file with the full document.

use super::{
    ensure_dir, read_json, remove_if_exists, sort_summaries, validate_file_id, write_json,
    CorruptionPolicy, SessionStore, SessionSummary, NOTEBOOK_DIR,
};
use crate::error::{MyIqError, Result};
use crate::session::NotebookSession;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Directory-of-files store for notebooks
#[derive(Debug, Clone)]
pub struct NotebookStore {
    dir: PathBuf,
    policy: CorruptionPolicy,
}

impl NotebookStore {
    /// Open (creating if needed) the notebook directory under `root`
    pub fn open(root: &Path, policy: CorruptionPolicy) -> Result<Self> {
        let dir = ensure_dir(root, NOTEBOOK_DIR)?;
        Ok(Self { dir, policy })
    }

    /// Directory holding the notebook files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        validate_file_id(id)?;
        Ok(self.dir.join(format!("{}.json", id)))
    }

    /// Every notebook, most recently updated first
    pub fn load_all(&self) -> Result<Vec<NotebookSession>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut notebooks = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(nb) = read_json::<NotebookSession>(&path, self.policy)? {
                notebooks.push(nb);
            }
        }
        notebooks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notebooks)
    }

    /// Replace a notebook's content and persist it
    pub fn update_content(&self, id: &str, content: &str) -> Result<NotebookSession> {
        let mut nb = self
            .load(id)?
            .ok_or_else(|| MyIqError::NotFound(format!("notebook {}", id)))?;
        nb.content = content.to_string();
        self.save(&mut nb)?;
        Ok(nb)
    }

    /// Change a notebook's title and persist it
    pub fn rename(&self, id: &str, title: &str) -> Result<NotebookSession> {
        let title = title.trim();
        if title.is_empty() {
            return Err(MyIqError::InvalidInput("title cannot be empty".into()).into());
        }
        let mut nb = self
            .load(id)?
            .ok_or_else(|| MyIqError::NotFound(format!("notebook {}", id)))?;
        nb.title = title.to_string();
        self.save(&mut nb)?;
        Ok(nb)
    }
}

impl SessionStore for NotebookStore {
    type Record = NotebookSession;

    fn load(&self, id: &str) -> Result<Option<NotebookSession>> {
        read_json(&self.path_for(id)?, self.policy)
    }

    fn save(&self, notebook: &mut NotebookSession) -> Result<()> {
        let path = self.path_for(&notebook.id)?;
        notebook.touch();
        write_json(&path, notebook)?;
        tracing::debug!(notebook_id = %notebook.id, "Saved notebook");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        remove_if_exists(&self.path_for(id)?)
    }

    fn list(&self) -> Result<Vec<SessionSummary>> {
        let mut summaries: Vec<SessionSummary> = self
            .load_all()?
            .into_iter()
            .map(|n| SessionSummary {
                id: n.id,
                title: n.title,
                updated_at: n.updated_at,
            })
            .collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }
}
