//! Durable record of installed packages.
//!
//! The manifest is a single JSON object `project_id -> PackageRecord`. Every
//! mutation rewrites the whole document through a temporary file and a
//! rename, so readers never observe a half-written manifest.

use anyhow::{Context, Result};
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

use super::PackageRecord;

pub type Manifest = BTreeMap<String, PackageRecord>;

const MANIFEST_FILE: &str = "plugins.json";

pub struct ManifestStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
    entries: Manifest,
}

impl<'a, R: Runtime> ManifestStore<'a, R> {
    /// Load `<state_dir>/plugins.json`, or start empty if it does not exist yet.
    ///
    /// Opening never creates the file.
    #[tracing::instrument(skip(runtime))]
    pub fn open(runtime: &'a R, state_dir: &Path) -> Result<Self> {
        let path = state_dir.join(MANIFEST_FILE);
        let entries = if runtime.exists(&path) {
            let content = runtime.read_to_string(&path)?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse manifest {:?}", path))?
        } else {
            debug!("No manifest at {:?}, starting empty", path);
            Manifest::new()
        };

        Ok(Self {
            runtime,
            path,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &Manifest {
        &self.entries
    }

    pub fn get(&self, project_id: &str) -> Option<&PackageRecord> {
        self.entries.get(project_id)
    }

    pub fn contains(&self, project_id: &str) -> bool {
        self.entries.contains_key(project_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the record for its project id and persist.
    pub fn upsert(&mut self, record: PackageRecord) -> Result<()> {
        let mut next = self.entries.clone();
        next.insert(record.project_id.clone(), record);
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }

    /// Drop the record for `project_id` and persist. Missing ids are a no-op.
    pub fn remove(&mut self, project_id: &str) -> Result<Option<PackageRecord>> {
        if !self.entries.contains_key(project_id) {
            return Ok(None);
        }

        let mut next = self.entries.clone();
        let removed = next.remove(project_id);
        self.persist(&next)?;
        self.entries = next;
        Ok(removed)
    }

    fn persist(&self, entries: &Manifest) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !self.runtime.exists(parent)
        {
            self.runtime.create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        self.runtime
            .write(&tmp, content.as_bytes())
            .with_context(|| format!("Failed to write manifest to {:?}", tmp))?;
        self.runtime
            .rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace manifest {:?}", self.path))?;

        debug!("Saved {} record(s) to {:?}", entries.len(), self.path);
        Ok(())
    }
}
