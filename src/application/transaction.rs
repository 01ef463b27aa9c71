//! Applies an installation plan to disk and keeps the manifest in step.
//!
//! Install items move through `Downloading -> Writing -> Recording`; the
//! manifest entry is only written once the artifact is on disk, and the jar
//! of a replaced version is deleted after that. A failing item is reported
//! and the run continues with the next one.

use anyhow::Result;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::{CatalogClient, FileRef};
use crate::environment::Core;
use crate::error::PacmineError;
use crate::package::{ManifestStore, PackageRecord};
use crate::runtime::Runtime;

use super::planner::{InstallationPlan, PlanItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    Install,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Installed,
    Removed,
    Failed,
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Installed => write!(f, "installed"),
            ItemOutcome::Removed => write!(f, "removed"),
            ItemOutcome::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub project_id: String,
    pub name: String,
    pub outcome: ItemOutcome,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionReport {
    pub mode: TransactionMode,
    pub cancelled: bool,
    pub items: Vec<ItemReport>,
}

impl TransactionReport {
    fn cancelled(mode: TransactionMode) -> Self {
        Self {
            mode,
            cancelled: true,
            items: vec![],
        }
    }

    /// True only when the run was confirmed and every item succeeded.
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.items.iter().all(|i| i.outcome != ItemOutcome::Failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items
            .iter()
            .filter(|i| i.outcome == ItemOutcome::Failed)
    }
}

#[derive(Debug, Clone, Copy)]
enum InstallStage {
    Preparing,
    Downloading,
    Writing,
    Recording,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStage::Preparing => write!(f, "prepare"),
            InstallStage::Downloading => write!(f, "download"),
            InstallStage::Writing => write!(f, "write"),
            InstallStage::Recording => write!(f, "record"),
        }
    }
}

pub struct TransactionEngine<'a, R: Runtime, C: CatalogClient> {
    runtime: &'a R,
    catalog: &'a C,
    manifest: ManifestStore<'a, R>,
    install_dir: PathBuf,
    auto_confirm: bool,
}

impl<'a, R: Runtime, C: CatalogClient> TransactionEngine<'a, R, C> {
    /// `root` is the server directory; artifacts go to `<root>/plugins` or
    /// `<root>/mods` depending on `core`.
    pub fn new(
        runtime: &'a R,
        catalog: &'a C,
        manifest: ManifestStore<'a, R>,
        root: &Path,
        core: Core,
        auto_confirm: bool,
    ) -> Self {
        Self {
            runtime,
            catalog,
            manifest,
            install_dir: root.join(core.install_dir_name()),
            auto_confirm,
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn manifest(&self) -> &ManifestStore<'a, R> {
        &self.manifest
    }

    #[tracing::instrument(skip(self, plan), fields(items = plan.len()))]
    pub async fn apply(
        &mut self,
        plan: InstallationPlan,
        mode: TransactionMode,
    ) -> Result<TransactionReport> {
        self.show_plan(&plan, mode);
        if !self.auto_confirm {
            let prompt = match mode {
                TransactionMode::Install => "Proceed with installation?",
                TransactionMode::Remove => "Proceed with removal?",
            };
            if !self.runtime.confirm(prompt)? {
                info!("Transaction declined");
                return Ok(TransactionReport::cancelled(mode));
            }
        }

        let mut items = Vec::with_capacity(plan.len());
        for item in plan.items {
            let report = match mode {
                TransactionMode::Install => self.install_item(item).await,
                TransactionMode::Remove => self.remove_item(item),
            };
            if report.outcome == ItemOutcome::Failed {
                warn!("{}: {}", report.name, report.detail);
            }
            items.push(report);
        }

        Ok(TransactionReport {
            mode,
            cancelled: false,
            items,
        })
    }

    async fn install_item(&mut self, item: PlanItem) -> ItemReport {
        let package = item.package;
        let project_id = package.project_id.clone();
        let name = package.display_name.clone();

        match self.install_package(package).await {
            Ok(path) => ItemReport {
                project_id,
                name,
                outcome: ItemOutcome::Installed,
                detail: path.display().to_string(),
            },
            Err((stage, e)) => ItemReport {
                project_id,
                name,
                outcome: ItemOutcome::Failed,
                detail: format!("{} failed: {:#}", stage, e),
            },
        }
    }

    async fn install_package(
        &mut self,
        package: PackageRecord,
    ) -> Result<PathBuf, (InstallStage, anyhow::Error)> {
        let (target, artifact) = self
            .artifact_target(&package)
            .map_err(|e| (InstallStage::Preparing, e.into()))?;
        let url = artifact.download_url.clone();
        let replaced = self
            .manifest
            .get(&package.project_id)
            .and_then(PackageRecord::artifact)
            .map(|previous| previous.filename.clone())
            .filter(|previous| *previous != artifact.filename);

        debug!("{}: downloading {}", package.project_id, url);
        let bytes = self
            .catalog
            .fetch_bytes(&url)
            .await
            .map_err(|e| (InstallStage::Downloading, e))?;

        debug!("{}: writing {:?}", package.project_id, target);
        self.write_artifact(&target, &bytes)
            .map_err(|e| (InstallStage::Writing, e))?;

        debug!("{}: recording", package.project_id);
        self.manifest
            .upsert(package)
            .map_err(|e| (InstallStage::Recording, e))?;

        if let Some(previous) = replaced {
            self.remove_replaced(&previous);
        }

        Ok(target)
    }

    /// Delete the artifact of the version that was just replaced. The new
    /// one is already recorded, so failures only get logged.
    fn remove_replaced(&self, filename: &str) {
        let Some(path) = self.plain_target(filename) else {
            warn!("Not removing previous artifact with unsafe name '{}'", filename);
            return;
        };
        if !self.runtime.exists(&path) {
            return;
        }
        match self.runtime.remove_file(&path) {
            Ok(()) => info!("Removed previous artifact {:?}", path),
            Err(e) => warn!("Could not remove previous artifact {:?}: {:#}", path, e),
        }
    }

    fn write_artifact(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let write = || -> Result<()> {
            if !self.runtime.exists(&self.install_dir) {
                self.runtime.create_dir_all(&self.install_dir)?;
            }
            self.runtime.write(target, bytes)
        };

        write().map_err(|e| {
            PacmineError::ArtifactWriteFailed {
                filename: target.display().to_string(),
                reason: format!("{:#}", e),
            }
            .into()
        })
    }

    fn remove_item(&mut self, item: PlanItem) -> ItemReport {
        let package = item.package;
        let mut report = ItemReport {
            project_id: package.project_id.clone(),
            name: package.display_name.clone(),
            outcome: ItemOutcome::Removed,
            detail: String::new(),
        };

        match self.artifact_target(&package).map(|(target, _)| target) {
            Ok(target) if self.runtime.exists(&target) => {
                match self.runtime.remove_file(&target) {
                    Ok(()) => report.detail = target.display().to_string(),
                    Err(e) => {
                        report.outcome = ItemOutcome::Failed;
                        report.detail = format!("delete failed: {:#}", e);
                    }
                }
            }
            Ok(target) => {
                info!("{:?} is already gone", target);
                report.detail = format!("{} (file already absent)", target.display());
            }
            Err(e) => {
                warn!("{}", e);
                report.detail = "no artifact on record".to_string();
            }
        }

        if let Err(e) = self.manifest.remove(&package.project_id) {
            report.outcome = ItemOutcome::Failed;
            report.detail = format!("manifest update failed: {:#}", e);
        }

        report
    }

    /// `<install_dir>/<filename>` for the record's first file.
    fn artifact_target<'p>(
        &self,
        package: &'p PackageRecord,
    ) -> Result<(PathBuf, &'p FileRef), PacmineError> {
        let artifact = package
            .artifact()
            .ok_or_else(|| PacmineError::InvalidArtifact {
                name: package.display_name.clone(),
                reason: "no files".to_string(),
            })?;

        let target = self.plain_target(&artifact.filename).ok_or_else(|| {
            PacmineError::InvalidArtifact {
                name: package.display_name.clone(),
                reason: format!("unsafe filename '{}'", artifact.filename),
            }
        })?;

        Ok((target, artifact))
    }

    /// `<install_dir>/<filename>`, or `None` if `filename` is not a bare file name.
    fn plain_target(&self, filename: &str) -> Option<PathBuf> {
        let path = Path::new(filename);
        let is_plain = path.file_name().is_some_and(|f| f == path.as_os_str())
            && filename != "."
            && filename != ".."
            && !filename.contains(['/', '\\']);
        is_plain.then(|| self.install_dir.join(filename))
    }

    fn show_plan(&self, plan: &InstallationPlan, mode: TransactionMode) {
        println!();
        match mode {
            TransactionMode::Install => println!("=== Installation Plan ==="),
            TransactionMode::Remove => println!("=== Removal Plan ==="),
        }
        println!();

        let line = |item: &PlanItem| {
            let file = item
                .package
                .artifact()
                .map(|f| f.filename.as_str())
                .unwrap_or("?");
            format!(
                "  {} {} ({})",
                item.package.display_name, item.package.version_number, file
            )
        };

        println!("Packages:");
        for item in plan.primaries() {
            println!("{}", line(item));
        }

        let mut dependencies = plan.dependencies().peekable();
        if dependencies.peek().is_some() {
            println!();
            println!("Dependencies:");
            for item in dependencies {
                println!("{}", line(item));
            }
        }

        println!();
        println!("Directory: {}", self.install_dir.display());
        println!();
    }
}
