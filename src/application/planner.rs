//! Turns user requests into an ordered installation or removal plan.

use anyhow::Result;
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;

use crate::catalog::{CatalogClient, DependencyRef, SearchHit};
use crate::environment::Environment;
use crate::error::PacmineError;
use crate::package::{Manifest, PackageRecord, VersionResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanReason {
    Primary,
    Dependency,
}

impl fmt::Display for PlanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanReason::Primary => write!(f, "primary"),
            PlanReason::Dependency => write!(f, "dependency"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanItem {
    pub package: PackageRecord,
    pub reason: PlanReason,
}

/// Ordered packages for one transaction plus the requests that were dropped.
#[derive(Debug, Default)]
pub struct InstallationPlan {
    pub items: Vec<PlanItem>,
    pub warnings: Vec<PacmineError>,
}

impl InstallationPlan {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn primaries(&self) -> impl Iterator<Item = &PlanItem> {
        self.items.iter().filter(|i| i.reason == PlanReason::Primary)
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &PlanItem> {
        self.items
            .iter()
            .filter(|i| i.reason == PlanReason::Dependency)
    }

    fn push(&mut self, package: PackageRecord, reason: PlanReason) {
        self.items.push(PlanItem { package, reason });
    }

    fn warn(&mut self, error: PacmineError) {
        info!("Skipping: {}", error);
        self.warnings.push(error);
    }
}

pub struct DependencyPlanner<'a, C: CatalogClient> {
    catalog: &'a C,
}

impl<'a, C: CatalogClient> DependencyPlanner<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Resolve `requests` in order, then add their required dependencies
    /// (one level deep). Every project id appears at most once.
    #[tracing::instrument(skip(self))]
    pub async fn plan(&self, requests: &[String], env: &Environment) -> Result<InstallationPlan> {
        let mut plan = InstallationPlan::default();
        let mut seen: HashSet<String> = HashSet::new();

        for request in requests {
            match self.resolve_request(request, env).await {
                Ok(record) => {
                    if !seen.insert(record.project_id.clone()) {
                        debug!("{} already planned, skipping", record.project_id);
                        continue;
                    }
                    info!(
                        "Resolved '{}' to {} {}",
                        request, record.display_name, record.version_number
                    );
                    plan.push(record, PlanReason::Primary);
                }
                Err(e) => plan.warn(e),
            }
        }

        let required: Vec<(String, DependencyRef)> = plan
            .primaries()
            .flat_map(|item| {
                item.package
                    .required_dependencies()
                    .map(|dep| (item.package.display_name.clone(), dep.clone()))
            })
            .collect();

        for (parent, dep) in required {
            if let Some(id) = &dep.project_id
                && seen.contains(id)
            {
                continue;
            }

            match self.resolve_dependency(&dep, &parent, env).await {
                Ok(record) => {
                    if !seen.insert(record.project_id.clone()) {
                        continue;
                    }
                    info!(
                        "Adding {} {} (required by {})",
                        record.display_name, record.version_number, parent
                    );
                    plan.push(record, PlanReason::Dependency);
                }
                Err(e) => plan.warn(e),
            }
        }

        if plan.is_empty() {
            return Err(PacmineError::NoResolvablePackages {
                reasons: plan.warnings,
            }
            .into());
        }
        Ok(plan)
    }

    /// Match each query against the installed manifest.
    ///
    /// Per query: exact name, then name substring, then exact slug, all
    /// case-insensitive; first hit in manifest order wins. A blank query
    /// matches nothing.
    #[tracing::instrument(skip(self, manifest))]
    pub fn plan_removal(&self, queries: &[String], manifest: &Manifest) -> Result<InstallationPlan> {
        let mut plan = InstallationPlan::default();
        let mut seen: HashSet<String> = HashSet::new();

        for query in queries {
            match find_installed(query, manifest) {
                Some(record) => {
                    if seen.insert(record.project_id.clone()) {
                        plan.push(record.clone(), PlanReason::Primary);
                    }
                }
                None => plan.warn(PacmineError::NotInstalled {
                    query: query.clone(),
                }),
            }
        }

        if plan.is_empty() {
            return Err(PacmineError::NoResolvablePackages {
                reasons: plan.warnings,
            }
            .into());
        }
        Ok(plan)
    }

    async fn resolve_request(
        &self,
        query: &str,
        env: &Environment,
    ) -> Result<PackageRecord, PacmineError> {
        let loaders = loader_categories(env);
        let hits = self
            .catalog
            .search(query, &loaders)
            .await
            .map_err(|e| PacmineError::CatalogUnavailable {
                query: query.to_string(),
                reason: format!("{:#}", e),
            })?;

        let top = hits
            .into_iter()
            .next()
            .ok_or_else(|| PacmineError::CatalogEmpty {
                query: query.to_string(),
            })?;

        self.resolve_project(&top, env).await
    }

    async fn resolve_dependency(
        &self,
        dep: &DependencyRef,
        parent: &str,
        env: &Environment,
    ) -> Result<PackageRecord, PacmineError> {
        let project_id = dep
            .project_id
            .as_deref()
            .ok_or_else(|| PacmineError::DependencyUnidentified {
                parent: parent.to_string(),
            })?;

        let project = self.catalog.project(project_id).await.map_err(|e| {
            PacmineError::CatalogUnavailable {
                query: project_id.to_string(),
                reason: format!("{:#}", e),
            }
        })?;

        self.resolve_project(&project, env).await
    }

    async fn resolve_project(
        &self,
        project: &SearchHit,
        env: &Environment,
    ) -> Result<PackageRecord, PacmineError> {
        let loaders = loader_categories(env);
        let releases = self
            .catalog
            .list_releases(&project.project_id, &loaders)
            .await
            .map_err(|e| PacmineError::CatalogUnavailable {
                query: project.title.clone(),
                reason: format!("{:#}", e),
            })?;

        let release = VersionResolver::resolve(&env.version, &releases).ok_or_else(|| {
            PacmineError::NoCompatibleVersion {
                name: project.title.clone(),
                runtime_version: env.version.clone(),
            }
        })?;

        PackageRecord::from_release(project, release.clone())
    }
}

fn loader_categories(env: &Environment) -> Vec<String> {
    env.core
        .loader_categories()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn find_installed<'m>(query: &str, manifest: &'m Manifest) -> Option<&'m PackageRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    let records = || manifest.values();

    records()
        .find(|r| r.display_name.to_lowercase() == query)
        .or_else(|| records().find(|r| r.display_name.to_lowercase().contains(&query)))
        .or_else(|| records().find(|r| r.slug.to_lowercase() == query))
}
