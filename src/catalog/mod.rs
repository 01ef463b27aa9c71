//! Remote registry abstraction.
//!
//! The planner only talks to [`CatalogClient`]; [`ModrinthCatalog`] is the
//! production implementation.

mod modrinth;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use modrinth::{DEFAULT_API_URL, ModrinthCatalog};

/// One search result, ranked by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchHit {
    pub project_id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub latest_version: Option<String>,
}

/// A downloadable file of a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub filename: String,
    pub download_url: String,
    /// Stable content identifier (SHA-1 of the file).
    pub content_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Required,
    Optional,
    Incompatible,
    Embedded,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyType::Required => write!(f, "required"),
            DependencyType::Optional => write!(f, "optional"),
            DependencyType::Incompatible => write!(f, "incompatible"),
            DependencyType::Embedded => write!(f, "embedded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    pub project_id: Option<String>,
    pub dependency_type: DependencyType,
}

impl DependencyRef {
    pub fn is_required(&self) -> bool {
        self.dependency_type == DependencyType::Required
    }
}

/// One published version of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Release {
    /// Registry id of this version.
    pub id: String,
    pub project_id: String,
    pub version_number: String,
    pub files: Vec<FileRef>,
    pub dependencies: Vec<DependencyRef>,
    pub game_versions: Vec<String>,
}

/// Operations the resolver needs from the remote registry.
///
/// Any non-2xx answer surfaces as `Err`; callers treat it as "no data".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Free-text search limited to the given loader categories, best hit first.
    async fn search(&self, query: &str, loader_categories: &[String]) -> Result<Vec<SearchHit>>;

    /// All releases of a project built for any of the given loaders, newest first.
    async fn list_releases(
        &self,
        project_id: &str,
        loader_categories: &[String],
    ) -> Result<Vec<Release>>;

    /// Look up a project by id or slug.
    async fn project(&self, project_id: &str) -> Result<SearchHit>;

    /// Download an artifact.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
