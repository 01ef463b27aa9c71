//! Modrinth v2 registry client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use crate::http::HttpClient;

use super::{CatalogClient, DependencyRef, DependencyType, FileRef, Release, SearchHit};

pub const DEFAULT_API_URL: &str = "https://api.modrinth.com/v2";

/// Modrinth API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct SearchResponse {
        #[serde(default)]
        pub hits: Vec<SearchHit>,
    }

    #[derive(Deserialize, Debug)]
    pub struct SearchHit {
        pub project_id: String,
        pub slug: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub latest_version: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Project {
        pub id: String,
        pub slug: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Version {
        pub id: String,
        pub project_id: String,
        pub version_number: String,
        #[serde(default)]
        pub game_versions: Vec<String>,
        #[serde(default)]
        pub files: Vec<File>,
        #[serde(default)]
        pub dependencies: Vec<Dependency>,
    }

    #[derive(Deserialize, Debug)]
    pub struct File {
        pub url: String,
        pub filename: String,
        #[serde(default)]
        pub primary: bool,
        #[serde(default)]
        pub hashes: Hashes,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct Hashes {
        #[serde(default)]
        pub sha1: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Dependency {
        pub project_id: Option<String>,
        pub dependency_type: super::DependencyType,
    }
}

impl From<api::SearchHit> for SearchHit {
    fn from(hit: api::SearchHit) -> Self {
        SearchHit {
            project_id: hit.project_id,
            slug: hit.slug,
            title: hit.title,
            description: hit.description,
            latest_version: hit.latest_version,
        }
    }
}

impl From<api::Project> for SearchHit {
    fn from(project: api::Project) -> Self {
        SearchHit {
            project_id: project.id,
            slug: project.slug,
            title: project.title,
            description: project.description,
            latest_version: None,
        }
    }
}

impl From<api::Version> for Release {
    fn from(version: api::Version) -> Self {
        let mut files = version.files;
        // The primary file is the canonical artifact; keep registry order otherwise.
        if let Some(pos) = files.iter().position(|f| f.primary) {
            let primary = files.remove(pos);
            files.insert(0, primary);
        }

        Release {
            id: version.id,
            project_id: version.project_id,
            version_number: version.version_number,
            files: files
                .into_iter()
                .map(|f| FileRef {
                    filename: f.filename,
                    download_url: f.url,
                    content_id: f.hashes.sha1,
                })
                .collect(),
            dependencies: version
                .dependencies
                .into_iter()
                .map(|d| DependencyRef {
                    project_id: d.project_id,
                    dependency_type: d.dependency_type,
                })
                .collect(),
            game_versions: version.game_versions,
        }
    }
}

/// Registry client speaking the Modrinth v2 API.
pub struct ModrinthCatalog {
    http_client: HttpClient,
    api_url: String,
}

impl ModrinthCatalog {
    pub fn new(http_client: HttpClient, api_url: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `[["categories:paper","categories:spigot"]]` - one OR-group of loaders.
    fn category_facets(loader_categories: &[String]) -> Result<String> {
        let group: Vec<String> = loader_categories
            .iter()
            .map(|c| format!("categories:{}", c))
            .collect();
        Ok(serde_json::to_string(&[group])?)
    }
}

#[async_trait]
impl CatalogClient for ModrinthCatalog {
    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str, loader_categories: &[String]) -> Result<Vec<SearchHit>> {
        let url = format!("{}/search", self.api_url);
        let facets = Self::category_facets(loader_categories)?;
        debug!("Searching '{}' with facets {}", query, facets);

        let response: api::SearchResponse = self
            .http_client
            .get_json_with_query(&url, &[("query", query), ("facets", &facets)])
            .await
            .with_context(|| format!("Search for '{}' failed", query))?;

        Ok(response.hits.into_iter().map(SearchHit::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_releases(
        &self,
        project_id: &str,
        loader_categories: &[String],
    ) -> Result<Vec<Release>> {
        let url = format!("{}/project/{}/version", self.api_url, project_id);
        let loaders = serde_json::to_string(loader_categories)?;

        let versions: Vec<api::Version> = self
            .http_client
            .get_json_with_query(&url, &[("loaders", &loaders)])
            .await
            .with_context(|| format!("Failed to list releases of {}", project_id))?;

        debug!("{} has {} release(s)", project_id, versions.len());
        Ok(versions.into_iter().map(Release::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn project(&self, project_id: &str) -> Result<SearchHit> {
        let url = format!("{}/project/{}", self.api_url, project_id);
        let project: api::Project = self
            .http_client
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to look up project {}", project_id))?;
        Ok(project.into())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.http_client
            .get_bytes(url)
            .await
            .with_context(|| format!("Failed to download {}", url))
    }
}
