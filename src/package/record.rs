use serde::{Deserialize, Serialize};

use crate::catalog::{DependencyRef, FileRef, Release, SearchHit};
use crate::error::PacmineError;

/// One installable artifact as recorded in the manifest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub project_id: String,
    pub display_name: String,
    pub slug: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub version_number: String,
    /// First entry is the artifact that gets installed.
    pub files: Vec<FileRef>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
    #[serde(default)]
    pub supported_runtime_versions: Vec<String>,
}

impl PackageRecord {
    /// Combine a project's identity with the release chosen for it.
    pub fn from_release(project: &SearchHit, release: Release) -> Result<Self, PacmineError> {
        if release.files.is_empty() {
            return Err(PacmineError::InvalidArtifact {
                name: project.title.clone(),
                reason: format!("release {} has no files", release.version_number),
            });
        }

        let project_id = if release.project_id.is_empty() {
            project.project_id.clone()
        } else {
            release.project_id
        };

        Ok(Self {
            project_id,
            display_name: project.title.clone(),
            slug: project.slug.clone(),
            version_id: release.id,
            version_number: release.version_number,
            files: release.files,
            dependencies: release.dependencies,
            supported_runtime_versions: release.game_versions,
        })
    }

    /// The canonical artifact, `None` only for hand-edited manifests.
    pub fn artifact(&self) -> Option<&FileRef> {
        self.files.first()
    }

    pub fn required_dependencies(&self) -> impl Iterator<Item = &DependencyRef> {
        self.dependencies.iter().filter(|d| d.is_required())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DependencyType;

    fn hit() -> SearchHit {
        SearchHit {
            project_id: "P1".into(),
            slug: "luminacore".into(),
            title: "LuminaCore".into(),
            ..Default::default()
        }
    }

    fn file(name: &str) -> FileRef {
        FileRef {
            filename: name.into(),
            download_url: format!("https://cdn/{}", name),
            content_id: "sha".into(),
        }
    }

    #[test]
    fn test_from_release() {
        let release = Release {
            id: "V1".into(),
            project_id: "P1".into(),
            version_number: "2.1.0".into(),
            files: vec![file("lumina.jar"), file("lumina-sources.jar")],
            dependencies: vec![
                DependencyRef {
                    project_id: Some("LIB".into()),
                    dependency_type: DependencyType::Required,
                },
                DependencyRef {
                    project_id: Some("OPT".into()),
                    dependency_type: DependencyType::Optional,
                },
            ],
            game_versions: vec!["1.20.1".into()],
        };

        let record = PackageRecord::from_release(&hit(), release).unwrap();

        assert_eq!(record.project_id, "P1");
        assert_eq!(record.display_name, "LuminaCore");
        assert_eq!(record.slug, "luminacore");
        assert_eq!(record.artifact().unwrap().filename, "lumina.jar");
        let required: Vec<_> = record.required_dependencies().collect();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].project_id.as_deref(), Some("LIB"));
        assert_eq!(record.supported_runtime_versions, vec!["1.20.1".to_string()]);
    }

    #[test]
    fn test_from_release_without_files() {
        let release = Release {
            project_id: "P1".into(),
            ..Default::default()
        };
        let err = PackageRecord::from_release(&hit(), release).unwrap_err();
        assert!(matches!(err, PacmineError::InvalidArtifact { .. }));
    }

    #[test]
    fn test_from_release_falls_back_to_hit_id() {
        let release = Release {
            files: vec![file("a.jar")],
            ..Default::default()
        };
        let record = PackageRecord::from_release(&hit(), release).unwrap();
        assert_eq!(record.project_id, "P1");
    }
}
