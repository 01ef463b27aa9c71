use anyhow::Result;
use std::path::Path;

use crate::application::{
    DependencyPlanner, TransactionEngine, TransactionMode, TransactionReport,
};
use crate::catalog::CatalogClient;
use crate::environment::EnvStore;
use crate::package::ManifestStore;
use crate::runtime::Runtime;

use super::config::Config;
use super::report::{print_plan_failure, print_report, print_skipped};

/// Install packages by name together with their required dependencies.
#[tracing::instrument(skip(runtime, config))]
pub async fn install<R: Runtime>(
    runtime: R,
    names: &[String],
    yes: bool,
    config: Config,
) -> Result<()> {
    let catalog = config.catalog()?;
    run(&runtime, &catalog, names, yes, &config.root).await?;
    Ok(())
}

pub async fn run<R: Runtime, C: CatalogClient>(
    runtime: &R,
    catalog: &C,
    names: &[String],
    yes: bool,
    root: &Path,
) -> Result<TransactionReport> {
    let store = EnvStore::new(runtime, root);
    let env = store.load()?;
    println!("   resolving {} for {} {}", names.join(", "), env.core, env.version);

    let plan = DependencyPlanner::new(catalog)
        .plan(names, &env)
        .await
        .inspect_err(print_plan_failure)?;
    print_skipped(&plan.warnings);

    let manifest = ManifestStore::open(runtime, &store.state_dir())?;
    let mut engine = TransactionEngine::new(runtime, catalog, manifest, root, env.core, yes);
    let report = engine.apply(plan, TransactionMode::Install).await?;

    print_report(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ItemOutcome;
    use crate::catalog::{FileRef, MockCatalogClient, Release, SearchHit};
    use crate::environment::{Core, Environment};
    use crate::error::PacmineError;
    use crate::runtime::{MockRuntime, RealRuntime};
    use tempfile::tempdir;

    fn lumina_catalog() -> MockCatalogClient {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_search().returning(|_, _| {
            Ok(vec![SearchHit {
                project_id: "P1".into(),
                slug: "luminacore".into(),
                title: "LuminaCore".into(),
                ..Default::default()
            }])
        });
        catalog.expect_list_releases().returning(|_, _| {
            Ok(vec![
                Release {
                    id: "old".into(),
                    project_id: "P1".into(),
                    version_number: "1.0".into(),
                    files: vec![FileRef {
                        filename: "lumina-1.0.jar".into(),
                        download_url: "https://cdn/lumina-1.0.jar".into(),
                        content_id: "a".into(),
                    }],
                    dependencies: vec![],
                    game_versions: vec!["1.19.4".into()],
                },
                Release {
                    id: "new".into(),
                    project_id: "P1".into(),
                    version_number: "2.0".into(),
                    files: vec![FileRef {
                        filename: "lumina-2.0.jar".into(),
                        download_url: "https://cdn/lumina-2.0.jar".into(),
                        content_id: "b".into(),
                    }],
                    dependencies: vec![],
                    game_versions: vec!["1.20.1".into()],
                },
            ])
        });
        catalog
            .expect_fetch_bytes()
            .returning(|_| Ok(b"jar".to_vec()));
        catalog
    }

    fn init_env(root: &Path, env: &Environment) {
        EnvStore::new(&RealRuntime, root).save(env).unwrap();
    }

    #[tokio::test]
    async fn test_install_requires_environment() {
        let dir = tempdir().unwrap();
        let catalog = MockCatalogClient::new();

        let err = run(&RealRuntime, &catalog, &["lumina".into()], true, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PacmineError>(),
            Some(PacmineError::EnvironmentNotInitialized { .. })
        ));
    }

    #[tokio::test]
    async fn test_install_end_to_end_and_reinstall_is_idempotent() {
        let dir = tempdir().unwrap();
        init_env(dir.path(), &Environment::new("1.20.1", Core::Paper));
        let catalog = lumina_catalog();

        let report = run(&RealRuntime, &catalog, &["lumina".into()], true, dir.path())
            .await
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.items[0].outcome, ItemOutcome::Installed);
        assert!(dir.path().join("plugins/lumina-2.0.jar").exists());

        let manifest_path = dir.path().join(".pacmine/plugins.json");
        let first = std::fs::read(&manifest_path).unwrap();

        run(&RealRuntime, &catalog, &["lumina".into()], true, dir.path())
            .await
            .unwrap();
        assert_eq!(std::fs::read(&manifest_path).unwrap(), first);
    }

    #[tokio::test]
    async fn test_install_cancelled_leaves_no_trace() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .returning(|p| p == Path::new("/srv/.pacmine/env"));
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"version":"1.20.1","core":"paper"}"#.into()));
        runtime.expect_confirm().returning(|_| Ok(false));
        runtime.expect_write().never();
        runtime.expect_rename().never();
        runtime.expect_create_dir_all().never();

        let mut catalog = MockCatalogClient::new();
        catalog.expect_search().returning(|_, _| {
            Ok(vec![SearchHit {
                project_id: "P1".into(),
                slug: "luminacore".into(),
                title: "LuminaCore".into(),
                ..Default::default()
            }])
        });
        catalog.expect_list_releases().returning(|_, _| {
            Ok(vec![Release {
                project_id: "P1".into(),
                files: vec![FileRef {
                    filename: "lumina.jar".into(),
                    download_url: "https://cdn/lumina.jar".into(),
                    content_id: "a".into(),
                }],
                game_versions: vec!["1.20.1".into()],
                ..Default::default()
            }])
        });
        catalog.expect_fetch_bytes().never();

        let report = run(&runtime, &catalog, &["lumina".into()], false, Path::new("/srv"))
            .await
            .unwrap();
        assert!(report.cancelled);
    }
}
