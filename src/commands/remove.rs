use anyhow::Result;
use log::debug;
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

/// Remove installed packages matched by name, name fragment or slug.
#[tracing::instrument(skip(runtime, config))]
pub async fn remove<R: Runtime>(
    runtime: R,
    queries: &[String],
    yes: bool,
    config: Config,
) -> Result<()> {
    let catalog = config.catalog()?;
    run(&runtime, &catalog, queries, yes, &config.root).await?;
    Ok(())
}

pub async fn run<R: Runtime, C: CatalogClient>(
    runtime: &R,
    catalog: &C,
    queries: &[String],
    yes: bool,
    root: &Path,
) -> Result<TransactionReport> {
    let store = EnvStore::new(runtime, root);
    let env = store.load()?;

    let manifest = ManifestStore::open(runtime, &store.state_dir())?;
    debug!("{} package(s) installed", manifest.len());

    let plan = DependencyPlanner::new(catalog)
        .plan_removal(queries, manifest.entries())
        .inspect_err(print_plan_failure)?;
    print_skipped(&plan.warnings);

    let mut engine = TransactionEngine::new(runtime, catalog, manifest, root, env.core, yes);
    let report = engine.apply(plan, TransactionMode::Remove).await?;

    print_report(&report);
    Ok(report)
}
