use anyhow::{Context, Result};

use crate::catalog::{CatalogClient, SearchHit};
use crate::environment::EnvStore;
use crate::runtime::Runtime;

use super::config::Config;

/// Search the registry for packages compatible with the configured core.
#[tracing::instrument(skip(runtime, config))]
pub async fn search<R: Runtime>(runtime: R, query: &str, config: Config) -> Result<()> {
    let catalog = config.catalog()?;
    let env = EnvStore::new(&runtime, &config.root).load()?;
    println!("Searching packages... {} {}", env.version, env.core);

    let hits = run(&catalog, query, env.core.loader_categories()).await?;
    if hits.is_empty() {
        println!("No packages found.");
        return Ok(());
    }

    println!("Found {} package(s):", hits.len());
    for hit in &hits {
        println!("{}", format_hit(hit));
    }
    Ok(())
}

pub async fn run<C: CatalogClient>(
    catalog: &C,
    query: &str,
    loader_categories: &[&str],
) -> Result<Vec<SearchHit>> {
    let loaders: Vec<String> = loader_categories.iter().map(|s| s.to_string()).collect();
    catalog
        .search(query, &loaders)
        .await
        .with_context(|| format!("Registry search for '{}' failed", query))
}

fn format_hit(hit: &SearchHit) -> String {
    if hit.description.is_empty() {
        format!("  {} ({})", hit.title, hit.slug)
    } else {
        format!("  {} ({}) - {}", hit.title, hit.slug, hit.description)
    }
}
