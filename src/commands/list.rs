use anyhow::Result;
use log::debug;

use crate::{environment::EnvStore, package::ManifestStore, runtime::Runtime};

use super::config::Config;

/// List installed packages with their artifact file.
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    for line in list_lines(&runtime, &config)? {
        println!("{}", line);
    }
    Ok(())
}

fn list_lines<R: Runtime>(runtime: &R, config: &Config) -> Result<Vec<String>> {
    let store = EnvStore::new(runtime, &config.root);
    let env = store.load()?;
    let manifest = ManifestStore::open(runtime, &store.state_dir())?;

    if manifest.is_empty() {
        return Ok(vec!["No packages installed.".to_string()]);
    }

    debug!("Found {} package(s)", manifest.len());
    let install_dir = config.root.join(env.core.install_dir_name());

    let mut lines = vec!["Installed packages:".to_string()];
    for record in manifest.entries().values() {
        let Some(artifact) = record.artifact() else {
            lines.push(format!(" - {} {} (no file)", record.display_name, record.version_number));
            continue;
        };
        let missing = if runtime.exists(&install_dir.join(&artifact.filename)) {
            ""
        } else {
            " [missing]"
        };
        lines.push(format!(
            " - {} {} ({}){}",
            record.display_name, record.version_number, artifact.filename, missing
        ));
    }
    Ok(lines)
}
