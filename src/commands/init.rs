use anyhow::Result;
use log::debug;

use crate::environment::{Core, EnvStore, Environment};
use crate::runtime::Runtime;

use super::config::Config;

/// Select core and game version for the server directory.
///
/// Missing values are asked for interactively. The core is validated
/// before anything is written.
#[tracing::instrument(skip(runtime, config))]
pub fn init<R: Runtime>(
    runtime: R,
    version: Option<String>,
    core: Option<String>,
    config: Config,
) -> Result<()> {
    let version = match version {
        Some(v) => v.trim().to_string(),
        None => runtime.prompt("Version:")?,
    };
    let core = match core {
        Some(c) => c,
        None => runtime.prompt("Core:")?,
    };
    let core: Core = core.parse()?;

    let store = EnvStore::new(&runtime, &config.root);
    if store.is_initialized() {
        debug!("Overwriting existing environment at {:?}", store.env_path());
    }
    store.save(&Environment::new(version.clone(), core))?;

    println!(
        "Initialized {} {} in {}",
        core,
        if version.is_empty() { "(latest)" } else { &version },
        config.root.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PacmineError;
    use crate::runtime::MockRuntime;
    use std::path::{Path, PathBuf};

    fn config() -> Config {
        Config {
            root: PathBuf::from("/srv"),
            api_url: None,
        }
    }

    #[test]
    fn test_init_prompts_for_missing_values() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_prompt()
            .withf(|q| q == "Version:")
            .returning(|_| Ok("1.20.1".into()));
        runtime
            .expect_prompt()
            .withf(|q| q == "Core:")
            .returning(|_| Ok("Paper".into()));
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_write()
            .withf(|path, contents| {
                path == Path::new("/srv/.pacmine/env")
                    && contents == br#"{"version":"1.20.1","core":"paper"}"#
            })
            .times(1)
            .returning(|_, _| Ok(()));

        init(runtime, None, None, config()).unwrap();
    }

    #[test]
    fn test_init_rejects_unsupported_core_before_writing() {
        let mut runtime = MockRuntime::new();
        runtime.expect_prompt().never();
        runtime.expect_write().never();
        runtime.expect_create_dir_all().never();

        let err = init(
            runtime,
            Some("1.20.1".into()),
            Some("sponge".into()),
            config(),
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PacmineError>(),
            Some(PacmineError::UnsupportedCore(..))
        ));
    }
}
