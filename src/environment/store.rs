use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::error::PacmineError;
use crate::runtime::Runtime;

use super::Environment;

/// Name of the per-server state directory.
pub const STATE_DIR: &str = ".pacmine";

const ENV_FILE: &str = "env";

/// Reads and writes the environment file under `<root>/.pacmine/`.
pub struct EnvStore<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> EnvStore<'a, R> {
    pub fn new(runtime: &'a R, root: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            root: root.into(),
        }
    }

    /// `<root>/.pacmine`
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// `<root>/.pacmine/env`
    pub fn env_path(&self) -> PathBuf {
        self.state_dir().join(ENV_FILE)
    }

    pub fn is_initialized(&self) -> bool {
        self.runtime.exists(&self.env_path())
    }

    #[tracing::instrument(skip(self))]
    pub fn load(&self) -> Result<Environment> {
        let path = self.env_path();
        if !self.runtime.exists(&path) {
            return Err(PacmineError::EnvironmentNotInitialized { path }.into());
        }

        let content = self.runtime.read_to_string(&path)?;
        let env: Environment = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse environment file {:?}", path))?;
        debug!("Loaded environment {} {}", env.core, env.version);
        Ok(env)
    }

    /// Rewrites the environment file wholesale.
    #[tracing::instrument(skip(self))]
    pub fn save(&self, env: &Environment) -> Result<()> {
        let dir = self.state_dir();
        if !self.runtime.exists(&dir) {
            self.runtime.create_dir_all(&dir)?;
        }

        let content = serde_json::to_string(env)?;
        self.runtime
            .write(&self.env_path(), content.as_bytes())
            .with_context(|| format!("Failed to save environment to {:?}", self.env_path()))
    }
}
