use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::{catalog::ModrinthCatalog, http::HttpClient, runtime::Runtime};

/// Resolved global options shared by every command.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server directory holding `.pacmine/`, `plugins/` and `mods/`.
    pub root: PathBuf,
    pub api_url: Option<String>,
}

impl Config {
    pub fn new<R: Runtime>(
        runtime: &R,
        root: Option<PathBuf>,
        api_url: Option<String>,
    ) -> Result<Self> {
        let root = match root {
            Some(path) => path,
            None => runtime.current_dir()?,
        };
        debug!("Using server root {:?}", root);
        Ok(Self { root, api_url })
    }

    pub fn catalog(&self) -> Result<ModrinthCatalog> {
        let http_client = HttpClient::for_registry()?;
        Ok(ModrinthCatalog::new(http_client, self.api_url.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_API_URL;
    use crate::runtime::MockRuntime;

    #[test]
    fn test_explicit_root_wins() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().never();

        let config = Config::new(&runtime, Some(PathBuf::from("/srv/mc")), None).unwrap();
        assert_eq!(config.root, PathBuf::from("/srv/mc"));
    }

    #[test]
    fn test_defaults_to_current_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/home/user/server")));

        let config = Config::new(&runtime, None, None).unwrap();
        assert_eq!(config.root, PathBuf::from("/home/user/server"));
    }

    #[test]
    fn test_catalog_uses_api_url() {
        let runtime = MockRuntime::new();
        let config = Config::new(
            &runtime,
            Some(PathBuf::from("/srv")),
            Some("http://localhost:9000".into()),
        )
        .unwrap();
        assert_eq!(config.catalog().unwrap().api_url(), "http://localhost:9000");

        let config = Config::new(&runtime, Some(PathBuf::from("/srv")), None).unwrap();
        assert_eq!(config.catalog().unwrap().api_url(), DEFAULT_API_URL);
    }
}
