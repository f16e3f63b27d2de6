//! Configuration file loader with multi-source merging

use super::file_config::{ConfigValidationError, FileConfig, ResolvedConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["council.toml", ".council.toml"];
const ENV_PREFIX: &str = "COUNCIL_";

/// Where a configuration layer comes from, for `config show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (`COUNCIL_EXECUTION__QUORUM_FLOOR=0.9`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./council.toml` or `./.council.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/agent-council/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(PathBuf::as_path),
        )
        .extract()
        .map_err(Box::new)
    }

    /// Load and validate in one step.
    pub fn load_resolved(
        config_path: Option<&PathBuf>,
    ) -> Result<(FileConfig, ResolvedConfig), ConfigValidationError> {
        let config = Self::load(config_path)?;
        let resolved = config.resolve()?;
        Ok((config, resolved))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/agent-council/config.toml if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("agent-council").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Config file locations in priority order (highest first).
    pub fn sources(config_path: Option<&PathBuf>) -> Vec<ConfigSource> {
        let mut sources = vec![ConfigSource {
            label: "Env",
            location: format!("{}*", ENV_PREFIX),
            found: std::env::vars().any(|(k, _)| k.starts_with(ENV_PREFIX)),
        }];

        if let Some(path) = config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                label: "Project",
                location: path.display().to_string(),
                found: true,
            },
            None => ConfigSource {
                label: "Project",
                location: PROJECT_FILES.map(|f| format!("./{}", f)).join(" or "),
                found: false,
            },
        });

        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                found: path.exists(),
                location: path.display().to_string(),
            });
        }

        sources.push(ConfigSource {
            label: "Default",
            location: "built-in defaults".to_string(),
            found: true,
        });
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.agents.is_empty());
        assert_eq!(config.roster.min_size, 4);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("agent-council"));
    }

    #[test]
    fn test_layers_merge_in_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("council.toml");
        let explicit = dir.path().join("explicit.toml");

        fs::write(
            &global,
            "[roster]\nmin_size = 2\nmax_size = 8\n\n[council]\nmax_rounds = 2\n",
        )
        .unwrap();
        fs::write(&project, "[roster]\nmax_size = 10\n").unwrap();
        fs::write(&explicit, "[council]\nmax_rounds = 6\n").unwrap();

        let config: FileConfig =
            ConfigLoader::figment(Some(&global), Some(&project), Some(&explicit))
                .extract()
                .unwrap();

        assert_eq!(config.roster.min_size, 2);
        assert_eq!(config.roster.max_size, 10);
        assert_eq!(config.council.max_rounds, 6);
        assert_eq!(config.council.pass_threshold, 0.95);
    }

    #[test]
    fn test_agents_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("council.toml");
        fs::write(
            &path,
            r#"
[[agents]]
id = "security"
mandatory = true

[[agents]]
id = "cost"
triggers = ["budget"]
"#,
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::figment(None, None, Some(&path))
            .extract()
            .unwrap();
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[1].triggers, vec!["budget"]);
    }

    #[test]
    fn test_sources_end_with_defaults() {
        let sources = ConfigLoader::sources(None);
        assert_eq!(sources.first().map(|s| s.label), Some("Env"));
        assert_eq!(sources.last().map(|s| s.label), Some("Default"));
    }
}
