use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use home::home_dir;
use serde::Deserialize;

use crate::{fetch::DEFAULT_GIT_HOST, git::DEFAULT_SUBMODULE_JOBS};

const CONFIG_FILE: &str = ".armsdk/config.toml";

pub struct ArmsdkConfig {
    pub sdk_path: Option<PathBuf>,
    pub git_program: PathBuf,
    pub git_host: String,
    pub git_jobs: u32,
}

impl ArmsdkConfig {
    /// Reads `~/.armsdk/config.toml` (if present) overlaid with `ARMSDK_*`
    /// environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(default_config_file(), None)?;
        Ok(raw_config.into())
    }
}

impl From<RawConfig> for ArmsdkConfig {
    fn from(raw_config: RawConfig) -> Self {
        Self {
            sdk_path: raw_config.sdk.path,
            git_program: raw_config.git.program.unwrap_or_else(|| PathBuf::from("git")),
            git_host: raw_config
                .git
                .host
                .unwrap_or_else(|| DEFAULT_GIT_HOST.to_owned()),
            git_jobs: raw_config.git.jobs.unwrap_or(DEFAULT_SUBMODULE_JOBS),
        }
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    sdk: SdkConfig,
    #[serde(default)]
    git: GitConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct SdkConfig {
    path: Option<PathBuf>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct GitConfig {
    program: Option<PathBuf>,
    host: Option<String>,
    jobs: Option<u32>,
}

impl RawConfig {
    fn load(
        file: Option<PathBuf>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(
                File::new(&file.to_string_lossy(), FileFormat::Toml).required(false),
            );
        }
        builder
            .add_source(
                Environment::with_prefix("ARMSDK")
                    .separator("_")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

fn default_config_file() -> Option<PathBuf> {
    home_dir().map(|home| home.join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_empty() {
        let env = HashMap::from([]);
        let config = RawConfig::load(None, Some(env)).unwrap();
        assert_eq!(config, RawConfig::default());

        let config = ArmsdkConfig::from(config);
        assert_eq!(config.git_program, PathBuf::from("git"));
        assert_eq!(config.git_host, "https://github.com/");
        assert_eq!(config.git_jobs, 4);
    }

    #[test]
    fn load_environment() {
        let env = HashMap::from([
            ("ARMSDK_SDK_PATH".to_owned(), "/opt/armsdk".to_owned()),
            ("ARMSDK_GIT_HOST".to_owned(), "https://mirror.local/".to_owned()),
            ("ARMSDK_GIT_JOBS".to_owned(), "8".to_owned()),
        ]);
        let config = RawConfig::load(None, Some(env)).unwrap();
        assert_eq!(
            config,
            RawConfig {
                sdk: SdkConfig {
                    path: Some("/opt/armsdk".into())
                },
                git: GitConfig {
                    program: None,
                    host: Some("https://mirror.local/".to_owned()),
                    jobs: Some(8),
                }
            }
        )
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(
            &file,
            r#"
                [sdk]
                path = "/home/user/armsdk"
                [git]
                program = "/usr/local/bin/git"
                jobs = 2
            "#,
        )
        .unwrap();
        let env = HashMap::from([("ARMSDK_GIT_JOBS".to_owned(), "6".to_owned())]);

        let config = RawConfig::load(Some(file), Some(env)).unwrap();

        assert_eq!(
            config,
            RawConfig {
                sdk: SdkConfig {
                    path: Some("/home/user/armsdk".into())
                },
                git: GitConfig {
                    program: Some("/usr/local/bin/git".into()),
                    host: None,
                    jobs: Some(6),
                }
            }
        )
    }

    #[test]
    fn missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = RawConfig::load(Some(dir.path().join("absent.toml")), Some(HashMap::new()));
        assert_eq!(config.unwrap(), RawConfig::default());
    }
}
