//! Layered settings loading
//!
//! Sources, lowest priority first: `default.toml` (required), then
//! `{environment}.toml` and `local.toml` (both optional), then `CRUDKIT_*`
//! variables with `__` between nested keys. `CRUDKIT_CONFIG_FILE` swaps the
//! three files for a single required one.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat, FileSourceFile};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_VAR: &str = "CRUDKIT_CONFIG_DIR";
const CONFIG_FILE_VAR: &str = "CRUDKIT_CONFIG_FILE";
const APP_ENV_VAR: &str = "CRUDKIT_APP_ENV";

/// Where the TOML layers come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLoader {
    Layered { dir: PathBuf, environment: String },
    Single(PathBuf),
}

impl ConfigLoader {
    /// Picks the file layers from `CRUDKIT_CONFIG_DIR`, `CRUDKIT_CONFIG_FILE`
    /// and `CRUDKIT_APP_ENV`; defaults to `config/` and `development`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dir = std::env::var_os(CONFIG_DIR_VAR);
        let file = std::env::var_os(CONFIG_FILE_VAR);

        match (dir, file) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSources),
            (None, Some(file)) => Ok(ConfigLoader::Single(file.into())),
            (dir, None) => {
                let environment = std::env::var(APP_ENV_VAR)
                    .map(|env| env.to_lowercase())
                    .unwrap_or_else(|_| "development".to_string());
                Ok(ConfigLoader::Layered {
                    dir: dir.map_or_else(|| PathBuf::from("config"), PathBuf::from),
                    environment,
                })
            }
        }
    }

    /// Files to read in priority order, with whether each must exist.
    fn files(&self) -> Vec<(PathBuf, bool)> {
        match self {
            ConfigLoader::Single(path) => vec![(path.clone(), true)],
            ConfigLoader::Layered { dir, environment } => vec![
                (dir.join("default.toml"), true),
                (dir.join(format!("{environment}.toml")), false),
                (dir.join("local.toml"), false),
            ],
        }
    }

    /// Merges every source and validates the result.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        for (path, required) in self.files() {
            if required && !path.exists() {
                return Err(ConfigError::MissingFile(path));
            }
            builder = builder.add_source(toml_source(&path).required(required));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("CRUDKIT")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}

fn toml_source(path: &Path) -> File<FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Held by every test that reads or writes CRUDKIT_* variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const DEFAULT_TOML: &str = r#"
[database]
url = "postgres://default/crudkit"

[password]
iterations = 2
"#;

    fn config_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn layered(dir: &TempDir, environment: &str) -> ConfigLoader {
        ConfigLoader::Layered {
            dir: dir.path().to_path_buf(),
            environment: environment.to_string(),
        }
    }

    /// Sets variables for one test and clears them on drop.
    struct ScopedEnv(Vec<&'static str>);

    impl ScopedEnv {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            for (key, value) in vars {
                unsafe { std::env::set_var(key, value) };
            }
            ScopedEnv(vars.iter().map(|(key, _)| *key).collect())
        }
    }

    impl Drop for ScopedEnv {
        fn drop(&mut self) {
            for key in &self.0 {
                unsafe { std::env::remove_var(key) };
            }
        }
    }

    #[test]
    fn test_from_env_sources() {
        let _lock = ENV_LOCK.lock().unwrap();

        let defaults = ConfigLoader::from_env().unwrap();
        assert_eq!(
            defaults,
            ConfigLoader::Layered {
                dir: PathBuf::from("config"),
                environment: "development".to_string(),
            }
        );

        {
            let _env = ScopedEnv::set(&[(CONFIG_FILE_VAR, "/etc/crudkit.toml")]);
            assert_eq!(
                ConfigLoader::from_env().unwrap(),
                ConfigLoader::Single(PathBuf::from("/etc/crudkit.toml"))
            );
        }

        let _env = ScopedEnv::set(&[
            (CONFIG_DIR_VAR, "/etc/crudkit"),
            (CONFIG_FILE_VAR, "/etc/crudkit.toml"),
        ]);
        assert!(matches!(
            ConfigLoader::from_env(),
            Err(ConfigError::ConflictingSources)
        ));
    }

    #[test]
    fn test_missing_default_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[]);
        let err = layered(&dir, "development").load().unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(path) if path.ends_with("default.toml")));
    }

    #[test]
    fn test_layer_precedence() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[
            ("default.toml", DEFAULT_TOML),
            (
                "staging.toml",
                "[database]\nurl = \"postgres://staging/crudkit\"\n\n[password]\niterations = 3\n",
            ),
            ("local.toml", "[password]\niterations = 4\n"),
        ]);
        let _env = ScopedEnv::set(&[("CRUDKIT_DATABASE__MAX_CONNECTIONS", "25")]);

        let settings = layered(&dir, "staging").load().unwrap();

        assert_eq!(settings.database.url, "postgres://staging/crudkit");
        assert_eq!(settings.database.max_connections, 25);
        assert_eq!(settings.password.iterations, 4);
    }

    #[test]
    fn test_environment_file_is_optional() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[("default.toml", DEFAULT_TOML)]);
        let settings = layered(&dir, "production").load().unwrap();
        assert_eq!(settings.database.url, "postgres://default/crudkit");
    }

    #[test]
    fn test_single_file_skips_layers() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[
            ("default.toml", "[database]\nurl = \"postgres://ignored/db\"\n"),
            ("only.toml", "[database]\nurl = \"postgresql://single/crudkit\"\n"),
        ]);

        let settings = ConfigLoader::Single(dir.path().join("only.toml"))
            .load()
            .unwrap();

        assert_eq!(settings.database.url, "postgresql://single/crudkit");
        assert_eq!(settings.password.iterations, 2);
    }

    #[test]
    fn test_loaded_settings_are_validated() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[(
            "default.toml",
            "[database]\nurl = \"postgres://default/crudkit\"\n\n[password]\nparallelism = 0\n",
        )]);

        let err = layered(&dir, "development").load().unwrap_err();
        assert_eq!(err.key(), "password.parallelism");
    }
}
