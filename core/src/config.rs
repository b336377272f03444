use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::str_interp::InterpError;
use crate::testing::{CommandTemplate, Language, ProcessRunner, Toolchain};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("Unknown extension in [test.toolchain.{0}]")]
    UnknownExtension(String),

    #[error("memory_limit_mb = {0} is too large")]
    MemoryLimitTooLarge(u64),

    #[error("Invalid command template in [test.toolchain.{ext}]: {source}")]
    InvalidTemplate {
        ext: String,
        #[source]
        source: InterpError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub test: TestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    pub time_limit_ms: u64,
    pub memory_limit_mb: Option<u64>,
    pub warmup: bool,
    /// Keyed by file extension, e.g. `cpp`.
    pub toolchain: BTreeMap<String, ToolchainConfig>,
}

/// With `compile` the language is treated as compiled, otherwise as interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    pub compile: Option<CommandTemplate>,
    pub run: CommandTemplate,
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &'static str = "acsb.toml";

    pub fn example_toml() -> String {
        let file = Asset::get(Self::FILENAME).expect("example config is embedded at build time");
        String::from_utf8_lossy(file.data.as_ref()).into_owned()
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.test.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = std::fs::read_to_string(&filepath)
            .with_context(|| format!("Cannot read {:?}", filepath))?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file in ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    /// Falls back to the defaults when no config file is found.
    pub fn load_or_default(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        match Self::find_file_in_ancestors(cur_dir) {
            Some(path) => {
                log::debug!("Loading config {:?}", path);
                Self::from_toml_file(path)
            }
            None => {
                log::debug!("'{}' not found; using defaults", Self::FILENAME);
                Ok(Self::default())
            }
        }
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: ProcessRunner::DEFAULT_TIME_LIMIT.as_millis() as u64,
            memory_limit_mb: None,
            warmup: true,
            toolchain: BTreeMap::new(),
        }
    }
}

impl TestConfig {
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(mb) = self.memory_limit_mb {
            if mb.checked_mul(1024 * 1024).is_none() {
                return Err(ConfigError::MemoryLimitTooLarge(mb));
            }
        }
        for (ext, entry) in &self.toolchain {
            if Language::from_extension(ext).is_none() {
                return Err(ConfigError::UnknownExtension(ext.to_owned()));
            }
            Toolchain::from(entry.clone())
                .validate()
                .map_err(|source| ConfigError::InvalidTemplate {
                    ext: ext.to_owned(),
                    source,
                })?;
        }
        Ok(())
    }

    /// The override for `lang` if configured, otherwise its built-in toolchain.
    pub fn toolchain_for(&self, lang: Language) -> Toolchain {
        self.toolchain
            .get(lang.extension())
            .cloned()
            .map(Toolchain::from)
            .unwrap_or_else(|| lang.default_toolchain())
    }

    pub fn runner(&self) -> ProcessRunner {
        ProcessRunner::new()
            .time_limit(self.time_limit())
            .memory_limit_mb(self.memory_limit_mb)
    }
}

impl From<ToolchainConfig> for Toolchain {
    fn from(cfg: ToolchainConfig) -> Self {
        match cfg.compile {
            Some(compile) => Toolchain::Compiled {
                compile,
                run: cfg.run,
            },
            None => Toolchain::Interpreted { run: cfg.run },
        }
    }
}
