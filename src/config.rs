use crate::dictionary::{
    ChunkManifest, DEFAULT_DICTIONARY_LENGTH, MIN_DICTIONARY_LENGTH, REFERENCE_MANIFEST,
};
use crate::segment::DEFAULT_MAX_WORD_LENGTH;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Global configuration for wordguard
/// All fields are optional to support partial configurations and merging
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WordguardConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<DictionaryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<BlacklistConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DictionaryConfig {
    /// Directory holding `<chunk id>.json.gz` files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Size of the ranked corpus the chunk tokens were generated against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_word_length: Option<usize>,
    /// Ordered chunk ids, e.g. `["a-ba", "ba-ca", ...]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_manifest: Option<Vec<String>>,
    /// Decoded chunks kept between calls; 0 disables the cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_cache_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlacklistConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_mapping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub defaults: ResolvedDefaultsConfig,
    pub dictionary: ResolvedDictionaryConfig,
    pub blacklist: ResolvedBlacklistConfig,
    pub validation: ResolvedValidationConfig,
}

#[derive(Debug, Clone)]
pub struct ResolvedDefaultsConfig {
    pub debug: bool,
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedDictionaryConfig {
    pub data_dir: PathBuf,
    pub dictionary_length: usize,
    pub max_word_length: usize,
    pub chunk_manifest: Vec<String>,
    pub chunk_cache_size: usize,
}

#[derive(Debug, Clone)]
pub struct ResolvedBlacklistConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ResolvedValidationConfig {
    pub character_mapping: bool,
    pub verbose: bool,
}

fn parse_bool(val: &str) -> bool {
    val == "1" || val.to_lowercase() == "true"
}

impl WordguardConfig {
    /// Load configuration from multiple levels and merge them
    pub fn load() -> Result<ResolvedConfig> {
        Self::load_with(WordguardConfig::default())
    }

    /// Like [`WordguardConfig::load`], with `overrides` applied after the environment
    pub fn load_with(overrides: WordguardConfig) -> Result<ResolvedConfig> {
        let configs = Self::load_all_configs()?;

        // Merge configurations (global -> project -> local -> custom)
        let mut merged = WordguardConfig::default();
        for config in configs {
            merged = Self::merge_configs(merged, config);
        }

        merged.apply_env_overrides();
        merged = Self::merge_configs(merged, overrides);
        merged.validate()?;

        Ok(merged.resolve_with_defaults())
    }

    /// Get all configuration file paths in priority order
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Global config: ~/.wordguard/settings.json
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".wordguard").join("settings.json"));
        }

        // 2. Project config: ./.wordguard/settings.json and its local override
        paths.push(PathBuf::from(".wordguard").join("settings.json"));
        paths.push(PathBuf::from(".wordguard").join("settings.local.json"));

        // 3. Custom path via environment variable - highest precedence (last wins)
        if let Ok(custom_path) = env::var("WORDGUARD_CONFIG_PATH") {
            // Trailing slash/backslash => treat as directory
            let looks_like_dir = custom_path.ends_with('\\') || custom_path.ends_with('/');
            let path = if looks_like_dir {
                PathBuf::from(&custom_path).join("settings.json")
            } else {
                PathBuf::from(&custom_path)
            };
            paths.push(path);
        }

        paths
    }

    /// Load all configuration files that exist
    fn load_all_configs() -> Result<Vec<WordguardConfig>> {
        let mut configs = Vec::new();

        for path in Self::get_config_paths() {
            match fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => {
                    configs.push(Self::load_from_file(&path)?);
                }
                _ => continue,
            }
        }

        Ok(configs)
    }

    /// Load a single configuration file
    pub fn load_from_file(path: &Path) -> Result<WordguardConfig> {
        let bytes = fs::read(path).context(format!("Failed to read config file: {path:?}"))?;

        // Strip UTF-8 BOM if present (0xEF, 0xBB, 0xBF)
        let content_bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);

        let config: WordguardConfig = serde_json::from_slice(content_bytes)
            .context(format!("Failed to parse config file: {path:?}"))?;

        Ok(config)
    }

    /// Deep merge two configurations, with `other` taking precedence
    fn merge_configs(mut base: WordguardConfig, other: WordguardConfig) -> WordguardConfig {
        if let Some(other_defaults) = other.defaults {
            let base_defaults = base.defaults.get_or_insert_with(DefaultsConfig::default);
            if other_defaults.debug.is_some() {
                base_defaults.debug = other_defaults.debug;
            }
            if other_defaults.log_level.is_some() {
                base_defaults.log_level = other_defaults.log_level;
            }
        }

        if let Some(other_dictionary) = other.dictionary {
            let base_dictionary = base
                .dictionary
                .get_or_insert_with(DictionaryConfig::default);
            if other_dictionary.data_dir.is_some() {
                base_dictionary.data_dir = other_dictionary.data_dir;
            }
            if other_dictionary.dictionary_length.is_some() {
                base_dictionary.dictionary_length = other_dictionary.dictionary_length;
            }
            if other_dictionary.max_word_length.is_some() {
                base_dictionary.max_word_length = other_dictionary.max_word_length;
            }
            if other_dictionary.chunk_manifest.is_some() {
                base_dictionary.chunk_manifest = other_dictionary.chunk_manifest;
            }
            if other_dictionary.chunk_cache_size.is_some() {
                base_dictionary.chunk_cache_size = other_dictionary.chunk_cache_size;
            }
        }

        if let Some(other_blacklist) = other.blacklist {
            let base_blacklist = base.blacklist.get_or_insert_with(BlacklistConfig::default);
            if other_blacklist.path.is_some() {
                base_blacklist.path = other_blacklist.path;
            }
        }

        if let Some(other_validation) = other.validation {
            let base_validation = base
                .validation
                .get_or_insert_with(ValidationConfig::default);
            if other_validation.character_mapping.is_some() {
                base_validation.character_mapping = other_validation.character_mapping;
            }
            if other_validation.verbose.is_some() {
                base_validation.verbose = other_validation.verbose;
            }
        }

        base
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        let defaults = self.defaults.get_or_insert_with(DefaultsConfig::default);
        if let Ok(val) = env::var("WORDGUARD_DEBUG") {
            defaults.debug = Some(parse_bool(&val));
        }
        if let Ok(val) = env::var("WORDGUARD_LOG_LEVEL") {
            defaults.log_level = Some(val);
        }

        let dictionary = self
            .dictionary
            .get_or_insert_with(DictionaryConfig::default);
        if let Ok(val) = env::var("WORDGUARD_DATA_DIR") {
            dictionary.data_dir = Some(val);
        }
        if let Ok(val) = env::var("WORDGUARD_DICTIONARY_LENGTH") {
            if let Ok(length) = val.parse() {
                dictionary.dictionary_length = Some(length);
            }
        }
        if let Ok(val) = env::var("WORDGUARD_MAX_WORD_LENGTH") {
            if let Ok(length) = val.parse() {
                dictionary.max_word_length = Some(length);
            }
        }
        if let Ok(val) = env::var("WORDGUARD_CHUNK_CACHE_SIZE") {
            if let Ok(size) = val.parse() {
                dictionary.chunk_cache_size = Some(size);
            }
        }

        let blacklist = self.blacklist.get_or_insert_with(BlacklistConfig::default);
        if let Ok(val) = env::var("WORDGUARD_BLACKLIST_PATH") {
            blacklist.path = Some(val);
        }

        let validation = self
            .validation
            .get_or_insert_with(ValidationConfig::default);
        if let Ok(val) = env::var("WORDGUARD_CHARACTER_MAPPING") {
            validation.character_mapping = Some(parse_bool(&val));
        }
        if let Ok(val) = env::var("WORDGUARD_VERBOSE") {
            validation.verbose = Some(parse_bool(&val));
        }
    }

    /// Convert to resolved config with all defaults applied
    pub fn resolve_with_defaults(self) -> ResolvedConfig {
        let defaults = self.defaults.unwrap_or_default();
        let dictionary = self.dictionary.unwrap_or_default();
        let blacklist = self.blacklist.unwrap_or_default();
        let validation = self.validation.unwrap_or_default();

        let data_dir = PathBuf::from(dictionary.data_dir.unwrap_or_else(|| "data".to_string()));
        let blacklist_path = blacklist
            .path
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("blacklist.json"));

        ResolvedConfig {
            defaults: ResolvedDefaultsConfig {
                debug: defaults.debug.unwrap_or(false),
                log_level: defaults.log_level.unwrap_or_else(|| "info".to_string()),
            },
            dictionary: ResolvedDictionaryConfig {
                data_dir,
                dictionary_length: dictionary
                    .dictionary_length
                    .unwrap_or(DEFAULT_DICTIONARY_LENGTH),
                max_word_length: dictionary
                    .max_word_length
                    .unwrap_or(DEFAULT_MAX_WORD_LENGTH),
                chunk_manifest: dictionary.chunk_manifest.unwrap_or_else(|| {
                    REFERENCE_MANIFEST.iter().map(|id| id.to_string()).collect()
                }),
                chunk_cache_size: dictionary.chunk_cache_size.unwrap_or(0),
            },
            blacklist: ResolvedBlacklistConfig {
                path: blacklist_path,
            },
            validation: ResolvedValidationConfig {
                character_mapping: validation.character_mapping.unwrap_or(true),
                verbose: validation.verbose.unwrap_or(false),
            },
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(ref defaults) = self.defaults {
            if let Some(ref log_level) = defaults.log_level {
                let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
                let level_lower = log_level.to_lowercase();
                if !valid_log_levels.contains(&level_lower.as_str()) {
                    anyhow::bail!("Invalid log level: {}", log_level);
                }
            }
        }

        if let Some(ref dictionary) = self.dictionary {
            if dictionary.max_word_length == Some(0) {
                anyhow::bail!("max_word_length must be at least 1");
            }
            if let Some(length) = dictionary.dictionary_length {
                if length < MIN_DICTIONARY_LENGTH {
                    anyhow::bail!(
                        "dictionary_length must be at least {}, got {}",
                        MIN_DICTIONARY_LENGTH,
                        length
                    );
                }
            }
            if let Some(ref manifest) = dictionary.chunk_manifest {
                ChunkManifest::parse(manifest).context("Invalid chunk_manifest")?;
            }
        }

        Ok(())
    }
}

impl ResolvedConfig {
    /// Convert back to WordguardConfig for serialization
    pub fn to_wordguard_config(&self) -> WordguardConfig {
        WordguardConfig {
            defaults: Some(DefaultsConfig {
                debug: Some(self.defaults.debug),
                log_level: Some(self.defaults.log_level.clone()),
            }),
            dictionary: Some(DictionaryConfig {
                data_dir: Some(self.dictionary.data_dir.to_string_lossy().into_owned()),
                dictionary_length: Some(self.dictionary.dictionary_length),
                max_word_length: Some(self.dictionary.max_word_length),
                chunk_manifest: Some(self.dictionary.chunk_manifest.clone()),
                chunk_cache_size: Some(self.dictionary.chunk_cache_size),
            }),
            blacklist: Some(BlacklistConfig {
                path: Some(self.blacklist.path.to_string_lossy().into_owned()),
            }),
            validation: Some(ValidationConfig {
                character_mapping: Some(self.validation.character_mapping),
                verbose: Some(self.validation.verbose),
            }),
        }
    }

    /// Get a pretty-printed JSON representation
    pub fn to_json_string(&self) -> Result<String> {
        let config = self.to_wordguard_config();
        serde_json::to_string_pretty(&config).context("Failed to serialize configuration to JSON")
    }
}

/// Get the global configuration instance
/// This loads the configuration once and caches it for the lifetime of the program
pub fn get_config() -> &'static ResolvedConfig {
    use std::sync::OnceLock;
    static CONFIG: OnceLock<ResolvedConfig> = OnceLock::new();

    CONFIG.get_or_init(|| {
        WordguardConfig::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load configuration: {e:#}");
            WordguardConfig::default().resolve_with_defaults()
        })
    })
}
