//! Configuration Reader
//!
//! Resolves named keys to strings, falling back to a caller-supplied default
//! when a key is unset or empty. Values are not validated here; malformed
//! values surface wherever they are consumed.

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    config: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigReader {
    values: BTreeMap<String, String>,
    source: Option<PathBuf>,
}

impl ConfigReader {
    /// An empty reader: every lookup returns its default
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            source: None,
        }
    }

    /// Loads the `config:` mapping of a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut reader = Self::from_yaml_str(&content, path)?;
        reader.source = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            keys = reader.values.len(),
            "Loaded config file"
        );
        Ok(reader)
    }

    fn from_yaml_str(content: &str, path: &Path) -> Result<Self> {
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let file: ConfigFile =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

        let mut values = BTreeMap::new();
        for (key, value) in file.config {
            let value = match value {
                serde_yaml::Value::Null => continue,
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(parse_error(format!(
                        "value of '{}' must be a string, number or boolean",
                        key
                    )));
                }
            };
            values.insert(key, value);
        }

        Ok(Self {
            values,
            source: None,
        })
    }

    /// Loads the discovered config file, or an empty reader if there is none
    pub fn discover() -> Result<Self> {
        match crate::find_config_file()? {
            Some(path) => Self::from_file(path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::new())
            }
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Applies a `key=value` override (highest precedence)
    pub fn apply_override(&mut self, pair: &str) -> Result<()> {
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                self.set(key.trim(), value);
                Ok(())
            }
            _ => Err(ConfigError::InvalidOverride(pair.to_string())),
        }
    }

    /// The configured value if present and non-empty
    pub fn get_opt(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The configured value if present and non-empty, else `default`
    pub fn get(&self, name: &str, default: &str) -> String {
        self.get_opt(name).unwrap_or(default).to_string()
    }

    /// File the values were loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_get_falls_back_on_unset_or_empty() {
        let reader = ConfigReader::from_pairs([("vmName", "mc"), ("servicePort", "")]);
        assert_eq!(reader.get("vmName", "my-server"), "mc");
        assert_eq!(reader.get("servicePort", "25565"), "25565");
        assert_eq!(reader.get("adminUsername", "pulumiuser"), "pulumiuser");
        assert_eq!(reader.get_opt("servicePort"), None);
    }

    #[test]
    fn test_from_file_stringifies_scalars() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gameserver.yaml");
        fs::write(
            &path,
            "config:\n  vmName: test\n  servicePort: 8080\n  unused: ~\n",
        )
        .unwrap();

        let reader = ConfigReader::from_file(&path).unwrap();
        assert_eq!(reader.get("vmName", ""), "test");
        assert_eq!(reader.get("servicePort", ""), "8080");
        assert_eq!(reader.get_opt("unused"), None);
        assert_eq!(reader.source(), Some(path.as_path()));
    }

    #[test]
    fn test_from_file_rejects_nested_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gameserver.yaml");
        fs::write(&path, "config:\n  osImage:\n    publisher: canonical\n").unwrap();

        let result = ConfigReader::from_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let mut reader = ConfigReader::from_pairs([("servicePort", "25565")]);
        reader.apply_override("servicePort=22").unwrap();
        reader.apply_override("osImage=a:b:c:d").unwrap();
        assert_eq!(reader.get("servicePort", ""), "22");
        assert_eq!(reader.get("osImage", ""), "a:b:c:d");

        assert!(matches!(
            reader.apply_override("no-equals-sign"),
            Err(ConfigError::InvalidOverride(_))
        ));
        assert!(reader.apply_override("=value").is_err());
    }
}
