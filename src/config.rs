use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyzer::AnalyzerOptions;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImpactConfig {
    pub max_files: Option<usize>,
    pub lang: Option<String>,
    pub python_bin: Option<String>,
    pub python_timeout_ms: Option<u64>,
    pub exclude: Option<Vec<String>>,
}

impl ImpactConfig {
    /// Fold config values into analyzer options; unset fields keep defaults.
    pub fn apply(&self, options: &mut AnalyzerOptions) {
        if let Some(bin) = &self.python_bin {
            options.python_bin = bin.clone();
        }
        if let Some(ms) = self.python_timeout_ms {
            options.python_timeout = Duration::from_millis(ms);
        }
        if let Some(exclude) = &self.exclude {
            options.exclude = exclude.clone();
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("impact.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ImpactConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ImpactConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ImpactConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("impact.toml");

        let config = ImpactConfig {
            max_files: Some(500),
            lang: Some("py".to_string()),
            python_bin: Some("python3.12".to_string()),
            python_timeout_ms: Some(2_000),
            exclude: Some(vec!["generated".to_string()]),
        };
        write_config(&path, &config, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.max_files, Some(500));
        assert_eq!(loaded.python_bin.as_deref(), Some("python3.12"));

        let mut options = AnalyzerOptions::default();
        loaded.apply(&mut options);
        assert_eq!(options.python_bin, "python3.12");
        assert_eq!(options.python_timeout, Duration::from_millis(2_000));
        assert_eq!(options.exclude, vec!["generated".to_string()]);
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).unwrap().is_none());
    }

    #[test]
    fn write_refuses_to_clobber() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("impact.toml");
        write_config(&path, &ImpactConfig::default(), false).unwrap();
        assert!(write_config(&path, &ImpactConfig::default(), false).is_err());
        assert!(write_config(&path, &ImpactConfig::default(), true).is_ok());
    }
}
