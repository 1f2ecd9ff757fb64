use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::criteria::Criterion;
use crate::dsl::{FilterAst, parse_filter};
use crate::tagging::AutomaticTagEntry;
use crate::targets::{Target, TargetStore};

pub const CONFIG_FILE_STEM: &str = "pingtags";

/// Everything persisted between runs.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub automatic_tags: Vec<AutomaticTagEntry>,
    /// Last filter expression typed by the user, kept even if it does not parse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Criterion>,
    #[serde(default)]
    pub topmost: bool,
    #[serde(default)]
    pub check_online_for_updates: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(FileFormat::Json),
            Some("yaml" | "yml") => Ok(FileFormat::Yaml),
            _ => bail!(
                "Config: Unsupported settings file extension: {}",
                path.display()
            ),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        FileFormat::from_path(path)?;
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .with_context(|| format!("Config: Failed to read {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("Config: Invalid settings in {}", path.display()))
    }

    /// Load the first candidate that exists and parses. Broken files are
    /// logged and skipped; with no usable file the defaults are returned.
    pub fn load_or_default(candidates: &[PathBuf]) -> (Self, Option<PathBuf>) {
        for path in candidates.iter().filter(|p| p.is_file()) {
            match Self::load(path) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {}", path.display());
                    return (settings, Some(path.clone()));
                }
                Err(e) => tracing::warn!("Skipping settings file: {:#}", e),
            }
        }
        tracing::info!("No settings file found, using defaults");
        (Self::default(), None)
    }

    /// Settings file names looked up in `dir`, JSON first.
    pub fn candidates_in(dir: &Path) -> Vec<PathBuf> {
        ["json", "yaml", "yml"]
            .iter()
            .map(|ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
            .collect()
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let text = match FileFormat::from_path(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self)
                .context("Config: Failed to serialize settings")?,
            FileFormat::Yaml => {
                serde_yaml::to_string(self).context("Config: Failed to serialize settings")?
            }
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Config: Failed to create {}", dir.display()))?;
        }
        std::fs::write(path, text)
            .with_context(|| format!("Config: Failed to write {}", path.display()))?;
        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn target_store(&self) -> TargetStore {
        TargetStore::from_targets(self.targets.clone())
    }

    /// The saved filter expression, parsed. Blank or absent means no filter.
    pub fn compiled_filter(&self) -> anyhow::Result<Option<FilterAst>> {
        match self.filter.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_filter(text)
                .map(Some)
                .with_context(|| format!("Config: Saved filter `{text}` is invalid")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::CriterionSource;
    use crate::tagging::{MatchType, TagSource};
    use std::time::Duration;

    fn sample() -> Settings {
        Settings {
            targets: vec![
                Target::new(
                    "10.0.0.1".parse().unwrap(),
                    Some("gateway".into()),
                    Duration::from_millis(2500),
                    ["lan".to_string()],
                )
                .unwrap(),
                Target::new("10.0.0.2".parse().unwrap(), None, Duration::from_secs(1), [])
                    .unwrap(),
            ],
            automatic_tags: vec![
                AutomaticTagEntry::new(TagSource::Address, MatchType::MatchesRegex, "^10\\.", "v4")
                    .unwrap(),
            ],
            filter: Some("lan & v4".into()),
            criteria: Some(Criterion::text(
                CriterionSource::AnyTag,
                MatchType::IsExactly,
                "lan",
            )),
            topmost: true,
            check_online_for_updates: Some(false),
        }
    }

    #[test]
    fn round_trips_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["settings.json", "nested/settings.yaml"] {
            let path = dir.path().join(name);
            sample().save(&path).unwrap();
            assert_eq!(Settings::load(&path).unwrap(), sample(), "{name}");
        }
    }

    #[test]
    fn shortest_cool_down_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pingtags.json");
        let target = Target::new(
            "10.0.0.9".parse().unwrap(),
            None,
            Duration::from_micros(1999),
            [],
        )
        .unwrap();
        let settings = Settings {
            targets: vec![target],
            ..Settings::default()
        };
        settings.save(&path).unwrap();

        let (loaded, found) = Settings::load_or_default(&Settings::candidates_in(dir.path()));
        assert_eq!(found, Some(path));
        assert_eq!(loaded, settings);
        assert_eq!(loaded.targets[0].cool_down(), Duration::from_millis(1));
    }

    #[test]
    fn missing_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pingtags.yaml");
        std::fs::write(&path, "topmost: true\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert!(settings.topmost);
        assert!(settings.targets.is_empty());
        assert_eq!(settings.check_online_for_updates, None);
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = sample().save(Path::new("settings.toml")).unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn load_or_default_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = Settings::candidates_in(dir.path());
        std::fs::write(&candidates[0], "{ not json").unwrap();
        sample().save(&candidates[1]).unwrap();

        let (settings, path) = Settings::load_or_default(&candidates);
        assert_eq!(path.as_ref(), Some(&candidates[1]));
        assert_eq!(settings.targets.len(), 2);

        let empty = tempfile::tempdir().unwrap();
        let (settings, path) = Settings::load_or_default(&Settings::candidates_in(empty.path()));
        assert_eq!(settings, Settings::default());
        assert!(path.is_none());
    }

    #[test]
    fn compiled_filter() {
        let mut settings = sample();
        let store = settings.target_store();
        let filter = settings.compiled_filter().unwrap().unwrap();
        assert_eq!(store.filter_indices(&filter, &settings.automatic_tags), vec![0]);

        settings.filter = Some("  ".into());
        assert!(settings.compiled_filter().unwrap().is_none());

        settings.filter = Some("a &".into());
        assert!(settings.compiled_filter().is_err());
    }
}
