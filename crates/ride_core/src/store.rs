//! Settings and statistics persistence.
//!
//! [IniFileStore] reads and writes the flat key=value file the driver menu
//! uses:
//!
//! ```text
//! [SETTINGS]
//! AverageRating=Enabled
//! Routes=City
//! PayPerMile=50
//!
//! [STATS]
//! AverageRating=4.6
//! TotalJobs=12
//! TotalEarnings=6030
//! ```
//!
//! A missing file, section or key loads as the default. Saving rewrites only
//! the keys of the section being saved and leaves everything else in place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bevy_ecs::prelude::Resource;
use thiserror::Error;

use crate::settings::{DriverSettings, DriverStats};

const SETTINGS_SECTION: &str = "SETTINGS";
const STATS_SECTION: &str = "STATS";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed value '{value}' for {section}.{key}")]
    Malformed {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

pub trait SettingsStore: Send + Sync {
    fn load_settings(&self) -> Result<DriverSettings, StoreError>;
    fn save_settings(&mut self, settings: &DriverSettings) -> Result<(), StoreError>;
    fn load_stats(&self) -> Result<DriverStats, StoreError>;
    fn save_stats(&mut self, stats: &DriverStats) -> Result<(), StoreError>;
}

#[derive(Resource)]
pub struct StoreResource(pub Box<dyn SettingsStore>);

impl StoreResource {
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        Self(store)
    }
}

impl std::ops::Deref for StoreResource {
    type Target = dyn SettingsStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::ops::DerefMut for StoreResource {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub settings: DriverSettings,
    pub stats: DriverStats,
}

impl MemoryStore {
    pub fn new(settings: DriverSettings, stats: DriverStats) -> Self {
        Self { settings, stats }
    }
}

impl SettingsStore for MemoryStore {
    fn load_settings(&self) -> Result<DriverSettings, StoreError> {
        Ok(self.settings)
    }

    fn save_settings(&mut self, settings: &DriverSettings) -> Result<(), StoreError> {
        self.settings = *settings;
        Ok(())
    }

    fn load_stats(&self) -> Result<DriverStats, StoreError> {
        Ok(self.stats)
    }

    fn save_stats(&mut self, stats: &DriverStats) -> Result<(), StoreError> {
        self.stats = *stats;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct IniFileStore {
    path: PathBuf,
}

impl IniFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<IniDocument, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(IniDocument::parse(&text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(IniDocument::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn update_section(
        &self,
        section: &str,
        entries: &[(&str, String)],
    ) -> Result<(), StoreError> {
        let mut document = self.read_document()?;
        for (key, value) in entries {
            document.set(section, key, value);
        }
        fs::write(&self.path, document.render())?;
        Ok(())
    }
}

impl SettingsStore for IniFileStore {
    fn load_settings(&self) -> Result<DriverSettings, StoreError> {
        let document = self.read_document()?;
        let defaults = DriverSettings::default();
        Ok(DriverSettings {
            rating_mode: parse_or(
                &document,
                SETTINGS_SECTION,
                "AverageRating",
                defaults.rating_mode,
            )?,
            region_policy: parse_or(
                &document,
                SETTINGS_SECTION,
                "Routes",
                defaults.region_policy,
            )?,
            pay_rate_per_mile: parse_or(
                &document,
                SETTINGS_SECTION,
                "PayPerMile",
                defaults.pay_rate_per_mile,
            )?,
        })
    }

    fn save_settings(&mut self, settings: &DriverSettings) -> Result<(), StoreError> {
        self.update_section(
            SETTINGS_SECTION,
            &[
                ("AverageRating", settings.rating_mode.to_string()),
                ("Routes", settings.region_policy.to_string()),
                ("PayPerMile", settings.pay_rate_per_mile.to_string()),
            ],
        )
    }

    fn load_stats(&self) -> Result<DriverStats, StoreError> {
        let document = self.read_document()?;
        Ok(DriverStats {
            average_rating: parse_or(&document, STATS_SECTION, "AverageRating", 0.0)?,
            total_jobs: parse_or(&document, STATS_SECTION, "TotalJobs", 0)?,
            total_earnings: parse_or(&document, STATS_SECTION, "TotalEarnings", 0)?,
        })
    }

    fn save_stats(&mut self, stats: &DriverStats) -> Result<(), StoreError> {
        self.update_section(
            STATS_SECTION,
            &[
                ("AverageRating", format!("{:.1}", stats.average_rating)),
                ("TotalJobs", stats.total_jobs.to_string()),
                ("TotalEarnings", stats.total_earnings.to_string()),
            ],
        )
    }
}

fn parse_or<T: FromStr>(
    document: &IniDocument,
    section: &'static str,
    key: &'static str,
    default: T,
) -> Result<T, StoreError> {
    match document.get(section, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| StoreError::Malformed {
            section,
            key,
            value: raw.to_string(),
        }),
    }
}

/// Line-preserving INI document. Section and key names match case-insensitively.
#[derive(Debug, Clone, Default)]
struct IniDocument {
    lines: Vec<String>,
}

fn section_name(line: &str) -> Option<&str> {
    let line = line.trim();
    line.strip_prefix('[')?.strip_suffix(']').map(str::trim)
}

fn key_value(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.starts_with(';') || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

impl IniDocument {
    fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Line range `(header, end)` of `section`, end exclusive.
    fn section_bounds(&self, section: &str) -> Option<(usize, usize)> {
        let header = self
            .lines
            .iter()
            .position(|line| {
                section_name(line).is_some_and(|name| name.eq_ignore_ascii_case(section))
            })?;
        let end = self.lines[header + 1..]
            .iter()
            .position(|line| section_name(line).is_some())
            .map_or(self.lines.len(), |offset| header + 1 + offset);
        Some((header, end))
    }

    fn get(&self, section: &str, key: &str) -> Option<&str> {
        let (header, end) = self.section_bounds(section)?;
        self.lines[header + 1..end].iter().find_map(|line| {
            key_value(line)
                .filter(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value)
        })
    }

    fn set(&mut self, section: &str, key: &str, value: &str) {
        let entry = format!("{key}={value}");
        let Some((header, end)) = self.section_bounds(section) else {
            if self.lines.last().is_some_and(|line| !line.trim().is_empty()) {
                self.lines.push(String::new());
            }
            self.lines.push(format!("[{section}]"));
            self.lines.push(entry);
            return;
        };

        let existing = (header + 1..end).find(|&idx| {
            key_value(&self.lines[idx]).is_some_and(|(name, _)| name.eq_ignore_ascii_case(key))
        });
        match existing {
            Some(idx) => self.lines[idx] = entry,
            None => {
                // after the last non-blank line of the section
                let insert_at = (header + 1..end)
                    .rev()
                    .find(|&idx| !self.lines[idx].trim().is_empty())
                    .map_or(header + 1, |idx| idx + 1);
                self.lines.insert(insert_at, entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{RatingMode, RegionPolicy};

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = IniFileStore::new(dir.path().join("absent.ini"));
        assert_eq!(store.load_settings().expect("settings"), DriverSettings::default());
        assert_eq!(store.load_stats().expect("stats"), DriverStats::default());
    }

    #[test]
    fn reads_both_sections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("driver.ini");
        fs::write(
            &path,
            "[SETTINGS]\nAverageRating=Disabled\nRoutes=City <-> Countryside\nPayPerMile=75\n\n\
             [STATS]\nAverageRating=4.6\nTotalJobs=12\nTotalEarnings=6030\n",
        )
        .expect("write");
        let store = IniFileStore::new(&path);

        let settings = store.load_settings().expect("settings");
        assert_eq!(settings.rating_mode, RatingMode::Disabled);
        assert_eq!(settings.region_policy, RegionPolicy::CityToCountryside);
        assert_eq!(settings.pay_rate_per_mile, 75);

        let stats = store.load_stats().expect("stats");
        assert!((stats.average_rating - 4.6).abs() < 1e-6);
        assert_eq!(stats.total_jobs, 12);
        assert_eq!(stats.total_earnings, 6030);
    }

    #[test]
    fn saving_stats_keeps_settings_section() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("driver.ini");
        fs::write(&path, "; driver profile\n[SETTINGS]\nRoutes=Countryside\n").expect("write");
        let mut store = IniFileStore::new(&path);

        store
            .save_stats(&DriverStats {
                average_rating: 4.5,
                total_jobs: 4,
                total_earnings: 1200,
            })
            .expect("save");

        let text = fs::read_to_string(&path).expect("read");
        assert!(text.starts_with("; driver profile\n[SETTINGS]\nRoutes=Countryside\n"));
        assert!(text.ends_with(concat!(
            "\n\n[STATS]\n",
            "AverageRating=4.5\nTotalJobs=4\nTotalEarnings=1200\n"
        )));
        assert_eq!(
            store.load_settings().expect("settings").region_policy,
            RegionPolicy::Countryside
        );
    }

    #[test]
    fn saving_settings_rewrites_keys_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("driver.ini");
        fs::write(&path, "[settings]\nPayPerMile=10\nExtra=keep\n[STATS]\nTotalJobs=3\n")
            .expect("write");
        let mut store = IniFileStore::new(&path);

        store.save_settings(&DriverSettings::default()).expect("save");

        let text = fs::read_to_string(&path).expect("read");
        assert_eq!(
            text,
            concat!(
                "[settings]\nPayPerMile=50\nExtra=keep\nAverageRating=Enabled\nRoutes=City\n",
                "[STATS]\nTotalJobs=3\n"
            )
        );
        assert_eq!(store.load_stats().expect("stats").total_jobs, 3);
    }

    #[test]
    fn malformed_value_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("driver.ini");
        fs::write(&path, "[SETTINGS]\nPayPerMile=lots\n").expect("write");
        let store = IniFileStore::new(&path);
        let err = store.load_settings().unwrap_err();
        assert!(matches!(
            err,
            StoreError::Malformed {
                key: "PayPerMile",
                ..
            }
        ));
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::default();
        let stats = DriverStats {
            average_rating: 3.5,
            total_jobs: 2,
            total_earnings: 99,
        };
        store.save_stats(&stats).expect("save");
        assert_eq!(store.load_stats().expect("load"), stats);
    }
}
