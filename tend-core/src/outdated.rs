//! Classification of installed dependencies against the registry.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;

use crate::reporter::Display;

static LOOSE_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("version pattern is valid")
});

pub const HEADERS: [&str; 4] = ["Package", "Current", "Wanted", "Latest"];

/// One dependency as reported by the registry client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyState {
    pub name: String,
    /// The range declared in the manifest.
    pub wanted: String,
    pub installed: Option<String>,
    /// `None` when the registry does not know the package.
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    UpToDate,
    /// Installed or wanted version lags the latest release.
    Behind,
    /// Installed or wanted version is newer than the latest release.
    Ahead,
    Missing,
    Unknown,
}

/// Extracts the first `x[.y[.z]]` found in `raw`, filling missing parts with zero.
pub fn coerce(raw: &str) -> Option<Version> {
    let captures = LOOSE_VERSION.captures(raw)?;
    let part = |index: usize| -> Option<u64> {
        captures
            .get(index)
            .map_or(Some(0), |m| m.as_str().parse().ok())
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

pub fn classify(dependency: &DependencyState) -> Freshness {
    let Some(installed) = dependency.installed.as_deref() else {
        return Freshness::Missing;
    };
    let Some(latest) = dependency.latest.as_deref().and_then(coerce) else {
        return Freshness::Unknown;
    };

    let (Some(installed), Some(wanted)) = (coerce(installed), coerce(&dependency.wanted)) else {
        return Freshness::Unknown;
    };

    if installed > latest || wanted > latest {
        Freshness::Ahead
    } else if installed == latest && wanted == latest {
        Freshness::UpToDate
    } else {
        Freshness::Behind
    }
}

/// Classified dependencies of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedReport {
    pub unit: PathBuf,
    pub entries: Vec<(DependencyState, Freshness)>,
}

impl OutdatedReport {
    pub fn new(unit: impl Into<PathBuf>, dependencies: Vec<DependencyState>) -> Self {
        let entries = dependencies
            .into_iter()
            .map(|dependency| {
                let freshness = classify(&dependency);
                (dependency, freshness)
            })
            .collect();
        Self {
            unit: unit.into(),
            entries,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, freshness)| *freshness == Freshness::UpToDate)
    }

    /// Table rows for every dependency that is not up to date.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.entries
            .iter()
            .filter(|(_, freshness)| *freshness != Freshness::UpToDate)
            .map(|(dependency, freshness)| {
                vec![
                    dependency.name.clone(),
                    match freshness {
                        Freshness::Missing => "NOT INSTALLED".to_string(),
                        _ => dependency.installed.clone().unwrap_or_default(),
                    },
                    dependency.wanted.clone(),
                    dependency
                        .latest
                        .clone()
                        .unwrap_or_else(|| "NOT FOUND".to_string()),
                ]
            })
            .collect()
    }

    /// Prints the stale table, or a success line when there is nothing to show.
    pub fn render(&self, display: &Display) {
        if self.is_clean() {
            display.success("All is good");
        } else {
            display.table(&HEADERS, &self.rows());
        }
    }
}
