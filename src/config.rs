//! Run settings read once from the environment.
//!
//! Present values are parsed up front so a malformed variable fails start-up
//! even for commands that never use it. Required values are checked when a
//! command asks for them.

use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::str::FromStr;

pub const MOST_RECENT_YEAR: &str = "MOST_RECENT_YEAR";
pub const COLLEGE_SCORECARD_KEY: &str = "COLLEGE_SCORECARD_KEY";
pub const INFLATION_ADJUST: &str = "INFLATION_ADJUST";

const DEFAULT_MAP_OUTPATH: &str = "docs/map.html";
const DEFAULT_TABLE_OUTPATH: &str = "docs/table.html";
const DEFAULT_DATA_DIR: &str = "data";

/// Immutable run settings. Not `Debug`, so the api key never ends up in logs.
pub struct Settings {
    most_recent_year: Option<i32>,
    scorecard_key: Option<String>,
    inflation_adjust: Option<f64>,
    pub map_title: String,
    pub map_notes: String,
    pub map_outpath: PathBuf,
    pub table_outpath: PathBuf,
    pub data_dir: PathBuf,
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{name} has an invalid value: {raw:?}"))
        })
        .transpose()
}

fn missing(name: &str) -> anyhow::Error {
    anyhow!("{name} must be set")
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
    }

    /// Reads settings through `lookup`, which returns `None` for unset names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            most_recent_year: parsed(&lookup, MOST_RECENT_YEAR)?,
            scorecard_key: lookup(COLLEGE_SCORECARD_KEY),
            inflation_adjust: parsed(&lookup, INFLATION_ADJUST)?,
            map_title: lookup("MAP_TITLE").unwrap_or_default(),
            map_notes: lookup("MAP_NOTE").unwrap_or_default(),
            map_outpath: lookup("MAP_OUTPATH").unwrap_or_else(|| DEFAULT_MAP_OUTPATH.into()).into(),
            table_outpath: lookup("TABLE_OUTPATH")
                .unwrap_or_else(|| DEFAULT_TABLE_OUTPATH.into())
                .into(),
            data_dir: lookup("IPEDS_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.into()).into(),
        })
    }

    pub fn most_recent_year(&self) -> Result<i32> {
        self.most_recent_year.ok_or_else(|| missing(MOST_RECENT_YEAR))
    }

    pub fn scorecard_key(&self) -> Result<&str> {
        self.scorecard_key
            .as_deref()
            .ok_or_else(|| missing(COLLEGE_SCORECARD_KEY))
    }

    /// PCE price index of the most recent year.
    pub fn inflation_adjust(&self) -> Result<f64> {
        self.inflation_adjust.ok_or_else(|| missing(INFLATION_ADJUST))
    }
}
