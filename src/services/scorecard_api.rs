//! Trait and types for reading earnings from the College Scorecard.

use anyhow::{Result, bail};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Largest page size the endpoint serves.
pub const RESULTS_PER_PAGE: u32 = 100;

/// Which wage statistic to request, six years after entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WageStat {
    Mean,
    Median,
}

impl WageStat {
    /// Endpoint field names for the (male, female) values.
    pub fn fields(self) -> (&'static str, &'static str) {
        match self {
            WageStat::Median => (
                "latest.earnings.6_yrs_after_entry.median_earnings_male",
                "latest.earnings.6_yrs_after_entry.median_earnings_non_male",
            ),
            WageStat::Mean => (
                "latest.earnings.6_yrs_after_entry.mean_earnings.male_students",
                "latest.earnings.6_yrs_after_entry.mean_earnings.female_students",
            ),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WageStat::Mean => "mean",
            WageStat::Median => "median",
        }
    }
}

impl fmt::Display for WageStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WageStat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(WageStat::Mean),
            "median" => Ok(WageStat::Median),
            other => bail!("unknown wage statistic '{other}', expected mean or median"),
        }
    }
}

/// Parameters shared by every page of one earnings request.
#[derive(Debug, Clone, Copy)]
pub struct WageQuery {
    pub stat: WageStat,
    /// Lower bound on undergraduate degree-seeking enrollment.
    pub poplimit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageMetadata {
    pub total: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// One page of the `schools.json` endpoint. Result objects are keyed by the
/// dotted field names that were requested.
#[derive(Debug, Clone, Deserialize)]
pub struct ScorecardPage {
    pub metadata: Option<PageMetadata>,
    pub results: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Abstraction over the earnings endpoint.
pub trait ScorecardApi {
    /// Returns the zero-based `page` of schools matching `query`.
    fn fetch_page(&self, query: &WageQuery, page: u32) -> Result<ScorecardPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wage_stat_fields() {
        let (male, female) = WageStat::Median.fields();
        assert!(male.ends_with("median_earnings_male"));
        assert!(female.ends_with("median_earnings_non_male"));
        assert_eq!("Mean".parse::<WageStat>().unwrap(), WageStat::Mean);
        assert!("mode".parse::<WageStat>().is_err());
    }

    #[test]
    fn test_page_deserializes() {
        let body = r#"{"metadata": {"total": 1, "page": 0, "per_page": 100},
                       "results": [{"id": 100654, "school.name": "A"}]}"#;
        let page: ScorecardPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.metadata.unwrap().total, Some(1));
        assert_eq!(page.results.len(), 1);
    }

    #[test]
    fn test_page_without_results_is_malformed() {
        let body = r#"{"metadata": {"total": 1}}"#;
        assert!(serde_json::from_str::<ScorecardPage>(body).is_err());
    }
}
