//! Record shaping: population floor, column projection and ordering.

use anyhow::{Result, anyhow, bail};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::dataset::Dataset;
use crate::source::RecordSource;
use crate::subject::{Specification, Subject};

/// Which years to request from the upstream source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearSelector {
    Single(i32),
    /// Inclusive on both ends.
    Range(i32, i32),
    List(Vec<i32>),
}

impl YearSelector {
    /// Builds a list selector, rejecting an empty list.
    pub fn list(years: Vec<i32>) -> Result<Self> {
        if years.is_empty() {
            bail!("year list is empty");
        }
        Ok(YearSelector::List(years))
    }

    /// The most recent requested year.
    pub fn latest(&self) -> Option<i32> {
        match self {
            YearSelector::Single(y) => Some(*y),
            YearSelector::Range(a, b) => Some(*a.max(b)),
            YearSelector::List(ys) => ys.iter().copied().max(),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        match self {
            YearSelector::Single(y) => *y == year,
            YearSelector::Range(a, b) => (*a.min(b)..=*a.max(b)).contains(&year),
            YearSelector::List(ys) => ys.contains(&year),
        }
    }
}

impl fmt::Display for YearSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSelector::Single(y) => write!(f, "{y}"),
            YearSelector::Range(a, b) => write!(f, "{a}..{b}"),
            YearSelector::List(ys) => {
                let parts: Vec<String> = ys.iter().map(i32::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

impl FromStr for YearSelector {
    type Err = anyhow::Error;

    /// Accepts `2023`, `2003..2023`, `2003-2023` or `2003,2013,2023`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let year = |part: &str| -> Result<i32> {
            part.trim()
                .parse::<i32>()
                .map_err(|_| anyhow!("malformed year selector '{s}'"))
        };

        if let Some((a, b)) = s.split_once("..").or_else(|| s.split_once('-')) {
            let (start, end) = (year(a)?, year(b)?);
            if start > end {
                bail!("year range '{s}' runs backwards");
            }
            return Ok(YearSelector::Range(start, end));
        }
        if s.contains(',') {
            let years = s.split(',').map(year).collect::<Result<Vec<_>>>()?;
            return YearSelector::list(years);
        }
        Ok(YearSelector::Single(year(s)?))
    }
}

/// Applies the population floor and the subject's column list to `raw`.
///
/// Qualifying identifiers are those whose row at the latest requested year
/// has a population proxy of at least `poplimit`. Their rows are kept for
/// every year, projected onto the subject's declared columns (columns absent
/// from `raw` are dropped), stably sorted by year and deduplicated.
pub fn shape_records(
    raw: &Dataset,
    subject: Subject,
    years: &YearSelector,
    poplimit: u32,
) -> Result<Dataset> {
    let latest = years
        .latest()
        .ok_or_else(|| anyhow!("year selector for {subject} is empty"))?;
    for required in ["year", "id"] {
        if !raw.has_column(required) {
            bail!("{subject} records have no '{required}' column");
        }
    }

    let floor = f64::from(poplimit);
    let qualifying: HashSet<&str> = raw
        .rows()
        .filter(|r| r.year() == Some(latest))
        .filter(|r| subject.population(r).is_some_and(|p| p >= floor))
        .filter_map(|r| r.text("id"))
        .collect();

    let kept = raw.filter(|r| r.text("id").is_some_and(|id| qualifying.contains(id)));
    let mut shaped = kept.select(subject.columns());
    shaped.sort_by_year();
    shaped.dedup();

    debug!(
        subject = %subject,
        latest,
        poplimit,
        raw_rows = raw.len(),
        qualifying = qualifying.len(),
        rows = shaped.len(),
        "Records shaped"
    );

    Ok(shaped)
}

/// Fetches `subject` from `source` and shapes it.
#[tracing::instrument(skip(source), fields(years = %years))]
pub fn shape<S: RecordSource + ?Sized>(
    source: &S,
    subject: Subject,
    spec: Option<Specification>,
    years: &YearSelector,
    poplimit: u32,
) -> Result<Dataset> {
    subject.check_specification(spec)?;
    let raw = source.fetch(subject, spec, years)?;
    shape_records(&raw, subject, years, poplimit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    #[test]
    fn test_year_selector_parsing() {
        assert_eq!("2023".parse::<YearSelector>().unwrap(), YearSelector::Single(2023));
        assert_eq!(
            "2003..2023".parse::<YearSelector>().unwrap(),
            YearSelector::Range(2003, 2023)
        );
        assert_eq!(
            "2003-2023".parse::<YearSelector>().unwrap(),
            YearSelector::Range(2003, 2023)
        );
        assert_eq!(
            "2003, 2013,2023".parse::<YearSelector>().unwrap(),
            YearSelector::List(vec![2003, 2013, 2023])
        );
    }

    #[test]
    fn test_year_selector_rejects_malformed() {
        assert!("twenty".parse::<YearSelector>().is_err());
        assert!("2023..2003".parse::<YearSelector>().is_err());
        assert!("2003,,2023".parse::<YearSelector>().is_err());
        assert!("".parse::<YearSelector>().is_err());
        assert!(YearSelector::list(vec![]).is_err());
    }

    #[test]
    fn test_year_selector_latest_and_contains() {
        let list = YearSelector::List(vec![2013, 2023, 2003]);
        assert_eq!(list.latest(), Some(2023));
        assert!(list.contains(2003));
        assert!(!list.contains(2004));
        assert!(YearSelector::Range(2000, 2005).contains(2005));
        assert_eq!(YearSelector::List(vec![]).latest(), None);
    }

    #[test]
    fn test_floor_evaluated_at_latest_year_only() {
        let raw = enrollment_rows();
        let years = YearSelector::List(vec![2013, 2023]);
        let shaped = shape_records(&raw, Subject::Enrollment, &years, 1000).unwrap();

        let ids: HashSet<_> = shaped.rows().map(|r| r.text("id").unwrap()).collect();
        assert_eq!(ids, HashSet::from(["big"]));
        // The 2013 row is kept even though it would fail the floor on its own.
        let years_kept: Vec<_> = shaped.rows().map(|r| r.year().unwrap()).collect();
        assert_eq!(years_kept, vec![2013, 2023]);
    }

    #[test]
    fn test_output_limited_to_declared_columns() {
        let raw = enrollment_rows();
        let shaped =
            shape_records(&raw, Subject::Enrollment, &YearSelector::Single(2023), 0).unwrap();
        assert!(!shaped.has_column("undeclared"));
        assert!(!shaped.has_column("latitude"));
        for col in shaped.columns() {
            assert!(Subject::Enrollment.columns().contains(&col.as_str()));
        }
    }

    #[test]
    fn test_reshaping_with_zero_floor_is_identity() {
        let raw = enrollment_rows();
        let years = YearSelector::Range(2013, 2023);
        let once = shape_records(&raw, Subject::Enrollment, &years, 1000).unwrap();
        let twice = shape_records(&once, Subject::Enrollment, &years, 0).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicates_removed() {
        let mut raw = enrollment_rows();
        raw.push_row(big_row(2023, 1500.0)).unwrap();
        let shaped =
            shape_records(&raw, Subject::Enrollment, &YearSelector::Single(2023), 0).unwrap();
        assert_eq!(shaped.rows().filter(|r| r.text("id") == Some("big")).count(), 2);
    }

    #[test]
    fn test_missing_id_column_is_an_error() {
        let raw = Dataset::from_rows(&["year"], vec![vec![2023.0.into()]]).unwrap();
        assert!(shape_records(&raw, Subject::Admissions, &YearSelector::Single(2023), 0).is_err());
    }

    // Helpers

    fn enrollment_rows() -> Dataset {
        Dataset::from_rows(
            &["year", "id", "name", "totmen", "totwomen", "undeclared"],
            vec![
                big_row(2023, 1500.0),
                vec![
                    2023.0.into(),
                    "small".into(),
                    "Small College".into(),
                    100.0.into(),
                    100.0.into(),
                    Value::Null,
                ],
                big_row(2013, 200.0),
                vec![
                    2013.0.into(),
                    "small".into(),
                    "Small College".into(),
                    5000.0.into(),
                    5000.0.into(),
                    Value::Null,
                ],
            ],
        )
        .unwrap()
    }

    fn big_row(year: i32, men: f64) -> Vec<Value> {
        vec![
            f64::from(year).into(),
            "big".into(),
            "Big University".into(),
            men.into(),
            (men / 2.0).into(),
            Value::Null,
        ]
    }
}
