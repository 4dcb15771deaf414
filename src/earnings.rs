//! Male/female earnings by school, collected from the College Scorecard.

use anyhow::{Result, anyhow, bail};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::services::scorecard_api::{RESULTS_PER_PAGE, ScorecardApi, WageQuery, WageStat};

/// PCE price index (2017 = 100) of the year Scorecard earnings are expressed in.
pub const PCE_BASE_INDEX: f64 = 116.11;

/// Earnings for one school. Schools without a male value are never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wages {
    pub male: f64,
    pub female: Option<f64>,
}

impl Wages {
    /// Rescales to the dollars of the year whose PCE index is `index`.
    pub fn adjusted(self, index: f64) -> Self {
        let factor = index / PCE_BASE_INDEX;
        Wages {
            male: self.male * factor,
            female: self.female.map(|f| f * factor),
        }
    }
}

/// Serialized as `[male, female]`.
impl Serialize for Wages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.male, self.female).serialize(serializer)
    }
}

/// Earnings keyed by school identifier.
pub type EarningsMap = BTreeMap<String, Wages>;

/// Reads every page of schools with at least `poplimit` students.
///
/// Page 0 supplies `metadata.total`; the remaining pages are read in order.
/// Any failed page aborts the whole fetch.
///
/// # Errors
///
/// Fails on request errors, when the total is missing, when a result has no
/// usable `id`, or when the number of results received differs from the
/// advertised total.
#[tracing::instrument(skip(api))]
pub fn fetch_wages<A: ScorecardApi + ?Sized>(
    api: &A,
    stat: WageStat,
    poplimit: u32,
) -> Result<EarningsMap> {
    let query = WageQuery { stat, poplimit };

    let first = api.fetch_page(&query, 0)?;
    let total = first
        .metadata
        .as_ref()
        .and_then(|m| m.total)
        .ok_or_else(|| anyhow!("Scorecard response is missing metadata.total"))?;
    let pages = total.div_ceil(u64::from(RESULTS_PER_PAGE)).max(1);
    info!(total, pages, "Fetching Scorecard earnings");

    let mut wages = EarningsMap::new();
    let mut received = collect_page(&first.results, stat, &mut wages)?;

    for page in 1..pages {
        let page = u32::try_from(page)?;
        let next = api.fetch_page(&query, page)?;
        received += collect_page(&next.results, stat, &mut wages)?;
        debug!(page, received, "Scorecard page received");
    }

    if received as u64 != total {
        bail!("Scorecard advertised {total} schools across {pages} pages but returned {received}");
    }

    info!(received, with_male_earnings = wages.len(), "Scorecard earnings fetched");
    Ok(wages)
}

/// Adds the page's schools that report male earnings. Returns the number of
/// results on the page.
fn collect_page(
    results: &[Map<String, Value>],
    stat: WageStat,
    out: &mut EarningsMap,
) -> Result<usize> {
    let (male_field, female_field) = stat.fields();
    for school in results {
        let id = school_id(school)?;
        let male = school.get(male_field).and_then(Value::as_f64);
        let female = school.get(female_field).and_then(Value::as_f64);
        if let Some(male) = male {
            out.insert(id, Wages { male, female });
        }
    }
    Ok(results.len())
}

fn school_id(school: &Map<String, Value>) -> Result<String> {
    match school.get("id") {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(anyhow!("Scorecard result has no usable id: {other:?}")),
    }
}

/// Applies [`Wages::adjusted`] to every school.
pub fn adjust_all(wages: &EarningsMap, index: f64) -> EarningsMap {
    wages
        .iter()
        .map(|(id, w)| (id.clone(), w.adjusted(index)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scorecard_api::{PageMetadata, ScorecardPage};
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn test_null_male_earnings_excluded() {
        let api = FakeApi::single(vec![
            school(1, Some(50000.0), Some(45000.0)),
            school(2, Some(60000.0), None),
            school(3, None, Some(40000.0)),
        ]);
        let wages = fetch_wages(&api, WageStat::Median, 300).unwrap();

        assert_eq!(wages.len(), 2);
        assert_eq!(wages["1"], Wages { male: 50000.0, female: Some(45000.0) });
        assert_eq!(wages["2"].female, None);
        assert!(!wages.contains_key("3"));
    }

    #[test]
    fn test_reads_every_page() {
        let page0: Vec<_> = (0..100).map(|i| school(i, Some(1000.0), None)).collect();
        let page1: Vec<_> = (100..150).map(|i| school(i, Some(2000.0), None)).collect();
        let api = FakeApi {
            pages: vec![page(Some(150), page0), page(Some(150), page1)],
            requested: RefCell::new(Vec::new()),
        };

        let wages = fetch_wages(&api, WageStat::Mean, 0).unwrap();
        assert_eq!(wages.len(), 150);
        assert_eq!(*api.requested.borrow(), vec![0, 1]);
    }

    #[test]
    fn test_missing_total_is_an_error() {
        let api = FakeApi {
            pages: vec![ScorecardPage {
                metadata: None,
                results: vec![],
            }],
            requested: RefCell::new(Vec::new()),
        };
        assert!(fetch_wages(&api, WageStat::Median, 0).is_err());
    }

    #[test]
    fn test_count_mismatch_is_an_error() {
        let api = FakeApi {
            pages: vec![page(Some(5), vec![school(1, Some(1.0), None)])],
            requested: RefCell::new(Vec::new()),
        };
        assert!(fetch_wages(&api, WageStat::Median, 0).is_err());
    }

    #[test]
    fn test_failed_page_aborts() {
        let page0: Vec<_> = (0..100).map(|i| school(i, Some(1000.0), None)).collect();
        let api = FakeApi {
            pages: vec![page(Some(250), page0)],
            requested: RefCell::new(Vec::new()),
        };
        assert!(fetch_wages(&api, WageStat::Median, 0).is_err());
    }

    #[test]
    fn test_inflation_adjustment() {
        let w = Wages {
            male: PCE_BASE_INDEX * 100.0,
            female: Some(PCE_BASE_INDEX * 50.0),
        };
        let adjusted = w.adjusted(PCE_BASE_INDEX * 2.0);
        assert!((adjusted.male - PCE_BASE_INDEX * 200.0).abs() < 1e-6);
        assert!((adjusted.female.unwrap() - PCE_BASE_INDEX * 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_wages_serialize_as_pair() {
        let w = Wages {
            male: 1.0,
            female: None,
        };
        assert_eq!(serde_json::to_string(&w).unwrap(), "[1.0,null]");
    }

    // Helpers

    struct FakeApi {
        pages: Vec<ScorecardPage>,
        requested: RefCell<Vec<u32>>,
    }

    impl FakeApi {
        fn single(results: Vec<Map<String, Value>>) -> Self {
            let total = results.len() as u64;
            Self {
                pages: vec![page(Some(total), results)],
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl ScorecardApi for FakeApi {
        fn fetch_page(&self, _query: &WageQuery, page: u32) -> Result<ScorecardPage> {
            self.requested.borrow_mut().push(page);
            self.pages
                .get(page as usize)
                .cloned()
                .ok_or_else(|| anyhow!("page {page} unavailable"))
        }
    }

    fn page(total: Option<u64>, results: Vec<Map<String, Value>>) -> ScorecardPage {
        ScorecardPage {
            metadata: Some(PageMetadata {
                total,
                page: None,
                per_page: None,
            }),
            results,
        }
    }

    fn school(id: u64, male: Option<f64>, female: Option<f64>) -> Map<String, Value> {
        let (male_field, female_field) = WageStat::Median.fields();
        let (mean_male, _) = WageStat::Mean.fields();
        let value = json!({
            "id": id,
            "school.name": format!("School {id}"),
            male_field: male,
            female_field: female,
            mean_male: male,
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }
}
