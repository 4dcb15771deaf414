//! Tabular panes of shaped IPEDS records plus Scorecard earnings.

use anyhow::Result;
use std::collections::HashSet;
use tracing::info;

use crate::dataset::{Dataset, Row, Value};
use crate::earnings::{EarningsMap, adjust_all, fetch_wages};
use crate::format::{self, int_value};
use crate::render;
use crate::services::scorecard_api::{ScorecardApi, WageStat};
use crate::shape::{YearSelector, shape};
use crate::source::RecordSource;
use crate::subject::{Specification, Subject};

/// Population floor for every table pane.
pub const TABLE_POPLIMIT: u32 = 500;

/// Columns shown as-is rather than as truncated integers.
const IDENTITY_HEADERS: &[&str] = &["Year", "ID", "School", "City", "State"];

const IDENTITY_COLUMNS: [(&str, &str); 5] = [
    ("name", "School"),
    ("year", "Year"),
    ("id", "ID"),
    ("city", "City"),
    ("state", "State"),
];

const ADMISSIONS_COLUMNS: &[(&str, &str)] = &[
    IDENTITY_COLUMNS[0],
    IDENTITY_COLUMNS[1],
    IDENTITY_COLUMNS[2],
    IDENTITY_COLUMNS[3],
    IDENTITY_COLUMNS[4],
    ("tot_enrolled", "FirstYearEnroll"),
    ("men_enrolled", "FirstYearMaleEnroll"),
    ("men_admitted", "MaleAdmittees"),
    ("men_applied", "MaleApplicants"),
    ("men_applied_share", "MaleApplicantShare"),
    ("men_admitted_share", "MaleAdmitShare"),
    ("accept_rate_men", "MaleAdmitRate"),
    ("accept_rate_women", "FemaleAdmitRate"),
    ("yield_rate_men", "MaleYieldRate"),
    ("yield_rate_women", "FemaleYieldRate"),
];

const ENROLLMENT_COLUMNS: &[(&str, &str)] = &[
    IDENTITY_COLUMNS[0],
    IDENTITY_COLUMNS[1],
    IDENTITY_COLUMNS[2],
    IDENTITY_COLUMNS[3],
    IDENTITY_COLUMNS[4],
    ("totmen", "MaleEnrollment"),
    ("totwomen", "FemaleEnrollment"),
    ("totmen_share", "MaleEnrollShare"),
];

const GRADUATION_COLUMNS: &[(&str, &str)] = &[
    IDENTITY_COLUMNS[0],
    IDENTITY_COLUMNS[1],
    IDENTITY_COLUMNS[2],
    IDENTITY_COLUMNS[3],
    IDENTITY_COLUMNS[4],
    ("totmen", "MaleCohort"),
    ("totwomen", "FemaleCohort"),
    ("totmen_graduated", "MaleGrads"),
    ("totwomen_graduated", "FemaleGrads"),
    ("gradrate_totmen", "MaleGradRate"),
    ("gradrate_totwomen", "FemaleGradRate"),
];

const NOTE_IPEDS: &str = "Source: NCES IPEDS.";
const NOTE_ENROLLMENT: &str =
    "Source: NCES IPEDS. Note: Enrollment includes total part-time and full-time enrollment.";

/// A table pane drawn from one subject and specification.
#[derive(Debug, Clone, Copy)]
pub struct PaneSpec {
    pub key: &'static str,
    pub title: &'static str,
    pub note: &'static str,
    pub subject: Subject,
    pub spec: Option<Specification>,
    /// Source column and display header, in display order.
    pub columns: &'static [(&'static str, &'static str)],
}

pub const PANES: &[PaneSpec] = &[
    PaneSpec {
        key: "admissions",
        title: "Admissions",
        note: NOTE_IPEDS,
        subject: Subject::Admissions,
        spec: None,
        columns: ADMISSIONS_COLUMNS,
    },
    PaneSpec {
        key: "enrollment_U",
        title: "Enrollment (Undergrad)",
        note: NOTE_ENROLLMENT,
        subject: Subject::Enrollment,
        spec: Some(Specification::Undergrad),
        columns: ENROLLMENT_COLUMNS,
    },
    PaneSpec {
        key: "enrollment_G",
        title: "Enrollment (Grad)",
        note: "Source: NCES IPEDS. Note: Enrollment includes total part-time and full-time \
               enrollment. \"Graduate\" includes graduate and first-professional enrollment.",
        subject: Subject::Enrollment,
        spec: Some(Specification::Grad),
        columns: ENROLLMENT_COLUMNS,
    },
    PaneSpec {
        key: "graduation_assc",
        title: "Graduation (Assc.)",
        note: "Source: NCES IPEDS. Note: Graduation rates measure the share of men/women who \
               graduated within three years of enrollment.",
        subject: Subject::Graduation,
        spec: Some(Specification::Associate),
        columns: GRADUATION_COLUMNS,
    },
    PaneSpec {
        key: "graduation_bach",
        title: "Graduation (Bach.)",
        note: "Source: NCES IPEDS. Note: Graduation rates measure the share of men/women who \
               graduated within six years of enrollment.",
        subject: Subject::Graduation,
        spec: Some(Specification::Bachelor),
        columns: GRADUATION_COLUMNS,
    },
];

pub const EARNINGS_KEY: &str = "earnings";
const EARNINGS_TITLE: &str = "Median Earnings";
const EARNINGS_NOTE: &str = "Source: College Scorecard. Note: Median earnings were measured six \
    years after students first enrolled, among individuals who received federal aid, were working, \
    and were not enrolled in school. Earnings are adjusted using the PCE Chain-Type Price Index.";

/// A rendered-ready table: display headers and formatted cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePane {
    pub key: String,
    pub title: String,
    pub note: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TablePane {
    fn new(key: &str, title: &str, note: &str, header: Vec<String>) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            note: note.to_string(),
            header,
            rows: Vec::new(),
        }
    }

    /// Appends `row` unless an identical row is already present.
    fn push_unique(&mut self, row: Vec<String>, seen: &mut HashSet<Vec<String>>) {
        if seen.insert(row.clone()) {
            self.rows.push(row);
        }
    }
}

fn identity_cell(value: Option<&Value>) -> String {
    match value {
        Some(v) if !v.is_null() => v.to_string(),
        _ => format::NA.to_string(),
    }
}

fn numeric_cell(header: &str, value: Option<f64>) -> String {
    let n = int_value(value);
    if !n.is_na() && (header.contains("Share") || header.contains("Rate")) {
        format!("{n}%")
    } else {
        n.to_string()
    }
}

fn format_cell(row: &Row<'_>, column: &str, header: &str) -> String {
    if IDENTITY_HEADERS.contains(&header) {
        identity_cell(row.get(column))
    } else {
        numeric_cell(header, row.num(column))
    }
}

/// Formats shaped records into `pane`'s columns.
///
/// Columns the records lack are shown as `NA`. Rows are ordered by year
/// (stable) and exact duplicates after formatting are dropped.
pub fn pane_from_records(records: &Dataset, pane: &PaneSpec) -> TablePane {
    let mut records = records.clone();
    records.sort_by_year();

    let header = pane.columns.iter().map(|(_, h)| h.to_string()).collect();
    let mut table = TablePane::new(pane.key, pane.title, pane.note, header);
    let mut seen = HashSet::new();
    for row in records.rows() {
        let cells = pane
            .columns
            .iter()
            .map(|(column, header)| format_cell(&row, column, header))
            .collect();
        table.push_unique(cells, &mut seen);
    }
    table
}

/// Joins admissions schools to their (already adjusted) earnings. Schools
/// without male earnings are left out.
pub fn earnings_pane(admissions: &Dataset, wages: &EarningsMap) -> TablePane {
    let header = ["School", "ID", "City", "State", "MaleEarnings", "FemaleEarnings"]
        .map(String::from)
        .to_vec();
    let mut table = TablePane::new(EARNINGS_KEY, EARNINGS_TITLE, EARNINGS_NOTE, header);
    let mut seen = HashSet::new();
    for row in admissions.rows() {
        let Some(w) = row.text("id").and_then(|id| wages.get(id)) else {
            continue;
        };
        let cells = vec![
            identity_cell(row.get("name")),
            identity_cell(row.get("id")),
            identity_cell(row.get("city")),
            identity_cell(row.get("state")),
            format::dollars(Some(w.male)),
            format::dollars(w.female),
        ];
        table.push_unique(cells, &mut seen);
    }
    table
}

/// Set of table panes for one artifact.
pub struct EdDataTable {
    most_recent_year: i32,
    panes: Vec<TablePane>,
}

impl EdDataTable {
    pub fn new(most_recent_year: i32) -> Self {
        Self {
            most_recent_year,
            panes: Vec::new(),
        }
    }

    pub fn panes(&self) -> &[TablePane] {
        &self.panes
    }

    /// Shapes every configured pane over its subject's trend years, then
    /// adds the earnings pane.
    #[tracing::instrument(skip(self, source, api))]
    pub fn generate<S, A>(&mut self, source: &S, api: &A, inflation_index: f64) -> Result<()>
    where
        S: RecordSource + ?Sized,
        A: ScorecardApi + ?Sized,
    {
        for pane in PANES {
            let years = YearSelector::list(pane.subject.trend_years(self.most_recent_year))?;
            let records = shape(source, pane.subject, pane.spec, &years, TABLE_POPLIMIT)?;
            let table = pane_from_records(&records, pane);
            info!(pane = pane.key, rows = table.rows.len(), "Table pane built");
            self.panes.push(table);
        }

        let wages = fetch_wages(api, WageStat::Median, TABLE_POPLIMIT)?;
        let wages = adjust_all(&wages, inflation_index);
        let admissions = shape(
            source,
            Subject::Admissions,
            None,
            &YearSelector::Single(self.most_recent_year),
            0,
        )?;
        let table = earnings_pane(&admissions, &wages);
        info!(pane = EARNINGS_KEY, rows = table.rows.len(), "Table pane built");
        self.panes.push(table);
        Ok(())
    }

    pub fn to_html(&self) -> String {
        render::table::render_tables(&self.panes)
    }
}
