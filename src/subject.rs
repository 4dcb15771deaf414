//! Subject variants and their typed configuration.
//!
//! Each [`Subject`] owns a fixed [`SubjectConfig`]: where its records come
//! from, how its population proxy is computed, and which columns survive
//! shaping.

use anyhow::{Result, anyhow, bail};
use std::fmt;
use std::str::FromStr;

use crate::dataset::Row;

/// A category of institutional statistics with its own schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Admissions,
    Enrollment,
    Completion,
    Graduation,
}

/// How a row's population is measured for the population floor.
#[derive(Debug, Clone, Copy)]
pub enum PopulationProxy {
    Column(&'static str),
    Sum(&'static str, &'static str),
}

impl PopulationProxy {
    /// Null when any input column is missing or non-numeric.
    pub fn eval(&self, row: &Row<'_>) -> Option<f64> {
        match self {
            PopulationProxy::Column(c) => row.num(c),
            PopulationProxy::Sum(a, b) => Some(row.num(a)? + row.num(b)?),
        }
    }
}

#[derive(Debug)]
pub struct SubjectConfig {
    /// File stem of the upstream extract.
    pub source: &'static str,
    pub proxy: PopulationProxy,
    /// Columns retained after shaping, in output order.
    pub columns: &'static [&'static str],
    /// Column that distinguishes specifications, for subjects that have them.
    pub specification_column: Option<&'static str>,
    /// Offsets from the most recent year used for multi-year trends.
    pub trend_offsets: &'static [i32],
}

/// CIP code of the all-fields total in completion extracts.
pub const GRAND_TOTAL_CIP: &str = "99";

static ADMISSIONS: SubjectConfig = SubjectConfig {
    source: "admissions",
    proxy: PopulationProxy::Column("tot_enrolled"),
    columns: &[
        "year", "id", "name", "city", "state", "latitude", "longitude",
        "tot_enrolled", "men_enrolled", "men_admitted",
        "men_applied", "men_applied_share", "men_admitted_share",
        "accept_rate_men", "accept_rate_women",
        "yield_rate_men", "yield_rate_women",
        "sat_rw_25", "sat_rw_75", "sat_math_25", "sat_math_75",
        "act_eng_25", "act_eng_75", "act_math_25", "act_math_75",
        "act_comp_25", "act_comp_75",
    ],
    specification_column: None,
    trend_offsets: &[20, 10, 0],
};

static ENROLLMENT: SubjectConfig = SubjectConfig {
    source: "enrollment",
    proxy: PopulationProxy::Sum("totmen", "totwomen"),
    columns: &[
        "year", "id", "name", "city", "state", "studentlevel", "latitude", "longitude",
        "totmen", "totwomen", "totmen_share",
        "wtmen", "wtwomen", "bkmen", "bkwomen",
        "asnmen", "asnwomen", "hspmen", "hspwomen",
    ],
    specification_column: Some("studentlevel"),
    trend_offsets: &[30, 20, 10, 0],
};

static COMPLETION: SubjectConfig = SubjectConfig {
    source: "completion",
    proxy: PopulationProxy::Sum("totmen", "totwomen"),
    columns: &[
        "year", "id", "name", "city", "state", "deglevel", "latitude", "longitude",
        "cip", "cip_description",
        "totmen", "totwomen", "totmen_share",
        "wtmen", "wtwomen", "bkmen", "bkwomen",
        "asnmen", "asnwomen", "hspmen", "hspwomen",
    ],
    specification_column: Some("deglevel"),
    trend_offsets: &[30, 20, 10, 0],
};

static GRADUATION: SubjectConfig = SubjectConfig {
    source: "graduation",
    proxy: PopulationProxy::Sum("totmen", "totwomen"),
    columns: &[
        "year", "id", "name", "city", "state", "deglevel", "latitude", "longitude",
        "totmen", "totwomen", "totmen_graduated", "totwomen_graduated",
        "wtmen", "wtwomen", "bkmen", "bkwomen",
        "asnmen", "asnwomen", "hspmen", "hspwomen",
        "gradrate_totmen", "gradrate_totwomen",
        "gradrate_wtmen", "gradrate_wtwomen",
        "gradrate_bkmen", "gradrate_bkwomen",
        "gradrate_asnmen", "gradrate_asnwomen",
        "gradrate_hspmen", "gradrate_hspwomen",
    ],
    specification_column: Some("deglevel"),
    trend_offsets: &[20, 10, 0],
};

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Admissions,
        Subject::Enrollment,
        Subject::Completion,
        Subject::Graduation,
    ];

    pub fn config(self) -> &'static SubjectConfig {
        match self {
            Subject::Admissions => &ADMISSIONS,
            Subject::Enrollment => &ENROLLMENT,
            Subject::Completion => &COMPLETION,
            Subject::Graduation => &GRADUATION,
        }
    }

    pub fn name(self) -> &'static str {
        self.config().source
    }

    pub fn population(self, row: &Row<'_>) -> Option<f64> {
        self.config().proxy.eval(row)
    }

    pub fn columns(self) -> &'static [&'static str] {
        self.config().columns
    }

    /// Whether `row` is a school-wide total rather than a breakdown.
    ///
    /// Completion extracts carry one row per CIP field; only the grand-total
    /// row describes the whole school. Rows without a `cip` value count as
    /// totals.
    pub fn is_total_row(self, row: &Row<'_>) -> bool {
        match self {
            Subject::Completion => row.text("cip").is_none_or(|cip| cip == GRAND_TOTAL_CIP),
            _ => true,
        }
    }

    /// Trend years ending at `most_recent_year`, oldest first.
    pub fn trend_years(self, most_recent_year: i32) -> Vec<i32> {
        self.config()
            .trend_offsets
            .iter()
            .map(|off| most_recent_year - off)
            .collect()
    }

    /// Subjects split by level must be given one; the rest must not.
    pub fn check_specification(self, spec: Option<Specification>) -> Result<()> {
        match (self, spec) {
            (Subject::Admissions, None) => Ok(()),
            (Subject::Enrollment, Some(Specification::Undergrad | Specification::Grad)) => Ok(()),
            (
                Subject::Completion | Subject::Graduation,
                Some(Specification::Associate | Specification::Bachelor),
            ) => Ok(()),
            (subject, Some(spec)) => bail!("{subject} has no '{}' specification", spec.code()),
            (subject, None) => bail!("{subject} requires a specification"),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Subject {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                anyhow!(
                    "unknown subject '{s}', expected admissions, enrollment, \
                     completion or graduation"
                )
            })
    }
}

/// A within-subject sub-category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specification {
    Undergrad,
    Grad,
    Associate,
    Bachelor,
}

impl Specification {
    /// The value stored in the upstream `studentlevel` / `deglevel` column.
    pub fn code(self) -> &'static str {
        match self {
            Specification::Undergrad => "undergrad",
            Specification::Grad => "grad",
            Specification::Associate => "assc",
            Specification::Bachelor => "bach",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Specification::Undergrad => "Undergraduate",
            Specification::Grad => "Graduate",
            Specification::Associate => "Associate's",
            Specification::Bachelor => "Bachelor's",
        }
    }
}

impl FromStr for Specification {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "undergrad" | "undergraduate" => Ok(Specification::Undergrad),
            "grad" | "graduate" => Ok(Specification::Grad),
            "assc" | "associate" => Ok(Specification::Associate),
            "bach" | "bachelor" => Ok(Specification::Bachelor),
            other => bail!("unknown specification '{other}'"),
        }
    }
}
