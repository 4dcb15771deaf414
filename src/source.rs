//! Upstream record access.
//!
//! The statistics themselves come from an external accessor; [`RecordSource`]
//! is the boundary. [`CsvSource`] reads per-subject extracts from a directory.

use anyhow::{Result, bail};
use std::path::PathBuf;
use tracing::debug;

use crate::dataset::Dataset;
use crate::shape::YearSelector;
use crate::subject::{Specification, Subject};

/// Returns raw records for one subject, limited to the requested years.
pub trait RecordSource {
    fn fetch(
        &self,
        subject: Subject,
        spec: Option<Specification>,
        years: &YearSelector,
    ) -> Result<Dataset>;
}

/// Reads `<dir>/<subject>.csv`.
///
/// Rows are kept when their `year` is selected and, if a specification is
/// given, their `studentlevel`/`deglevel` column matches it.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, subject: Subject) -> PathBuf {
        self.dir.join(format!("{}.csv", subject.config().source))
    }
}

impl RecordSource for CsvSource {
    fn fetch(
        &self,
        subject: Subject,
        spec: Option<Specification>,
        years: &YearSelector,
    ) -> Result<Dataset> {
        subject.check_specification(spec)?;
        let path = self.path_for(subject);
        let all = Dataset::read_csv(&path)?;

        let level = match (spec, subject.config().specification_column) {
            (Some(spec), Some(column)) => {
                if !all.has_column(column) {
                    bail!("{} has no '{column}' column", path.display());
                }
                Some((column, spec.code()))
            }
            _ => None,
        };

        let selected = all.filter(|r| {
            r.year().is_some_and(|y| years.contains(y))
                && level.is_none_or(|(column, code)| r.text(column) == Some(code))
        });

        debug!(
            path = %path.display(),
            total = all.len(),
            selected = selected.len(),
            "Records loaded"
        );

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_fetch_filters_years_and_level() {
        let dir = temp_dir("ipeds_viz_source_level");
        fs::write(
            dir.join("enrollment.csv"),
            "year,id,name,studentlevel,totmen,totwomen\n\
             2023,1,A,undergrad,10,10\n\
             2023,1,A,grad,5,5\n\
             2013,1,A,undergrad,8,8\n\
             2003,1,A,undergrad,7,7\n",
        )
        .unwrap();

        let source = CsvSource::new(&dir);
        let years = YearSelector::List(vec![2013, 2023]);
        let ds = source
            .fetch(Subject::Enrollment, Some(Specification::Undergrad), &years)
            .unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.rows().all(|r| r.text("studentlevel") == Some("undergrad")));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = temp_dir("ipeds_viz_source_missing");
        let source = CsvSource::new(&dir);
        let result = source.fetch(Subject::Admissions, None, &YearSelector::Single(2023));
        assert!(result.is_err());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_level_column_is_an_error() {
        let dir = temp_dir("ipeds_viz_source_nolevel");
        fs::write(dir.join("graduation.csv"), "year,id\n2023,1\n").unwrap();
        let source = CsvSource::new(&dir);
        let result = source.fetch(
            Subject::Graduation,
            Some(Specification::Bachelor),
            &YearSelector::Single(2023),
        );
        assert!(result.is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
