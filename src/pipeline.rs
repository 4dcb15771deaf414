//! End-to-end builds of the map and table artifacts.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::Settings;
use crate::datatable::EdDataTable;
use crate::multimap::{MultiMap, Outcome};
use crate::output::write_html;
use crate::services::scorecard_api::{ScorecardApi, WageStat};
use crate::source::RecordSource;
use crate::subject::Specification;

/// Frames of the published map, in dropdown order.
const MAP_FRAMES: &[(Outcome, Option<Specification>)] = &[
    (Outcome::AdmitRate, None),
    (Outcome::MaleEnrollmentShare, Some(Specification::Undergrad)),
    (Outcome::MaleEnrollmentShare, Some(Specification::Grad)),
    (Outcome::MaleCompletionShare, Some(Specification::Bachelor)),
    (Outcome::MaleGraduationRate, Some(Specification::Bachelor)),
    (Outcome::MaleGraduationRate, Some(Specification::Associate)),
];

/// Builds every map frame plus median earnings and writes the document to
/// `out`.
#[tracing::instrument(skip_all, fields(out = %out.display()))]
pub fn build_map<S, A>(
    settings: &Settings,
    source: &S,
    api: &A,
    out: &Path,
    search: bool,
) -> Result<MultiMap>
where
    S: RecordSource + ?Sized,
    A: ScorecardApi + ?Sized,
{
    let mut map = MultiMap::new(settings.most_recent_year()?);
    for (outcome, spec) in MAP_FRAMES {
        map.build_frame(source, *outcome, *spec)?;
    }
    map.build_earnings_frame(source, api, WageStat::Median, settings.inflation_adjust()?)?;

    let html = map.to_html(&settings.map_title, &settings.map_notes, search)?;
    write_html(out, &html)?;
    info!(frames = map.frames().len(), "Map built");
    Ok(map)
}

/// Builds every table pane and writes the document to `out`.
#[tracing::instrument(skip_all, fields(out = %out.display()))]
pub fn build_table<S, A>(
    settings: &Settings,
    source: &S,
    api: &A,
    out: &Path,
) -> Result<EdDataTable>
where
    S: RecordSource + ?Sized,
    A: ScorecardApi + ?Sized,
{
    let mut table = EdDataTable::new(settings.most_recent_year()?);
    table.generate(source, api, settings.inflation_adjust()?)?;

    write_html(out, &table.to_html())?;
    info!(panes = table.panes().len(), "Table built");
    Ok(table)
}
