//! Map frames: one scattergeo layer per subject, outcome and specification.
//!
//! A [`MapFrame`] holds everything the renderer needs for one selectable
//! layer: marker positions, sizes and colours, the colour bar, and one hover
//! narrative per school. [`MultiMap`] collects frames in display order.

use anyhow::{Result, bail};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

use crate::dataset::{Dataset, Row};
use crate::earnings::{EarningsMap, adjust_all, fetch_wages};
use crate::format::{self, Op, int_value, int_value_op};
use crate::render;
use crate::services::scorecard_api::{ScorecardApi, WageStat};
use crate::shape::{YearSelector, shape};
use crate::source::RecordSource;
use crate::stats::{LogScale, format_percentile, weighted_median};
use crate::subject::{Specification, Subject};
use crate::theme::{
    ACCEPTANCE_RATE_SCALE, ColorScale, EARNINGS_SCALE, GENDER_SPLIT_SCALE, GRADUATION_RATE_SCALE,
};

/// The variable that colours a frame's markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    AdmitRate,
    AdmitShare,
    MaleEnrollmentShare,
    MaleCompletionShare,
    MaleGraduationRate,
}

impl Outcome {
    pub fn subject(self) -> Subject {
        match self {
            Outcome::AdmitRate | Outcome::AdmitShare => Subject::Admissions,
            Outcome::MaleEnrollmentShare => Subject::Enrollment,
            Outcome::MaleCompletionShare => Subject::Completion,
            Outcome::MaleGraduationRate => Subject::Graduation,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Outcome::AdmitRate => "accept_rate_men",
            Outcome::AdmitShare => "men_admitted_share",
            Outcome::MaleEnrollmentShare | Outcome::MaleCompletionShare => "totmen_share",
            Outcome::MaleGraduationRate => "gradrate_totmen",
        }
    }

    pub fn scale(self) -> ColorScale {
        match self {
            Outcome::AdmitRate => ACCEPTANCE_RATE_SCALE,
            Outcome::MaleGraduationRate => GRADUATION_RATE_SCALE,
            Outcome::AdmitShare | Outcome::MaleEnrollmentShare | Outcome::MaleCompletionShare => {
                GENDER_SPLIT_SCALE
            }
        }
    }

    fn title(self) -> &'static str {
        match self {
            Outcome::AdmitRate => "<b>Male Acceptance Rate</b>",
            Outcome::AdmitShare => "<b>Male Share of Acceptances</b>",
            Outcome::MaleEnrollmentShare => "<b>Male Enrollment Share</b>",
            Outcome::MaleCompletionShare => "<b>Male Share of Degrees</b>",
            Outcome::MaleGraduationRate => "<b>Male Graduation Rate</b>",
        }
    }

    /// Frame name and colour-bar title.
    pub fn label(self, spec: Option<Specification>) -> String {
        match spec {
            Some(spec) => format!("{}<br>({})", self.title(), spec.label()),
            None => self.title().to_string(),
        }
    }
}

/// Marker sizing and the population a school needs to be drawn.
#[derive(Debug, Clone, Copy)]
struct Sizing {
    divisor: f64,
    cutoff: f64,
}

const EARNINGS_SIZING: Sizing = Sizing {
    divisor: 300.0,
    cutoff: 500.0,
};

impl Sizing {
    fn for_subject(subject: Subject) -> Self {
        let (divisor, cutoff) = match subject {
            Subject::Admissions => (300.0, 500.0),
            Subject::Enrollment => (750.0, 2000.0),
            Subject::Completion => (750.0, 500.0),
            Subject::Graduation => (200.0, 100.0),
        };
        Sizing { divisor, cutoff }
    }

    /// Diameter in pixels, kept between 8 and 30.
    fn marker(&self, population: f64) -> f64 {
        round1((population / self.divisor).clamp(8.0, 30.0))
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Adds `median` to `ticks`, replacing any tick at the same position.
fn with_median_tick(mut ticks: Vec<Tick>, median: Tick) -> Vec<Tick> {
    ticks.retain(|t| t.value != median.value);
    ticks.push(median);
    ticks.sort_by(|a, b| a.value.total_cmp(&b.value));
    ticks
}

fn percent_ticks(median: f64) -> Vec<Tick> {
    let median = median.trunc();
    let ticks = [0.0, 25.0, 50.0, 75.0, 100.0]
        .into_iter()
        .map(|v| Tick {
            value: v,
            label: format!("{v}%"),
        })
        .collect();
    with_median_tick(
        ticks,
        Tick {
            value: median,
            label: format!("<b>Median ({median}%)"),
        },
    )
}

fn thousands(amount: f64) -> i64 {
    ((amount / 1000.0).floor() * 1000.0) as i64
}

/// One selectable map layer.
#[derive(Debug, Clone)]
pub struct MapFrame {
    pub name: String,
    pub ids: Vec<String>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub text: Vec<String>,
    pub sizes: Vec<f64>,
    pub colors: Vec<f64>,
    pub scale: ColorScale,
    pub ticks: Vec<Tick>,
}

impl MapFrame {
    fn new(name: String, scale: ColorScale) -> Self {
        Self {
            name,
            ids: Vec::new(),
            lat: Vec::new(),
            lon: Vec::new(),
            text: Vec::new(),
            sizes: Vec::new(),
            colors: Vec::new(),
            scale,
            ticks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// "Currently viewing" line shown under the title.
    pub fn subtitle(&self) -> String {
        format!("Currently viewing: <b>{}", self.name.replace("<br>", " <b>"))
    }
}

struct HoverContext<'a> {
    year: i32,
    spec: Option<Specification>,
    trend: &'a [(i32, Option<f64>)],
    percentile: String,
}

type HoverFn = fn(&Row<'_>, &HoverContext<'_>) -> String;

fn header(row: &Row<'_>) -> String {
    format!(
        "<b><u>{}</u></b><br>(<i>{}, {}</i>)<br>",
        row.text("name").unwrap_or_default(),
        row.text("city").unwrap_or_default(),
        row.text("state").unwrap_or_default()
    )
}

fn trend_lines(title: &str, trend: &[(i32, Option<f64>)]) -> String {
    let mut out = format!("<br><b><u>{title}</u></b>:<br>");
    for (year, value) in trend {
        let shown = match value {
            Some(_) => format!("{}%", format::rate(*value)),
            None => format::NA.to_string(),
        };
        out.push_str(&format!("<b>{year}</b>: {shown}<br>"));
    }
    out
}

fn rank_line(percentile: &str) -> String {
    format!("That places it in the <b>{percentile}</b> percentile of schools shown.<br>")
}

fn hover_admissions(row: &Row<'_>, ctx: &HoverContext<'_>) -> String {
    let name = row.text("name").unwrap_or_default();
    format!(
        "{header}In {year}, <b>{applied} men</b> applied to {name},<br>\
         and <b>{admitted} men</b>, or <b>{rate}%</b> were admitted. In comparison,<br>\
         <b>{women_rate}%</b> of female applicants were accepted. Men made up<br>\
         <b>{apply_share}%</b> of total applicants, and <b>{admit_share}%</b> of total \
         admittees.<br>\
         {rank}{trend}",
        header = header(row),
        year = ctx.year,
        applied = int_value(row.num("men_applied")),
        admitted = int_value(row.num("men_admitted")),
        rate = format::rate(row.num("accept_rate_men")),
        women_rate = format::rate(row.num("accept_rate_women")),
        apply_share = format::rate(row.num("men_applied_share")),
        admit_share = format::rate(row.num("men_admitted_share")),
        rank = rank_line(&ctx.percentile),
        trend = trend_lines("Male Acceptance Rates", ctx.trend),
    )
}

fn hover_enrollment(row: &Row<'_>, ctx: &HoverContext<'_>) -> String {
    let name = row.text("name").unwrap_or_default();
    format!(
        "{header}In {year}, <b>{men} men</b> and <b>{women} women</b> were<br>\
         enrolled at {name}, meaning that<br>\
         men made up <b>{share}%</b> of total enrollment.<br>\
         {rank}{trend}",
        header = header(row),
        year = ctx.year,
        men = int_value(row.num("totmen")),
        women = int_value(row.num("totwomen")),
        share = format::rate(row.num("totmen_share")),
        rank = rank_line(&ctx.percentile),
        trend = trend_lines("Male Enrollment Share", ctx.trend),
    )
}

fn hover_completion(row: &Row<'_>, ctx: &HoverContext<'_>) -> String {
    let name = row.text("name").unwrap_or_default();
    let level = ctx.spec.map(Specification::label).unwrap_or("all");
    format!(
        "{header}In {year}, <b>{men} men</b> and <b>{women} women</b> earned<br>\
         {level} degrees at {name}, so men received<br>\
         <b>{share}%</b> of the degrees awarded.<br>\
         {rank}{trend}",
        header = header(row),
        year = ctx.year,
        men = int_value(row.num("totmen")),
        women = int_value(row.num("totwomen")),
        share = format::rate(row.num("totmen_share")),
        rank = rank_line(&ctx.percentile),
        trend = trend_lines("Male Share of Degrees", ctx.trend),
    )
}

fn hover_graduation(row: &Row<'_>, ctx: &HoverContext<'_>) -> String {
    let name = row.text("name").unwrap_or_default();
    let cohort_year = match ctx.spec {
        Some(Specification::Bachelor) => ctx.year - 6,
        _ => ctx.year - 3,
    };
    let men_rate = row.num("gradrate_totmen");
    let women_rate = row.num("gradrate_totwomen");
    format!(
        "{header}By {year}, <b>{graduated} men</b> who entered in {cohort_year} had<br>\
         graduated from {name}.<br>\
         The male graduation rate in this cohort was <b>{men}%</b> and<br>\
         the female graduation rate was <b>{women}%</b>. This means the<br>\
         difference in graduation rates was <b>{diff}</b> percentage points.<br>\
         {rank}{trend}",
        header = header(row),
        year = ctx.year,
        graduated = int_value(row.num("totmen_graduated")),
        men = format::rate(men_rate),
        women = format::rate(women_rate),
        diff = int_value_op(men_rate, women_rate, Op::Subtract),
        rank = rank_line(&ctx.percentile),
        trend = trend_lines("Male Graduation Rates", ctx.trend),
    )
}

fn hover_for(subject: Subject) -> HoverFn {
    match subject {
        Subject::Admissions => hover_admissions,
        Subject::Enrollment => hover_enrollment,
        Subject::Completion => hover_completion,
        Subject::Graduation => hover_graduation,
    }
}

fn hover_earnings(
    row: &Row<'_>,
    male: f64,
    female: Option<f64>,
    stat: WageStat,
    percentile: &str,
) -> String {
    let name = row.text("name").unwrap_or_default();
    format!(
        "{header}For students who first enrolled at {name},<br>\
         the <b>{stat} male student</b> was earning <b>{male}</b><br>\
         six years later, and the <b>{stat} female student</b> was earning<br>\
         <b>{female}</b> (inflation adjusted). This means the difference in<br>\
         earnings was <b>{diff}</b>.<br>\
         {rank}",
        header = header(row),
        male = format::dollars(Some(male)),
        female = format::dollars(female),
        diff = int_value_op(Some(male), female, Op::Subtract).dollars(),
        rank = rank_line(percentile),
    )
}

/// Outcome values per school and year, for the hover trend lines.
fn trend_series<'a>(all: &'a Dataset, column: &str) -> HashMap<&'a str, BTreeMap<i32, f64>> {
    let mut series: HashMap<&str, BTreeMap<i32, f64>> = HashMap::new();
    for row in all.rows() {
        if let (Some(id), Some(year), Some(value)) = (row.text("id"), row.year(), row.num(column)) {
            series.entry(id).or_default().insert(year, value);
        }
    }
    series
}

fn has_coordinates(row: &Row<'_>) -> bool {
    row.num("latitude").is_some() && row.num("longitude").is_some()
}

/// Builds the frame for `outcome` from shaped records covering the
/// subject's trend years.
///
/// Markers are the most recent year's schools that have coordinates, meet
/// the display-size cutoff and report the outcome. Trend years a school did
/// not report show as `NA`.
pub fn frame_from_records(
    all: &Dataset,
    outcome: Outcome,
    spec: Option<Specification>,
    most_recent_year: i32,
) -> Result<MapFrame> {
    let subject = outcome.subject();
    subject.check_specification(spec)?;
    let sizing = Sizing::for_subject(subject);
    let column = outcome.column();

    // One row per school and year; field breakdowns would stack markers.
    let all = all.filter(|r| subject.is_total_row(r));
    let shown = all.filter(|r| {
        r.year() == Some(most_recent_year)
            && r.text("id").is_some()
            && has_coordinates(r)
            && r.num(column).is_some()
            && subject.population(r).is_some_and(|p| p >= sizing.cutoff)
    });
    if shown.is_empty() {
        bail!("no {subject} schools to display for {most_recent_year}");
    }

    let outcomes: Vec<f64> = shown.rows().filter_map(|r| r.num(column)).collect();
    let populations: Vec<Option<f64>> = shown.rows().map(|r| subject.population(&r)).collect();
    let median = weighted_median(
        &outcomes.iter().copied().map(Some).collect::<Vec<_>>(),
        &populations,
    )?;

    let years = subject.trend_years(most_recent_year);
    let series = trend_series(&all, column);
    let hover = hover_for(subject);

    let mut frame = MapFrame::new(outcome.label(spec), outcome.scale());
    for row in shown.rows() {
        let (Some(id), Some(value), Some(population)) =
            (row.text("id"), row.num(column), subject.population(&row))
        else {
            continue;
        };
        let trend: Vec<(i32, Option<f64>)> = years
            .iter()
            .map(|y| (*y, series.get(id).and_then(|s| s.get(y)).copied()))
            .collect();
        let ctx = HoverContext {
            year: most_recent_year,
            spec,
            trend: &trend,
            percentile: format_percentile(&outcomes, value),
        };

        frame.ids.push(id.to_string());
        frame.lat.push(row.num("latitude").unwrap_or_default());
        frame.lon.push(row.num("longitude").unwrap_or_default());
        frame.text.push(hover(&row, &ctx));
        frame.sizes.push(sizing.marker(population));
        frame.colors.push(round1(value));
    }
    frame.ticks = percent_ticks(median);

    info!(frame = %frame.name, schools = frame.len(), median, "Frame built");
    Ok(frame)
}

/// Builds the earnings frame from the most recent admissions records and
/// already inflation-adjusted `wages`.
///
/// Male earnings are log-transformed and rescaled to 0–100 so the colour
/// scale spans the same range as the percentage frames; tick labels are
/// mapped back to dollars.
pub fn earnings_frame_from_records(
    admissions: &Dataset,
    wages: &EarningsMap,
    stat: WageStat,
    most_recent_year: i32,
) -> Result<MapFrame> {
    let sizing = EARNINGS_SIZING;
    let joined = |r: &Row<'_>| r.text("id").and_then(|id| wages.get(id)).copied();

    let shown = admissions.filter(|r| {
        r.year() == Some(most_recent_year)
            && has_coordinates(r)
            && r.num("tot_enrolled").is_some_and(|p| p >= sizing.cutoff)
            && joined(r).is_some_and(|w| w.male > 0.0)
    });
    if shown.is_empty() {
        bail!("no schools with earnings to display for {most_recent_year}");
    }

    let male: Vec<f64> = shown.rows().filter_map(|r| joined(&r)).map(|w| w.male).collect();
    let enrolled: Vec<Option<f64>> = shown.rows().map(|r| r.num("tot_enrolled")).collect();
    let scale = LogScale::fit(&male)?;
    let median = weighted_median(&male.iter().copied().map(Some).collect::<Vec<_>>(), &enrolled)?;

    let label = format!(
        "<b>Male {} Earnings</b><br>(6 Years After Enroll)",
        match stat {
            WageStat::Median => "Median",
            WageStat::Mean => "Mean",
        }
    );
    let mut frame = MapFrame::new(label, EARNINGS_SCALE);
    for row in shown.rows() {
        let (Some(id), Some(w)) = (row.text("id"), joined(&row)) else {
            continue;
        };
        let percentile = format_percentile(&male, w.male);

        frame.ids.push(id.to_string());
        frame.lat.push(row.num("latitude").unwrap_or_default());
        frame.lon.push(row.num("longitude").unwrap_or_default());
        frame.text.push(hover_earnings(&row, w.male, w.female, stat, &percentile));
        frame
            .sizes
            .push(sizing.marker(row.num("tot_enrolled").unwrap_or_default()));
        frame.colors.push(round1(scale.normalize(w.male)));
    }

    let ticks = [0.0, 25.0, 50.0, 75.0, 99.0]
        .into_iter()
        .map(|p| Tick {
            value: p,
            label: format!("${}", thousands(scale.invert(p))),
        })
        .collect();
    frame.ticks = with_median_tick(
        ticks,
        Tick {
            value: round1(scale.normalize(median)),
            label: format!("<b>Median (${})", thousands(median)),
        },
    );

    info!(frame = %frame.name, schools = frame.len(), median, "Earnings frame built");
    Ok(frame)
}

/// Ordered collection of map frames for one artifact.
pub struct MultiMap {
    most_recent_year: i32,
    frames: Vec<MapFrame>,
}

impl MultiMap {
    pub fn new(most_recent_year: i32) -> Self {
        Self {
            most_recent_year,
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[MapFrame] {
        &self.frames
    }

    /// Shapes the outcome's subject over its trend years and appends a frame.
    #[tracing::instrument(skip(self, source))]
    pub fn build_frame<S: RecordSource + ?Sized>(
        &mut self,
        source: &S,
        outcome: Outcome,
        spec: Option<Specification>,
    ) -> Result<()> {
        let subject = outcome.subject();
        let years = YearSelector::list(subject.trend_years(self.most_recent_year))?;
        let records = shape(source, subject, spec, &years, 0)?;
        let frame = frame_from_records(&records, outcome, spec, self.most_recent_year)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Fetches earnings, joins them to admissions and appends a frame.
    #[tracing::instrument(skip(self, source, api))]
    pub fn build_earnings_frame<S, A>(
        &mut self,
        source: &S,
        api: &A,
        stat: WageStat,
        inflation_index: f64,
    ) -> Result<()>
    where
        S: RecordSource + ?Sized,
        A: ScorecardApi + ?Sized,
    {
        let wages = fetch_wages(api, stat, EARNINGS_SIZING.cutoff as u32)?;
        let wages = adjust_all(&wages, inflation_index);
        let admissions = shape(
            source,
            Subject::Admissions,
            None,
            &YearSelector::Single(self.most_recent_year),
            0,
        )?;
        let frame = earnings_frame_from_records(&admissions, &wages, stat, self.most_recent_year)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Renders every frame into one HTML document.
    pub fn to_html(&self, title: &str, notes: &str, search: bool) -> Result<String> {
        render::map::render_map(&self.frames, title, notes, search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;
    use crate::earnings::Wages;

    #[test]
    fn test_label_with_specification() {
        assert_eq!(
            Outcome::MaleEnrollmentShare.label(Some(Specification::Grad)),
            "<b>Male Enrollment Share</b><br>(Graduate)"
        );
        assert_eq!(Outcome::AdmitRate.label(None), "<b>Male Acceptance Rate</b>");
    }

    #[test]
    fn test_marker_size_clamped() {
        let sizing = Sizing::for_subject(Subject::Admissions);
        assert_eq!(sizing.marker(300.0), 8.0);
        assert_eq!(sizing.marker(3000.0), 10.0);
        assert_eq!(sizing.marker(300_000.0), 30.0);
    }

    #[test]
    fn test_percent_ticks_include_median() {
        let ticks = percent_ticks(61.8);
        let values: Vec<f64> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 25.0, 50.0, 61.0, 75.0, 100.0]);
        assert_eq!(ticks[3].label, "<b>Median (61%)");

        let ticks = percent_ticks(50.0);
        assert_eq!(ticks.len(), 5);
        assert_eq!(ticks[2].label, "<b>Median (50%)");
    }

    #[test]
    fn test_admissions_frame() {
        let all = admissions_records();
        let frame = frame_from_records(&all, Outcome::AdmitRate, None, 2023).unwrap();

        // "small" is below the display cutoff, "nowhere" has no coordinates.
        assert_eq!(frame.ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(frame.colors, vec![40.0, 70.0]);
        assert_eq!(frame.sizes, vec![10.0, 8.0]);

        let a = &frame.text[0];
        assert!(a.contains("Alpha University"));
        assert!(a.contains("<b>600 men</b> applied"));
        assert!(a.contains("<b>2003</b>: NA"));
        assert!(a.contains("<b>2013</b>: 35.0%"));
        assert!(a.contains("<b>2023</b>: 40.0%"));
        assert!(a.contains("<b>50th</b> percentile"));
        assert!(frame.text[1].contains("<b>99th</b> percentile"));

        // Weighted by enrollment, Alpha (3000) outweighs Beta (600).
        assert!(frame.ticks.iter().any(|t| t.label == "<b>Median (40%)"));
    }

    #[test]
    fn test_frame_rejects_wrong_specification() {
        let all = admissions_records();
        let frame =
            frame_from_records(&all, Outcome::AdmitRate, Some(Specification::Grad), 2023);
        assert!(frame.is_err());
    }

    #[test]
    fn test_empty_frame_is_an_error() {
        let all = admissions_records();
        assert!(frame_from_records(&all, Outcome::AdmitRate, None, 1999).is_err());
    }

    #[test]
    fn test_graduation_hover_uses_cohort_lag_and_delta() {
        let all = Dataset::from_rows(
            &[
                "year", "id", "name", "city", "state", "latitude", "longitude",
                "totmen", "totwomen", "totmen_graduated", "gradrate_totmen", "gradrate_totwomen",
            ],
            vec![vec![
                2023.0.into(), "g".into(), "Gamma College".into(), "Troy".into(), "NY".into(),
                42.7.into(), (-73.7).into(),
                150.0.into(), 150.0.into(), 90.0.into(), 60.9.into(), 70.2.into(),
            ]],
        )
        .unwrap();

        let bach = frame_from_records(
            &all,
            Outcome::MaleGraduationRate,
            Some(Specification::Bachelor),
            2023,
        )
        .unwrap();
        assert!(bach.text[0].contains("entered in 2017"));
        assert!(bach.text[0].contains("<b>-10</b> percentage points"));

        let assc = frame_from_records(
            &all,
            Outcome::MaleGraduationRate,
            Some(Specification::Associate),
            2023,
        )
        .unwrap();
        assert!(assc.text[0].contains("entered in 2020"));
    }

    #[test]
    fn test_completion_frame_uses_grand_total_rows() {
        let row = |year: f64, cip: &str, field: &str, men: f64, women: f64, share: f64| {
            let cells: Vec<Value> = vec![
                year.into(), "100".into(), "Alpha University".into(), "Town".into(), "ST".into(),
                "bach".into(), 40.0.into(), (-80.0).into(), cip.into(), field.into(),
                men.into(), women.into(), share.into(),
            ];
            cells
        };
        let all = Dataset::from_rows(
            &[
                "year", "id", "name", "city", "state", "deglevel", "latitude", "longitude",
                "cip", "cip_description", "totmen", "totwomen", "totmen_share",
            ],
            vec![
                row(2013.0, "14", "Engineering", 300.0, 90.0, 76.9),
                row(2013.0, "99", "Grand total", 1900.0, 2200.0, 46.3),
                row(2023.0, "99", "Grand total", 2000.0, 2400.0, 45.5),
                row(2023.0, "14", "Engineering", 600.0, 200.0, 75.0),
                row(2023.0, "51", "Health", 100.0, 500.0, 16.7),
            ],
        )
        .unwrap();

        let frame = frame_from_records(
            &all,
            Outcome::MaleCompletionShare,
            Some(Specification::Bachelor),
            2023,
        )
        .unwrap();

        assert_eq!(frame.ids, vec!["100".to_string()]);
        assert_eq!(frame.colors, vec![45.5]);
        assert!(frame.text[0].contains("<b>2000 men</b> and <b>2400 women</b>"));
        assert!(frame.text[0].contains("<b>2013</b>: 46.3%"));
        assert!(frame.text[0].contains("<b>2023</b>: 45.5%"));
    }

    #[test]
    fn test_earnings_frame_log_normalised() {
        let admissions = admissions_records();
        let mut wages = EarningsMap::new();
        wages.insert("a".into(), Wages { male: 40_000.0, female: Some(38_000.0) });
        wages.insert("b".into(), Wages { male: 80_000.0, female: None });

        let frame =
            earnings_frame_from_records(&admissions, &wages, WageStat::Median, 2023).unwrap();

        assert_eq!(frame.ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(frame.colors, vec![0.0, 100.0]);
        assert!(frame.text[0].contains("<b>$40000</b>"));
        assert!(frame.text[0].contains("<b>$2000</b>"));
        assert!(frame.text[1].contains("<b>NA</b> (inflation adjusted)"));
        assert!(frame.text[1].contains("earnings was <b>NA</b>"));

        let labels: Vec<&str> = frame.ticks.iter().map(|t| t.label.as_str()).collect();
        assert!(labels.contains(&"<b>Median ($40000)"));
        assert!(labels.contains(&"$79000"));
    }

    #[test]
    fn test_earnings_frame_without_matches_is_an_error() {
        let admissions = admissions_records();
        let wages = EarningsMap::new();
        assert!(earnings_frame_from_records(&admissions, &wages, WageStat::Median, 2023).is_err());
    }

    #[test]
    fn test_subtitle() {
        let frame = MapFrame::new(
            Outcome::MaleGraduationRate.label(Some(Specification::Bachelor)),
            GRADUATION_RATE_SCALE,
        );
        assert_eq!(
            frame.subtitle(),
            "Currently viewing: <b><b>Male Graduation Rate</b> <b>(Bachelor's)"
        );
    }

    // Helpers

    fn admissions_records() -> Dataset {
        let columns = [
            "year", "id", "name", "city", "state", "latitude", "longitude",
            "tot_enrolled", "men_applied", "men_admitted", "accept_rate_men", "accept_rate_women",
            "men_applied_share", "men_admitted_share",
        ];
        let row = |year: f64, id: &str, name: &str, lat: Option<f64>, enrolled: f64, rate: f64| {
            let cells: Vec<Value> = vec![
                year.into(), id.into(), name.into(), "Town".into(), "ST".into(),
                lat.into(), (-80.0).into(),
                enrolled.into(), 600.0.into(), 240.0.into(), rate.into(), 45.0.into(),
                48.0.into(), 46.5.into(),
            ];
            cells
        };
        Dataset::from_rows(
            &columns,
            vec![
                row(2013.0, "a", "Alpha University", Some(40.0), 2900.0, 35.0),
                row(2023.0, "a", "Alpha University", Some(40.0), 3000.0, 40.0),
                row(2023.0, "b", "Beta College", Some(41.0), 600.0, 70.0),
                row(2023.0, "small", "Small College", Some(42.0), 100.0, 90.0),
                row(2023.0, "nowhere", "Nowhere Institute", None, 5000.0, 10.0),
            ],
        )
        .unwrap()
    }
}
