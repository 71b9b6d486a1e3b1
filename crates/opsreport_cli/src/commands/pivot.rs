use crate::commands::{read_observations, to_json, write_stdout, TableSource};
use crate::error::CliError;
use crate::render::render_report;
use clap::{Args, ValueEnum};
use log::{error, info};
use opsreport_core::{
    AggFn, Dimension, GridKey, Observation, ObservationFilter, Report, ReportPreset, ReportQuery,
    ReportService, ValueField,
};
use opsreport_store::{open_store_db, SnapshotPublisher, SqliteSnapshotStore, StoreConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Args, Debug)]
pub struct PivotArgs {
    /// JSON array of observations.
    #[arg(long, conflicts_with = "store")]
    pub input: Option<PathBuf>,

    /// Snapshot database; reads the current published snapshot.
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Priority table JSON replacing the built-in ranks.
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Named layout used for anything not set explicitly.
    #[arg(long, default_value = "weekly")]
    pub preset: ReportPreset,

    /// Row dimensions, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub rows: Vec<Dimension>,

    /// Column dimensions, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub cols: Vec<Dimension>,

    #[arg(long)]
    pub agg: Option<AggFn>,

    #[arg(long, value_enum)]
    pub value_field: Option<ValueFieldArg>,

    /// Skip the delta annotations.
    #[arg(long)]
    pub no_delta: bool,

    #[arg(long, value_delimiter = ',')]
    pub years: Vec<i32>,

    #[arg(long, value_delimiter = ',')]
    pub months: Vec<u32>,

    #[arg(long, value_delimiter = ',')]
    pub weeks: Vec<u32>,

    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Append the least-squares trend of each row.
    #[arg(long)]
    pub trend: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueFieldArg {
    Value,
    AbsoluteChange,
}

impl From<ValueFieldArg> for ValueField {
    fn from(value: ValueFieldArg) -> Self {
        match value {
            ValueFieldArg::Value => ValueField::Value,
            ValueFieldArg::AbsoluteChange => ValueField::AbsoluteChange,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl PivotArgs {
    /// Preset layout overridden by the explicit flags.
    pub fn query(&self) -> ReportQuery {
        let mut query = ReportQuery::from_preset(self.preset);
        if !self.rows.is_empty() {
            query.pivot.row_dims = self.rows.clone();
        }
        if !self.cols.is_empty() {
            query.pivot.col_dims = self.cols.clone();
        }
        if let Some(agg) = self.agg {
            query.pivot.agg_fn = agg;
        }
        if let Some(field) = self.value_field {
            query.pivot.value_field = field.into();
        }
        if self.no_delta {
            query.pivot.include_delta = false;
        }
        query.with_filter(self.filter())
    }

    /// Absent flags leave their field unconstrained.
    fn filter(&self) -> ObservationFilter {
        let mut filter = ObservationFilter::default();
        if !self.years.is_empty() {
            filter = filter.with_years(self.years.iter().copied());
        }
        if !self.months.is_empty() {
            filter = filter.with_months(self.months.iter().copied());
        }
        if !self.weeks.is_empty() {
            filter = filter.with_weeks(self.weeks.iter().copied());
        }
        if !self.categories.is_empty() {
            filter = filter.with_categories(self.categories.iter().cloned());
        }
        filter
    }
}

#[derive(Serialize)]
struct RowTrend<'a> {
    row: &'a GridKey,
    slope: f64,
    direction: opsreport_core::Direction,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    trends: Option<Vec<RowTrend<'a>>>,
}

pub fn run(args: PivotArgs) -> Result<(), CliError> {
    let started_at = Instant::now();
    let observations = load_observations(&args)?;
    let source = TableSource::open(args.table.as_deref())?;
    let table = source.table();
    let query = args.query();

    info!(
        "event=report_run module=cli status=start preset={} rows={} observations={}",
        args.preset,
        query.pivot.row_dims.len(),
        observations.len()
    );
    let report = match ReportService::new(table).run(&observations, &query) {
        Ok(report) => report,
        Err(err) => {
            error!(
                "event=report_run module=cli status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };
    info!(
        "event=report_run module=cli status=ok rows={} columns={} duration_ms={}",
        report.pivot.rows().len(),
        report.pivot.columns().len(),
        started_at.elapsed().as_millis()
    );

    let trends = args.trend.then(|| row_trends(&report));
    let output = match args.format {
        OutputFormat::Json => to_json(&JsonOutput {
            report: &report,
            trends,
        })?,
        OutputFormat::Text => {
            let mut text = render_report(&report, table);
            for trend in trends.iter().flatten() {
                text.push_str(&format!(
                    "trend {}: {:+.2} {}\n",
                    trend.row,
                    trend.slope,
                    trend.direction.arrow()
                ));
            }
            text
        }
    };
    write_stdout(&output)
}

fn row_trends(report: &Report) -> Vec<RowTrend<'_>> {
    report
        .pivot
        .rows()
        .iter()
        .filter_map(|row| {
            report.trend(row).map(|trend| RowTrend {
                row,
                slope: trend.slope,
                direction: trend.direction,
            })
        })
        .collect()
}

fn load_observations(args: &PivotArgs) -> Result<Vec<Observation>, CliError> {
    match (&args.input, &args.store) {
        (Some(path), _) => read_observations(path),
        (None, Some(store)) => load_current(store),
        (None, None) => Err(CliError::MissingSource),
    }
}

fn load_current(path: &Path) -> Result<Vec<Observation>, CliError> {
    let conn = open_store_db(path)?;
    let store = SqliteSnapshotStore::new(&conn);
    let publisher = SnapshotPublisher::new(&store, StoreConfig::default());
    Ok(publisher
        .load_current()?
        .map(|package| package.observations)
        .unwrap_or_default())
}
