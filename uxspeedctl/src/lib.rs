pub mod query;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uxspeed_core::params::spec::DISPLAY_MAX;
use uxspeed_core::{
    load_scenario_config, Calculator, DistributionResult, FunnelSummary, Overrides,
    ParameterRegistry,
};

pub use query::{parse_query, serialize_query};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] uxspeed_core::ConfigError),
    #[error("parameter error: {0}")]
    Registry(#[from] uxspeed_core::RegistryError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid assignment {0:?}, expected NAME=VALUE")]
    InvalidAssignment(String),
    #[error("parameter {0} is read-only")]
    ReadOnly(String),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "UX speed calculator command-line interface", long_about = None)]
pub struct Cli {
    /// Scenario file with a [parameters] table of overrides
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Overrides as a query string, e.g. "volume=50000&mu=1.2"
    #[arg(long)]
    pub query: Option<String>,
    /// Edit applied after loading, as NAME=VALUE (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Computes the funnel and prints its headline figures
    Compute,
    /// Lists parameters with their current values and bounds
    Params,
    /// Prints the query string that restores the current parameters
    Share,
    /// Prints the per-bucket funnel
    Buckets(BucketsArgs),
}

#[derive(Args, Debug)]
pub struct BucketsArgs {
    /// Last second to show (defaults to the displayMax parameter)
    #[arg(long)]
    pub display_max: Option<f64>,
    /// Include empty buckets
    #[arg(long, default_value_t = false)]
    pub all: bool,
}

pub fn run(cli: Cli) -> Result<()> {
    let context = AppContext::new(&cli)?;

    match &cli.command {
        Commands::Compute => {
            let report = context.compute_report()?;
            render(&report, cli.format)?;
        }
        Commands::Params => {
            let listing = context.parameter_listing();
            render(&listing, cli.format)?;
        }
        Commands::Share => {
            let link = context.share_link();
            render(&link, cli.format)?;
        }
        Commands::Buckets(args) => {
            let table = context.bucket_table(args);
            render(&table, cli.format)?;
        }
    }

    Ok(())
}

fn render<T>(value: &T, format: OutputFormat) -> Result<()>
where
    T: Serialize + DisplayFallback,
{
    match format {
        OutputFormat::Text => {
            println!("{}", value.display());
            Ok(())
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
            Ok(())
        }
    }
}

trait DisplayFallback {
    fn display(&self) -> String;
}

#[derive(Debug)]
struct AppContext {
    scenario: Option<String>,
    calculator: Calculator,
}

impl AppContext {
    fn new(cli: &Cli) -> Result<Self> {
        let mut overrides = Overrides::new();
        let mut scenario = None;
        if let Some(path) = &cli.config {
            let config = load_scenario_config(path)?;
            debug!(path = %path.display(), overrides = config.parameters.len(), "loaded scenario");
            scenario = config.name.clone();
            overrides.extend(config.into_overrides());
        }
        if let Some(query) = &cli.query {
            overrides.extend(parse_query(query));
        }

        let registry = ParameterRegistry::standard()?;
        overrides.retain(|name, _| {
            let read_only = registry
                .table()
                .get(name)
                .is_some_and(|spec| spec.read_only);
            if read_only {
                debug!(parameter = %name, "ignoring override of read-only parameter");
            }
            !read_only
        });

        let mut calculator = Calculator::new(registry, &overrides)?;
        for assignment in &cli.set {
            let (name, value) = parse_assignment(assignment)?;
            if calculator.registry().spec(name)?.read_only {
                return Err(AppError::ReadOnly(name.to_string()));
            }
            calculator.set(name, value)?;
        }

        Ok(Self {
            scenario,
            calculator,
        })
    }

    fn compute_report(&self) -> Result<ComputeReport> {
        Ok(ComputeReport {
            scenario: self.scenario.clone(),
            summary: self.calculator.summary()?,
            result: self.calculator.result().clone(),
        })
    }

    fn parameter_listing(&self) -> ParameterListing {
        let state = self.calculator.state();
        let rows = self
            .calculator
            .registry()
            .table()
            .iter()
            .filter_map(|spec| {
                let current = state.get(&spec.name)?;
                Some(ParameterRow {
                    name: spec.name.clone(),
                    label: spec.label.clone(),
                    units: spec.units.clone(),
                    value: current.value,
                    min: current.min.is_finite().then_some(current.min),
                    max: current.max.is_finite().then_some(current.max),
                    step: spec.step,
                    display_only: spec.display_only,
                    read_only: spec.read_only,
                    serialize: spec.serialize,
                })
            })
            .collect();
        ParameterListing { rows }
    }

    fn share_link(&self) -> ShareLink {
        ShareLink {
            query: serialize_query(self.calculator.registry().table(), self.calculator.state()),
        }
    }

    fn bucket_table(&self, args: &BucketsArgs) -> BucketTable {
        let result = self.calculator.result();
        let display_max = args
            .display_max
            .or_else(|| self.calculator.state().value(DISPLAY_MAX))
            .unwrap_or(f64::INFINITY);
        let rows = result
            .visible_buckets(display_max)
            .filter(|&i| args.all || result.total_population[i] > 0)
            .map(|i| BucketRow::from_result(result, i))
            .collect();
        BucketTable { display_max, rows }
    }
}

fn parse_assignment(assignment: &str) -> Result<(&str, &str)> {
    match assignment.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(AppError::InvalidAssignment(assignment.to_string())),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    summary: FunnelSummary,
    result: DistributionResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParameterRow {
    name: String,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    units: Option<String>,
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
    step: f64,
    display_only: bool,
    read_only: bool,
    serialize: bool,
}

#[derive(Debug, Serialize)]
struct ParameterListing {
    rows: Vec<ParameterRow>,
}

#[derive(Debug, Serialize)]
struct ShareLink {
    query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BucketRow {
    time: f64,
    users: u64,
    errored: u64,
    bounced: u64,
    converted: u64,
    non_converted: u64,
    bounce_rate: f64,
    conversion_rate: f64,
}

impl BucketRow {
    fn from_result(result: &DistributionResult, i: usize) -> Self {
        Self {
            time: result.x[i],
            users: result.total_population[i],
            errored: result.errored_distribution[i],
            bounced: result.bounced_distribution[i],
            converted: result.converted_distribution[i],
            non_converted: result.non_converted_distribution[i],
            bounce_rate: result.bounce_rate_distribution[i],
            conversion_rate: result.conversion_rate_distribution[i],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BucketTable {
    display_max: f64,
    rows: Vec<BucketRow>,
}

impl DisplayFallback for ComputeReport {
    fn display(&self) -> String {
        let mut lines = Vec::new();
        if let Some(name) = &self.scenario {
            lines.push(format!("Scenario: {name}"));
        }
        lines.push(format!(
            "Average Conversion Rate: {}%",
            self.summary.average_conversion_percent
        ));
        lines.push(format!("Converted Users: {}", self.summary.converted_users));
        lines.push(format!("Total Value: ${}", self.summary.total_value));
        lines.push(format!("Average Speed: {:.2} s", self.summary.average_speed));
        if !self.result.annotations.is_empty() {
            lines.push("Percentiles:".to_string());
            for annotation in &self.result.annotations {
                lines.push(format!("  - {}", annotation.text));
            }
        }
        lines.join("\n")
    }
}

impl DisplayFallback for ParameterListing {
    fn display(&self) -> String {
        let mut lines = Vec::new();
        for row in &self.rows {
            let bound = |value: Option<f64>| {
                value
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string())
            };
            let mut flags = Vec::new();
            if row.display_only {
                flags.push("display-only");
            }
            if row.read_only {
                flags.push("read-only");
            }
            if !row.serialize {
                flags.push("not shared");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            lines.push(format!(
                "{} ({}) = {}{} | range {}..{} step {}{}",
                row.name,
                row.label,
                row.value,
                row.units
                    .as_deref()
                    .map(|units| format!(" {units}"))
                    .unwrap_or_default(),
                bound(row.min),
                bound(row.max),
                row.step,
                flags
            ));
        }
        lines.join("\n")
    }
}

impl DisplayFallback for ShareLink {
    fn display(&self) -> String {
        self.query.clone()
    }
}

impl DisplayFallback for BucketTable {
    fn display(&self) -> String {
        if self.rows.is_empty() {
            return "No users below the display limit".to_string();
        }
        let mut lines = vec![format!(
            "{:>7} {:>10} {:>9} {:>9} {:>10} {:>10} {:>7} {:>7}",
            "time", "users", "errored", "bounced", "converted", "other", "bounce%", "conv%"
        )];
        for row in &self.rows {
            lines.push(format!(
                "{:>7.2} {:>10} {:>9} {:>9} {:>10} {:>10} {:>7.2} {:>7.2}",
                row.time,
                row.users,
                row.errored,
                row.bounced,
                row.converted,
                row.non_converted,
                row.bounce_rate,
                row.conversion_rate
            ));
        }
        lines.join("\n")
    }
}
