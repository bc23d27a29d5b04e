//! Command line surface: argument parsing, config resolution and the
//! commands that print predictions and dataset views.

use std::io::Write;
use std::path::PathBuf;

use clap::{ArgEnum, Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::Result;
use crate::records::{encode_transaction_date, FeatureRecord, HOUSE_AGE};
use crate::summary::Histogram;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct RealEstateArgs {
    #[clap(short, long, parse(from_os_str), help = "JSON configuration file")]
    pub config: Option<PathBuf>,
    #[clap(short, long, parse(from_os_str), env = "REAL_ESTATE_MODEL",
    help = "Model artifact path")]
    pub model: Option<PathBuf>,
    #[clap(short, long, parse(from_os_str), env = "REAL_ESTATE_DATASET",
    help = "Historical transactions file (csv or parquet)")]
    pub dataset: Option<PathBuf>,
    #[clap(short, long, parse(from_occurrences),
    help = "Verbose level")]
    pub verbose: usize,
    #[clap(subcommand)]
    pub command: Command,
}

impl RealEstateArgs {
    /// Config file (or defaults) with `--model` and `--dataset` laid on top.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
        if let Some(dataset) = &self.dataset {
            config.dataset_path = dataset.clone();
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate the price per unit area of one property
    Predict(PredictArgs),
    /// Print the first rows of the raw dataset
    Table {
        #[clap(short, long, help = "Number of rows to show")]
        rows: Option<usize>,
    },
    /// Count, mean, std, min, quartiles and max per numeric column
    Describe {
        #[clap(short, long, arg_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Pearson correlation between numeric columns
    Correlation {
        #[clap(short, long, arg_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Binned distribution of one column (house age by default)
    Histogram {
        #[clap(long, help = "Column to bin")]
        column: Option<String>,
        #[clap(long, help = "Also print the smoothed density")]
        density: bool,
    },
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[clap(long, default_value_t = 2013.5, help = "Transaction date as year.fraction, e.g. 2013.250")]
    pub transaction_date: f64,
    #[clap(long, requires = "month", help = "Transaction year, overrides --transaction-date")]
    pub year: Option<i32>,
    #[clap(long, requires = "year", help = "Transaction month (1-12)")]
    pub month: Option<u32>,
    #[clap(long, default_value_t = 10.0, help = "House age in years")]
    pub house_age: f64,
    #[clap(long, default_value_t = 300.0, help = "Distance to the nearest MRT station in meters")]
    pub distance: f64,
    #[clap(long, default_value_t = 2, help = "Number of convenience stores nearby")]
    pub stores: u32,
    #[clap(long, default_value_t = 24.9670, allow_hyphen_values = true)]
    pub latitude: f64,
    #[clap(long, default_value_t = 121.5400, allow_hyphen_values = true)]
    pub longitude: f64,
}

impl PredictArgs {
    pub fn record(&self) -> Result<FeatureRecord> {
        let transaction_date = match (self.year, self.month) {
            (Some(year), Some(month)) => encode_transaction_date(year, month)?,
            _ => self.transaction_date,
        };
        Ok(FeatureRecord::build(
            transaction_date,
            self.house_age,
            self.distance,
            self.stores,
            self.latitude,
            self.longitude,
        ))
    }

    /// The record, rejected if any input is outside the form's ranges.
    pub fn validated_record(&self) -> Result<FeatureRecord> {
        let record = self.record()?;
        record.check_domains()?;
        Ok(record)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, ArgEnum)]
pub enum OutputFormat {
    Table,
    Csv,
}

fn write_histogram<W: Write>(out: &mut W, hist: &Histogram, with_density: bool) -> Result<()> {
    writeln!(out, "{}", hist.column)?;
    let widest = hist.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bin in &hist.bins {
        let bar = "#".repeat(bin.count * 40 / widest);
        writeln!(out, "{:>10.2} - {:<10.2} {:>6} {}", bin.lower, bin.upper, bin.count, bar)?;
    }
    if with_density {
        writeln!(out, "density")?;
        for (x, y) in &hist.density {
            writeln!(out, "{:>10.3} {:.6}", x, y)?;
        }
    }
    Ok(())
}

pub async fn run<W: Write>(ctx: &AppContext, command: &Command, out: &mut W) -> Result<()> {
    match command {
        Command::Predict(args) => {
            let record = args.validated_record()?;
            log::debug!("Input\n{}", record.to_frame()?);
            writeln!(out, "{}", ctx.estimate(&record).await?)?;
        }
        Command::Table { rows } => {
            let rows = rows.unwrap_or(ctx.config().preview_rows);
            writeln!(out, "{}", ctx.dataset().preview(rows).await?)?;
        }
        Command::Describe { format } => {
            let summary = ctx.dataset().describe().await?;
            match format {
                OutputFormat::Table => writeln!(out, "{}", summary.to_frame()?)?,
                OutputFormat::Csv => summary.write_csv(&mut *out)?,
            }
        }
        Command::Correlation { format } => {
            let matrix = ctx.dataset().correlation_matrix().await?;
            match format {
                OutputFormat::Table => writeln!(out, "{}", matrix.to_frame()?)?,
                OutputFormat::Csv => matrix.write_csv(&mut *out)?,
            }
        }
        Command::Histogram { column, density } => {
            let column = column.as_deref().unwrap_or(HOUSE_AGE);
            let hist = ctx.dataset().histogram(column).await?;
            write_histogram(out, &hist, *density)?;
        }
    }
    Ok(())
}
