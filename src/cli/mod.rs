//! Kolosal Compare CLI Module
//!
//! Command-line interface for comparing candidate classifiers and inspecting
//! data files.

use clap::{Parser, Subcommand};
use colored::*;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;

use crate::config::{CompareConfig, ModelSpec};
use crate::data::{load_frame, prepare, train_test_split};
use crate::error::Result;
use crate::preprocessing::ScalerType;
use crate::record::{comparison_table, rank, DataSource, ModelRecord, RankedModel};
use crate::training::{ClassificationMetrics, CvStrategy, Estimator, Scoring};
use crate::visualization::SvgSurface;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_failed(detail: &str) {
    println!("{} {}", "failed".truecolor(230, 110, 110), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "kolosal-compare")]
#[command(author = "KolosalAI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cross-validated comparison of classification models")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cross-validate candidate models and rank them
    Compare {
        /// JSON configuration file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Input data file (CSV, JSON, or Parquet)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Target column name
        #[arg(short, long)]
        target: Option<String>,

        /// Number of cross-validation folds
        #[arg(long)]
        folds: Option<usize>,

        /// Share of rows held out as the test set
        #[arg(long)]
        test_ratio: Option<f64>,

        /// Scoring metric (accuracy, precision, recall, f1, balanced_accuracy)
        #[arg(long)]
        scoring: Option<String>,

        /// Scaler type (none, standard, minmax, robust, maxabs)
        #[arg(long)]
        scaler: Option<String>,

        /// Random seed for the train/test split
        #[arg(long)]
        seed: Option<u64>,

        /// Write one SVG plot per model into this directory
        #[arg(long)]
        plot_dir: Option<PathBuf>,
    },

    /// Show data information
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Flag values for `compare`, applied over a config file
#[derive(Debug, Default, Clone)]
pub struct CompareArgs {
    pub config: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub target: Option<String>,
    pub folds: Option<usize>,
    pub test_ratio: Option<f64>,
    pub scoring: Option<String>,
    pub scaler: Option<String>,
    pub seed: Option<u64>,
    pub plot_dir: Option<PathBuf>,
}

impl CompareArgs {
    /// Resolve the final configuration: file values first, then flags. The
    /// merged result is validated once, after every flag is applied.
    pub fn into_config(self) -> Result<CompareConfig> {
        let mut config = match &self.config {
            Some(path) => CompareConfig::read(path)?,
            None => CompareConfig::default(),
        };

        if let Some(data) = self.data {
            config.data = data;
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(folds) = self.folds {
            config.folds = folds;
        }
        if let Some(ratio) = self.test_ratio {
            config.test_ratio = ratio;
        }
        if let Some(scoring) = self.scoring {
            config.cv.scoring = scoring.parse::<Scoring>()?;
        }
        if let Some(scaler) = self.scaler {
            config.scaler = scaler.parse::<ScalerType>()?;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(dir) = self.plot_dir {
            config.plot_dir = Some(dir);
        }

        config.validate()?;
        Ok(config)
    }
}

// ─── Compare ───────────────────────────────────────────────────────────────────

/// Outcome of one model's cross-validation
#[derive(Debug, Clone)]
pub struct ModelOutcome {
    pub name: String,
    /// Summary line, or the error that stopped cross-validation
    pub summary: std::result::Result<String, String>,
    pub plot: Option<PathBuf>,
}

/// Everything a comparison run produced
#[derive(Debug, Clone)]
pub struct CompareReport {
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub outcomes: Vec<ModelOutcome>,
    pub ranking: Vec<RankedModel>,
    pub table: String,
    /// Metric used for cross-validation and for the held-out score
    pub scoring: Scoring,
    /// Best model by mean CV score and its held-out metrics
    pub best: Option<(String, ClassificationMetrics)>,
}

impl CompareReport {
    /// Held-out score of the best model under the configured metric
    pub fn best_test_score(&self) -> Option<f64> {
        self.best.as_ref().map(|(_, metrics)| metrics.get(self.scoring))
    }
}

/// Load, prepare and split the data, cross-validate every configured model
/// on the training split, then refit the best one and score it on the
/// test split.
///
/// A model whose cross-validation fails is reported and left out of the
/// ranking; data and configuration errors abort the run.
pub fn run_compare(config: &CompareConfig) -> Result<CompareReport> {
    config.validate()?;

    let df = load_frame(&config.data)?;
    let plan = config.column_plan(&df)?;
    let data = prepare(&df, &plan)?;
    let stratify = config.cv.strategy == CvStrategy::StratifiedKFold;
    let (train, test) = train_test_split(&data, config.test_ratio, stratify, config.seed)?;

    if let Some(dir) = &config.plot_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut records = Vec::with_capacity(config.models.len());
    let mut outcomes = Vec::with_capacity(config.models.len());

    for spec in &config.models {
        let name = spec.display_name();
        let mut record = ModelRecord::new(
            spec.build_pipeline(config.scaler),
            name.clone(),
            train.features(),
            train.labels(),
        )?
        .with_cv_config(config.cv.clone());

        let summary = match record.cross_validate(DataSource::Own, config.folds) {
            Ok(_) => record.summary().map_err(|e| e.to_string()),
            Err(e) => {
                warn!(model = %name, error = %e, "Cross-validation failed");
                Err(e.to_string())
            }
        };

        let plot = match (&config.plot_dir, record.is_computed()) {
            (Some(dir), true) => {
                let path = dir.join(plot_file_name(spec));
                let mut surface = SvgSurface::default();
                record.plot(&mut surface)?.save(&path)?;
                Some(path)
            }
            _ => None,
        };

        outcomes.push(ModelOutcome { name, summary, plot });
        records.push(record);
    }

    let ranking = rank(&records);
    let table = comparison_table(&records);

    let best = match ranking.first() {
        Some(top) => match records.get(top.index) {
            Some(record) => {
                let mut model = record.estimator().clone();
                model.fit(train.features(), train.labels())?;
                let predictions = model.predict(test.features())?;
                let metrics = ClassificationMetrics::compute(test.labels(), &predictions)?;
                Some((top.name.clone(), metrics))
            }
            None => None,
        },
        None => None,
    };

    Ok(CompareReport {
        n_train: train.n_samples(),
        n_test: test.n_samples(),
        n_features: train.n_features(),
        outcomes,
        ranking,
        table,
        scoring: config.cv.scoring,
        best,
    })
}

fn plot_file_name(spec: &ModelSpec) -> String {
    let stem: String = spec
        .display_name()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}.svg", stem.trim_matches('_'))
}

pub fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let config = args.into_config()?;

    section("Compare");
    println!("  {}", kv("Data   ", &config.data.display().to_string()));
    println!("  {}", kv("Target ", &config.target));
    println!("  {}", kv("Folds  ", &config.folds.to_string()));
    println!("  {}", kv("Scoring", config.cv.scoring.name()));
    println!();

    step_run("Cross-validating");
    let start = Instant::now();
    let report = match run_compare(&config) {
        Ok(report) => report,
        Err(e) => {
            step_failed(&e.to_string());
            return Err(e.into());
        }
    };
    step_done(&format!(
        "{} models · {} train / {} test rows · {} features · {:.1}s",
        report.outcomes.len(),
        report.n_train,
        report.n_test,
        report.n_features,
        start.elapsed().as_secs_f64()
    ));

    section("Models");
    for outcome in &report.outcomes {
        match &outcome.summary {
            Ok(line) => println!("  {} {}", ok("✓"), line),
            Err(e) => println!("  {} {} {}", "✗".truecolor(230, 110, 110), outcome.name, dim(e)),
        }
        if let Some(path) = &outcome.plot {
            println!("    {}", dim(&format!("plot → {}", path.display())));
        }
    }

    section("Ranking");
    for line in report.table.lines() {
        println!("  {}", line);
    }

    if let (Some((name, metrics)), Some(score)) = (&report.best, report.best_test_score()) {
        section(&format!("Test set · {}", name));
        println!("  {}", kv(&format!("{:<18}", report.scoring.name()), &format!("{:.5}", score)));
        println!();
        for line in metrics.report().lines() {
            println!("  {}", line);
        }
    }

    println!();
    Ok(())
}

// ─── Info ──────────────────────────────────────────────────────────────────────

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_frame(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!("  {:<20} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(50)));

    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    println!();
    Ok(())
}
