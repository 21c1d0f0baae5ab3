//! noiselab: label-noise robustness experiments on product-rating data
//!
//! Downloads the base ratings dataset, writes noisy copies at several noise
//! ratios, records classifier runs and renders the aggregated accuracy as a
//! LaTeX table.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use lab::LabError;
use lab::augment::{format_ratio, run_augment};
use lab::datasets::{DatasetCache, DatasetRegistry, TargetDataset, default_cache_dir, prepare_dataset};
use lab::reports::{JsonReport, LatexTable, MarkdownReport, ReportFormat};
use lab::results::{ResultRow, append_result, experiment_ids, filter_experiment, group_means, load_results, pivot};
use lab::synthetic::write_noisy_xor;
use noiselab_core::{Config, NoiseRule, NoiseSelection, PROJECT_CONFIG_FILE};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

mod logging;

#[derive(Parser)]
#[command(name = "noiselab")]
#[command(about = "Noisy dataset augmentation and result aggregation for label-noise experiments")]
#[command(version)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Config file (default: ./noiselab.toml, then the user config)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Download the base dataset into the cache
  Download {
    /// Dataset name
    #[arg(short, long)]
    dataset: Option<TargetDataset>,

    /// Source URL (plain CSV, .gz or .tar.gz)
    #[arg(long)]
    url: Option<String>,

    /// Force re-download
    #[arg(long)]
    force: bool,

    /// Cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,
  },

  /// Write noisy_dataset_<ratio>.csv for each noise ratio
  Augment {
    /// Base dataset CSV (default: the cached dataset)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Dataset to use when no input is given
    #[arg(short, long)]
    dataset: Option<TargetDataset>,

    /// Noise ratios, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    ratios: Option<Vec<f64>>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Copies of every rating event
    #[arg(long)]
    replication: Option<usize>,

    /// Keep comma-separated user ids on one row instead of one row per user
    #[arg(long)]
    keep_user_lists: bool,

    /// Row selection: exact or bernoulli
    #[arg(long)]
    selection: Option<NoiseSelection>,

    /// Label redraw rule: resample or exclusive
    #[arg(long)]
    rule: Option<NoiseRule>,

    /// Also corrupt the category of selected rows
    #[arg(long)]
    perturb_categories: bool,
  },

  /// Aggregate a results CSV into a table
  Aggregate {
    /// Results CSV
    results: PathBuf,

    /// Only use rows of this experiment
    #[arg(short, long)]
    exp_id: Option<String>,

    /// Output format: latex, markdown or json
    #[arg(short, long, default_value = "latex")]
    format: ReportFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Algorithm columns, comma-separated (LaTeX only)
    #[arg(short, long, value_delimiter = ',')]
    algorithms: Option<Vec<String>>,

    /// Decimal places for accuracy
    #[arg(long)]
    precision: Option<usize>,
  },

  /// Generate a noisy XOR sample set
  SynthXor {
    /// Number of samples
    #[arg(short = 'n', long, default_value = "5000")]
    count: usize,

    /// Label flip probability
    #[arg(long, default_value = "0.01")]
    noise: f64,

    /// Output CSV
    #[arg(short, long)]
    output: PathBuf,

    /// RNG seed (default: augment.seed from config)
    #[arg(long)]
    seed: Option<u64>,
  },

  /// Append one training run to a results CSV
  Record {
    /// Results CSV
    results: PathBuf,

    #[arg(long)]
    algorithm: String,

    #[arg(long)]
    noise_ratio: f64,

    /// Test accuracy in percent
    #[arg(long)]
    accuracy: f64,

    #[arg(long = "T")]
    threshold: Option<f64>,

    #[arg(long = "s")]
    specificity: Option<f64>,

    #[arg(long)]
    max_included_literals: Option<f64>,

    #[arg(long)]
    epochs: Option<f64>,

    #[arg(long)]
    platform: Option<String>,

    /// Training time in seconds
    #[arg(long)]
    total_time: Option<f64>,

    #[arg(long)]
    exp_id: Option<String>,
  },

  /// List known datasets and their cache state
  Datasets {
    /// Cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,
  },

  /// Remove cached datasets
  Clean {
    /// Remove everything in the cache
    #[arg(long)]
    all: bool,

    /// Remove one dataset
    #[arg(short, long)]
    dataset: Option<TargetDataset>,

    /// Cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,
  },

  /// Write a commented config template to ./noiselab.toml
  Init {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
  let config = Config::resolve(cli.config.as_deref(), &cwd)?;
  logging::init_logging(&config.logging.level, cli.verbose);

  match cli.command {
    Commands::Download {
      dataset,
      url,
      force,
      cache_dir,
    } => download(&config, dataset, url, force, cache_dir).await,
    Commands::Augment {
      input,
      dataset,
      ratios,
      output,
      seed,
      replication,
      keep_user_lists,
      selection,
      rule,
      perturb_categories,
    } => {
      let mut config = config;
      let augment = &mut config.augment;
      if let Some(ratios) = ratios {
        augment.ratios = ratios;
      }
      if let Some(output) = output {
        augment.output_dir = output;
      }
      if let Some(seed) = seed {
        augment.seed = seed;
      }
      if let Some(replication) = replication {
        augment.replication = replication;
      }
      if let Some(selection) = selection {
        augment.selection = selection;
      }
      if let Some(rule) = rule {
        augment.rule = rule;
      }
      if keep_user_lists {
        augment.explode_users = false;
      }
      augment.perturb_categories |= perturb_categories;
      augment_dataset(&config, input, dataset).await
    }
    Commands::Aggregate {
      results,
      exp_id,
      format,
      output,
      algorithms,
      precision,
    } => {
      let mut config = config;
      if let Some(algorithms) = algorithms {
        config.report.algorithms = algorithms;
      }
      if let Some(precision) = precision {
        config.report.precision = precision;
      }
      aggregate(&config, &results, exp_id.as_deref(), format, output.as_deref())
    }
    Commands::SynthXor {
      count,
      noise,
      output,
      seed,
    } => {
      let mut rng = StdRng::seed_from_u64(seed.unwrap_or(config.augment.seed));
      let flips = write_noisy_xor(&output, count, noise, &mut rng)?;
      println!("Wrote {} samples ({} flipped) to {}", count, flips, output.display());
      Ok(())
    }
    Commands::Record {
      results,
      algorithm,
      noise_ratio,
      accuracy,
      threshold,
      specificity,
      max_included_literals,
      epochs,
      platform,
      total_time,
      exp_id,
    } => {
      let row = ResultRow {
        threshold,
        specificity,
        max_included_literals,
        epochs,
        platform,
        total_time,
        exp_id,
        ..ResultRow::new(algorithm, noise_ratio, accuracy)
      };
      append_result(&results, &row)?;
      info!("Recorded run in {}", results.display());
      Ok(())
    }
    Commands::Datasets { cache_dir } => list_datasets(&config, cache_dir),
    Commands::Clean {
      all,
      dataset,
      cache_dir,
    } => clean_cache(&config, all, dataset, cache_dir),
    Commands::Init { force } => init_config(&cwd, force),
  }
}

fn cache_dir_for(config: &Config, cache_dir: Option<PathBuf>) -> PathBuf {
  cache_dir
    .or_else(|| config.dataset.cache_dir.clone())
    .unwrap_or_else(default_cache_dir)
}

fn dataset_for(config: &Config, dataset: Option<TargetDataset>) -> anyhow::Result<TargetDataset> {
  match dataset {
    Some(dataset) => Ok(dataset),
    None => TargetDataset::from_name(&config.dataset.name)
      .ok_or_else(|| LabError::UnknownDataset(config.dataset.name.clone()).into()),
  }
}

async fn download(
  config: &Config,
  dataset: Option<TargetDataset>,
  url: Option<String>,
  force: bool,
  cache_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
  let dataset = dataset_for(config, dataset)?;
  let url = url.or_else(|| config.dataset.url.clone());
  let path = prepare_dataset(dataset, url.as_deref(), Some(cache_dir_for(config, cache_dir)), force).await?;
  println!("{}", path.display());
  Ok(())
}

async fn augment_dataset(config: &Config, input: Option<PathBuf>, dataset: Option<TargetDataset>) -> anyhow::Result<()> {
  let input = match input {
    Some(input) => input,
    None => {
      let dataset = dataset_for(config, dataset)?;
      prepare_dataset(
        dataset,
        config.dataset.url.as_deref(),
        Some(cache_dir_for(config, None)),
        false,
      )
      .await?
    }
  };

  let reports = run_augment(&input, &config.augment).with_context(|| format!("augmenting {}", input.display()))?;

  for report in &reports {
    println!(
      "noise {:>6}: {} rows, {} ratings / {} categories changed -> {}{}",
      format_ratio(report.ratio),
      report.output_rows,
      report.noise.ratings_changed,
      report.noise.categories_changed,
      report.output.display(),
      if report.appended { " (appended)" } else { "" }
    );
  }
  Ok(())
}

fn aggregate(
  config: &Config,
  results: &Path,
  exp_id: Option<&str>,
  format: ReportFormat,
  output: Option<&Path>,
) -> anyhow::Result<()> {
  let rows = load_results(results)?;
  let available = experiment_ids(&rows);
  let rows = filter_experiment(rows, exp_id);

  if rows.is_empty() {
    if let Some(id) = exp_id {
      if !available.is_empty() {
        warn!("Known experiments: {}", available.join(", "));
      }
      return Err(LabError::EmptyResults(format!(" for experiment {}", id)).into());
    }
    return Err(LabError::EmptyResults(format!(" in {}", results.display())).into());
  }

  let groups = group_means(&rows);
  let table = pivot(&groups);
  info!(
    "{} rows -> {} noise ratios x {} algorithms",
    rows.len(),
    table.noise_ratios.len(),
    table.algorithms.len()
  );

  let content = match format {
    ReportFormat::Latex => LatexTable::render(&table, &config.report)?.content().to_string(),
    ReportFormat::Markdown => MarkdownReport::from_groups(&groups, &table, exp_id, config.report.precision)
      .content()
      .to_string(),
    ReportFormat::Json => JsonReport::from_groups(&groups, &table, exp_id).to_json()?,
  };

  match output {
    Some(path) => {
      std::fs::write(path, &content).with_context(|| format!("writing {}", path.display()))?;
      info!("Wrote {} report to {}", format, path.display());
    }
    None => {
      let mut stdout = std::io::stdout().lock();
      stdout.write_all(content.as_bytes())?;
      stdout.flush()?;
    }
  }
  Ok(())
}

fn list_datasets(config: &Config, cache_dir: Option<PathBuf>) -> anyhow::Result<()> {
  let cache = DatasetCache::new(cache_dir_for(config, cache_dir));
  let cached = cache.list_cached();

  println!("Cache: {}", cache.cache_dir().display());
  for spec in DatasetRegistry::all() {
    let state = match cached.iter().find(|c| c.dataset == spec.dataset) {
      Some(entry) => format!("cached, {} KiB at {}", entry.bytes.div_ceil(1024), entry.path.display()),
      None => "not cached".to_string(),
    };
    println!("  {:<10} {} ({})", spec.dataset, spec.description, state);
    println!("  {:<10} source: {}", "", spec.kaggle_url());
  }
  Ok(())
}

fn clean_cache(config: &Config, all: bool, dataset: Option<TargetDataset>, cache_dir: Option<PathBuf>) -> anyhow::Result<()> {
  let cache = DatasetCache::new(cache_dir_for(config, cache_dir));

  if all {
    let removed = cache.clean_all()?;
    println!("Removed {} cached dataset(s)", removed);
  } else if let Some(dataset) = dataset {
    if cache.remove(dataset)? {
      println!("Removed cached {}", dataset);
    } else {
      println!("{} was not cached", dataset);
    }
  } else {
    anyhow::bail!("Specify --all or --dataset <name>");
  }
  Ok(())
}

fn init_config(cwd: &Path, force: bool) -> anyhow::Result<()> {
  let path = cwd.join(PROJECT_CONFIG_FILE);
  if path.exists() && !force {
    anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
  }
  std::fs::write(&path, Config::generate_template())?;
  println!("Wrote {}", path.display());
  Ok(())
}
