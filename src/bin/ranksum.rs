#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ranksum_harness::{
    build_report, default_comparisons, load_matrix, render_report_markdown, run_analysis,
    AnalysisConfig, LoadOptions, MovieColumns, RatingTable,
};

#[derive(Parser)]
#[command(name = "ranksum", version, about = "Rank-sum hypothesis tests over movie ratings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every comparison against a rating matrix CSV
    Run {
        /// Wide CSV: one row per rater, one column per movie or attribute
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// JSON analysis config (alpha, target movie, franchises)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides the config's alpha
        #[arg(long)]
        alpha: Option<f64>,
        #[arg(long, default_value = "json")]
        format: String,
        /// Treat the first N data columns as movies instead of matching `(YYYY)`
        #[arg(long)]
        leading_movies: Option<usize>,
        /// The CSV has no rater id column
        #[arg(long)]
        no_rater_id: bool,
    },
    /// List the comparisons a run would perform, in order
    Comparisons {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            out,
            config,
            alpha,
            format,
            leading_movies,
            no_rater_id,
        } => {
            let mut cfg = read_config(config.as_ref())?;
            if let Some(alpha) = alpha {
                cfg = cfg.with_alpha(alpha)?;
            }
            if format != "json" && format != "md" {
                return Err(format!("unknown --format {format:?} (expected json or md)").into());
            }

            let opts = LoadOptions {
                has_rater_id: !no_rater_id,
                movie_columns: leading_movies
                    .map(MovieColumns::Leading)
                    .unwrap_or_default(),
            };
            let table = RatingTable::from_matrix(load_matrix(&data, opts)?);
            let reports = run_analysis(&table, &default_comparisons(&cfg), cfg.alpha);
            let report = build_report(&table, &cfg, &reports);

            if format == "json" {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(out, json)?;
            } else {
                std::fs::write(out, render_report_markdown(&report))?;
            }
        }
        Commands::Comparisons { config } => {
            let cfg = read_config(config.as_ref())?;
            for comparison in default_comparisons(&cfg) {
                println!(
                    "{}\t{}\t{}",
                    comparison.id, comparison.alternative, comparison.question
                );
            }
        }
    }

    Ok(())
}

fn read_config(path: Option<&PathBuf>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(AnalysisConfig::from_path(path)?),
        None => Ok(AnalysisConfig::default()),
    }
}
