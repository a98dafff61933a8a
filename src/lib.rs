#![forbid(unsafe_code)]

//! # ranksum-harness
//!
//! Batch Mann–Whitney rank-sum testing over a wide movie-rating matrix.
//!
//! A run loads the matrix once, then walks a fixed list of comparisons. Each
//! comparison splits movies or raters into two groups (median popularity,
//! median release year, an explicit title list, a rater attribute, or the
//! first film of a franchise against its sequels), tests the two rating
//! samples with a tie-corrected normal approximation, and decides against a
//! significance threshold. Comparisons that cannot apply to the dataset are
//! reported as such instead of being dropped.

pub mod config;
pub mod grouping;
pub mod load;
pub mod rank_sum;
pub mod report;
pub mod runner;
pub mod table;
pub mod verdict;

pub use config::{AnalysisConfig, ConfigError, Franchise};
pub use grouping::{Group, GroupingError, GroupingRule, Partition};
pub use load::{load_matrix, read_matrix, LoadError, LoadOptions, MovieColumns};
pub use rank_sum::{mann_whitney_u, Alternative, RankSumError, RankSumResult};
pub use report::{build_report, render_report_markdown, AnalysisReport};
pub use runner::{
    default_comparisons, run_analysis, run_comparison, Comparison, ComparisonReport,
    ComparisonStatus, TestOutcome,
};
pub use table::{
    movie_year, summarize, to_long, Column, ColumnKind, ColumnSelector, LongObservation,
    MatrixError, MovieSummary, RatingMatrix, RatingTable,
};
pub use verdict::{decide, Decision, SampleSummary, Verdict, DEFAULT_ALPHA};
