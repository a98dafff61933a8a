//! Report generation for analysis runs.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::rank_sum::Alternative;
use crate::runner::{ComparisonReport, ComparisonStatus};
use crate::table::RatingTable;
use crate::verdict::Decision;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub config_hash: String,
    pub dataset: DatasetShape,
    pub summary: ReportSummary,
    pub comparisons: Vec<ReportComparison>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetShape {
    pub raters: usize,
    pub movies: usize,
    pub attributes: usize,
    pub observations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub alpha: f64,
    pub comparisons: usize,
    pub completed: usize,
    pub rejected: usize,
    pub not_applicable: usize,
    pub undefined: usize,
}

/// Flat per-comparison record. Statistics are `None` unless the comparison
/// completed.
#[derive(Debug, Clone, Serialize)]
pub struct ReportComparison {
    pub id: String,
    pub question: String,
    pub status: &'static str,
    pub alternative: Alternative,
    pub group_a: String,
    pub group_b: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u_statistic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_a: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_b: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_b: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn build_report(
    table: &RatingTable,
    cfg: &AnalysisConfig,
    reports: &[ComparisonReport],
) -> AnalysisReport {
    let matrix = table.matrix();
    let dataset = DatasetShape {
        raters: matrix.n_raters(),
        movies: matrix.movie_columns().count(),
        attributes: matrix.attribute_columns().count(),
        observations: table.observations().len(),
    };

    let comparisons: Vec<ReportComparison> =
        reports.iter().map(ReportComparison::from_report).collect();

    let count = |status: &str| comparisons.iter().filter(|c| c.status == status).count();
    let summary = ReportSummary {
        alpha: cfg.alpha,
        comparisons: comparisons.len(),
        completed: count("completed"),
        rejected: comparisons
            .iter()
            .filter(|c| c.decision == Some(Decision::Reject))
            .count(),
        not_applicable: count("not_applicable"),
        undefined: count("undefined"),
    };

    AnalysisReport {
        config_hash: hash_config(cfg),
        dataset,
        summary,
        comparisons,
    }
}

impl ReportComparison {
    fn from_report(report: &ComparisonReport) -> Self {
        let mut out = Self {
            id: report.id.clone(),
            question: report.question.clone(),
            status: report.status.label(),
            alternative: report.alternative,
            group_a: report.group_names[0].clone(),
            group_b: report.group_names[1].clone(),
            u_statistic: None,
            p_value: None,
            z: None,
            effect_size: None,
            n_a: None,
            n_b: None,
            mean_a: None,
            mean_b: None,
            boundary: None,
            column: None,
            decision: None,
            conclusion: report.conclusion.clone(),
            reason: None,
        };

        match &report.status {
            ComparisonStatus::Completed(outcome) => {
                out.u_statistic = Some(outcome.rank_sum.u1);
                out.p_value = Some(outcome.rank_sum.p_value);
                out.z = Some(outcome.rank_sum.z);
                out.effect_size = Some(outcome.rank_sum.effect_size);
                out.n_a = Some(outcome.verdict.sample_a.n);
                out.n_b = Some(outcome.verdict.sample_b.n);
                out.mean_a = Some(outcome.verdict.sample_a.mean);
                out.mean_b = Some(outcome.verdict.sample_b.mean);
                out.boundary = outcome.partition.boundary;
                out.column = outcome.partition.column.clone();
                out.decision = Some(outcome.verdict.decision);
            }
            ComparisonStatus::NotApplicable { category, reason } => {
                out.reason = Some(format!("{category}: {reason}"));
            }
            ComparisonStatus::Undefined { reason } => {
                out.reason = Some(reason.clone());
            }
        }
        out
    }
}

pub fn render_report_markdown(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str("# Rank-Sum Analysis Report\n\n");
    out.push_str(&format!("- Config hash: `{}`\n", report.config_hash));
    out.push_str(&format!(
        "- Dataset: {} raters, {} movies, {} attributes, {} observations\n",
        report.dataset.raters,
        report.dataset.movies,
        report.dataset.attributes,
        report.dataset.observations
    ));
    out.push_str(&format!("- Alpha: {}\n", report.summary.alpha));
    out.push_str(&format!(
        "- Comparisons completed/rejected/not applicable/undefined: {}/{}/{}/{}\n",
        report.summary.completed,
        report.summary.rejected,
        report.summary.not_applicable,
        report.summary.undefined
    ));

    for cmp in &report.comparisons {
        out.push_str(&format!("\n## {}\n\n", cmp.question));
        out.push_str(&format!("- Id: `{}`\n", cmp.id));
        match (cmp.u_statistic, cmp.p_value) {
            (Some(u), Some(p)) => {
                out.push_str(&format!(
                    "- Mann-Whitney U ({}): U = {:.1}, p = {:.2e}\n",
                    cmp.alternative, u, p
                ));
                if let Some(column) = &cmp.column {
                    out.push_str(&format!("- Attribute column: {}\n", column));
                }
                if let Some(boundary) = cmp.boundary {
                    out.push_str(&format!("- Median split at {}\n", boundary));
                }
                out.push_str(&format!(
                    "- {}: n = {}, mean = {:.4}\n",
                    cmp.group_a,
                    cmp.n_a.unwrap_or(0),
                    cmp.mean_a.unwrap_or(f64::NAN)
                ));
                out.push_str(&format!(
                    "- {}: n = {}, mean = {:.4}\n",
                    cmp.group_b,
                    cmp.n_b.unwrap_or(0),
                    cmp.mean_b.unwrap_or(f64::NAN)
                ));
                if let Some(conclusion) = &cmp.conclusion {
                    out.push_str(&format!(
                        "- Conclusion: {} (alpha = {})\n",
                        conclusion, report.summary.alpha
                    ));
                }
            }
            _ => {
                let status = if cmp.status == "undefined" {
                    "undefined"
                } else {
                    "skipped, not applicable"
                };
                out.push_str(&format!(
                    "- Status: {} ({})\n",
                    status,
                    cmp.reason.as_deref().unwrap_or("no reason recorded")
                ));
            }
        }
    }

    out
}

fn hash_config(cfg: &AnalysisConfig) -> String {
    let bytes = serde_json::to_vec(cfg).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}
