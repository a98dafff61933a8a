//! Analysis runner.
//!
//! A comparison binds one grouping rule to one alternative hypothesis. The
//! runner attempts every comparison, in declared order, against the same
//! read-only `RatingTable`. A comparison that cannot be tested still yields a
//! `ComparisonReport`, so the output always accounts for the full set.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::grouping::{GroupingRule, Partition};
use crate::rank_sum::{mann_whitney_u, Alternative, RankSumResult};
use crate::table::RatingTable;
use crate::verdict::{Decision, Verdict};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub id: String,
    pub question: String,
    pub rule: GroupingRule,
    pub alternative: Alternative,
    /// Display names for group A and group B.
    pub group_names: [String; 2],
    /// Conclusion text for Reject and FailToReject.
    pub conclusions: [String; 2],
}

impl Comparison {
    pub fn new(id: &str, question: &str, rule: GroupingRule, alternative: Alternative) -> Self {
        let (a, b) = rule.labels();
        Self {
            id: id.to_string(),
            question: question.to_string(),
            rule,
            alternative,
            group_names: [a, b],
            conclusions: [
                Decision::Reject.to_string(),
                Decision::FailToReject.to_string(),
            ],
        }
    }

    pub fn with_groups(mut self, a: &str, b: &str) -> Self {
        self.group_names = [a.to_string(), b.to_string()];
        self
    }

    pub fn with_conclusions(mut self, reject: &str, retain: &str) -> Self {
        self.conclusions = [reject.to_string(), retain.to_string()];
        self
    }

    pub fn conclusion(&self, decision: Decision) -> &str {
        match decision {
            Decision::Reject => &self.conclusions[0],
            Decision::FailToReject => &self.conclusions[1],
        }
    }
}

/// Everything one completed test produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestOutcome {
    pub partition: Partition,
    pub rank_sum: RankSumResult,
    pub verdict: Verdict,
}

impl TestOutcome {
    pub fn u_statistic(&self) -> f64 {
        self.rank_sum.u1
    }

    pub fn p_value(&self) -> f64 {
        self.rank_sum.p_value
    }

    pub fn decision(&self) -> Decision {
        self.verdict.decision
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonStatus {
    Completed(Box<TestOutcome>),
    /// Grouping could not be applied to this dataset.
    NotApplicable { category: String, reason: String },
    /// Groups were formed but the statistic is undefined for them.
    Undefined { reason: String },
}

impl ComparisonStatus {
    pub fn outcome(&self) -> Option<&TestOutcome> {
        match self {
            ComparisonStatus::Completed(outcome) => Some(&**outcome),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComparisonStatus::Completed(_) => "completed",
            ComparisonStatus::NotApplicable { .. } => "not_applicable",
            ComparisonStatus::Undefined { .. } => "undefined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub id: String,
    pub question: String,
    pub alternative: Alternative,
    pub group_names: [String; 2],
    pub conclusion: Option<String>,
    pub status: ComparisonStatus,
}

/// The fixed comparison list: popularity, era, target vs comparison set,
/// three rater attributes, then one entry per configured franchise.
pub fn default_comparisons(cfg: &AnalysisConfig) -> Vec<Comparison> {
    let mut comparisons = vec![
        Comparison::new(
            "popularity",
            "Do movies with higher popularity receive higher ratings?",
            GroupingRule::MedianCount,
            Alternative::Greater,
        )
        .with_groups("High popularity", "Low popularity"),
        Comparison::new(
            "era",
            "Are newer movies rated differently than older movies?",
            GroupingRule::MedianYear,
            Alternative::TwoSided,
        )
        .with_groups("New movies", "Old movies"),
        Comparison::new(
            "target_vs_comparison",
            &format!("Is {} rated higher than the comparison movies?", cfg.target_movie),
            GroupingRule::Explicit {
                target: cfg.target_movie.clone(),
                others: cfg.comparison_movies.clone(),
            },
            Alternative::Greater,
        )
        .with_groups(&cfg.target_movie, "Comparison movies"),
        Comparison::new(
            "gender",
            "Do male and female viewers rate movies differently?",
            attribute_rule(&["gender"], 1.0, 2.0),
            Alternative::TwoSided,
        )
        .with_groups("Male viewers", "Female viewers"),
        Comparison::new(
            "only_child",
            "Do only children rate movies differently?",
            attribute_rule(&["sibling", "only"], 1.0, 0.0),
            Alternative::TwoSided,
        )
        .with_groups("Only children", "Has siblings"),
        Comparison::new(
            "social_viewing",
            "Do social viewers rate differently than solo viewers?",
            attribute_rule(&["movies with people", "social"], 1.0, 0.0),
            Alternative::TwoSided,
        )
        .with_groups("Social viewers", "Solo viewers"),
    ];

    for franchise in &cfg.franchises {
        comparisons.push(
            Comparison::new(
                &format!("franchise_{}", slug(&franchise.name)),
                &format!("Is the first {} film rated higher than its sequels?", franchise.name),
                GroupingRule::FranchiseFirstVsRest {
                    titles: franchise.titles.clone(),
                },
                Alternative::Greater,
            )
            .with_groups("First", "Sequels")
            .with_conclusions("First rated higher", "No significant difference"),
        );
    }

    comparisons
}

fn attribute_rule(keywords: &[&str], value_a: f64, value_b: f64) -> GroupingRule {
    GroupingRule::Attribute {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        value_a,
        value_b,
    }
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

/// Group, test and decide one comparison. Never fails: skips and degenerate
/// samples are reported through `ComparisonStatus`.
pub fn run_comparison(table: &RatingTable, comparison: &Comparison, alpha: f64) -> ComparisonReport {
    let status = evaluate(table, comparison, alpha);
    let conclusion = status
        .outcome()
        .map(|o| comparison.conclusion(o.decision()).to_string());
    ComparisonReport {
        id: comparison.id.clone(),
        question: comparison.question.clone(),
        alternative: comparison.alternative,
        group_names: comparison.group_names.clone(),
        conclusion,
        status,
    }
}

fn evaluate(table: &RatingTable, comparison: &Comparison, alpha: f64) -> ComparisonStatus {
    let partition = match comparison.rule.assign(table) {
        Ok(partition) => partition,
        Err(err) => {
            tracing::warn!(
                comparison = %comparison.id,
                category = err.category(),
                reason = %err,
                "comparison not applicable"
            );
            return ComparisonStatus::NotApplicable {
                category: err.category().to_string(),
                reason: err.to_string(),
            };
        }
    };

    let rank_sum = match mann_whitney_u(
        &partition.group_a.ratings,
        &partition.group_b.ratings,
        comparison.alternative,
    ) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(
                comparison = %comparison.id,
                reason = %err,
                "rank-sum statistic undefined"
            );
            return ComparisonStatus::Undefined {
                reason: err.to_string(),
            };
        }
    };

    let verdict = Verdict::render(
        rank_sum.p_value,
        alpha,
        &partition.group_a.ratings,
        &partition.group_b.ratings,
    );
    tracing::debug!(
        comparison = %comparison.id,
        u = rank_sum.u1,
        p_value = rank_sum.p_value,
        decision = %verdict.decision,
        "comparison completed"
    );

    ComparisonStatus::Completed(Box::new(TestOutcome {
        partition,
        rank_sum,
        verdict,
    }))
}

/// Run every comparison and return one report per comparison, in order.
pub fn run_analysis(
    table: &RatingTable,
    comparisons: &[Comparison],
    alpha: f64,
) -> Vec<ComparisonReport> {
    let reports: Vec<ComparisonReport> = comparisons
        .iter()
        .map(|c| run_comparison(table, c, alpha))
        .collect();

    let completed = reports
        .iter()
        .filter(|r| r.status.outcome().is_some())
        .count();
    tracing::info!(
        comparisons = reports.len(),
        completed,
        skipped = reports.len() - completed,
        alpha,
        "analysis finished"
    );
    reports
}
