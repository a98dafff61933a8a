//! Group assignment rules.
//!
//! Each rule splits either the movies or the raters of a `RatingTable` into
//! two disjoint labeled groups and returns the pooled ratings of each side.
//! Rules are pure: the same table and rule always give the same partition.

use std::collections::HashSet;

use serde::Serialize;

use crate::table::{movie_year, ColumnSelector, RatingTable};

/// Fewer ratings than this on either side and the comparison is skipped.
pub const MIN_GROUP_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum GroupingRule {
    /// Movies with at least the median number of ratings vs the rest.
    MedianCount,
    /// Movies released in or after the median year vs earlier ones.
    MedianYear,
    /// One target movie vs a pooled list of other movies.
    Explicit { target: String, others: Vec<String> },
    /// Raters whose attribute equals `value_a` vs those equal to `value_b`.
    Attribute {
        keywords: Vec<String>,
        value_a: f64,
        value_b: f64,
    },
    /// First present title of a series vs all later present titles.
    FranchiseFirstVsRest { titles: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub label: String,
    /// Movies or raters assigned to this group.
    pub entities: usize,
    #[serde(skip)]
    pub ratings: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    pub group_a: Group,
    pub group_b: Group,
    /// Median used by median rules; `None` otherwise.
    pub boundary: Option<f64>,
    /// Attribute column picked by an attribute rule.
    pub column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GroupingError {
    #[error("no rated movies to split")]
    EmptyPopulation,
    #[error("no movie has a parsable (YYYY) release year")]
    NoYearData,
    #[error("no column matches any of [{}]", .keywords.join(", "))]
    ColumnNotFound { keywords: Vec<String> },
    #[error("movie not present in dataset: {movie}")]
    UnknownMovie { movie: String },
    #[error("only {present} of the listed titles are present, need at least {required}")]
    InsufficientEntries { present: usize, required: usize },
    #[error("group {label} has {size} ratings, need at least {required}")]
    UndersizedGroup {
        label: String,
        size: usize,
        required: usize,
    },
}

impl GroupingError {
    /// `config` for a comparison whose configuration cannot apply to this
    /// dataset, `data` for everything the data itself is missing.
    pub fn category(&self) -> &'static str {
        match self {
            GroupingError::InsufficientEntries { .. } => "config",
            _ => "data",
        }
    }
}

/// Result of a ≥-median split over named values.
#[derive(Debug, Clone, PartialEq)]
pub struct MedianSplit<'a> {
    pub median: f64,
    /// Entries with value ≥ median.
    pub upper: Vec<&'a str>,
    pub lower: Vec<&'a str>,
}

/// Median with the usual even-length convention (mean of the two middle values).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    let n = v.len();
    if n % 2 == 1 {
        Some(v[n / 2])
    } else {
        Some(0.5 * (v[n / 2 - 1] + v[n / 2]))
    }
}

/// Split entries at their median. Values equal to the median land in `upper`.
pub fn median_split<'a, I>(entries: I) -> Option<MedianSplit<'a>>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let entries: Vec<(&'a str, f64)> = entries.into_iter().collect();
    let values: Vec<f64> = entries.iter().map(|(_, v)| *v).collect();
    let median = median(&values)?;
    let (upper, lower): (Vec<_>, Vec<_>) = entries.into_iter().partition(|(_, v)| *v >= median);
    Some(MedianSplit {
        median,
        upper: upper.into_iter().map(|(k, _)| k).collect(),
        lower: lower.into_iter().map(|(k, _)| k).collect(),
    })
}

impl GroupingRule {
    /// Default labels for the two sides.
    pub fn labels(&self) -> (String, String) {
        match self {
            GroupingRule::MedianCount => ("high".into(), "low".into()),
            GroupingRule::MedianYear => ("new".into(), "old".into()),
            GroupingRule::Explicit { target, .. } => (target.clone(), "comparison".into()),
            GroupingRule::Attribute {
                value_a, value_b, ..
            } => (value_a.to_string(), value_b.to_string()),
            GroupingRule::FranchiseFirstVsRest { .. } => ("first".into(), "rest".into()),
        }
    }

    pub fn assign(&self, table: &RatingTable) -> Result<Partition, GroupingError> {
        let partition = match self {
            GroupingRule::MedianCount => self.median_count(table)?,
            GroupingRule::MedianYear => self.median_year(table)?,
            GroupingRule::Explicit { target, others } => self.explicit(table, target, others)?,
            GroupingRule::Attribute {
                keywords,
                value_a,
                value_b,
            } => self.attribute(table, keywords, *value_a, *value_b)?,
            GroupingRule::FranchiseFirstVsRest { titles } => self.franchise(table, titles)?,
        };

        for group in [&partition.group_a, &partition.group_b] {
            if group.ratings.len() < MIN_GROUP_SIZE {
                return Err(GroupingError::UndersizedGroup {
                    label: group.label.clone(),
                    size: group.ratings.len(),
                    required: MIN_GROUP_SIZE,
                });
            }
        }
        Ok(partition)
    }

    fn median_count(&self, table: &RatingTable) -> Result<Partition, GroupingError> {
        let split = median_split(
            table
                .summaries()
                .iter()
                .map(|s| (s.movie.as_str(), s.num_ratings as f64)),
        )
        .ok_or(GroupingError::EmptyPopulation)?;
        Ok(self.movie_partition(table, split))
    }

    fn median_year(&self, table: &RatingTable) -> Result<Partition, GroupingError> {
        let split = median_split(
            table
                .summaries()
                .iter()
                .filter_map(|s| movie_year(&s.movie).map(|y| (s.movie.as_str(), y as f64))),
        )
        .ok_or(GroupingError::NoYearData)?;
        Ok(self.movie_partition(table, split))
    }

    fn movie_partition(&self, table: &RatingTable, split: MedianSplit<'_>) -> Partition {
        let (label_a, label_b) = self.labels();
        let upper: HashSet<&str> = split.upper.iter().copied().collect();
        let lower: HashSet<&str> = split.lower.iter().copied().collect();
        Partition {
            group_a: Group {
                label: label_a,
                entities: upper.len(),
                ratings: table.ratings_for_movies(&upper),
            },
            group_b: Group {
                label: label_b,
                entities: lower.len(),
                ratings: table.ratings_for_movies(&lower),
            },
            boundary: Some(split.median),
            column: None,
        }
    }

    fn explicit(
        &self,
        table: &RatingTable,
        target: &str,
        others: &[String],
    ) -> Result<Partition, GroupingError> {
        let target_ratings = table
            .movie_ratings(target)
            .ok_or_else(|| GroupingError::UnknownMovie {
                movie: target.to_string(),
            })?;

        let present: Vec<&str> = others
            .iter()
            .map(String::as_str)
            .filter(|m| table.has_movie(m))
            .collect();
        let pooled: Vec<f64> = present
            .iter()
            .filter_map(|m| table.movie_ratings(m))
            .flatten()
            .collect();

        let (label_a, label_b) = self.labels();
        Ok(Partition {
            group_a: Group {
                label: label_a,
                entities: 1,
                ratings: target_ratings,
            },
            group_b: Group {
                label: label_b,
                entities: present.len(),
                ratings: pooled,
            },
            boundary: None,
            column: None,
        })
    }

    fn attribute(
        &self,
        table: &RatingTable,
        keywords: &[String],
        value_a: f64,
        value_b: f64,
    ) -> Result<Partition, GroupingError> {
        let selector = ColumnSelector::new(keywords);
        let column = selector
            .select(table.matrix())
            .ok_or_else(|| GroupingError::ColumnNotFound {
                keywords: selector.keywords().to_vec(),
            })?;

        let keep_a: Vec<bool> = column.cells.iter().map(|c| *c == Some(value_a)).collect();
        let keep_b: Vec<bool> = column.cells.iter().map(|c| *c == Some(value_b)).collect();

        let (label_a, label_b) = self.labels();
        Ok(Partition {
            group_a: Group {
                label: label_a,
                entities: keep_a.iter().filter(|k| **k).count(),
                ratings: table.matrix().ratings_for_raters(&keep_a),
            },
            group_b: Group {
                label: label_b,
                entities: keep_b.iter().filter(|k| **k).count(),
                ratings: table.matrix().ratings_for_raters(&keep_b),
            },
            boundary: None,
            column: Some(column.name.clone()),
        })
    }

    fn franchise(&self, table: &RatingTable, titles: &[String]) -> Result<Partition, GroupingError> {
        let present: Vec<&str> = titles
            .iter()
            .map(String::as_str)
            .filter(|t| table.has_movie(t))
            .collect();
        if present.len() < 2 {
            return Err(GroupingError::InsufficientEntries {
                present: present.len(),
                required: 2,
            });
        }
        let (first, rest) = (present[0], &present[1..]);

        let first_ratings = table.movie_ratings(first).unwrap_or_default();
        let rest_ratings: Vec<f64> = rest
            .iter()
            .filter_map(|t| table.movie_ratings(t))
            .flatten()
            .collect();

        let (label_a, label_b) = self.labels();
        Ok(Partition {
            group_a: Group {
                label: label_a,
                entities: 1,
                ratings: first_ratings,
            },
            group_b: Group {
                label: label_b,
                entities: rest.len(),
                ratings: rest_ratings,
            },
            boundary: None,
            column: None,
        })
    }
}
