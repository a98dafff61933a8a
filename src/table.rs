//! Rating matrix shapes: the wide rater × column matrix, its long form,
//! and per-movie summaries.
//!
//! Nothing here makes statistical decisions. The matrix is built once,
//! validated once, and then only read:
//! - `RatingMatrix`: raters as rows, movie and attribute columns in source order
//! - `LongObservation`: one entry per observed (movie, rater, rating) cell
//! - `MovieSummary`: count and mean per movie, derived from the long form
//! - `ColumnSelector`: keyword → first matching column, shared by every
//!   rater-attribute comparison

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static MOVIE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d{4})\)").expect("Invalid movie year regex"));

/// Whether a column carries movie ratings or a rater attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Movie,
    Attribute,
}

/// One column of the wide matrix. `cells[r]` belongs to rater `r`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Option<f64>>,
}

impl Column {
    pub fn movie(name: impl Into<String>, cells: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Movie,
            cells,
        }
    }

    pub fn attribute(name: impl Into<String>, cells: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Attribute,
            cells,
        }
    }

    pub fn is_movie(&self) -> bool {
        self.kind == ColumnKind::Movie
    }

    /// Present cells in rater order.
    pub fn observed(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().filter_map(|cell| *cell)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MatrixError {
    #[error("duplicate column name: {name}")]
    DuplicateColumn { name: String },
    #[error("duplicate rater id: {id}")]
    DuplicateRater { id: String },
    #[error("column {name} has {got} cells, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        got: usize,
    },
}

/// Immutable wide matrix. Construction enforces unique column names, unique
/// rater ids and rectangular shape.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    rater_ids: Vec<String>,
    columns: Vec<Column>,
}

impl RatingMatrix {
    pub fn new(rater_ids: Vec<String>, columns: Vec<Column>) -> Result<Self, MatrixError> {
        let mut seen_raters = HashSet::with_capacity(rater_ids.len());
        for id in &rater_ids {
            if !seen_raters.insert(id.as_str()) {
                return Err(MatrixError::DuplicateRater { id: id.clone() });
            }
        }

        let mut seen_columns = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen_columns.insert(column.name.as_str()) {
                return Err(MatrixError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
            if column.cells.len() != rater_ids.len() {
                return Err(MatrixError::RaggedColumn {
                    name: column.name.clone(),
                    expected: rater_ids.len(),
                    got: column.cells.len(),
                });
            }
        }

        Ok(Self { rater_ids, columns })
    }

    pub fn rater_ids(&self) -> &[String] {
        &self.rater_ids
    }

    pub fn n_raters(&self) -> usize {
        self.rater_ids.len()
    }

    /// All columns, movies and attributes interleaved as in the source.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn movie_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|c| c.is_movie())
    }

    pub fn attribute_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|c| !c.is_movie())
    }

    /// Every observed movie rating given by a rater for whom `keep[r]` holds.
    pub fn ratings_for_raters(&self, keep: &[bool]) -> Vec<f64> {
        self.movie_columns()
            .flat_map(|column| {
                column
                    .cells
                    .iter()
                    .zip(keep)
                    .filter_map(|(cell, &k)| if k { *cell } else { None })
            })
            .collect()
    }
}

/// One observed cell. `movie` indexes `RatingMatrix::columns`, `rater`
/// indexes `RatingMatrix::rater_ids`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongObservation {
    pub movie: usize,
    pub rater: usize,
    pub rating: f64,
}

/// Melt the movie columns into long form, movie-major. Absent cells are
/// dropped; attribute columns never appear.
pub fn to_long(matrix: &RatingMatrix) -> Vec<LongObservation> {
    let mut out = Vec::new();
    for (movie, column) in matrix.columns().iter().enumerate() {
        if !column.is_movie() {
            continue;
        }
        for (rater, cell) in column.cells.iter().enumerate() {
            if let Some(rating) = *cell {
                out.push(LongObservation {
                    movie,
                    rater,
                    rating,
                });
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSummary {
    pub movie: String,
    pub num_ratings: usize,
    pub mean_rating: f64,
}

/// Count and mean per movie, in first-seen order. Movies with no
/// observations have no long-form rows and therefore no summary.
pub fn summarize(matrix: &RatingMatrix, long: &[LongObservation]) -> Vec<MovieSummary> {
    let mut order: Vec<usize> = Vec::new();
    let mut acc: HashMap<usize, (usize, f64)> = HashMap::new();
    for obs in long {
        let entry = acc.entry(obs.movie).or_insert_with(|| {
            order.push(obs.movie);
            (0, 0.0)
        });
        entry.0 += 1;
        entry.1 += obs.rating;
    }

    order
        .into_iter()
        .map(|idx| {
            let (count, sum) = acc[&idx];
            MovieSummary {
                movie: matrix.columns()[idx].name.clone(),
                num_ratings: count,
                mean_rating: sum / count as f64,
            }
        })
        .collect()
}

/// Release year embedded as `(YYYY)` in a movie identity.
pub fn movie_year(identity: &str) -> Option<i32> {
    MOVIE_YEAR
        .captures(identity)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Picks the first column whose name contains any of the keywords,
/// case-insensitively. All columns are searched in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelector {
    keywords: Vec<String>,
}

impl ColumnSelector {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn matches(&self, column_name: &str) -> bool {
        let name = column_name.to_lowercase();
        self.keywords.iter().any(|k| name.contains(k.as_str()))
    }

    pub fn select<'a>(&self, matrix: &'a RatingMatrix) -> Option<&'a Column> {
        matrix.columns().iter().find(|c| self.matches(&c.name))
    }
}

/// A loaded matrix together with its derived long form and summaries.
/// Built once; every comparison reads from the same instance.
#[derive(Debug, Clone)]
pub struct RatingTable {
    matrix: RatingMatrix,
    long: Vec<LongObservation>,
    summaries: Vec<MovieSummary>,
    summary_index: HashMap<String, usize>,
}

impl RatingTable {
    pub fn from_matrix(matrix: RatingMatrix) -> Self {
        let long = to_long(&matrix);
        let summaries = summarize(&matrix, &long);
        let summary_index = summaries
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.movie.clone(), idx))
            .collect();
        Self {
            matrix,
            long,
            summaries,
            summary_index,
        }
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    pub fn observations(&self) -> &[LongObservation] {
        &self.long
    }

    pub fn summaries(&self) -> &[MovieSummary] {
        &self.summaries
    }

    pub fn summary(&self, movie: &str) -> Option<&MovieSummary> {
        self.summary_index.get(movie).map(|&idx| &self.summaries[idx])
    }

    pub fn has_movie(&self, movie: &str) -> bool {
        self.matrix
            .column(movie)
            .map(Column::is_movie)
            .unwrap_or(false)
    }

    /// Observed ratings of one movie, or `None` when no such movie column exists.
    pub fn movie_ratings(&self, movie: &str) -> Option<Vec<f64>> {
        self.matrix
            .column(movie)
            .filter(|c| c.is_movie())
            .map(|c| c.observed().collect())
    }

    /// Long-form ratings of every movie whose name is in `movies`.
    pub fn ratings_for_movies(&self, movies: &HashSet<&str>) -> Vec<f64> {
        let columns = self.matrix.columns();
        self.long
            .iter()
            .filter(|obs| movies.contains(columns[obs.movie].name.as_str()))
            .map(|obs| obs.rating)
            .collect()
    }
}
