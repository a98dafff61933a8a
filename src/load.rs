//! CSV loading for the wide rating matrix.

use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::{Column, MatrixError, RatingMatrix};

static TRAILING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\d{4}\)\s*$").expect("Invalid trailing year regex"));

/// How data columns are split into movie and attribute columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovieColumns {
    /// A column is a movie iff its name ends in `(YYYY)`.
    #[default]
    Auto,
    /// The first `n` data columns are movies, the rest attributes.
    Leading(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// The first column holds rater ids. Otherwise raters are `row-<index>`.
    /// Under `MovieColumns::Auto` a first header ending in `(YYYY)` is read
    /// as a movie and the ids are synthesized regardless.
    pub has_rater_id: bool,
    pub movie_columns: MovieColumns,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            has_rater_id: true,
            movie_columns: MovieColumns::Auto,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv has no data columns")]
    NoColumns,
    #[error("row {row}, column {column}: cannot parse {value:?} as a rating")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Blank and `NaN` cells are absent. Infinite values parse here and are
/// rejected by the caller.
fn parse_cell(raw: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed.parse()?;
    Ok(Some(value).filter(|v| !v.is_nan()))
}

pub fn is_movie_identity(name: &str) -> bool {
    TRAILING_YEAR.is_match(name)
}

pub fn read_matrix<R: Read>(reader: R, opts: LoadOptions) -> Result<RatingMatrix, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    // A leading movie header means the file carries no id column.
    let has_rater_id = opts.has_rater_id
        && !(opts.movie_columns == MovieColumns::Auto
            && headers.first().is_some_and(|h| is_movie_identity(h)));
    let skip = usize::from(has_rater_id);
    if headers.len() <= skip {
        return Err(LoadError::NoColumns);
    }
    let names = &headers[skip..];

    let mut rater_ids: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let id = if has_rater_id {
            record.get(0).unwrap_or_default().trim().to_string()
        } else {
            format!("row-{row}")
        };
        rater_ids.push(id);

        for (idx, name) in names.iter().enumerate() {
            let raw = record.get(idx + skip).unwrap_or_default();
            let cell = match parse_cell(raw) {
                Ok(cell) if cell.map_or(true, f64::is_finite) => cell,
                _ => {
                    return Err(LoadError::InvalidCell {
                        row,
                        column: name.clone(),
                        value: raw.to_string(),
                    })
                }
            };
            cells[idx].push(cell);
        }
    }

    let columns = names
        .iter()
        .zip(cells)
        .enumerate()
        .map(|(idx, (name, cells))| {
            let is_movie = match opts.movie_columns {
                MovieColumns::Auto => is_movie_identity(name),
                MovieColumns::Leading(n) => idx < n,
            };
            if is_movie {
                Column::movie(name.clone(), cells)
            } else {
                Column::attribute(name.clone(), cells)
            }
        })
        .collect();

    let matrix = RatingMatrix::new(rater_ids, columns)?;
    tracing::info!(
        raters = matrix.n_raters(),
        movies = matrix.movie_columns().count(),
        attributes = matrix.attribute_columns().count(),
        "rating matrix loaded"
    );
    Ok(matrix)
}

pub fn load_matrix(path: impl AsRef<Path>, opts: LoadOptions) -> Result<RatingMatrix, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_matrix(std::io::BufReader::new(file), opts)
}
