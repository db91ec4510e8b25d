//! Course catalog
//!
//! The catalog is loaded once at startup and is read-only afterwards. The
//! CSV loader understands the Coursera export layout:
//!
//! | column | field |
//! |---|---|
//! | `course_title` | `title` |
//! | `course_organization` | `description` |
//! | `course_Certificate_type` | `category` |
//! | `course_rating` | `rating` |
//! | `course_difficulty` | `difficulty` |
//!
//! The export carries no duration, price or tags, so those fall back to
//! 40 hours, 99.99 and the lowercased category. Optional `course_id`,
//! `course_duration`, `course_price` and `course_tags` columns override the
//! fallbacks when present.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::index::IndexDocument;
use crate::types::{Course, DEFAULT_CATEGORY, Difficulty};

/// Duration assumed when the catalog does not carry one
pub const DEFAULT_DURATION_HOURS: u32 = 40;

/// Price assumed when the catalog does not carry one
pub const DEFAULT_PRICE: f64 = 99.99;

/// Rating assumed when the catalog rating is missing or unreadable
pub const DEFAULT_RATING: f64 = 4.0;

/// Errors that can occur while loading the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("duplicate course id: {0}")]
    DuplicateId(String),
}

/// One row of the CSV export
#[derive(Debug, Deserialize)]
struct CatalogRow {
    course_title: String,
    #[serde(default)]
    course_organization: String,
    #[serde(rename = "course_Certificate_type", default)]
    course_certificate_type: String,
    #[serde(default)]
    course_rating: String,
    #[serde(default)]
    course_difficulty: String,
    #[serde(default)]
    course_id: Option<String>,
    #[serde(default)]
    course_duration: Option<String>,
    #[serde(default)]
    course_price: Option<String>,
    #[serde(default)]
    course_tags: Option<String>,
}

impl CatalogRow {
    fn into_course(self, row: usize) -> Result<Course, CatalogError> {
        let title = self.course_title.trim().to_string();
        if title.is_empty() {
            return Err(CatalogError::InvalidRow {
                row,
                message: "empty course_title".to_string(),
            });
        }

        let id = self
            .course_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| row.to_string());

        let category = match self.course_certificate_type.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            other => other.to_string(),
        };

        let difficulty = self.course_difficulty.parse().unwrap_or_else(|_| {
            if !self.course_difficulty.trim().is_empty() {
                debug!(row, value = %self.course_difficulty, "unknown difficulty, using mixed");
            }
            Difficulty::Mixed
        });

        let rating = self
            .course_rating
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 5.0))
            .unwrap_or(DEFAULT_RATING);

        let duration = self
            .course_duration
            .and_then(|d| d.trim().parse::<u32>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_DURATION_HOURS);

        let price = self
            .course_price
            .and_then(|p| p.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(DEFAULT_PRICE);

        let mut tags: BTreeSet<String> = self
            .course_tags
            .unwrap_or_default()
            .split([';', ','])
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            tags.insert(category.to_lowercase());
        }

        Ok(Course {
            id,
            title,
            description: self.course_organization.trim().to_string(),
            category,
            difficulty,
            duration,
            tags,
            rating,
            price,
        })
    }
}

/// Immutable, id-addressable set of courses
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Course>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(courses.len());
        for (pos, course) in courses.iter().enumerate() {
            if by_id.insert(course.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(course.id.clone()));
            }
        }
        Ok(Self { courses, by_id })
    }

    /// Load a Coursera-style CSV export from disk
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(file)?;
        info!(path = %path.display(), courses = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Load a Coursera-style CSV export from any reader.
    ///
    /// Rows with an empty title are skipped with a warning; structural CSV
    /// errors abort the load.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let mut courses = Vec::new();
        for (row, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            match record?.into_course(row) {
                Ok(course) => courses.push(course),
                Err(e) => warn!(error = %e, "skipping catalog row"),
            }
        }

        Self::new(courses)
    }

    pub fn get(&self, id: &str) -> Option<&Course> {
        self.by_id.get(id).map(|pos| &self.courses[*pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Index documents for every course, in catalog order
    pub fn documents(&self) -> Vec<IndexDocument> {
        self.courses.iter().map(IndexDocument::from_course).collect()
    }
}
