//! Course catalog
//!
//! The catalog is static input: loaded once, never mutated. Records use the
//! portal's JSON field names (`dept`, `grade`, `classification`, `credit`,
//! `name`, `professor`, `time_location`) so an exported course list can be
//! dropped in as-is.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub type CourseId = u32;

/// Classification (이수구분) of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "전필")]
    MajorRequired,
    #[serde(rename = "전선")]
    MajorElective,
    #[serde(rename = "교필")]
    LiberalRequired,
    #[serde(rename = "교선")]
    LiberalElective,
    #[serde(rename = "교직")]
    Teaching,
    #[serde(rename = "일선")]
    GeneralElective,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::MajorRequired => "전필",
            Category::MajorElective => "전선",
            Category::LiberalRequired => "교필",
            Category::LiberalElective => "교선",
            Category::Teaching => "교직",
            Category::GeneralElective => "일선",
        }
    }

    /// Categories whose label starts with 교: liberal required, liberal
    /// elective and teaching certificate.
    pub fn is_general_education(self) -> bool {
        self.label().starts_with('교')
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One offered course section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(rename = "dept")]
    pub department: String,
    #[serde(rename = "grade", deserialize_with = "year_from_text_or_number")]
    pub year: u8,
    #[serde(rename = "classification")]
    pub category: Category,
    pub code: String,
    #[serde(rename = "credit")]
    pub credits: u32,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "professor")]
    pub instructor: String,
    #[serde(rename = "time_location")]
    pub schedule: String,
}

fn year_from_text_or_number<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u8),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .trim_end_matches("학년")
            .parse()
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate course id {0} in catalog")]
    DuplicateId(CourseId),
}

/// Immutable ordered collection of courses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(courses.len());
        for course in &courses {
            if !seen.insert(course.id) {
                return Err(CatalogError::DuplicateId(course.id));
            }
        }
        Ok(Self { courses })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let courses: Vec<Course> = serde_json::from_str(json)?;
        Self::new(courses)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), courses = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn get(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Distinct departments whose name starts with `college`, in catalog order.
    pub fn departments_in_college(&self, college: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.courses
            .iter()
            .filter(|c| c.department.starts_with(college))
            .map(|c| c.department.as_str())
            .filter(|d| seen.insert(*d))
            .collect()
    }

    pub fn has_department(&self, department: &str) -> bool {
        self.courses.iter().any(|c| c.department == department)
    }
}
