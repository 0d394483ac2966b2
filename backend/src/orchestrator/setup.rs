//! Setup form (시뮬레이션 환경 설정)
//!
//! Holds the boundary, lead time and declared affiliation while the user is
//! still editing. Selects start on placeholder values; [`SetupForm::validate`]
//! refuses to let the login phase begin until each one is a concrete choice.

use crate::config::DrillConfig;
use crate::core::time::{parse_civil, BoundaryConfig, ClockError};
use crate::models::{Catalog, Identity};
use std::fmt;
use thiserror::Error;

pub const COLLEGE_PLACEHOLDER: &str = "-대학선택-";
pub const DEPARTMENT_PLACEHOLDER: &str = "-학과선택-";

pub const COLLEGES: [&str; 5] = [
    "인문사회과학대학",
    "사범대학",
    "경영경제대학",
    "융합공과대학",
    "문화예술대학",
];

pub const YEARS: [u8; 4] = [1, 2, 3, 4];

pub const DEFAULT_NAME: &str = "수뭉이";
pub const DEFAULT_STUDENT_ID: &str = "202612345";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    College,
    Department,
}

impl fmt::Display for SetupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupField::College => f.write_str("college"),
            SetupField::Department => f.write_str("department"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("select a {0}; the placeholder is not a choice")]
    Placeholder(SetupField),

    #[error("unknown college '{0}'")]
    UnknownCollege(String),

    #[error("department '{department}' is not part of {college}")]
    DepartmentOutsideCollege { college: String, department: String },

    #[error("department '{0}' offers no courses")]
    UnknownDepartment(String),

    #[error("year {0} is outside 1-4")]
    YearOutOfRange(u8),

    #[error(transparent)]
    Boundary(#[from] ClockError),
}

/// Validated form contents, ready to anchor a clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSetup {
    pub identity: Identity,
    pub boundary: BoundaryConfig,
    pub boundary_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupForm {
    pub boundary: String,
    pub lead_seconds: u32,
    college: String,
    department: String,
    pub year: u8,
    pub name: String,
    pub student_id: String,
}

impl Default for SetupForm {
    fn default() -> Self {
        Self::from_config(&DrillConfig::default())
    }
}

impl SetupForm {
    pub fn from_config(config: &DrillConfig) -> Self {
        Self {
            boundary: config.boundary.clone(),
            lead_seconds: config.lead_seconds,
            college: COLLEGE_PLACEHOLDER.to_string(),
            department: DEPARTMENT_PLACEHOLDER.to_string(),
            year: 4,
            name: DEFAULT_NAME.to_string(),
            student_id: DEFAULT_STUDENT_ID.to_string(),
        }
    }

    pub fn college(&self) -> &str {
        &self.college
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    /// Pick a college; the department select resets to its placeholder.
    pub fn select_college(&mut self, college: impl Into<String>) {
        self.college = college.into();
        self.department = DEPARTMENT_PLACEHOLDER.to_string();
    }

    pub fn select_department(&mut self, department: impl Into<String>) {
        self.department = department.into();
    }

    /// Department choices for the selected college; empty while the college
    /// is still the placeholder.
    pub fn department_options<'c>(&self, catalog: &'c Catalog) -> Vec<&'c str> {
        if self.college == COLLEGE_PLACEHOLDER {
            return Vec::new();
        }
        catalog.departments_in_college(&self.college)
    }

    pub fn validate(&self, catalog: &Catalog) -> Result<ValidatedSetup, SetupError> {
        if self.college == COLLEGE_PLACEHOLDER {
            return Err(SetupError::Placeholder(SetupField::College));
        }
        if !COLLEGES.contains(&self.college.as_str()) {
            return Err(SetupError::UnknownCollege(self.college.clone()));
        }
        if self.department == DEPARTMENT_PLACEHOLDER {
            return Err(SetupError::Placeholder(SetupField::Department));
        }
        if !self.department.starts_with(&self.college) {
            return Err(SetupError::DepartmentOutsideCollege {
                college: self.college.clone(),
                department: self.department.clone(),
            });
        }
        if !catalog.has_department(&self.department) {
            return Err(SetupError::UnknownDepartment(self.department.clone()));
        }
        if !YEARS.contains(&self.year) {
            return Err(SetupError::YearOutOfRange(self.year));
        }

        let boundary = BoundaryConfig::new(parse_civil(&self.boundary)?, self.lead_seconds)?;

        Ok(ValidatedSetup {
            identity: Identity {
                college: self.college.clone(),
                department: self.department.clone(),
                year: self.year,
                name: self.name.clone(),
                student_id: self.student_id.clone(),
            },
            boundary,
            boundary_text: self.boundary.trim().to_string(),
        })
    }
}
