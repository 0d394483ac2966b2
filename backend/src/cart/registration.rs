//! Applied-course list (수강신청내역)
//!
//! # Invariants
//!
//! 1. A course id appears at most once.
//! 2. At most one section per title: a different section of an already
//!    registered title is refused.
//!
//! Rejections leave the list untouched.

use crate::core::time::{format_civil, Millis};
use crate::models::{Course, CourseId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("course {course_id} is already registered")]
    AlreadyRegistered { course_id: CourseId },

    #[error("another section of '{title}' (course {existing_id}) is already registered")]
    SectionConflict { title: String, existing_id: CourseId },

    #[error("course {0} is not in the catalog")]
    UnknownCourse(CourseId),

    #[error("course {0} is not registered")]
    NotRegistered(CourseId),

    #[error("registration is not available in this session")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCourse {
    pub course: Course,
    /// Wall-clock time of the registration.
    pub applied_at_ms: Millis,
}

impl AppliedCourse {
    /// `YYYY-MM-DD HH:MM:SS`
    pub fn applied_at(&self) -> String {
        format_civil(self.applied_at_ms)
    }
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled(AppliedCourse),
    /// The user declined the confirmation; nothing changed.
    NotConfirmed,
}

#[derive(Debug, Clone, Default)]
pub struct AppliedCourses {
    entries: Vec<AppliedCourse>,
}

impl AppliedCourses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `course` could be registered right now.
    pub fn check(&self, course: &Course) -> Result<(), RegistrationError> {
        if self.contains(course.id) {
            return Err(RegistrationError::AlreadyRegistered {
                course_id: course.id,
            });
        }
        if let Some(existing) = self.entries.iter().find(|a| a.course.title == course.title) {
            return Err(RegistrationError::SectionConflict {
                title: course.title.clone(),
                existing_id: existing.course.id,
            });
        }
        Ok(())
    }

    /// Append `course` stamped with `applied_at_ms`.
    pub fn apply(&mut self, course: &Course, applied_at_ms: Millis) -> Result<&AppliedCourse, RegistrationError> {
        self.check(course)?;
        self.entries.push(AppliedCourse {
            course: course.clone(),
            applied_at_ms,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Remove by id.
    pub fn cancel(&mut self, course_id: CourseId) -> Option<AppliedCourse> {
        let pos = self.entries.iter().position(|a| a.course.id == course_id)?;
        Some(self.entries.remove(pos))
    }

    pub fn contains(&self, course_id: CourseId) -> bool {
        self.entries.iter().any(|a| a.course.id == course_id)
    }

    pub fn entries(&self) -> &[AppliedCourse] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_credits(&self) -> u32 {
        self.entries.iter().map(|a| a.course.credits).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn course(id: CourseId, title: &str, credits: u32) -> Course {
        Course {
            id,
            department: "dept".to_string(),
            year: 1,
            category: Category::MajorRequired,
            code: format!("C{id}"),
            credits,
            title: title.to_string(),
            instructor: String::new(),
            schedule: String::new(),
        }
    }

    #[test]
    fn test_same_id_rejected_and_list_unchanged() {
        let mut applied = AppliedCourses::new();
        applied.apply(&course(101, "X", 3), 10).unwrap();

        assert_eq!(
            applied.apply(&course(101, "X", 3), 20).unwrap_err(),
            RegistrationError::AlreadyRegistered { course_id: 101 }
        );
        assert_eq!(applied.len(), 1);
        assert_eq!(applied.entries()[0].applied_at_ms, 10);
    }

    #[test]
    fn test_section_conflict() {
        let mut applied = AppliedCourses::new();
        applied.apply(&course(101, "X", 3), 10).unwrap();
        assert_eq!(
            applied.check(&course(102, "X", 3)),
            Err(RegistrationError::SectionConflict {
                title: "X".to_string(),
                existing_id: 101
            })
        );

        assert!(applied.cancel(101).is_some());
        assert!(applied.apply(&course(102, "X", 3), 30).is_ok());
    }

    #[test]
    fn test_cancel_unknown_and_credits() {
        let mut applied = AppliedCourses::new();
        applied.apply(&course(1, "A", 3), 0).unwrap();
        applied.apply(&course(2, "B", 2), 0).unwrap();
        assert_eq!(applied.total_credits(), 5);
        assert!(applied.cancel(99).is_none());
        assert_eq!(applied.cancel(1).map(|a| a.course.id), Some(1));
        assert_eq!(applied.total_credits(), 2);
    }
}
