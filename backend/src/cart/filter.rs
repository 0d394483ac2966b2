//! View modes over the catalog
//!
//! Exactly one view mode is active at a time. Search narrows whatever the mode
//! produced by a case-sensitive substring of the title or the code.

use crate::models::{Catalog, Category, Course};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Liberal-arts classification selected in the two-level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiberalClass {
    /// 교필
    Required,
    /// 교선
    Elective,
}

/// One option of the area select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaOption {
    /// Text matched against department and title.
    pub value: &'static str,
    /// Text shown in the select.
    pub label: &'static str,
}

const REQUIRED_AREAS: [AreaOption; 3] = [
    AreaOption { value: "컴퓨팅사고", label: "기초(컴퓨팅사고와데이터의이해)" },
    AreaOption { value: "다양성존중", label: "핵심(다양성존중역량)" },
    AreaOption { value: "윤리실천", label: "핵심(윤리실천역량)" },
];

const ELECTIVE_AREAS: [AreaOption; 6] = [
    AreaOption { value: "교양과인성", label: "기초(교양과인성)" },
    AreaOption { value: "균형(인문)", label: "균형(인문)" },
    AreaOption { value: "균형(사회)", label: "균형(사회)" },
    AreaOption { value: "균형(자연)", label: "균형(자연)" },
    AreaOption { value: "균형(공학)", label: "균형(공학)" },
    AreaOption { value: "균형(예술)", label: "균형(예술)" },
];

impl LiberalClass {
    pub fn category(self) -> Category {
        match self {
            LiberalClass::Required => Category::LiberalRequired,
            LiberalClass::Elective => Category::LiberalElective,
        }
    }

    /// Area options; the set depends on the class.
    pub fn areas(self) -> &'static [AreaOption] {
        match self {
            LiberalClass::Required => &REQUIRED_AREAS,
            LiberalClass::Elective => &ELECTIVE_AREAS,
        }
    }

    pub fn area(self, value: &str) -> Option<&'static AreaOption> {
        self.areas().iter().find(|a| a.value == value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("area '{area}' is not offered for {class}")]
    UnknownArea { class: &'static str, area: String },

    #[error("department '{department}' does not belong to {college}")]
    DepartmentOutsideCollege { college: String, department: String },
}

/// Mutually exclusive list modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    /// The default cart.
    Cart,
    MyDepartment,
    Liberal {
        class: LiberalClass,
        /// `None` lists the whole class.
        area: Option<String>,
    },
    Teaching,
    ByDepartment {
        college: Option<String>,
        department: Option<String>,
    },
    GeneralElective,
}

impl ViewMode {
    /// Liberal view, checking the area belongs to the class.
    pub fn liberal(class: LiberalClass, area: Option<&str>) -> Result<Self, FilterError> {
        let area = match area {
            None => None,
            Some(value) => match class.area(value) {
                Some(option) => Some(option.value.to_string()),
                None => {
                    return Err(FilterError::UnknownArea {
                        class: class.category().label(),
                        area: value.to_string(),
                    })
                }
            },
        };
        Ok(ViewMode::Liberal { class, area })
    }

    /// Department browse view, checking the cascade is consistent.
    pub fn by_department(college: Option<&str>, department: Option<&str>) -> Result<Self, FilterError> {
        if let (Some(college), Some(department)) = (college, department) {
            if !department.starts_with(college) {
                return Err(FilterError::DepartmentOutsideCollege {
                    college: college.to_string(),
                    department: department.to_string(),
                });
            }
        }
        Ok(ViewMode::ByDepartment {
            college: college.map(str::to_string),
            department: department.map(str::to_string),
        })
    }

    /// Header label for the list panel.
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Cart => "장바구니",
            ViewMode::MyDepartment => "MYDEPT",
            ViewMode::Liberal { .. } => "LIBERAL",
            ViewMode::Teaching => "TEACHING",
            ViewMode::ByDepartment { .. } => "BYDEPT",
            ViewMode::GeneralElective => "GENERAL",
        }
    }
}

fn matches_search(course: &Course, term: &str) -> bool {
    term.is_empty() || course.title.contains(term) || course.code.contains(term)
}

fn matches_view(course: &Course, view: &ViewMode, my_department: &str) -> bool {
    match view {
        ViewMode::Cart => true,
        ViewMode::MyDepartment => course.department == my_department,
        ViewMode::Liberal { class, area } => {
            course.category == class.category()
                && area
                    .as_deref()
                    .map_or(true, |a| course.department.contains(a) || course.title.contains(a))
        }
        ViewMode::Teaching => course.category == Category::Teaching,
        ViewMode::ByDepartment { college, department } => {
            college.as_deref().map_or(true, |c| course.department.starts_with(c))
                && department.as_deref().map_or(true, |d| course.department == d)
        }
        ViewMode::GeneralElective => course.category == Category::GeneralElective,
    }
}

/// Courses listed for `view`, then narrowed by `search`.
///
/// The cart view lists `cart`; every other view filters the full catalog.
pub fn apply_view<'a>(
    catalog: &'a Catalog,
    cart: &'a [Course],
    my_department: &str,
    view: &ViewMode,
    search: &str,
) -> Vec<&'a Course> {
    let source: &'a [Course] = match view {
        ViewMode::Cart => cart,
        _ => catalog.courses(),
    };
    source
        .iter()
        .filter(|c| matches_view(c, view, my_department))
        .filter(|c| matches_search(c, search))
        .collect()
}
