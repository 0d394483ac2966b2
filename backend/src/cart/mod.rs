//! Cart/filter engine
//!
//! - [`build_default_cart`]: the randomized default shortlist (장바구니)
//! - [`filter`]: view modes and free-text search over catalog or cart
//! - [`registration`]: the applied-course list and its duplicate rules
//!
//! All shuffling goes through an injected [`RngManager`], so a fixed seed
//! reproduces the same cart.

pub mod filter;
pub mod registration;

pub use filter::{apply_view, AreaOption, FilterError, LiberalClass, ViewMode};
pub use registration::{AppliedCourse, AppliedCourses, CancelOutcome, RegistrationError};

use crate::models::{Catalog, Course, Identity};
use crate::rng::RngManager;
use std::collections::HashSet;

/// Major courses taken into the cart at most.
pub const MAJOR_PICKS: usize = 7;

/// Total cart size when enough courses exist.
pub const CART_SIZE: usize = 14;

/// Build the default cart for `identity`.
///
/// Own-department courses of the declared year come first, then the rest of
/// the department, each group shuffled independently; the first
/// [`MAJOR_PICKS`] are kept. The remainder up to [`CART_SIZE`] is filled with
/// shuffled general-education courses not already picked, and the combined
/// list is shuffled once more.
pub fn build_default_cart(catalog: &Catalog, identity: &Identity, rng: &mut RngManager) -> Vec<Course> {
    let (mut priority, mut other): (Vec<&Course>, Vec<&Course>) = catalog
        .courses()
        .iter()
        .filter(|c| c.department == identity.department)
        .partition(|c| c.year == identity.year);

    rng.shuffle(&mut priority);
    rng.shuffle(&mut other);

    let majors: Vec<&Course> = priority
        .into_iter()
        .chain(other)
        .take(MAJOR_PICKS)
        .collect();
    let needed_liberal = CART_SIZE - majors.len();

    let mut liberal_pool: Vec<&Course> = catalog
        .courses()
        .iter()
        .filter(|c| c.category.is_general_education())
        .collect();
    rng.shuffle(&mut liberal_pool);

    let major_ids: HashSet<_> = majors.iter().map(|c| c.id).collect();
    let liberals = liberal_pool
        .into_iter()
        .filter(|c| !major_ids.contains(&c.id))
        .take(needed_liberal);

    let mut cart: Vec<Course> = majors.into_iter().chain(liberals).cloned().collect();
    rng.shuffle(&mut cart);

    tracing::debug!(
        department = %identity.department,
        year = identity.year,
        size = cart.len(),
        "default cart built"
    );
    cart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn course(id: u32, dept: &str, year: u8, category: Category) -> Course {
        Course {
            id,
            department: dept.to_string(),
            year,
            category,
            code: format!("C{id:04}"),
            credits: 3,
            title: format!("Course {id}"),
            instructor: "Prof".to_string(),
            schedule: "Mon 1-2".to_string(),
        }
    }

    fn identity(dept: &str, year: u8) -> Identity {
        Identity {
            college: "융합공과대학".to_string(),
            department: dept.to_string(),
            year,
            name: "tester".to_string(),
            student_id: "1".to_string(),
        }
    }

    #[test]
    fn test_declared_year_fills_majors_first() {
        let dept = "융합공과대학 컴퓨터과학전공";
        let mut courses: Vec<Course> = (1..=7).map(|i| course(i, dept, 2, Category::MajorRequired)).collect();
        courses.extend((8..=12).map(|i| course(i, dept, 3, Category::MajorElective)));
        courses.extend((100..=120).map(|i| course(i, "교양대학", 1, Category::LiberalElective)));
        let catalog = Catalog::new(courses).unwrap();

        let cart = build_default_cart(&catalog, &identity(dept, 2), &mut RngManager::new(5));
        assert_eq!(cart.len(), CART_SIZE);

        let majors: Vec<_> = cart.iter().filter(|c| c.department == dept).collect();
        assert_eq!(majors.len(), MAJOR_PICKS);
        assert!(majors.iter().all(|c| c.year == 2));
    }

    #[test]
    fn test_small_department_backfilled_with_liberal() {
        let dept = "사범대학 국어교육과";
        let mut courses = vec![course(1, dept, 1, Category::MajorRequired)];
        courses.extend((10..=30).map(|i| course(i, "교양대학", 1, Category::LiberalRequired)));
        let catalog = Catalog::new(courses).unwrap();

        let cart = build_default_cart(&catalog, &identity(dept, 4), &mut RngManager::new(9));
        assert_eq!(cart.len(), CART_SIZE);
        assert_eq!(cart.iter().filter(|c| c.department == dept).count(), 1);
    }

    #[test]
    fn test_unknown_department_gets_only_liberal() {
        let courses = (10..=15).map(|i| course(i, "교양대학", 1, Category::Teaching)).collect();
        let catalog = Catalog::new(courses).unwrap();

        let cart = build_default_cart(&catalog, &identity("nowhere", 1), &mut RngManager::new(1));
        assert_eq!(cart.len(), 6);
    }
}
