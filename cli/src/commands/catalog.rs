//! `regdrill catalog`: colleges and their departments.

use anyhow::{bail, Result};
use registration_drill_core::orchestrator::setup::COLLEGES;

use crate::context::DrillContext;

pub fn run(ctx: &DrillContext, college: Option<&str>) -> Result<()> {
    match college {
        Some(college) => {
            if !COLLEGES.contains(&college) {
                bail!("unknown college '{college}'; one of {COLLEGES:?}");
            }
            for department in ctx.catalog.departments_in_college(college) {
                let count = ctx
                    .catalog
                    .courses()
                    .iter()
                    .filter(|c| c.department == department)
                    .count();
                println!("{department}\t{count}");
            }
        }
        None => {
            for college in COLLEGES {
                let departments = ctx.catalog.departments_in_college(college);
                println!("{college}\t{} departments", departments.len());
            }
            println!("(catalog: {} courses)", ctx.catalog.len());
        }
    }
    Ok(())
}
