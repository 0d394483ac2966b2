//! `regdrill classify`: verdict and delay for a simulated click time.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;
use clap::Args;
use registration_drill_core::core::time::{civil_datetime, format_civil, parse_civil, BoundaryConfig};
use registration_drill_core::latency::{LatencyKind, LatencySimulator};
use registration_drill_core::{classify, Eligibility};
use serde::Serialize;

use crate::context::DrillContext;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Synthetic click time on the boundary's date, HH:MM:SS[.mmm]
    #[arg(long)]
    at: String,

    /// Output machine-readable JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ClassifyReport {
    boundary: String,
    lead_seconds: u32,
    click: String,
    click_ms: i64,
    offset_ms: i64,
    eligibility: Eligibility,
    early: bool,
    delay_ms: u64,
}

pub fn run(ctx: &DrillContext, args: &ClassifyArgs) -> Result<()> {
    let boundary_ms = parse_civil(&ctx.config.boundary)?;
    let boundary = BoundaryConfig::new(boundary_ms, ctx.config.lead_seconds)?;

    let time = NaiveTime::parse_from_str(&args.at, "%H:%M:%S%.f")
        .with_context(|| format!("invalid click time '{}' (HH:MM:SS[.mmm])", args.at))?;
    let date = civil_datetime(boundary.boundary_ms)
        .ok_or_else(|| anyhow!("boundary out of range"))?
        .date();
    let click_ms = date.and_time(time).and_utc().timestamp_millis();

    let eligibility = classify(click_ms, boundary.boundary_ms);
    let seed = ctx.config.seed_or(click_ms);
    let mut latency = LatencySimulator::new(ctx.config.latency.clone(), seed)?;
    let delay_ms = latency.simulate(LatencyKind::for_login(eligibility));

    let report = ClassifyReport {
        boundary: format_civil(boundary.boundary_ms),
        lead_seconds: boundary.lead_seconds,
        click: args.at.clone(),
        click_ms,
        offset_ms: click_ms - boundary.boundary_ms,
        eligibility,
        early: eligibility.is_early(),
        delay_ms,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let verdict = if report.early { "EARLY" } else { "ON TIME" };
        println!(
            "{verdict}: click {} is {:+} ms from {}; login delay {} ms",
            report.click, report.offset_ms, report.boundary, report.delay_ms
        );
    }
    Ok(())
}
