//! Configuration and catalog shared by every command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use registration_drill_core::models::Catalog;
use registration_drill_core::orchestrator::FileSessionStore;
use registration_drill_core::DrillConfig;

const SAMPLE_CATALOG: &str = include_str!("../data/courses.json");

pub struct ContextArgs {
    pub config: Option<PathBuf>,
    pub boundary: Option<String>,
    pub lead: Option<u32>,
    pub seed: Option<u64>,
    pub catalog: Option<PathBuf>,
    pub session_dir: PathBuf,
}

pub struct DrillContext {
    pub config: DrillConfig,
    pub catalog: Arc<Catalog>,
    pub session_dir: PathBuf,
}

impl DrillContext {
    /// Config file first, then flag overrides, then validation.
    pub fn load(args: ContextArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => DrillConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => DrillConfig::default(),
        };
        if let Some(boundary) = args.boundary {
            config.boundary = boundary;
        }
        if let Some(lead) = args.lead {
            config.lead_seconds = lead;
        }
        if args.seed.is_some() {
            config.seed = args.seed;
        }
        config.validate().context("invalid drill configuration")?;

        let catalog = match &args.catalog {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("failed to load catalog {}", path.display()))?,
            None => Catalog::from_json_str(SAMPLE_CATALOG).context("bundled catalog is invalid")?,
        };
        tracing::debug!(courses = catalog.len(), "catalog ready");

        Ok(Self {
            config,
            catalog: Arc::new(catalog),
            session_dir: args.session_dir,
        })
    }

    pub fn session_store(&self) -> FileSessionStore {
        FileSessionStore::new(&self.session_dir)
    }
}
