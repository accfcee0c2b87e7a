//! Bootstrap orchestration: initialized-marker check, tables, indexes, data.
//!
//! The phases run strictly in that order against one [`SqlClient`]. Table and
//! index creation tolerate objects left behind by an earlier run; the data
//! load does not, which is what the marker check is for.

use anyhow::Context;
use ldif_source::{render_files, DataMapping, LdifReader, TemplateContext};
use std::path::{Path, PathBuf};
use sync_core::{
    create_indexes, create_tables, IndexReport, SqlClient, TableReport, Translator,
};
use tracing::{debug, info, warn};

/// The row whose presence means a previous bootstrap completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub table: String,
    pub id: String,
}

/// Data files to render and load.
#[derive(Debug, Clone)]
pub struct DataPlan {
    pub mapping: DataMapping,
    /// Groups to load; all groups when empty
    pub groups: Vec<String>,
    pub templates_dir: PathBuf,
    pub render_dir: PathBuf,
    pub context: TemplateContext,
}

/// What a bootstrap run should do.
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    /// Skip everything when the marker row exists
    pub skip_initialized: bool,
    pub marker: Option<Marker>,
    pub skip_tables: bool,
    pub skip_indexes: bool,
    /// Data load; skipped when `None`
    pub data: Option<DataPlan>,
}

/// Outcome of the data load phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub files: usize,
    pub rows: usize,
    pub skipped: usize,
}

/// Outcome of a bootstrap run; a phase that did not run has no report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub already_initialized: bool,
    pub tables: Option<TableReport>,
    pub indexes: Option<IndexReport>,
    pub load: Option<LoadReport>,
}

/// Runs the bootstrap phases for one translator against one client.
pub struct Bootstrap<'a, C: SqlClient + ?Sized> {
    translator: &'a Translator,
    client: &'a C,
}

impl<'a, C: SqlClient + ?Sized> Bootstrap<'a, C> {
    pub fn new(translator: &'a Translator, client: &'a C) -> Self {
        Self { translator, client }
    }

    /// Whether the marker row exists.
    pub async fn is_initialized(&self, marker: &Marker) -> anyhow::Result<bool> {
        self.client
            .row_exists(&marker.table, &marker.id)
            .await
            .with_context(|| {
                format!("Failed to check for {} in {}", marker.id, marker.table)
            })
    }

    /// Create one table per object class.
    pub async fn create_tables(&self) -> anyhow::Result<TableReport> {
        let tables = self
            .translator
            .synthesize_tables()
            .context("Failed to synthesize tables")?;
        let report = create_tables(self.client, &tables)
            .await
            .context("Failed to create tables")?;
        info!(
            "Tables: {} created, {} already present",
            report.created.len(),
            report.existing.len()
        );
        Ok(report)
    }

    /// Create the indexes for the tables the target reports.
    pub async fn create_indexes(&self) -> anyhow::Result<IndexReport> {
        let live = self
            .client
            .table_column_types()
            .await
            .context("Failed to read column types from the target")?;
        let statements = self.translator.plan_indexes(&live);
        debug!("Planned {} indexes", statements.len());

        let report = create_indexes(self.client, &statements)
            .await
            .context("Failed to create indexes")?;
        info!(
            "Indexes: {} created, {} already present",
            report.created.len(),
            report.existing.len()
        );
        Ok(report)
    }

    /// Render the selected data files and load their entries.
    pub async fn load_data(&self, plan: &DataPlan) -> anyhow::Result<LoadReport> {
        for group in plan.mapping.unknown_groups(&plan.groups) {
            warn!("Data group '{group}' is not defined in the data mapping");
        }

        let files = plan.mapping.files(&plan.groups);
        let rendered = render_files(
            files.as_slice(),
            &plan.templates_dir,
            &plan.render_dir,
            &plan.context,
        )
        .await
        .context("Failed to render data files")?;

        self.load_files(rendered.as_slice()).await
    }

    /// Load entries from already rendered LDIF files, in order.
    pub async fn load_files<P: AsRef<Path>>(&self, files: &[P]) -> anyhow::Result<LoadReport> {
        let transformer = self.translator.transformer();
        let mut report = LoadReport::default();

        for path in files {
            let path = path.as_ref();
            info!("Loading {}", path.display());
            let content = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;

            for entry in LdifReader::new(content.as_slice()) {
                let entry =
                    entry.with_context(|| format!("Failed to parse {}", path.display()))?;
                let row = transformer.transform_entry(&entry).with_context(|| {
                    format!("Failed to transform '{}' from {}", entry.dn.as_str(), path.display())
                })?;

                match row {
                    Some(row) => {
                        self.client.insert_row(&row).await.with_context(|| {
                            format!("Failed to insert '{}' into {}", entry.dn.as_str(), row.table())
                        })?;
                        report.rows += 1;
                    }
                    None => report.skipped += 1,
                }
            }
            report.files += 1;
        }

        info!(
            "Data: {} rows from {} files, {} container entries skipped",
            report.rows, report.files, report.skipped
        );
        Ok(report)
    }

    /// Run every enabled phase.
    pub async fn run(&self, options: &BootstrapOptions) -> anyhow::Result<BootstrapReport> {
        let mut report = BootstrapReport::default();

        if options.skip_initialized {
            if let Some(marker) = &options.marker {
                if self.is_initialized(marker).await? {
                    info!(
                        "Target already initialized ({} exists in {}), skipping",
                        marker.id, marker.table
                    );
                    report.already_initialized = true;
                    return Ok(report);
                }
            }
        }

        if !options.skip_tables {
            report.tables = Some(self.create_tables().await?);
        }
        if !options.skip_indexes {
            report.indexes = Some(self.create_indexes().await?);
        }
        match &options.data {
            Some(plan) => report.load = Some(self.load_data(plan).await?),
            None => info!("No data files configured, skipping data load"),
        }

        Ok(report)
    }
}
