//! Staged migration of legacy records

use crate::strategy::{LegacyFlatStrategy, MigrationStrategy};
use crate::{LegacyRecord, MigrationError, MigrationFailure, MigrationReport, MigratorConfig};
use folio_domain::traits::RecordSink;
use folio_domain::UnifiedRecord;
use folio_gatekeeper::{Gatekeeper, GatekeeperConfig};
use tracing::{debug, info, warn};

/// Migration Adapter: legacy flat records into unified records
///
/// Each record runs through the same stages: check preconditions,
/// prepare a draft, execute (assemble through the gatekeeper), verify
/// against the legacy source, then finalize by persisting. A record
/// that fails any stage is rolled back: nothing of it reaches the sink.
///
/// # Examples
///
/// ```
/// use folio_migrator::{LegacyRecord, Migrator};
/// use folio_domain::{RecordSink, UnifiedRecord};
///
/// struct Discard;
/// impl RecordSink for Discard {
///     type Error = String;
///     fn persist(&mut self, _record: &UnifiedRecord) -> Result<(), String> { Ok(()) }
/// }
///
/// let legacy = LegacyRecord::from_json(r#"{
///     "source_url": "https://www.marxists.org/archive/marx/works/1867-c1/index.htm",
///     "title": "Capital", "author": "Karl Marx", "date": "1867",
///     "content_hash": "0123456789abcdef"
/// }"#).unwrap();
///
/// let report = Migrator::default_config().migrate_batch(&[legacy], &mut Discard);
/// assert_eq!(report.succeeded, 1);
/// ```
pub struct Migrator<S = LegacyFlatStrategy> {
    config: MigratorConfig,
    gatekeeper: Gatekeeper,
    strategy: S,
}

impl Migrator {
    /// Create a Migrator for the flat legacy format
    pub fn new(config: MigratorConfig) -> Self {
        Self::with_strategy(config, LegacyFlatStrategy)
    }

    /// Create a Migrator with default configuration
    pub fn default_config() -> Self {
        Self::new(MigratorConfig::default())
    }
}

impl<S: MigrationStrategy> Migrator<S> {
    /// Create a Migrator with custom prepare and verify stages
    pub fn with_strategy(config: MigratorConfig, strategy: S) -> Self {
        Self {
            config,
            gatekeeper: Gatekeeper::new(GatekeeperConfig::migration()),
            strategy,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Migrate one legacy record
    ///
    /// In dry-run mode the finalize stage logs instead of persisting.
    ///
    /// # Errors
    /// [`MigrationError`] naming the stage that failed; the sink is
    /// untouched unless finalize itself fails.
    pub fn migrate_one<K>(&self, legacy: &LegacyRecord, sink: &mut K) -> Result<UnifiedRecord, MigrationError>
    where
        K: RecordSink,
        K::Error: std::fmt::Display,
    {
        let missing = legacy.missing_required();
        if !missing.is_empty() {
            return Err(MigrationError::MissingRequired(missing));
        }

        let draft = self.strategy.prepare(legacy, &self.config);
        let record = self.gatekeeper.assemble(draft)?;

        self.strategy
            .verify(legacy, &record, &self.config)
            .map_err(MigrationError::Verification)?;

        if self.config.dry_run {
            info!("DRY RUN: Would persist {}", record.locator());
        } else {
            sink.persist(&record)
                .map_err(|e| MigrationError::Sink(e.to_string()))?;
            debug!("Migrated {}", record.locator());
        }
        Ok(record)
    }

    /// Migrate a whole batch
    pub fn migrate_batch<K>(&self, records: &[LegacyRecord], sink: &mut K) -> MigrationReport
    where
        K: RecordSink,
        K::Error: std::fmt::Display,
    {
        self.migrate_batch_from(records, 0, sink)
    }

    /// Migrate a batch starting at `start`
    ///
    /// A failed record never stops the batch. At most `batch_limit`
    /// records are handled per call; the report's `resume_index` is
    /// where the next call should start.
    pub fn migrate_batch_from<K>(&self, records: &[LegacyRecord], start: usize, sink: &mut K) -> MigrationReport
    where
        K: RecordSink,
        K::Error: std::fmt::Display,
    {
        let start = start.min(records.len());
        let end = self
            .config
            .batch_limit
            .map_or(records.len(), |limit| start.saturating_add(limit).min(records.len()));
        info!("Migrating legacy records {}..{} of {}", start, end, records.len());

        let mut report = MigrationReport::new(start, self.config.dry_run);
        for (index, legacy) in records.iter().enumerate().take(end).skip(start) {
            match self.migrate_one(legacy, sink) {
                Ok(_) => report.record_success(),
                Err(err) => {
                    warn!("Rolled back legacy record {} at {}: {}", index, err.stage(), err);
                    report.record_failure(MigrationFailure {
                        index,
                        locator: legacy.source_url.clone(),
                        stage: err.stage(),
                        error: err.to_string(),
                    });
                }
            }
            report.resume_index = index + 1;
        }

        info!(
            "Migration batch finished: {} succeeded, {} failed",
            report.succeeded, report.failed
        );
        report
    }
}
