use indicatif::ProgressBar;
use tracing::{debug, info};

use crate::database::repo::PixivDatabase;
use crate::error::{ReconcileError, Result};
use crate::pipeline::executor::{Sleeper, UpdateExecutor};
use crate::pipeline::resolver::{MetadataResolver, Resolution};
use crate::pipeline::results::{Outcome, RunResult};
use crate::remote::ArchiveService;

/// Copies PixivUtil2 metadata onto every untagged archive, one at a time.
///
/// Any fatal error stops the whole run; archives already updated stay
/// updated but no ledger is returned for the partial run.
pub struct ReconciliationPipeline<'a, S: ArchiveService, Z: Sleeper> {
    service: &'a S,
    resolver: MetadataResolver<'a>,
    db: &'a PixivDatabase,
    executor: UpdateExecutor<'a, S, Z>,
    progress: ProgressBar,
}

impl<'a, S: ArchiveService, Z: Sleeper> ReconciliationPipeline<'a, S, Z> {
    pub fn new(service: &'a S, db: &'a PixivDatabase, sleeper: Z, max_retries: u32) -> Self {
        Self {
            service,
            resolver: MetadataResolver::new(db),
            db,
            executor: UpdateExecutor::new(service, sleeper, max_retries),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(&mut self) -> Result<RunResult> {
        self.check_preconditions()?;

        info!("Getting untagged archives...");
        let arcids = self.service.list_untagged_archive_ids()?;
        info!("Found {} untagged archives", arcids.len());
        self.progress.set_length(arcids.len() as u64);

        let mut result = RunResult::default();
        for arcid in &arcids {
            let outcome = match self.process(arcid) {
                Ok(outcome) => outcome,
                Err(err) => {
                    self.progress.abandon();
                    return Err(err);
                }
            };
            result.record(outcome, arcid);
            info!("[{}] update status: {}", arcid, outcome.as_str());
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        Ok(result)
    }

    fn check_preconditions(&self) -> Result<()> {
        self.service.check_session().map_err(|err| {
            ReconcileError::Precondition(format!("Failed to confirm API key validity: {err}"))
        })?;

        let missing = self.db.missing_tables()?;
        if !missing.is_empty() {
            return Err(ReconcileError::Precondition(format!(
                "Required table does not exist: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    fn process(&mut self, arcid: &str) -> Result<Outcome> {
        let archive = self.service.get_metadata(arcid)?;
        match self.resolver.resolve(arcid, &archive.tags, &archive.filename)? {
            Resolution::NoMetadata { image_id } => {
                debug!("[{}] no PixivUtil2 row for image {}", arcid, image_id);
                Ok(Outcome::NoMetadata)
            }
            Resolution::Resolved(metadata) => {
                debug!(
                    "[{}] replacing title {:?} and summary {:?} from pixiv image {}",
                    arcid, archive.title, archive.summary, metadata.image_id
                );
                let applied = self.executor.apply(arcid, &metadata)?;
                if applied.attempts > 1 {
                    info!("[{}] applied after {} attempts", arcid, applied.attempts);
                }
                Ok(Outcome::Success)
            }
        }
    }
}
