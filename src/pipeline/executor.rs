use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ReconcileError, RemoteError, Result};
use crate::pipeline::resolver::ResolvedMetadata;
use crate::remote::ArchiveService;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Blocks the run between update attempts.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Delay before retry number `retry_count + 1`: 2, 4, 8, 16... seconds.
pub fn backoff_delay(retry_count: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(retry_count.saturating_add(1)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    Locked,
    Network,
}

/// Result of a single update attempt.
#[derive(Debug)]
enum AttemptOutcome {
    Applied,
    Retryable(RetryReason, String),
    Fatal(ReconcileError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub attempts: u32,
}

pub struct UpdateExecutor<'a, S: ArchiveService, Z: Sleeper> {
    service: &'a S,
    sleeper: Z,
    max_retries: u32,
}

impl<'a, S: ArchiveService, Z: Sleeper> UpdateExecutor<'a, S, Z> {
    pub fn new(service: &'a S, sleeper: Z, max_retries: u32) -> Self {
        Self {
            service,
            sleeper,
            max_retries,
        }
    }

    /// Pushes resolved metadata to the server, retrying lock and network
    /// failures with exponential backoff.
    pub fn apply(&mut self, arcid: &str, metadata: &ResolvedMetadata) -> Result<Applied> {
        let tags = metadata.tags.to_tag_string();
        let mut retry_count = 0u32;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let outcome = self.attempt(arcid, &metadata.title, &tags, &metadata.summary);
            match outcome {
                AttemptOutcome::Applied => {
                    debug!("[{}] metadata applied after {} attempt(s)", arcid, attempts);
                    return Ok(Applied { attempts });
                }
                AttemptOutcome::Retryable(reason, message) if retry_count <= self.max_retries => {
                    let delay = backoff_delay(retry_count);
                    warn!(
                        "[{}] {:?} failure on attempt {} ({}), retrying in {}s",
                        arcid,
                        reason,
                        attempts,
                        message,
                        delay.as_secs()
                    );
                    self.sleeper.sleep(delay);
                    retry_count += 1;
                }
                AttemptOutcome::Retryable(RetryReason::Locked, message) => {
                    return Err(ReconcileError::PersistentLock {
                        arcid: arcid.to_string(),
                        message,
                    });
                }
                AttemptOutcome::Retryable(RetryReason::Network, message) => {
                    return Err(ReconcileError::PersistentNetwork {
                        arcid: arcid.to_string(),
                        message,
                    });
                }
                AttemptOutcome::Fatal(err) => return Err(err),
            }
        }
    }

    fn attempt(&self, arcid: &str, title: &str, tags: &str, summary: &str) -> AttemptOutcome {
        match self.service.update_metadata(arcid, title, tags, summary) {
            Ok(()) => AttemptOutcome::Applied,
            Err(err) if err.is_locked() => {
                AttemptOutcome::Retryable(RetryReason::Locked, err.message().to_string())
            }
            Err(err) if err.is_transient_transport() => {
                AttemptOutcome::Retryable(RetryReason::Network, err.message().to_string())
            }
            Err(RemoteError::Status { status, message }) => {
                AttemptOutcome::Fatal(ReconcileError::RemoteRejected {
                    arcid: arcid.to_string(),
                    status,
                    message,
                })
            }
            Err(err) => AttemptOutcome::Fatal(ReconcileError::Remote(err)),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;

    use super::Sleeper;
    use crate::error::RemoteError;
    use crate::remote::{ArchiveMetadata, ArchiveService, RemoteResult};

    #[derive(Default)]
    pub struct RecordingSleeper {
        pub slept: Vec<Duration>,
    }

    impl Sleeper for &mut RecordingSleeper {
        fn sleep(&mut self, duration: Duration) {
            self.slept.push(duration);
        }
    }

    pub fn locked() -> RemoteError {
        RemoteError::Status {
            status: RemoteError::LOCKED,
            message: "Locked resource".to_string(),
        }
    }

    pub fn timed_out() -> RemoteError {
        RemoteError::Transport {
            message: "timed out reading response".to_string(),
            transient: true,
        }
    }

    /// In-memory archive server with scripted update responses.
    #[derive(Default)]
    pub struct FakeArchiveService {
        pub session: Option<RemoteError>,
        pub untagged: Vec<String>,
        pub archives: HashMap<String, ArchiveMetadata>,
        pub update_script: RefCell<VecDeque<RemoteResult<()>>>,
        pub updates: RefCell<Vec<(String, String, String, String)>>,
    }

    impl FakeArchiveService {
        pub fn with_archive(mut self, arcid: &str, filename: &str, tags: &str) -> Self {
            self.untagged.push(arcid.to_string());
            self.archives.insert(
                arcid.to_string(),
                ArchiveMetadata {
                    filename: filename.to_string(),
                    tags: tags.to_string(),
                    title: filename.to_string(),
                    summary: String::new(),
                },
            );
            self
        }

        pub fn script_updates(self, responses: impl IntoIterator<Item = RemoteResult<()>>) -> Self {
            self.update_script.borrow_mut().extend(responses);
            self
        }

        pub fn update_count(&self) -> usize {
            self.updates.borrow().len()
        }
    }

    impl ArchiveService for FakeArchiveService {
        fn check_session(&self) -> RemoteResult<()> {
            match &self.session {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn list_untagged_archive_ids(&self) -> RemoteResult<Vec<String>> {
            Ok(self.untagged.clone())
        }

        fn get_metadata(&self, arcid: &str) -> RemoteResult<ArchiveMetadata> {
            self.archives
                .get(arcid)
                .cloned()
                .ok_or_else(|| RemoteError::Status {
                    status: 400,
                    message: format!("No archive with ID {arcid}"),
                })
        }

        fn update_metadata(&self, arcid: &str, title: &str, tags: &str, summary: &str) -> RemoteResult<()> {
            self.updates.borrow_mut().push((
                arcid.to_string(),
                title.to_string(),
                tags.to_string(),
                summary.to_string(),
            ));
            self.update_script.borrow_mut().pop_front().unwrap_or(Ok(()))
        }
    }
}
