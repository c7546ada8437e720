//! Upload queue with a simulated progress lifecycle.
//!
//! A single clock calls [`UploadQueue::tick`] for the whole queue. Each
//! active item carries the instant of its next progress step; ticks only visit
//! identifiers present in the active set, so removing an item guarantees it is
//! never updated again. Finished and rejected items are evicted by the same
//! clock once they are [`FINISHED_ITEM_TTL`] old, together with the
//! notifications of owners left without items.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;

use crate::domain::document::human_size;
use crate::domain::upload::{
    BatchError, FileDescriptor, IntakeError, Notification, UploadId, UploadItemView, UploadState,
    validate_batch, validate_file,
};

/// Smallest progress increment, in percent.
pub const MIN_STEP: u8 = 5;
/// Largest progress increment, in percent.
pub const MAX_STEP: u8 = 20;
/// Shortest pause between two steps of the same item.
pub const MIN_STEP_DELAY: Duration = Duration::from_millis(200);
/// Longest pause between two steps of the same item.
pub const MAX_STEP_DELAY: Duration = Duration::from_millis(500);
/// How long a done or rejected item stays visible before eviction.
pub const FINISHED_ITEM_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug)]
struct UploadItem {
    id: UploadId,
    owner: String,
    file: FileDescriptor,
    /// Descriptor captured at intake, compared with `file` on completion.
    received: FileDescriptor,
    state: UploadState,
    progress: u8,
    next_step_at: Instant,
}

impl UploadItem {
    fn view(&self) -> UploadItemView {
        UploadItemView {
            id: self.id.clone(),
            file: self.file.clone(),
            display_size: human_size(self.file.size),
            state: self.state.clone(),
            progress: self.progress,
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    next_seq: u64,
    /// Items keyed by intake sequence, so iteration keeps intake order.
    items: BTreeMap<u64, UploadItem>,
    index: HashMap<UploadId, u64>,
    active: HashSet<UploadId>,
    /// Terminal items in the order they finished.
    finished: VecDeque<(Instant, UploadId)>,
    owner_items: HashMap<String, usize>,
    notifications: HashMap<String, VecDeque<Notification>>,
}

impl QueueState {
    fn insert(&mut self, item: UploadItem) {
        let seq = self.next_seq;
        self.next_seq += 1;
        *self.owner_items.entry(item.owner.clone()).or_default() += 1;
        self.index.insert(item.id.clone(), seq);
        self.items.insert(seq, item);
    }

    fn take(&mut self, id: &UploadId) -> Option<UploadItem> {
        let seq = self.index.remove(id)?;
        self.active.remove(id);
        let item = self.items.remove(&seq)?;
        if let Some(count) = self.owner_items.get_mut(&item.owner) {
            *count -= 1;
            if *count == 0 {
                self.owner_items.remove(&item.owner);
            }
        }
        Some(item)
    }

    fn owned_by<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a UploadItem> + 'a {
        self.items.values().filter(move |item| item.owner == owner)
    }

    fn evict_finished(&mut self, now: Instant) -> usize {
        let mut evicted = 0;
        while let Some((finished_at, _)) = self.finished.front() {
            if now.saturating_duration_since(*finished_at) < FINISHED_ITEM_TTL {
                break;
            }
            let Some((_, id)) = self.finished.pop_front() else {
                break;
            };
            // Already gone when removed by hand.
            let Some(item) = self.take(&id) else {
                continue;
            };
            evicted += 1;
            if !self.owner_items.contains_key(&item.owner) {
                self.notifications.remove(&item.owner);
            }
        }
        evicted
    }
}

/// Outcome of a batch that passed the batch-level check.
#[derive(Debug, Default)]
pub struct IntakeReport {
    pub accepted: Vec<UploadId>,
    pub rejected: Vec<IntakeError>,
}

/// Upload items of every signed-in user, keyed by owner.
#[derive(Debug, Default)]
pub struct UploadQueue {
    state: Mutex<QueueState>,
}

fn step_delay<R: Rng>(rng: &mut R) -> Duration {
    rng.random_range(MIN_STEP_DELAY..=MAX_STEP_DELAY)
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a selection and enqueues its files for `owner`.
    ///
    /// Oversized batches are refused before any file is looked at. Files that
    /// fail validation stay visible as rejected items until removed or evicted.
    pub fn intake<R: Rng>(
        &self,
        owner: &str,
        files: Vec<FileDescriptor>,
        now: Instant,
        rng: &mut R,
    ) -> Result<IntakeReport, BatchError> {
        if let Err(err) = validate_batch(&files) {
            log::warn!("Rejected upload batch from {owner}: {err}");
            return Err(err);
        }

        let mut report = IntakeReport::default();
        let mut state = self.state.lock();

        for file in files {
            let id = UploadId::generate(Utc::now().timestamp_millis(), rng);
            let (item_state, next_step_at) = match validate_file(&file) {
                Ok(()) => {
                    state.active.insert(id.clone());
                    report.accepted.push(id.clone());
                    (UploadState::Queued, now + step_delay(rng))
                }
                Err(err) => {
                    log::info!("Rejected upload {}: {err}", file.name);
                    let reason = err.to_string();
                    report.rejected.push(err);
                    state.finished.push_back((now, id.clone()));
                    (UploadState::Rejected { reason }, now)
                }
            };

            state.insert(UploadItem {
                id,
                owner: owner.to_string(),
                received: file.clone(),
                file,
                state: item_state,
                progress: 0,
                next_step_at,
            });
        }

        Ok(report)
    }

    /// Advances every active item whose next step is due, then evicts expired
    /// finished items. Returns the number of items advanced.
    pub fn tick<R: Rng>(&self, now: Instant, rng: &mut R) -> usize {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let mut due: Vec<u64> = state
            .active
            .iter()
            .filter_map(|id| state.index.get(id).copied())
            .filter(|seq| {
                state
                    .items
                    .get(seq)
                    .is_some_and(|item| now >= item.next_step_at)
            })
            .collect();
        due.sort_unstable();

        let mut advanced = 0;
        for seq in due {
            let Some(item) = state.items.get_mut(&seq) else {
                continue;
            };

            let step = rng.random_range(MIN_STEP..=MAX_STEP);
            item.progress = item.progress.saturating_add(step).min(100);
            advanced += 1;

            if item.progress < 100 {
                item.state = UploadState::Uploading;
                item.next_step_at = now + step_delay(rng);
                continue;
            }

            item.state = UploadState::Done;
            state.active.remove(&item.id);
            state.finished.push_back((now, item.id.clone()));

            if item.file == item.received {
                log::info!(
                    "Upload {} complete, integrity check passed ({}, {} bytes, {})",
                    item.id,
                    item.file.name,
                    item.file.size,
                    item.file.mime_type
                );
            } else {
                log::warn!("Upload {} complete, integrity check failed", item.id);
            }

            state
                .notifications
                .entry(item.owner.clone())
                .or_default()
                .push_back(Notification::success(format!(
                    "{} uploaded successfully.",
                    item.file.name
                )));
        }

        let evicted = state.evict_finished(now);
        if evicted > 0 {
            log::debug!("Evicted {evicted} finished upload(s)");
        }

        advanced
    }

    /// Drops an item of `owner` from the queue, whatever its state.
    pub fn remove(&self, owner: &str, id: &UploadId) -> bool {
        let mut state = self.state.lock();
        let owned = state
            .index
            .get(id)
            .and_then(|seq| state.items.get(seq))
            .is_some_and(|item| item.owner == owner);
        if !owned {
            return false;
        }
        state.take(id);
        log::debug!("Removed upload {id}");
        true
    }

    /// Forgets everything belonging to `owner`, used when the session ends.
    pub fn discard_owner(&self, owner: &str) {
        let mut state = self.state.lock();
        let ids: Vec<UploadId> = state.owned_by(owner).map(|item| item.id.clone()).collect();
        for id in &ids {
            state.take(id);
        }
        state.notifications.remove(owner);
    }

    /// Snapshot of `owner`'s items in intake order.
    pub fn items(&self, owner: &str) -> Vec<UploadItemView> {
        self.state
            .lock()
            .owned_by(owner)
            .map(UploadItem::view)
            .collect()
    }

    /// Whether `owner` has items still waiting for progress.
    pub fn has_active(&self, owner: &str) -> bool {
        let state = self.state.lock();
        state
            .active
            .iter()
            .filter_map(|id| state.index.get(id).and_then(|seq| state.items.get(seq)))
            .any(|item| item.owner == owner)
    }

    /// Takes the pending notifications of `owner`.
    pub fn drain_notifications(&self, owner: &str) -> Vec<Notification> {
        self.state
            .lock()
            .notifications
            .remove(owner)
            .map(Vec::from)
            .unwrap_or_default()
    }
}
