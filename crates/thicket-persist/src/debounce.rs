use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::repository::SnapshotRepository;

/// Writes one snapshot through the repository. Returns `false` on failure.
pub type SaveFn<T> = fn(&SnapshotRepository, &T) -> bool;

/// Timer-reset scheduler for snapshot writes.
///
/// Every [`observe`](Self::observe) replaces the latest snapshot, cancels the
/// pending timer and arms a new one. When a timer fires, whatever snapshot is
/// latest at that moment is written. A burst of changes inside the quiet
/// window therefore costs exactly one write.
///
/// The writer holds at most one pending timer. Dropping it flushes.
pub struct DebouncedWriter<T: Send + Sync + 'static> {
    name: &'static str,
    repo: Arc<SnapshotRepository>,
    save: SaveFn<T>,
    delay: Duration,
    latest: Arc<Mutex<Option<Arc<T>>>>,
    pending: Option<JoinHandle<()>>,
    skip_next: bool,
}

impl<T: Send + Sync + 'static> DebouncedWriter<T> {
    pub fn new(
        name: &'static str,
        repo: Arc<SnapshotRepository>,
        save: SaveFn<T>,
        delay: Duration,
    ) -> Self {
        Self {
            name,
            repo,
            save,
            delay,
            latest: Arc::new(Mutex::new(None)),
            pending: None,
            skip_next: false,
        }
    }

    /// A writer whose first observed snapshot came from storage and is
    /// not written back.
    pub fn hydrated(
        name: &'static str,
        repo: Arc<SnapshotRepository>,
        save: SaveFn<T>,
        delay: Duration,
    ) -> Self {
        let mut writer = Self::new(name, repo, save, delay);
        writer.skip_next = true;
        writer
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record `snapshot` as the latest and restart the quiet window.
    pub fn observe(&mut self, snapshot: Arc<T>) {
        if std::mem::take(&mut self.skip_next) {
            trace!(writer = self.name, "skipping hydrated snapshot");
            return;
        }

        self.cancel_pending();
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);

        let Ok(handle) = Handle::try_current() else {
            debug!(writer = self.name, "no runtime, writing immediately");
            write_latest(self.name, &self.repo, self.save, &self.latest);
            return;
        };

        let name = self.name;
        let repo = Arc::clone(&self.repo);
        let save = self.save;
        let latest = Arc::clone(&self.latest);
        let delay = self.delay;
        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            write_latest(name, &repo, save, &latest);
        }));
        trace!(writer = self.name, delay_ms = delay.as_millis() as u64, "write scheduled");
    }

    /// Whether a snapshot is waiting to be written.
    pub fn is_pending(&self) -> bool {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Cancel the timer and write any pending snapshot now.
    ///
    /// Returns `true` if a snapshot was written.
    pub fn flush(&mut self) -> bool {
        self.cancel_pending();
        write_latest(self.name, &self.repo, self.save, &self.latest)
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T: Send + Sync + 'static> Drop for DebouncedWriter<T> {
    fn drop(&mut self) {
        self.flush();
    }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for DebouncedWriter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedWriter")
            .field("name", &self.name)
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

// The lock is held across the save so a concurrent flush waits for an
// in-flight write instead of racing it.
fn write_latest<T>(
    name: &str,
    repo: &SnapshotRepository,
    save: SaveFn<T>,
    latest: &Mutex<Option<Arc<T>>>,
) -> bool {
    let mut slot = latest.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(snapshot) = slot.take() else {
        return false;
    };
    let saved = save(repo, &snapshot);
    trace!(writer = name, saved, "debounced write");
    saved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageKeys;
    use crate::memory::InMemorySnapshotStore;
    use thicket_types::{CommentId, CommentNode, CommentsState, Timestamp};

    const DELAY: Duration = Duration::from_millis(300);

    fn setup() -> (Arc<InMemorySnapshotStore>, Arc<SnapshotRepository>) {
        let store = Arc::new(InMemorySnapshotStore::new());
        let repo = Arc::new(SnapshotRepository::new(
            store.clone(),
            StorageKeys::default(),
        ));
        (store, repo)
    }

    fn writer(repo: &Arc<SnapshotRepository>) -> DebouncedWriter<CommentsState> {
        DebouncedWriter::new(
            "comments",
            Arc::clone(repo),
            SnapshotRepository::save_comments,
            DELAY,
        )
    }

    fn state_with(texts: &[&str]) -> Arc<CommentsState> {
        let mut state = CommentsState::empty();
        for (i, text) in texts.iter().enumerate() {
            let id = CommentId::from(format!("c{i}"));
            let node = CommentNode::new(id.clone(), None, *text, Timestamp::from_millis(i as u64));
            state.by_id.insert(id.clone(), node);
            state.root_ids.push(id);
        }
        Arc::new(state)
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_written_before_quiet_window() {
        let (store, repo) = setup();
        let mut w = writer(&repo);
        w.observe(state_with(&["a"]));

        sleep_ms(299).await;
        assert_eq!(store.write_count(), 0);
        assert!(w.is_pending());

        sleep_ms(2).await;
        assert_eq!(store.write_count(), 1);
        assert!(!w.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_one_write_of_latest() {
        let (store, repo) = setup();
        let mut w = writer(&repo);
        w.observe(state_with(&["a"]));
        sleep_ms(100).await;
        w.observe(state_with(&["a", "b"]));
        sleep_ms(100).await;
        w.observe(state_with(&["a", "b", "c"]));

        // 400ms after the first change, but only 200ms after the last.
        sleep_ms(200).await;
        assert_eq!(store.write_count(), 0);

        sleep_ms(150).await;
        assert_eq!(store.write_count(), 1);
        let loaded = repo.load_comments().unwrap();
        assert_eq!(loaded.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn separated_changes_write_separately() {
        let (store, repo) = setup();
        let mut w = writer(&repo);
        w.observe(state_with(&["a"]));
        sleep_ms(400).await;
        w.observe(state_with(&["a", "b"]));
        sleep_ms(400).await;
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hydrated_writer_skips_first_snapshot() {
        let (store, repo) = setup();
        let mut w = DebouncedWriter::hydrated(
            "comments",
            Arc::clone(&repo),
            SnapshotRepository::save_comments,
            DELAY,
        );
        w.observe(state_with(&["loaded"]));
        assert!(!w.is_pending());
        sleep_ms(500).await;
        assert_eq!(store.write_count(), 0);

        w.observe(state_with(&["loaded", "new"]));
        sleep_ms(500).await;
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_now_and_cancels_timer() {
        let (store, repo) = setup();
        let mut w = writer(&repo);
        w.observe(state_with(&["a"]));
        assert!(w.flush());
        assert_eq!(store.write_count(), 1);

        sleep_ms(500).await;
        assert_eq!(store.write_count(), 1);
        assert!(!w.flush());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_flushes_pending_snapshot() {
        let (store, repo) = setup();
        let mut w = writer(&repo);
        w.observe(state_with(&["a"]));
        drop(w);
        assert_eq!(store.write_count(), 1);
        assert_eq!(repo.load_comments().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_is_dropped() {
        let (store, repo) = setup();
        store.set_fail_writes(true);
        let mut w = writer(&repo);
        w.observe(state_with(&["a"]));
        sleep_ms(400).await;
        assert!(!w.is_pending());
        assert!(store.is_empty());
    }

    #[test]
    fn without_runtime_writes_immediately() {
        let (store, repo) = setup();
        let mut w = writer(&repo);
        w.observe(state_with(&["a"]));
        assert_eq!(store.write_count(), 1);
        assert!(!w.is_pending());
    }
}
