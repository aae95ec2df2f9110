use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use thicket_ledger::VoteLedger;
use thicket_persist::{
    DebouncedWriter, FileSnapshotStore, PersistConfig, SnapshotRepository, SnapshotStore,
};
use thicket_store::{Clock, Reducer, SystemClock};
use thicket_types::{CommentId, CommentsState, Vote};

use crate::error::{BoardError, BoardResult};

/// High-level comment board API.
///
/// Owns the current tree snapshot, the local actor's vote ledger and the
/// two debounced writers that keep them durable. Construct it with
/// [`open`](Self::open) and finish with [`close`](Self::close); dropping the
/// board also flushes.
pub struct CommentBoard<C: Clock = SystemClock> {
    reducer: Reducer<C>,
    state: Arc<CommentsState>,
    votes: Arc<VoteLedger>,
    comments_writer: DebouncedWriter<CommentsState>,
    votes_writer: DebouncedWriter<VoteLedger>,
}

impl CommentBoard<SystemClock> {
    /// Open a board over `store`, hydrating from any saved snapshots.
    pub fn open(store: Arc<dyn SnapshotStore>, config: &PersistConfig) -> Self {
        Self::open_with_clock(store, config, SystemClock::new())
    }

    /// Open a board backed by JSON files in `dir`.
    pub fn open_dir(dir: impl AsRef<Path>, config: &PersistConfig) -> BoardResult<Self> {
        let store = FileSnapshotStore::open(dir)?;
        Ok(Self::open(Arc::new(store), config))
    }
}

impl<C: Clock> CommentBoard<C> {
    pub fn open_with_clock(
        store: Arc<dyn SnapshotStore>,
        config: &PersistConfig,
        clock: C,
    ) -> Self {
        let repo = Arc::new(SnapshotRepository::new(store, config.keys()));
        let delay = config.debounce();

        // The opening snapshots are never written back. Stored bytes, even
        // ones that failed to load, stay untouched until a real change.
        let state = Arc::new(repo.load_comments().unwrap_or_default());
        let votes = Arc::new(repo.load_votes().unwrap_or_default());

        let mut comments_writer = DebouncedWriter::hydrated(
            "comments",
            Arc::clone(&repo),
            SnapshotRepository::save_comments,
            delay,
        );
        let mut votes_writer = DebouncedWriter::hydrated(
            "user_votes",
            Arc::clone(&repo),
            SnapshotRepository::save_votes,
            delay,
        );
        comments_writer.observe(Arc::clone(&state));
        votes_writer.observe(Arc::clone(&votes));

        info!(
            namespace = %config.namespace,
            total_comments = state.len(),
            total_votes = votes.len(),
            "comment board opened"
        );

        Self {
            reducer: Reducer::with_clock(clock),
            state,
            votes,
            comments_writer,
            votes_writer,
        }
    }

    // ---- Reads ----

    /// The current tree snapshot.
    pub fn state(&self) -> &Arc<CommentsState> {
        &self.state
    }

    pub fn votes(&self) -> &VoteLedger {
        &self.votes
    }

    /// The local actor's vote on `id`.
    pub fn vote_for(&self, id: &CommentId) -> Vote {
        self.votes.get_vote(id)
    }

    /// Find a comment by full id or by a unique id prefix.
    pub fn resolve(&self, prefix: &str) -> BoardResult<CommentId> {
        if let Some(node) = self.state.by_id.get(prefix) {
            return Ok(node.id.clone());
        }
        if prefix.is_empty() {
            return Err(BoardError::NotFound(prefix.to_string()));
        }

        let mut matches = self
            .state
            .by_id
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(id, _)| id)
            .take_while(|id| id.as_str().starts_with(prefix));
        match (matches.next(), matches.count()) {
            (None, _) => Err(BoardError::NotFound(prefix.to_string())),
            (Some(id), 0) => Ok(id.clone()),
            (Some(_), rest) => Err(BoardError::Ambiguous {
                prefix: prefix.to_string(),
                matches: rest + 1,
            }),
        }
    }

    // ---- Transitions ----

    /// Post a top-level comment.
    pub fn add_comment(&mut self, text: impl Into<String>) -> Option<CommentId> {
        let (next, created) = self.reducer.add_comment(&self.state, None, text);
        self.commit(next);
        created
    }

    /// Reply under `parent`. `None` if the parent does not exist.
    pub fn reply(&mut self, parent: &CommentId, text: impl Into<String>) -> Option<CommentId> {
        let (next, created) = self.reducer.add_comment(&self.state, Some(parent), text);
        self.commit(next);
        created
    }

    /// Returns `true` if the comment existed.
    pub fn edit_comment(&mut self, id: &CommentId, text: impl Into<String>) -> bool {
        let next = self.reducer.edit_comment(&self.state, id, text);
        self.commit(next)
    }

    /// Delete `id` and all its replies. Returns `true` if the comment existed.
    ///
    /// Votes the actor cast inside the subtree stay in the ledger; see
    /// [`prune_votes`](Self::prune_votes).
    pub fn delete_comment(&mut self, id: &CommentId) -> bool {
        let next = self.reducer.delete_comment(&self.state, id);
        self.commit(next)
    }

    pub fn toggle_collapse(&mut self, id: &CommentId) -> bool {
        let next = self.reducer.toggle_collapse(&self.state, id);
        self.commit(next)
    }

    /// Like `id`, or retract an existing like. Returns the actor's new vote,
    /// or `None` if the comment does not exist.
    pub fn like(&mut self, id: &CommentId) -> Option<Vote> {
        let previous = self.votes.get_vote(id);
        let next = self.reducer.like_comment(&self.state, id, previous);
        self.cast(id, next, previous.after_like())
    }

    /// Dislike `id`, or retract an existing dislike.
    pub fn dislike(&mut self, id: &CommentId) -> Option<Vote> {
        let previous = self.votes.get_vote(id);
        let next = self.reducer.dislike_comment(&self.state, id, previous);
        self.cast(id, next, previous.after_dislike())
    }

    /// Replace the tree with the empty tree. The vote ledger is untouched.
    pub fn clear_all(&mut self) {
        let next = self.reducer.clear_all();
        self.commit(next);
    }

    /// Drop ledger entries for comments that no longer exist. Returns how
    /// many were removed.
    pub fn prune_votes(&mut self) -> usize {
        if self.votes.iter().all(|(id, _)| self.state.contains(id)) {
            return 0;
        }
        let removed = Arc::make_mut(&mut self.votes).retain_known(&self.state);
        self.votes_writer.observe(Arc::clone(&self.votes));
        removed
    }

    // ---- Lifecycle ----

    /// Write any pending snapshots now.
    pub fn flush(&mut self) {
        let comments = self.comments_writer.flush();
        let votes = self.votes_writer.flush();
        debug!(comments, votes, "board flushed");
    }

    /// Flush pending writes and release the board.
    pub fn close(mut self) {
        self.flush();
        info!(total_comments = self.state.len(), "comment board closed");
    }

    fn commit(&mut self, next: Arc<CommentsState>) -> bool {
        if Arc::ptr_eq(&next, &self.state) {
            return false;
        }
        self.state = next;
        self.comments_writer.observe(Arc::clone(&self.state));
        true
    }

    fn cast(&mut self, id: &CommentId, next: Arc<CommentsState>, vote: Vote) -> Option<Vote> {
        if !self.commit(next) {
            return None;
        }
        Arc::make_mut(&mut self.votes).set_vote(id, vote);
        self.votes_writer.observe(Arc::clone(&self.votes));
        debug!(id = %id, vote = %vote, "vote recorded");
        Some(vote)
    }
}

impl<C: Clock> std::fmt::Debug for CommentBoard<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentBoard")
            .field("comments", &self.state.len())
            .field("votes", &self.votes.len())
            .field("comments_writer", &self.comments_writer)
            .field("votes_writer", &self.votes_writer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use thicket_persist::{InMemorySnapshotStore, StorageKeys};
    use thicket_store::{selectors, ManualClock};
    use thicket_types::Timestamp;

    fn store() -> Arc<InMemorySnapshotStore> {
        Arc::new(InMemorySnapshotStore::new())
    }

    fn board(store: &Arc<InMemorySnapshotStore>) -> CommentBoard {
        CommentBoard::open(store.clone(), &PersistConfig::default())
    }

    #[test]
    fn post_reply_and_read_back() {
        let store = store();
        let mut b = board(&store);
        let root = b.add_comment("Hello").unwrap();
        let reply = b.reply(&root, "Hi").unwrap();

        let state = b.state();
        assert_eq!(selectors::total_count(state), 2);
        let children: Vec<_> = selectors::child_comments(state, &root).map(|n| &n.id).collect();
        assert_eq!(children, [&reply]);
    }

    #[test]
    fn reply_to_missing_parent_changes_nothing() {
        let store = store();
        let mut b = board(&store);
        let before = Arc::clone(b.state());
        assert!(b.reply(&CommentId::from("ghost"), "x").is_none());
        assert!(Arc::ptr_eq(&before, b.state()));
    }

    #[test]
    fn like_toggles_and_switches_with_ledger() {
        let store = store();
        let mut b = board(&store);
        let id = b.add_comment("c").unwrap();

        assert_eq!(b.like(&id), Some(Vote::Like));
        assert_eq!(b.vote_for(&id), Vote::Like);
        assert_eq!(b.state().get(&id).unwrap().likes, 1);

        assert_eq!(b.dislike(&id), Some(Vote::Dislike));
        let node = b.state().get(&id).unwrap();
        assert_eq!((node.likes, node.dislikes), (0, 1));

        assert_eq!(b.dislike(&id), Some(Vote::None));
        assert_eq!(b.vote_for(&id), Vote::None);
        assert!(b.votes().is_empty());
        let node = b.state().get(&id).unwrap();
        assert_eq!((node.likes, node.dislikes), (0, 0));
    }

    #[test]
    fn vote_on_missing_comment_leaves_ledger_alone() {
        let store = store();
        let mut b = board(&store);
        assert_eq!(b.like(&CommentId::from("ghost")), None);
        assert!(b.votes().is_empty());
    }

    #[test]
    fn state_survives_reopen() {
        let store = store();
        let (root, reply) = {
            let mut b = board(&store);
            let root = b.add_comment("persist me").unwrap();
            let reply = b.reply(&root, "and me").unwrap();
            b.like(&reply);
            b.toggle_collapse(&root);
            b.close();
            (root, reply)
        };

        let b = board(&store);
        assert_eq!(b.state().len(), 2);
        assert!(b.state().get(&root).unwrap().is_collapsed());
        assert_eq!(b.vote_for(&reply), Vote::Like);
    }

    #[test]
    fn reopening_does_not_rewrite_hydrated_snapshots() {
        let store = store();
        let mut b = board(&store);
        b.add_comment("x");
        b.close();
        let writes = store.write_count();

        let b = board(&store);
        b.close();
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn corrupt_storage_opens_empty() {
        let store = store();
        let keys = StorageKeys::default();
        store.write(&keys.comments, b"{not json").unwrap();
        store.write(&keys.user_votes, b"42").unwrap();
        let b = board(&store);
        assert!(b.state().is_empty());
        assert!(b.votes().is_empty());
    }

    #[test]
    fn opening_a_fresh_store_writes_nothing() {
        let store = store();
        let b = board(&store);
        b.close();
        assert_eq!(store.write_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn rejected_snapshot_is_left_in_storage() {
        let store = store();
        let keys = StorageKeys::default();
        let stored: &[u8] = br#"{"byId":{
            "a":{"id":"a","parentId":null,"text":"precious","createdAt":1}
        },"rootIds":["a","ghost"]}"#;
        store.write(&keys.comments, stored).unwrap();
        store.write(&keys.user_votes, b"[]").unwrap();
        let writes = store.write_count();

        let b = board(&store);
        assert!(b.state().is_empty());
        b.close();

        assert_eq!(store.write_count(), writes);
        assert_eq!(store.read(&keys.comments).unwrap().as_deref(), Some(stored));
        assert_eq!(store.read(&keys.user_votes).unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn failing_medium_never_blocks_transitions() {
        let store = store();
        store.set_fail_writes(true);
        let mut b = board(&store);
        let id = b.add_comment("still works").unwrap();
        assert!(b.edit_comment(&id, "edited"));
        assert_eq!(b.state().get(&id).unwrap().text, "edited");
        b.close();
        assert!(store.is_empty());
    }

    #[test]
    fn delete_then_prune_votes() {
        let store = store();
        let mut b = board(&store);
        let root = b.add_comment("root").unwrap();
        let reply = b.reply(&root, "reply").unwrap();
        b.like(&reply);

        assert!(b.delete_comment(&root));
        assert!(b.state().is_empty());
        assert_eq!(b.votes().len(), 1);
        assert_eq!(b.prune_votes(), 1);
        assert_eq!(b.prune_votes(), 0);
    }

    #[test]
    fn clear_all_keeps_votes() {
        let store = store();
        let mut b = board(&store);
        let id = b.add_comment("x").unwrap();
        b.like(&id);
        b.clear_all();
        assert!(b.state().is_empty());
        assert_eq!(b.vote_for(&id), Vote::Like);
    }

    #[test]
    fn edit_uses_injected_clock() {
        let store = store();
        let clock = Arc::new(ManualClock::new(Timestamp::from_millis(1_000)));
        let mut b = CommentBoard::open_with_clock(
            store.clone(),
            &PersistConfig::default(),
            Arc::clone(&clock),
        );
        let id = b.add_comment("x").unwrap();
        clock.advance(500);
        b.edit_comment(&id, "y");
        let node = b.state().get(&id).unwrap();
        assert_eq!(node.created_at, Timestamp::from_millis(1_000));
        assert_eq!(node.updated_at, Some(Timestamp::from_millis(1_500)));
    }

    #[test]
    fn resolve_by_prefix() {
        let store = store();
        let mut b = board(&store);
        let id = b.add_comment("x").unwrap();

        assert_eq!(b.resolve(id.as_str()).unwrap(), id);
        assert_eq!(b.resolve(id.short_id()).unwrap(), id);
        assert!(matches!(b.resolve("zzzz"), Err(BoardError::NotFound(_))));
        assert!(matches!(b.resolve(""), Err(BoardError::NotFound(_))));
    }

    #[test]
    fn resolve_reports_ambiguity() {
        let store = store();
        let keys = StorageKeys::default();
        let snapshot = br#"{"byId":{
            "abc1":{"id":"abc1","parentId":null,"text":"a","createdAt":1},
            "abc2":{"id":"abc2","parentId":null,"text":"b","createdAt":2}
        },"rootIds":["abc1","abc2"]}"#;
        store.write(&keys.comments, snapshot).unwrap();

        let b = board(&store);
        assert!(matches!(
            b.resolve("abc"),
            Err(BoardError::Ambiguous { matches: 2, .. })
        ));
        assert_eq!(b.resolve("abc2").unwrap(), CommentId::from("abc2"));
    }

    #[test]
    fn open_dir_persists_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = PersistConfig::default();
        {
            let mut b = CommentBoard::open_dir(dir.path(), &config).unwrap();
            b.add_comment("on disk");
            b.close();
        }
        assert!(dir.path().join("thicket-comments.json").is_file());
        let b = CommentBoard::open_dir(dir.path(), &config).unwrap();
        assert_eq!(b.state().len(), 1);
    }

    #[test]
    fn read_only_open_leaves_fresh_dir_empty() {
        let dir = tempfile::tempdir().unwrap();
        let b = CommentBoard::open_dir(dir.path(), &PersistConfig::default()).unwrap();
        assert!(b.state().is_empty());
        b.close();
        assert!(!dir.path().join("thicket-comments.json").exists());
        assert!(!dir.path().join("thicket-userVotes.json").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_changes_collapse_into_one_write() {
        let store = store();
        let mut b = board(&store);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.write_count(), 0);

        let id = b.add_comment("a").unwrap();
        b.edit_comment(&id, "b");
        b.toggle_collapse(&id);
        assert_eq!(store.write_count(), 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.write_count(), 1);
        b.close();
        assert_eq!(store.write_count(), 1);
    }
}
