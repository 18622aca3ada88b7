//! Sync coordinator - glue between the board store, the local snapshot
//! cache, and the remote store.
//!
//! Startup races the cached snapshot (hydrated synchronously) against a
//! background remote load; when the load resolves with a non-empty stage
//! list it overwrites the store wholesale. Full replace, no merge: local
//! edits made between hydration and reconciliation are discarded.
//!
//! Mutations update the store synchronously elsewhere; this module mirrors
//! them to the remote on fire-and-forget threads. There is no queue, no
//! deduplication, and no ordering guarantee between writes: two writes to
//! the same row settle in completion order, not issue order. Failed writes
//! are logged and never retried or rolled back, so local and remote can
//! diverge until a later successful write lands on the same row.

use std::path::PathBuf;
use std::thread::JoinHandle;

use crate::db::DbConnection;
use crate::error::BoardError;
use crate::models::{Board, Card, Stage};
use crate::repo::BoardRepo;
use crate::snapshot::Snapshot;
use crate::store::BoardStore;

/// One mirrored mutation, matching the persistence adapter's write surface.
#[derive(Debug, Clone)]
pub enum RemoteWrite {
    /// Wholesale replacement (import): prunes remote rows the new board no
    /// longer contains. Must be the only write recorded by its session, as
    /// its prune races any sibling card write.
    ReplaceBoard(Board),
    StageOrder(Vec<Stage>),
    UpsertCard { stage_id: String, card: Card },
    UpdateCard(Card),
    MoveCard { card_id: String, to_stage_id: String },
    DeleteCard { card_id: String },
}

pub struct SyncCoordinator {
    remote: Option<PathBuf>,
    board_id: i64,
    snapshot_path: PathBuf,
    loader: Option<JoinHandle<Result<Board, BoardError>>>,
    writes: Vec<JoinHandle<()>>,
}

impl SyncCoordinator {
    /// Start a session: hydrate the store from the cached snapshot if one
    /// exists (so there is something to show immediately), then dispatch the
    /// remote load in the background.
    pub fn start(
        remote: Option<PathBuf>,
        board_id: i64,
        snapshot_path: PathBuf,
        store: &mut BoardStore,
    ) -> Self {
        match Snapshot::load(&snapshot_path) {
            Ok(Some(board)) => store.replace(board),
            Ok(None) => {}
            Err(e) => log::warn!("ignoring unreadable snapshot: {}", e),
        }

        let loader = Some(Self::spawn_load(remote.clone(), board_id));

        Self {
            remote,
            board_id,
            snapshot_path,
            loader,
            writes: Vec::new(),
        }
    }

    fn spawn_load(
        remote: Option<PathBuf>,
        board_id: i64,
    ) -> JoinHandle<Result<Board, BoardError>> {
        std::thread::spawn(move || match remote {
            Some(path) => {
                let conn = DbConnection::open(&path)?;
                BoardRepo::load_board(&conn, board_id)
            }
            // Unconfigured remote: fall back to the fixed demo fixture.
            None => Ok(Board::demo_board()),
        })
    }

    /// Apply the resolved remote load to the store: a non-empty stage list
    /// overwrites the board wholesale. The demo fixture only replaces an
    /// empty store, so the offline fallback never clobbers cached data.
    /// Load failures surface to the caller; the store keeps its current
    /// (snapshot-hydrated) state.
    pub fn reconcile(&mut self, store: &mut BoardStore) -> Result<(), BoardError> {
        let Some(handle) = self.loader.take() else {
            return Ok(());
        };
        let loaded = handle
            .join()
            .map_err(|_| BoardError::persistence("remote load thread panicked"))??;
        if loaded.stages.is_empty() {
            return Ok(());
        }
        if loaded.demo && !store.board().stages.is_empty() {
            return Ok(());
        }
        store.replace(loaded);
        if !store.board().demo {
            Snapshot::save(&self.snapshot_path, store.board())?;
        }
        Ok(())
    }

    /// Force a fresh remote load and reconcile it (the `pull` command).
    pub fn pull(&mut self, store: &mut BoardStore) -> Result<(), BoardError> {
        if let Some(handle) = self.loader.take() {
            let _ = handle.join();
        }
        self.loader = Some(Self::spawn_load(self.remote.clone(), self.board_id));
        self.reconcile(store)
    }

    /// Record a mutation that has already been applied to the store:
    /// rewrite the local snapshot synchronously, then dispatch the matching
    /// remote write without awaiting it. Remote failures are logged only;
    /// the local state is never rolled back.
    pub fn record(&mut self, store: &BoardStore, write: RemoteWrite) {
        if let Err(e) = Snapshot::save(&self.snapshot_path, store.board()) {
            log::warn!("failed to write board snapshot: {}", e);
        }

        let Some(path) = self.remote.clone() else {
            // Writes against an unconfigured remote are no-ops.
            return;
        };
        let board_id = self.board_id;
        self.writes.push(std::thread::spawn(move || {
            if let Err(e) = Self::apply_write(&path, board_id, &write) {
                log::warn!("remote write failed, local state kept: {}", e);
            }
        }));
    }

    fn apply_write(path: &PathBuf, board_id: i64, write: &RemoteWrite) -> Result<(), BoardError> {
        let conn = DbConnection::open(path)?;
        match write {
            RemoteWrite::ReplaceBoard(board) => {
                BoardRepo::replace_board(&conn, board_id, board)
            }
            RemoteWrite::StageOrder(stages) => {
                BoardRepo::save_stage_order(&conn, board_id, stages)
            }
            RemoteWrite::UpsertCard { stage_id, card } => {
                BoardRepo::upsert_card(&conn, board_id, stage_id, card)
            }
            RemoteWrite::UpdateCard(card) => BoardRepo::update_card_row(&conn, card),
            RemoteWrite::MoveCard { card_id, to_stage_id } => {
                BoardRepo::move_card(&conn, card_id, to_stage_id)
            }
            RemoteWrite::DeleteCard { card_id } => BoardRepo::delete_card(&conn, card_id),
        }
    }

    /// Join all outstanding background work. Called at session teardown so
    /// a one-shot process does not exit with writes still in flight; the
    /// mutation path itself never blocks on these threads.
    pub fn finish(self) {
        for handle in self.writes {
            if handle.join().is_err() {
                log::warn!("remote write thread panicked");
            }
        }
        if let Some(loader) = self.loader {
            let _ = loader.join();
        }
    }
}
