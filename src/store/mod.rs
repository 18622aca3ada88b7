//! Board store - owns the in-memory board and all mutations to it.
//!
//! Every operation is synchronous and total: it either fully applies and
//! swaps in a new consistent board, or leaves the current board untouched.
//! Consumers never reach into the stage/column lists directly; the remote
//! mirror is the only eventually consistent view.

use std::collections::{HashMap, HashSet};

use crate::error::BoardError;
use crate::models::{Board, Card, Stage};

#[derive(Debug, Default)]
pub struct BoardStore {
    board: Board,
}

impl BoardStore {
    pub fn new() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub fn with_board(board: Board) -> Self {
        let mut store = Self::new();
        store.replace(board);
        store
    }

    /// Current board snapshot. Immediately reflects every prior mutation.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Wholesale overwrite, used by the sync coordinator when a remote load
    /// resolves and by import. Full replace, not a merge.
    pub fn replace(&mut self, mut board: Board) {
        board.normalize();
        self.board = board;
    }

    /// Add a card to a stage's column. Generates a fresh unique id and
    /// appends. Fails with a validation error (board unchanged) when the
    /// country is empty or the stage does not exist.
    pub fn add_card(&mut self, stage_id: &str, draft: Card) -> Result<Card, BoardError> {
        if draft.country.trim().is_empty() {
            return Err(BoardError::validation("Country cannot be empty"));
        }
        let mut next = self.board.clone();
        let column = next.columns.get_mut(stage_id).ok_or_else(|| {
            BoardError::validation(format!("No stage with id '{}'", stage_id))
        })?;
        let mut card = draft;
        card.id = uuid::Uuid::new_v4().to_string();
        column.push(card.clone());
        self.board = next;
        Ok(card)
    }

    /// Replace the card with a matching id in place, wherever it currently
    /// lives. Does not change which stage owns the card. Returns false (and
    /// does nothing) when no card matches.
    pub fn update_card(&mut self, updated: Card) -> bool {
        let mut next = self.board.clone();
        for column in next.columns.values_mut() {
            if let Some(slot) = column.iter_mut().find(|c| c.id == updated.id) {
                *slot = updated;
                self.board = next;
                return true;
            }
        }
        false
    }

    /// Move a card between stages: remove from the source column, append to
    /// the destination column. No-op when source and destination match, the
    /// card is not in the source column, or the destination has no column.
    /// Returns whether a move happened.
    pub fn move_card(&mut self, card_id: &str, from_stage_id: &str, to_stage_id: &str) -> bool {
        if from_stage_id == to_stage_id {
            return false;
        }
        let mut next = self.board.clone();
        if !next.columns.contains_key(to_stage_id) {
            return false;
        }
        let Some(source) = next.columns.get_mut(from_stage_id) else {
            return false;
        };
        let Some(pos) = source.iter().position(|c| c.id == card_id) else {
            return false;
        };
        let card = source.remove(pos);
        next.columns
            .get_mut(to_stage_id)
            .expect("destination column checked above")
            .push(card);
        self.board = next;
        true
    }

    /// Remove a card from a stage's column. Absent card is a silent no-op.
    pub fn delete_card(&mut self, stage_id: &str, card_id: &str) -> bool {
        let mut next = self.board.clone();
        let Some(column) = next.columns.get_mut(stage_id) else {
            return false;
        };
        let before = column.len();
        column.retain(|c| c.id != card_id);
        if column.len() == before {
            return false;
        }
        self.board = next;
        true
    }

    /// Replace the stage sequence wholesale. Columns are keyed by stable
    /// stage id, so they are untouched. Every id in the new order must
    /// already have a column; anything else is a programmer error.
    pub fn reorder_stages(&mut self, new_order: Vec<Stage>) {
        for stage in &new_order {
            assert!(
                self.board.columns.contains_key(&stage.id),
                "reorder_stages: stage id '{}' has no column",
                stage.id
            );
        }
        let mut next = self.board.clone();
        next.stages = new_order;
        self.board = next;
    }

    /// Full replace of the stage list (the stage editor's batch operation):
    /// add, remove, rename, retune, and reorder in one step. New stages get
    /// empty columns; columns of removed stages are dropped with their cards.
    pub fn set_stages(&mut self, rows: Vec<Stage>) -> Result<(), BoardError> {
        let mut seen = HashSet::new();
        for stage in &rows {
            if stage.name.trim().is_empty() {
                return Err(BoardError::validation("Stage name cannot be empty"));
            }
            if !seen.insert(stage.id.as_str()) {
                return Err(BoardError::validation(format!(
                    "Duplicate stage id '{}'",
                    stage.id
                )));
            }
        }
        let mut next = self.board.clone();
        let mut columns: HashMap<String, Vec<Card>> = HashMap::new();
        for stage in &rows {
            let column = next.columns.remove(&stage.id).unwrap_or_default();
            columns.insert(stage.id.clone(), column);
        }
        next.stages = rows;
        next.columns = columns;
        self.board = next;
        Ok(())
    }
}
