use rusqlite::Connection;
use std::collections::HashMap;

use crate::error::BoardError;
use crate::models::{Board, Card, Flags, Priority, Stage};

/// Board repository - translates board loads and mutations into remote
/// read/write operations against the stages/cards tables. Each operation is
/// independently fallible; callers decide whether failures surface (reads)
/// or are only logged (mirrored writes).
pub struct BoardRepo;

impl BoardRepo {
    /// Fetch all stages (ordered by the stored sort key) and all cards for
    /// the board, grouping cards by stage id. Cards referencing a stage
    /// absent from the stage list are silently dropped.
    pub fn load_board(conn: &Connection, board_id: i64) -> Result<Board, BoardError> {
        let mut stmt = conn.prepare(
            "SELECT id, name, prob, wip FROM stages WHERE board_id = ?1 ORDER BY sort",
        )?;
        let rows = stmt.query_map([board_id], |row| {
            Ok(Stage {
                id: row.get(0)?,
                name: row.get(1)?,
                prob: row.get(2)?,
                wip: row.get(3)?,
            })
        })?;

        let mut stages = Vec::new();
        for row in rows {
            stages.push(row?);
        }

        let mut columns: HashMap<String, Vec<Card>> = stages
            .iter()
            .map(|s| (s.id.clone(), Vec::new()))
            .collect();

        let mut stmt = conn.prepare(
            "SELECT id, stage_id, country, value, owner, org, priority, next_action,
                    due, links, notes, flags
             FROM cards WHERE board_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([board_id], |row| {
            let priority: Option<String> = row.get(6)?;
            let flags_json: String = row.get(11)?;
            let flags = serde_json::from_str::<Flags>(&flags_json).unwrap_or_default();
            let stage_id: String = row.get(1)?;
            let card = Card {
                id: row.get(0)?,
                country: row.get(2)?,
                value: row.get(3)?,
                owner: row.get(4)?,
                org: row.get(5)?,
                priority: priority.as_deref().and_then(Priority::from_str),
                next_action: row.get(7)?,
                due: row.get(8)?,
                links: row.get(9)?,
                notes: row.get(10)?,
                flags,
            };
            Ok((stage_id, card))
        })?;

        for row in rows {
            let (stage_id, card) = row?;
            if let Some(column) = columns.get_mut(&stage_id) {
                column.push(card);
            }
        }

        Ok(Board {
            stages,
            columns,
            demo: false,
        })
    }

    /// Upsert every stage row with an explicit sort field equal to its
    /// position in the sequence - this is how reordering (and renames and
    /// probability retunes) are persisted. Stage rows for this board that no
    /// longer appear in the sequence are removed.
    pub fn save_stage_order(
        conn: &Connection,
        board_id: i64,
        stages: &[Stage],
    ) -> Result<(), BoardError> {
        for (sort, stage) in stages.iter().enumerate() {
            conn.execute(
                "INSERT INTO stages (id, board_id, name, prob, wip, sort)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     board_id = excluded.board_id,
                     name = excluded.name,
                     prob = excluded.prob,
                     wip = excluded.wip,
                     sort = excluded.sort",
                rusqlite::params![stage.id, board_id, stage.name, stage.prob, stage.wip, sort as i64],
            )?;
        }

        // Drop rows for stages removed by the stage editor, so a reload does
        // not resurrect them.
        if stages.is_empty() {
            conn.execute("DELETE FROM stages WHERE board_id = ?1", [board_id])?;
        } else {
            let placeholders = (2..=stages.len() + 1)
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "DELETE FROM stages WHERE board_id = ?1 AND id NOT IN ({})",
                placeholders
            );
            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&board_id];
            for stage in stages {
                params.push(&stage.id);
            }
            conn.execute(&sql, params.as_slice())?;
        }

        Ok(())
    }

    /// Mirror a wholesale board replacement: persist the stage sequence,
    /// prune card rows absent from the new board, then upsert every card.
    /// Upserts alone would let a later load resurrect cards the replacement
    /// removed. Rows of other boards are untouched.
    pub fn replace_board(
        conn: &Connection,
        board_id: i64,
        board: &Board,
    ) -> Result<(), BoardError> {
        Self::save_stage_order(conn, board_id, &board.stages)?;

        let mut card_ids = Vec::new();
        for stage in &board.stages {
            if let Some(column) = board.columns.get(&stage.id) {
                for card in column {
                    card_ids.push(card.id.as_str());
                }
            }
        }
        if card_ids.is_empty() {
            conn.execute("DELETE FROM cards WHERE board_id = ?1", [board_id])?;
        } else {
            let placeholders = (2..=card_ids.len() + 1)
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "DELETE FROM cards WHERE board_id = ?1 AND id NOT IN ({})",
                placeholders
            );
            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&board_id];
            for id in &card_ids {
                params.push(id);
            }
            conn.execute(&sql, params.as_slice())?;
        }

        for stage in &board.stages {
            if let Some(column) = board.columns.get(&stage.id) {
                for card in column {
                    Self::upsert_card(conn, board_id, &stage.id, card)?;
                }
            }
        }

        Ok(())
    }

    /// Insert or update one card row, including which stage owns it
    pub fn upsert_card(
        conn: &Connection,
        board_id: i64,
        stage_id: &str,
        card: &Card,
    ) -> Result<(), BoardError> {
        let flags_json = serde_json::to_string(&card.flags)?;
        conn.execute(
            "INSERT INTO cards (id, board_id, stage_id, country, value, owner, org,
                                priority, next_action, due, links, notes, flags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(id) DO UPDATE SET
                 board_id = excluded.board_id,
                 stage_id = excluded.stage_id,
                 country = excluded.country,
                 value = excluded.value,
                 owner = excluded.owner,
                 org = excluded.org,
                 priority = excluded.priority,
                 next_action = excluded.next_action,
                 due = excluded.due,
                 links = excluded.links,
                 notes = excluded.notes,
                 flags = excluded.flags",
            rusqlite::params![
                card.id,
                board_id,
                stage_id,
                card.country,
                card.value,
                card.owner,
                card.org,
                card.priority.map(|p| p.as_str()),
                card.next_action,
                card.due,
                card.links,
                card.notes,
                flags_json,
            ],
        )?;
        Ok(())
    }

    /// Update card fields (not the owning stage)
    pub fn update_card_row(conn: &Connection, card: &Card) -> Result<(), BoardError> {
        let flags_json = serde_json::to_string(&card.flags)?;
        conn.execute(
            "UPDATE cards SET country = ?1, value = ?2, owner = ?3, org = ?4,
                    priority = ?5, next_action = ?6, due = ?7, links = ?8,
                    notes = ?9, flags = ?10
             WHERE id = ?11",
            rusqlite::params![
                card.country,
                card.value,
                card.owner,
                card.org,
                card.priority.map(|p| p.as_str()),
                card.next_action,
                card.due,
                card.links,
                card.notes,
                flags_json,
                card.id,
            ],
        )?;
        Ok(())
    }

    /// Move a card to another stage
    pub fn move_card(conn: &Connection, card_id: &str, to_stage_id: &str) -> Result<(), BoardError> {
        conn.execute(
            "UPDATE cards SET stage_id = ?1 WHERE id = ?2",
            rusqlite::params![to_stage_id, card_id],
        )?;
        Ok(())
    }

    /// Delete a card
    pub fn delete_card(conn: &Connection, card_id: &str) -> Result<(), BoardError> {
        conn.execute("DELETE FROM cards WHERE id = ?1", [card_id])?;
        Ok(())
    }
}
