use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Card, Stage};

/// Board model - the ordered stage sequence plus one card column per stage.
///
/// Invariants (enforced by the board store, assumed by everything else):
/// - every stage id in `stages` has exactly one entry in `columns`
/// - no card appears in more than one column
/// - card ids are unique board-wide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub stages: Vec<Stage>,
    pub columns: HashMap<String, Vec<Card>>,
    /// Set when this board is the offline fixture rather than remote data.
    /// Not part of the snapshot/export format.
    #[serde(skip)]
    pub demo: bool,
}

impl Board {
    /// Look up a stage by id
    pub fn stage(&self, stage_id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    /// Look up a stage by name (case-insensitive)
    pub fn stage_by_name(&self, name: &str) -> Option<&Stage> {
        self.stages
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Find a card by country name (case-insensitive)
    pub fn find_card_by_country(&self, country: &str) -> Option<(&str, &Card)> {
        for stage in &self.stages {
            if let Some(card) = self.columns.get(&stage.id).and_then(|col| {
                col.iter().find(|c| c.country.eq_ignore_ascii_case(country))
            }) {
                return Some((stage.id.as_str(), card));
            }
        }
        None
    }

    /// Total number of cards across all columns
    pub fn card_count(&self) -> usize {
        self.stages
            .iter()
            .map(|s| self.columns.get(&s.id).map_or(0, |c| c.len()))
            .sum()
    }

    /// Restore the column invariant after deserializing external data:
    /// every stage gets a column, cards without a stage are silently dropped.
    pub fn normalize(&mut self) {
        let mut columns: HashMap<String, Vec<Card>> = self
            .stages
            .iter()
            .map(|s| (s.id.clone(), Vec::new()))
            .collect();
        for (stage_id, cards) in self.columns.drain() {
            if let Some(col) = columns.get_mut(&stage_id) {
                *col = cards;
            }
        }
        self.columns = columns;
    }

    /// The default board template: the fixed expansion pipeline with one
    /// seeded card in the first stage. Used when neither the snapshot nor
    /// the remote store yields any stages.
    pub fn default_template() -> Self {
        let stages = vec![
            Stage::with_id("prospect", "Prospect", Some(10.0)),
            Stage::with_id("qualified", "Qualified", Some(25.0)),
            Stage::with_id("proposal", "Proposal", Some(50.0)),
            Stage::with_id("negotiation", "Negotiation", Some(70.0)),
            Stage::with_id("live", "First Event Live", Some(100.0)),
        ];
        let mut columns: HashMap<String, Vec<Card>> = stages
            .iter()
            .map(|s| (s.id.clone(), Vec::new()))
            .collect();
        columns
            .get_mut("prospect")
            .unwrap()
            .push(Card::new("Example Country"));
        Board {
            stages,
            columns,
            demo: false,
        }
    }

    /// The fixed demo fixture returned when no remote store is configured.
    pub fn demo_board() -> Self {
        let stages = vec![
            Stage::with_id("demo-todo", "Todo", Some(20.0)),
            Stage::with_id("demo-doing", "Doing", Some(60.0)),
            Stage::with_id("demo-done", "Done", Some(100.0)),
        ];
        let mut columns: HashMap<String, Vec<Card>> = stages
            .iter()
            .map(|s| (s.id.clone(), Vec::new()))
            .collect();
        let mut card = Card::new("Example Country");
        card.owner = Some("Demo User".to_string());
        columns.get_mut("demo-todo").unwrap().push(card);
        Board {
            stages,
            columns,
            demo: true,
        }
    }
}
