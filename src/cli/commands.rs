use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::cli::error::{user_error, validate_non_empty, validate_prob, validate_wip};
use crate::cli::output::{
    format_board, format_card_summary, format_forecast_table, format_stage_list,
};
use crate::cli::parser::{apply_card_args, parse_card_args};
use crate::db::DbConnection;
use crate::error::BoardError;
use crate::forecast::{forecast, ForecastMode};
use crate::models::{Board, Card, Stage};
use crate::snapshot::Snapshot;
use crate::store::BoardStore;
use crate::sync::{RemoteWrite, SyncCoordinator};

#[derive(Parser)]
#[command(name = "dealflow")]
#[command(about = "Deal pipeline board - a command-line kanban and probability-weighted forecast tool")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new deal card
    Add {
        /// Target country (one deal per country)
        country: String,
        /// Card fields (e.g. "value=1200 owner=Ana stage=Proposal +nda")
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show the board
    Board {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show one deal in full
    Show {
        /// Country of the deal
        country: String,
    },
    /// Modify a deal's fields (stage changes go through `move`)
    Modify {
        /// Country of the deal
        country: String,
        /// Field tokens (e.g. "value=900 priority=High -nda")
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Move a deal to another stage
    Move {
        /// Country of the deal
        country: String,
        /// Destination stage name
        stage: String,
    },
    /// Delete a deal
    Delete {
        /// Country of the deal
        country: String,
    },
    /// Stage editor commands
    Stages {
        #[command(subcommand)]
        subcommand: StageCommands,
    },
    /// Probability-weighted revenue forecast
    Forecast {
        /// Probability interpretation: absolute or transition
        #[arg(long, default_value = "absolute")]
        mode: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Export the board to a JSON file
    Export {
        /// Output path (defaults to dealflow-board-<date>.json)
        path: Option<String>,
    },
    /// Import a board from a JSON file, replacing the current board
    Import {
        /// Input path
        path: String,
    },
    /// Reload the board from the remote store, discarding local state
    Pull,
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// List stages in pipeline order
    List,
    /// Edit one stage (name=, prob=, wip=)
    Edit {
        /// Stage to edit (current name)
        stage: String,
        /// Field tokens (e.g. "prob=60 wip=4 name=Scoping")
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Reorder stages (comma-separated list of all stage names)
    Reorder {
        /// New order, e.g. "Prospect,Proposal,Qualified,Negotiation,First Event Live"
        order: String,
    },
    /// Replace the whole stage list: "Name:prob[:wip],..."
    Set {
        /// Stage spec, e.g. "Prospect:10,Proposal:50:4,Won:100"
        spec: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Add { country, args } => handle_add(country, args),
        Commands::Board { json } => handle_board(json),
        Commands::Show { country } => handle_show(country),
        Commands::Modify { country, args } => handle_modify(country, args),
        Commands::Move { country, stage } => handle_move(country, stage),
        Commands::Delete { country } => handle_delete(country),
        Commands::Stages { subcommand } => match subcommand {
            StageCommands::List => handle_stages_list(),
            StageCommands::Edit { stage, args } => handle_stages_edit(stage, args),
            StageCommands::Reorder { order } => handle_stages_reorder(order),
            StageCommands::Set { spec } => handle_stages_set(spec),
        },
        Commands::Forecast { mode, json } => handle_forecast(mode, json),
        Commands::Export { path } => handle_export(path),
        Commands::Import { path } => handle_import(path),
        Commands::Pull => handle_pull(),
    }
}

/// One CLI invocation = one board session: hydrate from the snapshot, load
/// from the remote (or the demo fallback), mutate through the store, and
/// drain outstanding remote writes on teardown.
struct Session {
    store: BoardStore,
    sync: SyncCoordinator,
}

impl Session {
    fn open() -> Result<Self> {
        let mut store = BoardStore::new();
        let mut sync = SyncCoordinator::start(
            DbConnection::resolve_remote(),
            DbConnection::board_id(),
            DbConnection::snapshot_path(),
            &mut store,
        );
        // The CLI renders once, so the startup load is reconciled before the
        // command runs. Read failures surface here.
        sync.reconcile(&mut store).context("Failed to load board")?;

        let mut session = Session { store, sync };
        session.seed_if_empty();
        Ok(session)
    }

    /// Install the default template when neither snapshot nor remote
    /// produced any stages, and mirror it out.
    fn seed_if_empty(&mut self) {
        if !self.store.board().stages.is_empty() {
            return;
        }
        self.store.replace(Board::default_template());
        self.sync.record(
            &self.store,
            RemoteWrite::StageOrder(self.store.board().stages.clone()),
        );
        let seeded: Vec<(String, Card)> = self
            .store
            .board()
            .stages
            .iter()
            .flat_map(|s| {
                self.store.board().columns[&s.id]
                    .iter()
                    .map(|c| (s.id.clone(), c.clone()))
            })
            .collect();
        for (stage_id, card) in seeded {
            self.sync
                .record(&self.store, RemoteWrite::UpsertCard { stage_id, card });
        }
    }

    fn board(&self) -> &Board {
        self.store.board()
    }

    /// Resolve a card by country or die with a user error
    fn require_card(&self, country: &str) -> (String, Card) {
        match self.board().find_card_by_country(country) {
            Some((stage_id, card)) => (stage_id.to_string(), card.clone()),
            None => user_error(&format!("No deal found for country '{}'", country)),
        }
    }

    /// Resolve a stage by name or die with a user error
    fn require_stage(&self, name: &str) -> Stage {
        match self.board().stage_by_name(name) {
            Some(stage) => stage.clone(),
            None => {
                let names: Vec<&str> =
                    self.board().stages.iter().map(|s| s.name.as_str()).collect();
                user_error(&format!(
                    "No stage named '{}'. Stages: {}",
                    name,
                    names.join(", ")
                ))
            }
        }
    }

    fn finish(self) {
        self.sync.finish();
    }
}

fn handle_add(country: String, args: Vec<String>) -> Result<()> {
    if let Err(e) = validate_non_empty(&country, "Country") {
        user_error(&e);
    }
    let parsed = match parse_card_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => user_error(&e),
    };

    let mut session = Session::open()?;
    if session.board().find_card_by_country(&country).is_some() {
        user_error(&format!("A deal for '{}' already exists", country));
    }
    let stage = match &parsed.stage {
        Some(name) => session.require_stage(name),
        None => session.board().stages[0].clone(),
    };

    let mut draft = Card::new(&country);
    if let Err(e) = apply_card_args(&mut draft, &parsed) {
        user_error(&e);
    }

    let card = match session.store.add_card(&stage.id, draft) {
        Ok(card) => card,
        Err(BoardError::Validation(msg)) => user_error(&msg),
        Err(e) => return Err(e.into()),
    };
    session.sync.record(
        &session.store,
        RemoteWrite::UpsertCard {
            stage_id: stage.id.clone(),
            card: card.clone(),
        },
    );

    println!("Added '{}' to {}", card.country, stage.name);
    session.finish();
    Ok(())
}

fn handle_board(json: bool) -> Result<()> {
    let session = Session::open()?;
    if json {
        println!("{}", serde_json::to_string_pretty(session.board())?);
    } else {
        print!("{}", format_board(session.board()));
    }
    session.finish();
    Ok(())
}

fn handle_show(country: String) -> Result<()> {
    let session = Session::open()?;
    let (stage_id, card) = session.require_card(&country);
    let stage_name = session
        .board()
        .stage(&stage_id)
        .map(|s| s.name.clone())
        .unwrap_or_default();
    print!("{}", format_card_summary(&card, &stage_name));
    session.finish();
    Ok(())
}

fn handle_modify(country: String, args: Vec<String>) -> Result<()> {
    let parsed = match parse_card_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => user_error(&e),
    };
    if parsed.stage.is_some() {
        user_error("Use 'dealflow move' to change a deal's stage.");
    }

    let mut session = Session::open()?;
    let (_, mut card) = session.require_card(&country);
    if let Err(e) = apply_card_args(&mut card, &parsed) {
        user_error(&e);
    }
    session.store.update_card(card.clone());
    session
        .sync
        .record(&session.store, RemoteWrite::UpdateCard(card.clone()));

    println!("Updated '{}'", card.country);
    session.finish();
    Ok(())
}

fn handle_move(country: String, stage: String) -> Result<()> {
    let mut session = Session::open()?;
    let (from_stage_id, card) = session.require_card(&country);
    let destination = session.require_stage(&stage);

    if session
        .store
        .move_card(&card.id, &from_stage_id, &destination.id)
    {
        session.sync.record(
            &session.store,
            RemoteWrite::MoveCard {
                card_id: card.id.clone(),
                to_stage_id: destination.id.clone(),
            },
        );
        println!("Moved '{}' to {}", card.country, destination.name);
    } else {
        println!("'{}' is already in {}", card.country, destination.name);
    }
    session.finish();
    Ok(())
}

fn handle_delete(country: String) -> Result<()> {
    let mut session = Session::open()?;
    let (stage_id, card) = session.require_card(&country);
    session.store.delete_card(&stage_id, &card.id);
    session.sync.record(
        &session.store,
        RemoteWrite::DeleteCard {
            card_id: card.id.clone(),
        },
    );
    println!("Deleted '{}'", card.country);
    session.finish();
    Ok(())
}

fn handle_stages_list() -> Result<()> {
    let session = Session::open()?;
    print!("{}", format_stage_list(session.board()));
    session.finish();
    Ok(())
}

fn handle_stages_edit(stage: String, args: Vec<String>) -> Result<()> {
    let mut session = Session::open()?;
    let target = session.require_stage(&stage);

    let mut rows = session.board().stages.clone();
    let slot = rows
        .iter_mut()
        .find(|s| s.id == target.id)
        .expect("stage resolved above");
    for token in &args {
        let Some(eq_pos) = token.find('=') else {
            user_error(&format!(
                "Unrecognized token '{}'. Use name=, prob=, or wip=.",
                token
            ));
        };
        let field = token[..eq_pos].to_lowercase();
        let value = &token[eq_pos + 1..];
        match field.as_str() {
            "name" => {
                if let Err(e) = validate_non_empty(value, "Stage name") {
                    user_error(&e);
                }
                slot.name = value.to_string();
            }
            "prob" => {
                slot.prob = if value.is_empty() || value == "none" {
                    None
                } else {
                    match validate_prob(value) {
                        Ok(p) => Some(p),
                        Err(e) => user_error(&e),
                    }
                };
            }
            "wip" => {
                slot.wip = if value.is_empty() || value == "none" {
                    None
                } else {
                    match validate_wip(value) {
                        Ok(w) => Some(w),
                        Err(e) => user_error(&e),
                    }
                };
            }
            _ => user_error(&format!(
                "Unrecognized field name '{}'. Use name=, prob=, or wip=.",
                field
            )),
        }
    }

    apply_stage_rows(&mut session, rows)?;
    println!("Updated stage '{}'", stage);
    session.finish();
    Ok(())
}

fn handle_stages_reorder(order: String) -> Result<()> {
    let mut session = Session::open()?;
    let names: Vec<&str> = order
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if names.len() != session.board().stages.len() {
        user_error(&format!(
            "Reorder must list all {} stages exactly once",
            session.board().stages.len()
        ));
    }
    let mut new_order = Vec::new();
    for name in names {
        let stage = session.require_stage(name);
        if new_order.iter().any(|s: &Stage| s.id == stage.id) {
            user_error(&format!("Stage '{}' listed more than once", name));
        }
        new_order.push(stage);
    }

    session.store.reorder_stages(new_order);
    session.sync.record(
        &session.store,
        RemoteWrite::StageOrder(session.board().stages.clone()),
    );
    println!("Reordered stages");
    session.finish();
    Ok(())
}

fn handle_stages_set(spec: String) -> Result<()> {
    let mut session = Session::open()?;

    // "Name:prob[:wip],..." - names matching existing stages keep their id
    // (and therefore their cards); new names get fresh stages.
    let mut rows = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let mut pieces = part.split(':');
        let name = pieces.next().unwrap_or_default().trim();
        if let Err(e) = validate_non_empty(name, "Stage name") {
            user_error(&e);
        }
        let prob = match pieces.next().map(str::trim).filter(|s| !s.is_empty()) {
            Some(p) => match validate_prob(p) {
                Ok(p) => Some(p),
                Err(e) => user_error(&e),
            },
            None => None,
        };
        let wip = match pieces.next().map(str::trim).filter(|s| !s.is_empty()) {
            Some(w) => match validate_wip(w) {
                Ok(w) => Some(w),
                Err(e) => user_error(&e),
            },
            None => None,
        };

        let mut stage = match session.board().stage_by_name(name) {
            Some(existing) => existing.clone(),
            None => Stage::new(name, None),
        };
        stage.name = name.to_string();
        stage.prob = prob;
        stage.wip = wip;
        rows.push(stage);
    }
    if rows.is_empty() {
        user_error("Stage spec is empty");
    }

    apply_stage_rows(&mut session, rows)?;
    println!("Replaced stage list");
    session.finish();
    Ok(())
}

fn apply_stage_rows(session: &mut Session, rows: Vec<Stage>) -> Result<()> {
    if let Err(e) = session.store.set_stages(rows) {
        match e {
            BoardError::Validation(msg) => user_error(&msg),
            other => return Err(other.into()),
        }
    }
    session.sync.record(
        &session.store,
        RemoteWrite::StageOrder(session.store.board().stages.clone()),
    );
    Ok(())
}

fn handle_forecast(mode: String, json: bool) -> Result<()> {
    let mode = match ForecastMode::from_str(&mode) {
        Some(mode) => mode,
        None => user_error(&format!(
            "Invalid mode '{}'. Use absolute or transition.",
            mode
        )),
    };
    let session = Session::open()?;
    let board = session.board();
    let report = forecast(&board.stages, &board.columns, mode);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_forecast_table(&report, mode));
    }
    session.finish();
    Ok(())
}

fn handle_export(path: Option<String>) -> Result<()> {
    let session = Session::open()?;
    let path = path.unwrap_or_else(Snapshot::export_filename);
    let text = Snapshot::export_string(session.board())?;
    std::fs::write(&path, text).with_context(|| format!("Failed to write {}", path))?;
    println!(
        "Exported {} stages, {} deals to {}",
        session.board().stages.len(),
        session.board().card_count(),
        path
    );
    session.finish();
    Ok(())
}

fn handle_import(path: String) -> Result<()> {
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => user_error(&format!("Failed to read {}: {}", path, e)),
    };
    let board = match Snapshot::import(&text) {
        Ok(board) => board,
        Err(BoardError::Validation(msg)) => user_error(&msg),
        Err(e) => return Err(e.into()),
    };

    let mut session = Session::open()?;
    session.store.replace(board);
    // One write for the whole replacement: it prunes remote rows the new
    // board no longer contains, so it must not race sibling card writes.
    session.sync.record(
        &session.store,
        RemoteWrite::ReplaceBoard(session.board().clone()),
    );

    println!(
        "Imported {} stages, {} deals from {}",
        session.board().stages.len(),
        session.board().card_count(),
        path
    );
    session.finish();
    Ok(())
}

fn handle_pull() -> Result<()> {
    let mut session = Session::open()?;
    session
        .sync
        .pull(&mut session.store)
        .context("Failed to reload board from remote")?;
    if session.board().demo {
        println!("No remote store configured; showing the demo board.");
    } else {
        println!(
            "Board refreshed: {} stages, {} deals",
            session.board().stages.len(),
            session.board().card_count()
        );
    }
    session.finish();
    Ok(())
}
