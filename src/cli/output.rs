// Output formatting utilities

use crate::forecast::{Forecast, ForecastMode};
use crate::models::{Board, Card, Stage};

/// Detect terminal width for line truncation.
/// Falls back to a conservative default when not attached to a terminal.
fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        w as usize
    } else {
        100
    }
}

/// Format a monetary amount with thousands separators (no currency symbol;
/// deal values are unit-agnostic).
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = value.abs().round() as u64;
    let digits = rounded.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

fn flag_summary(card: &Card) -> String {
    let mut set = Vec::new();
    if card.flags.nda {
        set.push("NDA");
    }
    if card.flags.tech {
        set.push("TECH");
    }
    if card.flags.jaa {
        set.push("JAA");
    }
    if set.is_empty() {
        String::new()
    } else {
        format!(" [{}]", set.join(","))
    }
}

fn stage_header(stage: &Stage, count: usize) -> String {
    let cap = match stage.wip {
        Some(wip) if (count as i64) > wip => format!(" ({}/{} OVER)", count, wip),
        Some(wip) => format!(" ({}/{})", count, wip),
        None => format!(" ({})", count),
    };
    let prob = match stage.prob {
        Some(p) => format!("  {}%", trim_float(p)),
        None => String::new(),
    };
    format!("{}{}{}", stage.name, cap, prob)
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn truncate(line: String, width: usize) -> String {
    if line.chars().count() <= width {
        line
    } else {
        let mut out: String = line.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Render the board as stage sections with one line per card
pub fn format_board(board: &Board) -> String {
    let width = get_terminal_width();
    let mut out = String::new();
    if board.demo {
        out.push_str("(demo board - no remote store configured)\n\n");
    }
    for stage in &board.stages {
        let cards = board.columns.get(&stage.id).map(Vec::as_slice).unwrap_or(&[]);
        out.push_str(&stage_header(stage, cards.len()));
        out.push('\n');
        for card in cards {
            let mut line = format!("  - {}", card.country);
            if let Some(value) = card.value {
                line.push_str(&format!("  {}", format_amount(value)));
            }
            if let Some(owner) = &card.owner {
                line.push_str(&format!("  {}", owner));
            }
            if let Some(priority) = card.priority {
                line.push_str(&format!("  {}", priority.as_str()));
            }
            if let Some(due) = &card.due {
                line.push_str(&format!("  due {}", due));
            }
            line.push_str(&flag_summary(card));
            out.push_str(&truncate(line, width));
            out.push('\n');
        }
        out.push('\n');
    }
    if board.stages.is_empty() {
        out.push_str("Board has no stages.\n");
    }
    out
}

/// Render a single card in full
pub fn format_card_summary(card: &Card, stage_name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Country:  {}\n", card.country));
    out.push_str(&format!("Stage:    {}\n", stage_name));
    if let Some(value) = card.value {
        out.push_str(&format!("Value:    {}\n", format_amount(value)));
    }
    if let Some(owner) = &card.owner {
        out.push_str(&format!("Owner:    {}\n", owner));
    }
    if let Some(org) = &card.org {
        out.push_str(&format!("Org:      {}\n", org));
    }
    if let Some(priority) = card.priority {
        out.push_str(&format!("Priority: {}\n", priority.as_str()));
    }
    if let Some(next_action) = &card.next_action {
        out.push_str(&format!("Next:     {}\n", next_action));
    }
    if let Some(due) = &card.due {
        out.push_str(&format!("Due:      {}\n", due));
    }
    if let Some(links) = &card.links {
        out.push_str(&format!("Links:    {}\n", links));
    }
    if let Some(notes) = &card.notes {
        out.push_str(&format!("Notes:    {}\n", notes));
    }
    let flags = flag_summary(card);
    if !flags.is_empty() {
        out.push_str(&format!("Flags:   {}\n", flags));
    }
    out
}

/// Render the stage editor listing
pub fn format_stage_list(board: &Board) -> String {
    let mut out = String::from("Pos  Stage                     Win%   WIP  Cards\n");
    for (i, stage) in board.stages.iter().enumerate() {
        let count = board.columns.get(&stage.id).map_or(0, Vec::len);
        out.push_str(&format!(
            "{:<4} {:<25} {:>5} {:>5} {:>6}\n",
            i,
            stage.name,
            stage.prob.map(trim_float).unwrap_or_else(|| "-".to_string()),
            stage.wip.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string()),
            count
        ));
    }
    out
}

/// Render the weighted forecast report
pub fn format_forecast_table(forecast: &Forecast, mode: ForecastMode) -> String {
    let mut out = format!("Forecast ({} mode)\n\n", mode.as_str());
    out.push_str("Stage                     Win%  Deals       Value    Weighted\n");
    for stage in &forecast.per_stage {
        out.push_str(&format!(
            "{:<25} {:>4} {:>6} {:>11} {:>11}\n",
            stage.name,
            trim_float(stage.prob),
            stage.count,
            format_amount(stage.total),
            format_amount(stage.weighted),
        ));
    }
    out.push_str(&format!(
        "{:<25} {:>4} {:>6} {:>11} {:>11}\n",
        "Total",
        "",
        forecast.per_stage.iter().map(|s| s.count).sum::<usize>(),
        format_amount(forecast.total),
        format_amount(forecast.weighted),
    ));
    out
}
