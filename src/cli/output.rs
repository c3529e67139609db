// Output formatting utilities

use crate::models::{Agent, Lead, LeadStatus};
use crate::pipeline::projection::StageColumn;
use crate::pipeline::stats::{Leaderboard, Portfolio};
use crate::utils::{format_time_ago, format_timestamp, ActivityBadge};
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";
const ANSI_FG_BLUE: &str = "\x1b[34m";
const ANSI_FG_MAGENTA: &str = "\x1b[35m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";

/// Gap between kanban columns
const BOARD_GAP: usize = 2;
const BOARD_MIN_COLUMN: usize = 14;

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

fn status_color(status: LeadStatus) -> &'static str {
    match status {
        LeadStatus::New => ANSI_FG_BLUE,
        LeadStatus::Contacted => ANSI_FG_YELLOW,
        LeadStatus::Interested => ANSI_FG_MAGENTA,
        LeadStatus::Closed => ANSI_FG_GREEN,
        LeadStatus::Lost => ANSI_FG_RED,
    }
}

fn badge_color(badge: ActivityBadge) -> &'static str {
    match badge {
        ActivityBadge::Active => ANSI_FG_GREEN,
        ActivityBadge::Idle => ANSI_FG_YELLOW,
        ActivityBadge::Stalled => ANSI_FG_BRIGHT_BLACK,
    }
}

/// Pad to `width` first, then color, so escape codes never skew alignment
fn paint(text: &str, width: usize, color: &str, is_tty: bool) -> String {
    let padded = format!("{:<width$}", text, width = width);
    if is_tty {
        format!("{}{}{}", color, padded, ANSI_RESET)
    } else {
        padded
    }
}

/// Truncate to `max` characters, marking the cut with "..."
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let kept: String = text.chars().take(max - 3).collect();
    format!("{}...", kept)
}

fn owner_name(lead: &Lead) -> &str {
    lead.assigned_to.as_ref().map(|a| a.name.as_str()).unwrap_or("Unassigned")
}

/// Lead list table
pub fn format_lead_list_table(leads: &[&Lead], now: i64, is_tty: bool) -> String {
    if leads.is_empty() {
        return "No leads found.".to_string();
    }

    let id_width = leads.iter().map(|l| l.id.to_string().len()).max().unwrap_or(2).max(2);
    let name_width = leads.iter().map(|l| l.name.chars().count().min(30)).max().unwrap_or(4).max(4);
    let phone_width = leads.iter().map(|l| l.phone.chars().count()).max().unwrap_or(5).max(5);
    let company_width = leads.iter()
        .map(|l| l.company.as_deref().unwrap_or("").chars().count().min(20))
        .max().unwrap_or(7).max(7);
    let source_width = leads.iter().map(|l| l.source.chars().count().min(15)).max().unwrap_or(6).max(6);
    let status_width = 10;
    let owner_width = leads.iter().map(|l| owner_name(l).chars().count().min(20)).max().unwrap_or(5).max(5);
    let updated_width = 8;

    let mut output = String::new();
    let header = format!(
        "{:<id$} {:<name$} {:<phone$} {:<company$} {:<source$} {:<status$} {:<owner$} {:<updated$} {}",
        "ID", "Name", "Phone", "Company", "Source", "Status", "Owner", "Updated", "Activity",
        id = id_width,
        name = name_width,
        phone = phone_width,
        company = company_width,
        source = source_width,
        status = status_width,
        owner = owner_width,
        updated = updated_width,
    );
    output.push_str(&bold_if_tty(&header, is_tty));
    output.push('\n');
    output.push_str(&"-".repeat(header.chars().count()));
    output.push('\n');

    for lead in leads {
        let badge = ActivityBadge::from_updated(lead.updated_ts, now);
        output.push_str(&format!(
            "{:<id$} {:<name$} {:<phone$} {:<company$} {:<source$} {} {:<owner$} {:<updated$} {}\n",
            lead.id,
            truncate(&lead.name, name_width),
            lead.phone,
            truncate(lead.company.as_deref().unwrap_or(""), company_width),
            truncate(&lead.source, source_width),
            paint(lead.status.as_str(), status_width, status_color(lead.status), is_tty),
            truncate(owner_name(lead), owner_width),
            format_time_ago(lead.updated_ts, now),
            paint(badge.as_str(), 0, badge_color(badge), is_tty),
            id = id_width,
            name = name_width,
            phone = phone_width,
            company = company_width,
            source = source_width,
            owner = owner_width,
            updated = updated_width,
        ));
    }

    output.push_str(&format!("\n{} lead(s)", leads.len()));
    output
}

/// Kanban board, one column per stage, sized to `width`
pub fn format_board(columns: &[StageColumn<'_>], width: usize, is_tty: bool) -> String {
    if columns.is_empty() {
        return String::new();
    }
    let gaps = BOARD_GAP * (columns.len() - 1);
    let column_width = (width.saturating_sub(gaps) / columns.len()).max(BOARD_MIN_COLUMN);
    let gap = " ".repeat(BOARD_GAP);

    let mut output = String::new();

    let headers: Vec<String> = columns.iter()
        .map(|c| {
            let label = truncate(&format!("{} ({})", c.stage, c.leads.len()), column_width);
            paint(&label, column_width, status_color(c.stage), is_tty)
        })
        .collect();
    output.push_str(headers.join(&gap).trim_end());
    output.push('\n');

    let rules: Vec<String> = columns.iter().map(|_| "-".repeat(column_width)).collect();
    output.push_str(&rules.join(&gap));
    output.push('\n');

    let depth = columns.iter().map(|c| c.leads.len()).max().unwrap_or(0);
    for row in 0..depth {
        let cells: Vec<String> = columns.iter()
            .map(|c| {
                let text = c.leads.get(row)
                    .map(|l| truncate(&format!("#{} {}", l.id, l.name), column_width))
                    .unwrap_or_default();
                format!("{:<width$}", text, width = column_width)
            })
            .collect();
        output.push_str(cells.join(&gap).trim_end());
        output.push('\n');
    }

    if depth == 0 {
        output.push_str("(no leads)\n");
    }
    output
}

/// Detailed view of one lead
pub fn format_lead_summary(lead: &Lead, now: i64) -> String {
    let mut output = String::new();

    let header = format!("Lead {}: {}", lead.id, lead.name);
    output.push_str(&header);
    output.push('\n');
    output.push_str(&"=".repeat(header.chars().count().max(40)));
    output.push_str("\n\n");

    let badge = ActivityBadge::from_updated(lead.updated_ts, now);
    output.push_str(&format!("Status:   {}\n", lead.status));
    output.push_str(&format!("Activity: {} ({})\n\n", badge.as_str(), format_time_ago(lead.updated_ts, now)));

    output.push_str("Contact:\n");
    output.push_str(&format!("  Phone:    {}\n", lead.phone));
    output.push_str(&format!("  Email:    {}\n", lead.email.as_deref().unwrap_or("(none)")));
    output.push_str(&format!("  Company:  {}\n", lead.company.as_deref().unwrap_or("(none)")));
    output.push_str(&format!("  Source:   {}\n\n", lead.source));

    match &lead.assigned_to {
        Some(agent) => output.push_str(&format!("Owner:    {} (agent {})\n", agent.name, agent.id)),
        None => output.push_str("Owner:    Unassigned\n"),
    }
    if lead.status.is_locked() {
        output.push_str("Pipeline: locked (deal won)\n");
    }
    output.push_str(&format!("Created:  {}\n", format_timestamp(lead.created_ts)));
    output.push_str(&format!("Updated:  {}\n", format_timestamp(lead.updated_ts)));
    output
}

pub fn format_agent_list(agents: &[Agent]) -> String {
    if agents.is_empty() {
        return "No agents found.".to_string();
    }
    let name_width = agents.iter().map(|a| a.name.chars().count()).max().unwrap_or(4).max(4);

    let mut output = format!("{:<4} {:<name$} {:<6} {}\n", "ID", "Name", "Role", "Email", name = name_width);
    output.push_str(&"-".repeat(name_width + 24));
    output.push('\n');
    for agent in agents {
        output.push_str(&format!(
            "{:<4} {:<name$} {:<6} {}\n",
            agent.id,
            agent.name,
            agent.role.as_str(),
            agent.email.as_deref().unwrap_or(""),
            name = name_width
        ));
    }
    output
}

/// Agent portfolio: headline figures, stage and source breakdowns, active work
pub fn format_portfolio(agent: &Agent, portfolio: &Portfolio<'_>, now: i64) -> String {
    let mut output = String::new();
    let header = format!("Portfolio: {}", agent.name);
    output.push_str(&header);
    output.push('\n');
    output.push_str(&"=".repeat(header.chars().count().max(40)));
    output.push_str("\n\n");

    output.push_str(&format!("Total leads:  {}\n", portfolio.total));
    output.push_str(&format!("Active:       {}\n", portfolio.active));
    output.push_str(&format!("Won:          {}\n", portfolio.won));
    output.push_str(&format!("Conversion:   {}%\n\n", portfolio.conversion));

    output.push_str("By stage:\n");
    for (stage, count) in &portfolio.stage_counts {
        output.push_str(&format!("  {:<11} {}\n", stage.as_str(), count));
    }

    if !portfolio.sources.is_empty() {
        output.push_str("\nBy source:\n");
        for (source, count) in &portfolio.sources {
            output.push_str(&format!("  {:<11} {}\n", truncate(source, 11), count));
        }
    }

    output.push_str("\nActive leads:\n");
    if portfolio.active_leads.is_empty() {
        output.push_str("  (none)\n");
    }
    for lead in &portfolio.active_leads {
        let badge = ActivityBadge::from_updated(lead.updated_ts, now);
        output.push_str(&format!(
            "  #{:<4} {:<24} {:<11} {}\n",
            lead.id,
            truncate(&lead.name, 24),
            lead.status.as_str(),
            badge.as_str()
        ));
    }
    output
}

pub fn format_leaderboard(board: &Leaderboard) -> String {
    let mut output = String::from("Leaderboard\n===========\n\n");
    if board.entries.is_empty() {
        output.push_str("No agents yet.\n");
        return output;
    }

    let name_width = board.entries.iter().map(|e| e.name.chars().count()).max().unwrap_or(4).max(4);
    output.push_str(&format!("{:<4} {:<name$} {:>4} {:>6}\n", "Rank", "Name", "Wins", "XP", name = name_width));
    for (rank, entry) in board.entries.iter().enumerate() {
        output.push_str(&format!(
            "{:<4} {:<name$} {:>4} {:>6}\n",
            rank + 1,
            entry.name,
            entry.wins,
            entry.xp,
            name = name_width
        ));
    }
    output.push_str(&format!("\nTotal closed deals: {}\n", board.total_closed));
    if let Some(top) = &board.top_performer {
        output.push_str(&format!("Top performer: {}\n", top));
    }
    output
}
