use clap::{Parser, Subcommand};
use crate::cli::abbrev;
use crate::cli::error::{parse_lead_id_list, user_error, validate_lead_id, validate_non_empty, validate_phone};
use crate::cli::output::{
    format_agent_list, format_board, format_lead_list_table, format_lead_summary,
    format_leaderboard, format_portfolio, get_terminal_width, is_tty,
};
use crate::config::Config;
use crate::db::DbConnection;
use crate::models::{Agent, AgentRef, AgentRole, Lead, LeadPatch, LeadStatus, NewLead};
use crate::pipeline::stats::{leaderboard, portfolio};
use crate::pipeline::{
    BulkSelection, Coordinator, Notice, NoticeLevel, PipelineEvent, QuickFilter, StatusFilter, ViewFilter,
};
use crate::store::{LeadScope, LeadStore, SqliteStore};
use crate::utils::now_ts;
use anyhow::{anyhow, Context, Result};

#[derive(Parser)]
#[command(name = "leadpipe")]
#[command(about = "Lead pipeline engine - capture, assign and move sales leads through stages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Act as this agent (ID or name), overriding `operator` in the rc file
    #[arg(long = "as", global = true, value_name = "AGENT")]
    pub actor: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new lead (always starts in New)
    Add {
        /// Lead name
        name: String,
        /// Phone number
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        company: Option<String>,
        /// Where the lead came from (defaults to Manual)
        #[arg(long)]
        source: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List leads
    List {
        /// Match name (case-insensitive) or phone
        #[arg(short, long)]
        search: Option<String>,
        /// Stage name or "All"
        #[arg(long)]
        status: Option<String>,
        /// Only leads without an owner
        #[arg(long)]
        unassigned: bool,
        /// Only leads owned by this agent (ID or name)
        #[arg(long)]
        agent: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the kanban board
    Board {
        /// Match name (case-insensitive) or phone
        #[arg(short, long)]
        search: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show detailed summary of a lead
    Show {
        /// Lead ID
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Move a lead to another stage (unassigned leads are taken by the operator)
    Move {
        /// Lead ID
        id: String,
        /// Target stage
        stage: String,
    },
    /// Edit lead fields directly
    Edit {
        /// Lead ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// New email, or "none" to clear it
        #[arg(long)]
        email: Option<String>,
        /// New company, or "none" to clear it
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        source: Option<String>,
        /// Set the stage directly (allowed even for closed leads)
        #[arg(long)]
        status: Option<String>,
        /// Hand the lead to this agent (ID or name), or "none" to unassign
        #[arg(long)]
        assign: Option<String>,
    },
    /// Permanently delete lead(s)
    Delete {
        /// Lead ID(s): comma-separated list and ranges, e.g. "1,3,5-7"
        ids: String,
    },
    /// Quick select leads, then optionally assign or delete them in one batch
    Select {
        /// "unassigned" or a stage name (Closed is never offered)
        filter: String,
        /// How many leads to take (defaults to quickselect.count)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Assign the selection to this agent (ID or name)
        #[arg(long, conflicts_with = "delete")]
        assign: Option<String>,
        /// Delete the selection
        #[arg(long)]
        delete: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Assign explicit lead IDs to an agent in one batch
    Assign {
        /// Lead ID(s): comma-separated list and ranges
        ids: String,
        /// Agent ID or name
        #[arg(long = "to")]
        agent: Option<String>,
    },
    /// Agent management commands
    Agents {
        #[command(subcommand)]
        subcommand: AgentCommands,
    },
    /// Show an agent's portfolio
    Stats {
        /// Agent ID or name (defaults to the operator)
        #[arg(long)]
        agent: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Rank agents by won deals
    Leaderboard {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AgentCommands {
    /// Create a new agent
    Add {
        name: String,
        #[arg(long)]
        email: Option<String>,
        /// Create the agent as an admin
        #[arg(long)]
        admin: bool,
    },
    /// List agents
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    args = match abbrev::expand_command_abbreviations(args) {
        Ok(expanded) => expanded,
        Err(e) => user_error(&e),
    };

    // Bare lead ID shows the lead
    if args.len() == 1 && validate_lead_id(&args[0]).is_ok() {
        args.insert(0, "show".to_string());
    }

    let clap_args = std::iter::once("leadpipe".to_string())
        .chain(args)
        .collect::<Vec<_>>();
    let cli = match Cli::try_parse_from(clap_args) {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            if e.use_stderr() {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    let actor = cli.actor.as_deref();
    match cli.command {
        Commands::Add { name, phone, email, company, source, json } => {
            handle_add(actor, name, phone, email, company, source, json)
        }
        Commands::List { search, status, unassigned, agent, json } => {
            handle_list(search, status, unassigned, agent, json)
        }
        Commands::Board { search, json } => handle_board(search, json),
        Commands::Show { id, json } => handle_show(&id, json),
        Commands::Move { id, stage } => handle_move(actor, &id, &stage),
        Commands::Edit { id, name, phone, email, company, source, status, assign } => {
            let edits = LeadEdits { name, phone, email, company, source, status, assign };
            handle_edit(&id, edits)
        }
        Commands::Delete { ids } => handle_delete(&ids),
        Commands::Select { filter, count, assign, delete, json } => {
            handle_select(&filter, count, assign, delete, json)
        }
        Commands::Assign { ids, agent } => handle_assign(&ids, agent),
        Commands::Agents { subcommand } => handle_agents(subcommand),
        Commands::Stats { agent, json } => handle_stats(actor, agent, json),
        Commands::Leaderboard { json } => handle_leaderboard(json),
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => user_error(&format!("{:#}", e)),
    }
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    let conn = DbConnection::connect(config)
        .context("Failed to connect to database")?;
    Ok(SqliteStore::new(conn))
}

/// Config plus a coordinator whose cache holds every lead
fn open_coordinator() -> Result<(Config, Coordinator<SqliteStore>)> {
    let config = load_config();
    let store = open_store(&config)?;
    let coordinator = Coordinator::load(store)
        .map_err(|e| anyhow!("Failed to load leads: {}", e))?;
    Ok((config, coordinator))
}

/// Print success notices; failures are reported through the returned error
fn print_notices<S: LeadStore>(coordinator: &mut Coordinator<S>, quiet: bool) {
    for event in coordinator.drain_events() {
        match event {
            PipelineEvent::Notice(Notice { level: NoticeLevel::Success, message }) if !quiet => {
                println!("{}", message);
            }
            PipelineEvent::DealWon { lead_id } => log::info!("Deal won on lead {}", lead_id),
            _ => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Find an agent by numeric ID or case-insensitive name
fn find_agent<'a>(agents: &'a [Agent], who: &str) -> Option<&'a Agent> {
    let who = who.trim();
    match who.parse::<i64>() {
        Ok(id) => agents.iter().find(|a| a.id == id),
        Err(_) => agents.iter().find(|a| a.name.eq_ignore_ascii_case(who)),
    }
}

fn require_agent<S: LeadStore>(store: &mut S, who: &str) -> Result<Agent> {
    let agents = store.list_agents()?;
    match find_agent(&agents, who) {
        Some(agent) => Ok(agent.clone()),
        None => user_error(&format!("Agent '{}' not found", who)),
    }
}

/// The acting agent: `--as` first, then `operator` from the rc file
fn operator_name(actor: Option<&str>, config: &Config) -> Option<String> {
    actor.map(str::to_string).or_else(|| config.operator.map(|id| id.to_string()))
}

fn require_operator<S: LeadStore>(store: &mut S, actor: Option<&str>, config: &Config) -> Result<AgentRef> {
    match operator_name(actor, config) {
        Some(who) => Ok(require_agent(store, &who)?.to_ref()),
        None => user_error("No operator set. Pass --as <agent> or set operator=<agent id> in ~/.leadpipe/rc"),
    }
}

fn parse_stage(value: &str) -> LeadStatus {
    match LeadStatus::from_str(value) {
        Some(stage) => stage,
        None => user_error(&format!(
            "Invalid stage: '{}'. Valid stages: New, Contacted, Interested, Closed, Lost.",
            value
        )),
    }
}

fn parse_id(value: &str) -> i64 {
    validate_lead_id(value).unwrap_or_else(|e| user_error(&e))
}

fn handle_add(
    actor: Option<&str>,
    name: String,
    phone: String,
    email: Option<String>,
    company: Option<String>,
    source: Option<String>,
    json: bool,
) -> Result<()> {
    if let Err(e) = validate_non_empty(&name, "Name").and_then(|_| validate_phone(&phone)) {
        user_error(&e);
    }

    let (config, mut coordinator) = open_coordinator()?;
    let created_by = match operator_name(actor, &config) {
        Some(who) => Some(require_agent(coordinator.store_mut(), &who)?.id),
        None => None,
    };

    let new_lead = NewLead {
        name,
        phone,
        email,
        company,
        source,
        created_by,
    };
    let result = coordinator.add_lead(new_lead);
    print_notices(&mut coordinator, json);
    let lead = result?;

    if json {
        print_json(&lead)?;
    }
    Ok(())
}

fn handle_list(
    search: Option<String>,
    status: Option<String>,
    unassigned: bool,
    agent: Option<String>,
    json: bool,
) -> Result<()> {
    let status = match status.as_deref() {
        None => StatusFilter::All,
        Some(value) => StatusFilter::parse(value).unwrap_or_else(|| {
            user_error(&format!("Invalid status filter: '{}'. Use All or a stage name.", value))
        }),
    };
    let filter = ViewFilter {
        search: search.unwrap_or_default(),
        status,
        unassigned_only: unassigned,
    };

    let (_config, mut coordinator) = open_coordinator()?;

    let scoped: Vec<Lead>;
    let leads: Vec<&Lead> = match agent {
        Some(who) => {
            let agent = require_agent(coordinator.store_mut(), &who)?;
            scoped = coordinator.store_mut().list_leads(LeadScope::AssignedTo(agent.id))?;
            crate::pipeline::project(&scoped, &filter)
        }
        None => coordinator.project(&filter),
    };

    if json {
        print_json(&leads)?;
    } else {
        println!("{}", format_lead_list_table(&leads, now_ts(), is_tty()));
    }
    Ok(())
}

fn handle_board(search: Option<String>, json: bool) -> Result<()> {
    let (_config, coordinator) = open_coordinator()?;
    let columns = coordinator.project_by_stage(search.as_deref().unwrap_or(""));

    if json {
        print_json(&columns)?;
    } else {
        print!("{}", format_board(&columns, get_terminal_width(), is_tty()));
    }
    Ok(())
}

fn handle_show(id: &str, json: bool) -> Result<()> {
    let id = parse_id(id);
    let (_config, coordinator) = open_coordinator()?;
    let Some(lead) = coordinator.find(id) else {
        user_error(&format!("Lead {} not found", id));
    };

    if json {
        print_json(lead)?;
    } else {
        print!("{}", format_lead_summary(lead, now_ts()));
    }
    Ok(())
}

fn handle_move(actor: Option<&str>, id: &str, stage: &str) -> Result<()> {
    let id = parse_id(id);
    let target = parse_stage(stage);

    let (config, mut coordinator) = open_coordinator()?;
    let operator = require_operator(coordinator.store_mut(), actor, &config)?;

    let result = coordinator.move_lead(id, target, &operator);
    print_notices(&mut coordinator, false);
    result?;
    Ok(())
}

/// Field edits collected from the command line
struct LeadEdits {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    company: Option<String>,
    source: Option<String>,
    status: Option<String>,
    assign: Option<String>,
}

fn is_none_keyword(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("none")
}

/// "none" clears a nullable field
fn clearable(value: String) -> Option<String> {
    if is_none_keyword(&value) {
        None
    } else {
        Some(value)
    }
}

fn handle_edit(id: &str, edits: LeadEdits) -> Result<()> {
    let id = parse_id(id);
    if let Some(phone) = &edits.phone {
        if let Err(e) = validate_phone(phone) {
            user_error(&e);
        }
    }

    let (_config, mut coordinator) = open_coordinator()?;
    let assigned_to = match edits.assign {
        Some(who) if is_none_keyword(&who) => Some(None),
        Some(who) => Some(Some(require_agent(coordinator.store_mut(), &who)?.id)),
        None => None,
    };

    let patch = LeadPatch {
        name: edits.name,
        phone: edits.phone,
        email: edits.email.map(clearable),
        company: edits.company.map(clearable),
        source: edits.source,
        status: edits.status.as_deref().map(parse_stage),
        assigned_to,
    };

    let result = coordinator.edit_lead(id, patch);
    print_notices(&mut coordinator, false);
    result?;
    Ok(())
}

fn handle_delete(ids: &str) -> Result<()> {
    let ids = parse_lead_id_list(ids).unwrap_or_else(|e| user_error(&e));
    let (_config, mut coordinator) = open_coordinator()?;

    let result = match ids.as_slice() {
        [single] => coordinator.delete_lead(*single).map(|_| 1),
        many => coordinator.bulk_delete(many),
    };
    print_notices(&mut coordinator, false);
    result?;
    Ok(())
}

fn handle_select(
    filter: &str,
    count: Option<usize>,
    assign: Option<String>,
    delete: bool,
    json: bool,
) -> Result<()> {
    let filter = QuickFilter::parse(filter)?;
    let (config, mut coordinator) = open_coordinator()?;
    let count = count.unwrap_or(config.quick_select_count);

    let mut selection = BulkSelection::new();
    let quiet = json && assign.is_none() && !delete;
    let result = coordinator.quick_select(&mut selection, filter, count);
    print_notices(&mut coordinator, quiet);
    result?;

    if let Some(who) = assign {
        let agent = require_agent(coordinator.store_mut(), &who)?;
        let result = coordinator.bulk_assign(selection.ids(), Some(agent.id));
        print_notices(&mut coordinator, false);
        result?;
        return Ok(());
    }

    if delete {
        let result = coordinator.bulk_delete(selection.ids());
        print_notices(&mut coordinator, false);
        result?;
        return Ok(());
    }

    let chosen: Vec<&Lead> = selection.ids().iter()
        .filter_map(|id| coordinator.find(*id))
        .collect();
    if json {
        print_json(&chosen)?;
    } else {
        println!("{}", format_lead_list_table(&chosen, now_ts(), is_tty()));
    }
    Ok(())
}

fn handle_assign(ids: &str, agent: Option<String>) -> Result<()> {
    let ids = parse_lead_id_list(ids).unwrap_or_else(|e| user_error(&e));
    let (_config, mut coordinator) = open_coordinator()?;

    let agent_id = match agent {
        Some(who) => Some(require_agent(coordinator.store_mut(), &who)?.id),
        None => None,
    };

    let result = coordinator.bulk_assign(&ids, agent_id);
    print_notices(&mut coordinator, false);
    result?;
    Ok(())
}

fn handle_agents(cmd: AgentCommands) -> Result<()> {
    let config = load_config();
    let mut store = open_store(&config)?;

    match cmd {
        AgentCommands::Add { name, email, admin } => {
            if let Err(e) = validate_non_empty(&name, "Agent name") {
                user_error(&e);
            }
            let role = if admin { AgentRole::Admin } else { AgentRole::Agent };
            let agent = store.create_agent(name.trim(), email.as_deref(), role)?;
            println!("Created agent {}: {} ({})", agent.id, agent.name, agent.role.as_str());
        }
        AgentCommands::List { json } => {
            let agents = store.list_agents()?;
            if json {
                print_json(&agents)?;
            } else {
                print!("{}", format_agent_list(&agents));
            }
        }
    }
    Ok(())
}

fn handle_stats(actor: Option<&str>, agent: Option<String>, json: bool) -> Result<()> {
    let (config, mut coordinator) = open_coordinator()?;
    let who = match agent.or_else(|| operator_name(actor, &config)) {
        Some(who) => who,
        None => user_error("No agent given. Pass --agent <agent>, --as <agent>, or set operator in ~/.leadpipe/rc"),
    };
    let agent = require_agent(coordinator.store_mut(), &who)?;

    let stats = portfolio(coordinator.leads(), agent.id);
    if json {
        print_json(&stats)?;
    } else {
        print!("{}", format_portfolio(&agent, &stats, now_ts()));
    }
    Ok(())
}

fn handle_leaderboard(json: bool) -> Result<()> {
    let (_config, mut coordinator) = open_coordinator()?;
    let agents = coordinator.store_mut().list_agents()?;
    let board = leaderboard(&agents, coordinator.leads());

    if json {
        print_json(&board)?;
    } else {
        print!("{}", format_leaderboard(&board));
    }
    Ok(())
}
