use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ledgerbook::ai::{ChatRole, GeminiClient, TextGenerator};
use ledgerbook::config::{config_dir, load_config, resolve_output_dir, CONFIG_TEMPLATE};
use ledgerbook::error::{LedgerError, Result};
use ledgerbook::ledger::{
    confirmer_from_settings, FilterCriteria, NewTransaction, Transaction, TransactionType,
};
use ledgerbook::plan::Plan;
use ledgerbook::report::{format_money, format_signed, render_text, ExportFormat, ExportOutcome};
use ledgerbook::session::Session;
use ledgerbook::util::words::split_words;

#[derive(Parser)]
#[command(name = "ledgerbook")]
#[command(
    version,
    about = "Small-business bookkeeping with ledger confirmation and AI financial statements",
    long_about = None
)]
struct Cli {
    /// Path to config directory (default: ~/.ledgerbook or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Sign in and run commands read from stdin, one per line
    Session {
        /// Subscription plan for this session (SME, Startup, Enterprise)
        #[arg(long)]
        plan: Option<Plan>,

        /// Email of the signed-in user
        #[arg(long)]
        email: Option<String>,

        /// Start with the two sample ledger entries
        #[arg(long)]
        demo: bool,
    },
}

/// One line typed into a session
#[derive(Parser)]
#[command(name = "ledgerbook", no_binary_name = true, disable_version_flag = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Record a transaction; it stays PENDING until the ledger confirms it
    Add {
        #[arg(short, long)]
        description: String,

        #[arg(short, long, allow_hyphen_values = true)]
        amount: String,

        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,

        /// Category (default: General)
        #[arg(short, long)]
        category: Option<String>,

        /// Ask the AI for a category when none is given
        #[arg(long)]
        suggest: bool,
    },

    /// Suggest a one-word category for a description
    Suggest {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Show the ledger, most recent first
    List(FilterArgs),

    /// Wait until every pending transaction is confirmed or failed
    Wait,

    /// Dashboard totals and spending by category
    Summary,

    /// Export the ledger (or the filtered view) as CSV
    ExportCsv(FilterArgs),

    /// Generate, show or export financial statements
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// Ask the AI tax consultant a question
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Estimate tax liability from annual revenue and expenses
    TaxEstimate {
        #[arg(long)]
        revenue: f64,

        #[arg(long)]
        expenses: f64,
    },

    /// Show the conversation with the tax consultant
    Chat,

    /// Show the audit log, most recent first
    Audit {
        /// Number of entries to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the signed-in user and plan
    Whoami,

    /// Sign out and end the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Args)]
struct FilterArgs {
    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// income or expense
    #[arg(short = 't', long = "type")]
    kind: Option<TransactionType>,

    /// Text to find in description or category
    #[arg(short, long)]
    search: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            from: args.from,
            to: args.to,
            kind: args.kind,
            search: args.search,
        }
    }
}

#[derive(Subcommand)]
enum ReportAction {
    /// Ask the AI auditor for statements over the current ledger
    Generate,

    /// Print the current statements
    Show,

    /// Save or print the current statements
    Export {
        /// pdf, text or print
        #[arg(short, long, default_value = "pdf")]
        format: ExportFormat,
    },
}

enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Session { plan, email, demo } => {
            cmd_session(&cfg_dir, plan, email, demo).await
        }
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(LedgerError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized ledgerbook config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company and plan:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Export your AI key:          export GEMINI_API_KEY=...");
    println!();
    println!("Then start a session:");
    println!("  ledgerbook session --demo");

    Ok(())
}

async fn cmd_session(
    cfg_dir: &Path,
    plan: Option<Plan>,
    email: Option<String>,
    demo: bool,
) -> Result<()> {
    let mut config = load_config(cfg_dir)?;
    if let Some(plan) = plan {
        config.session.plan = plan;
    }
    if let Some(email) = email {
        config.session.email = email;
    }
    if demo {
        config.session.seed_samples = true;
    }

    let output_dir = resolve_output_dir(&config.export.output_dir, cfg_dir);
    let confirmer = confirmer_from_settings(&config.confirmation)?;
    let ai: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_settings(&config.ai));
    let mut session = Session::start(config, output_dir, confirmer, ai).await;

    let principal = session.principal();
    println!(
        "Signed in as {} ({}) on the {} plan. Type 'help' for commands.",
        principal.email, principal.business_name, principal.plan
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words = match split_words(&line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("Error: {e}");
                continue;
            }
        };
        if words.is_empty() || words[0].starts_with('#') {
            continue;
        }

        let parsed = match SessionLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                let _ = e.print();
                continue;
            }
        };

        match run_command(&mut session, parsed.command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    session.logout().await;
    println!("Signed out.");
    Ok(())
}

async fn run_command(session: &mut Session, command: SessionCommand) -> Result<Flow> {
    match command {
        SessionCommand::Add {
            description,
            amount,
            kind,
            category,
            suggest,
        } => cmd_add(session, description, amount, kind, category, suggest).await?,
        SessionCommand::Suggest { description } => {
            let category = session.suggest_category(&description.join(" ")).await?;
            println!("Suggested category: {category}");
        }
        SessionCommand::List(filter) => cmd_list(session, filter.into()).await?,
        SessionCommand::Wait => {
            let pending = session.wait_for_confirmations().await;
            println!("All confirmations settled ({pending} were pending).");
        }
        SessionCommand::Summary => cmd_summary(session).await?,
        SessionCommand::ExportCsv(filter) => {
            let export = session.export_csv(&filter.into()).await?;
            let scope = if export.filtered { "filtered" } else { "full" };
            println!(
                "Exported {} transactions ({scope} ledger) to {}",
                export.rows,
                export.path.display()
            );
        }
        SessionCommand::Report { action } => cmd_report(session, action).await?,
        SessionCommand::Ask { question } => {
            let reply = session.ask_tax_advisor(&question.join(" ")).await?;
            println!("{reply}");
        }
        SessionCommand::TaxEstimate { revenue, expenses } => {
            let reply = session.estimate_tax(revenue, expenses).await?;
            println!("{reply}");
        }
        SessionCommand::Chat => {
            for turn in session.advisor_history()? {
                let who = match turn.role {
                    ChatRole::User => "You",
                    ChatRole::Assistant => "LedgerBot",
                };
                println!("{who}: {}", turn.text);
                println!();
            }
        }
        SessionCommand::Audit { limit } => cmd_audit(session, limit).await?,
        SessionCommand::Whoami => {
            let principal = session.principal();
            println!("User:     {} ({})", principal.user, principal.email);
            println!("Business: {}", principal.business_name);
            println!("Plan:     {}", principal.plan);
        }
        SessionCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn cmd_add(
    session: &Session,
    description: String,
    amount: String,
    kind: TransactionType,
    category: Option<String>,
    suggest: bool,
) -> Result<()> {
    let category = match category {
        Some(category) => Some(category),
        None if suggest => {
            let suggested = session.suggest_category(&description).await?;
            println!("Suggested category: {suggested}");
            Some(suggested)
        }
        None => None,
    };

    let tx = session
        .add_transaction(NewTransaction {
            description,
            amount,
            kind,
            category,
        })
        .await?;

    println!(
        "Added {} ({}): {} {} [{}]. Confirming on ledger...",
        tx.id,
        tx.status(),
        tx.description,
        format_signed(tx.signed_amount(), session.currency_symbol()),
        tx.category
    );
    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "LEDGER")]
    ledger: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "USER")]
    user: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "DETAILS")]
    details: String,
}

fn transaction_row(tx: &Transaction, currency_symbol: &str) -> TransactionRow {
    TransactionRow {
        id: tx.id.clone(),
        date: tx.date.to_string(),
        description: tx.description.clone(),
        category: tx.category.clone(),
        amount: format_signed(tx.signed_amount(), currency_symbol),
        status: tx.status().to_string(),
        ledger: tx
            .ledger_index()
            .map(|i| format!("#{i}"))
            .unwrap_or_else(|| "-".to_string()),
    }
}

async fn cmd_list(session: &Session, criteria: FilterCriteria) -> Result<()> {
    let transactions = session.transactions(&criteria).await?;

    if transactions.is_empty() {
        if criteria.is_active() {
            println!(
                "No transactions match the {} active filter(s).",
                criteria.active_count()
            );
        } else {
            println!("No transactions recorded yet.");
            println!("Add one with: add -d \"Office Rent Payment\" -a 120000 -t expense");
        }
        return Ok(());
    }

    let rows: Vec<TransactionRow> = transactions
        .iter()
        .rev()
        .map(|tx| transaction_row(tx, session.currency_symbol()))
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    if criteria.is_active() {
        println!("{} transaction(s) match.", transactions.len());
    }

    Ok(())
}

async fn cmd_summary(session: &Session) -> Result<()> {
    let summary = session.summary().await?;
    let symbol = session.currency_symbol();

    println!("Total income:   {}", format_money(summary.total_income, symbol));
    println!("Total expenses: {}", format_money(summary.total_expense, symbol));
    println!("Net profit:     {}", format_money(summary.net_profit, symbol));

    if !summary.by_category.is_empty() {
        let rows: Vec<CategoryRow> = summary
            .by_category
            .iter()
            .map(|(category, amount)| CategoryRow {
                category: category.clone(),
                amount: format_money(*amount, symbol),
            })
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!();
        println!("{table}");
    }

    Ok(())
}

async fn cmd_report(session: &mut Session, action: ReportAction) -> Result<()> {
    match action {
        ReportAction::Generate => {
            println!("Auditing ledger...");
            let status = session.generate_report().await?;
            let report = session.report()?;
            println!(
                "Financial statements for {} generated (period ended {}).",
                report.company_name, report.statement_date
            );
            if !status.balanced {
                println!(
                    "Warning: the statement of financial position does not balance \
                     (assets differ from equity and liabilities by {}).",
                    format_money(status.imbalance, session.currency_symbol())
                );
            }
            println!("Use 'report show' to view or 'report export' to save.");
        }
        ReportAction::Show => {
            let doc = session.document()?;
            print!("{}", render_text(&doc));
        }
        ReportAction::Export { format } => match session.export_report(format).await? {
            ExportOutcome::Saved(path) => println!("Saved {format}: {}", path.display()),
            ExportOutcome::Printed => println!("Sent statements to the printer."),
        },
    }
    Ok(())
}

async fn cmd_audit(session: &Session, limit: Option<usize>) -> Result<()> {
    let entries = session.audit_log().await?;
    let shown = limit.unwrap_or(entries.len());

    let rows: Vec<AuditRow> = entries
        .iter()
        .take(shown)
        .map(|e| AuditRow {
            time: e
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            user: e.user.clone(),
            action: e.action.to_string(),
            details: e.details.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
