use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use configuration::ConfigArgs;
// Import database types directly from the database crate
use database::{connect, run_migrations, DbRepository, LoanLedger};

mod error;
mod menu;
mod render;

/// The main entry point for the Libris library CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config(&cli.config.config)
        .with_context(|| format!("Failed to load {}", cli.config.config.display()))?;
    let _log_guard = configuration::init_logging(&config.logging)?;

    // Initialize the database connection and run migrations
    let db_pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    let repo = DbRepository::new(db_pool.clone());
    let ledger = LoanLedger::new(db_pool, config.loans.loan_period()?);

    // Execute the appropriate command
    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            menu::Menu::new(&repo, &ledger, stdin.lock(), stdout.lock())
                .run()
                .await?;
        }
        Commands::Migrate => println!("Database schema is up to date."),
        Commands::Overdue(args) => handle_overdue(args, &repo).await?,
        Commands::Restock(args) => handle_restock(args, &repo).await?,
        Commands::Audit => handle_audit(&ledger).await?,
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A terminal front desk for a small lending library.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu (the default when no command is given).
    Menu,
    /// Apply the database migrations and exit.
    Migrate,
    /// Print every open loan that is past its due date.
    Overdue(OverdueArgs),
    /// Add Available copies to an existing title.
    Restock(RestockArgs),
    /// Check that every copy's status agrees with its open loans.
    Audit,
}

#[derive(Parser)]
struct OverdueArgs {
    /// The report date (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

#[derive(Parser)]
struct RestockArgs {
    /// The title to restock.
    #[arg(long)]
    book_id: i32,

    /// How many copies to add.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    copies: u32,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn handle_overdue(args: OverdueArgs, repo: &DbRepository) -> anyhow::Result<()> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let rows = repo.overdue_report(as_of).await?;
    if rows.is_empty() {
        println!("No overdue loans as of {as_of}.");
    } else {
        println!("{}", render::overdue_table(&rows, as_of));
    }
    Ok(())
}

async fn handle_restock(args: RestockArgs, repo: &DbRepository) -> anyhow::Result<()> {
    let added = repo.restock(args.book_id, args.copies).await?;
    println!("Success: added {added} copies to book {}.", args.book_id);
    Ok(())
}

async fn handle_audit(ledger: &LoanLedger) -> anyhow::Result<()> {
    let discrepancies = ledger.audit().await?;
    if discrepancies.is_empty() {
        println!("Every copy's status matches its loan records.");
        return Ok(());
    }
    println!("{}", render::audit_table(&discrepancies));
    anyhow::bail!("{} copies disagree with their loan records", discrepancies.len())
}
