use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::process;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use yansi::Paint;

use kcal::api::{self, NutritionClient};
use kcal::config::{self, Settings};
use kcal::display;
use kcal::session::{SearchSession, SessionError};
use kcal::worker::{FetchOutcome, SearchKind};

#[derive(Parser)]
#[command(
    name = "kcal",
    author,
    version,
    about = "Look up calories and macronutrients on Open Food Facts",
    long_about = r#"kcal: look up calories, protein, fat and carbohydrates for packaged food.

Products are fetched from the Open Food Facts database, either by barcode or by
searching for a product name. Set OFF_BASE_URL, OFF_LOCALE and OFF_REGION (or use
`--env-file`) to point at another instance or change the language and country.

Examples:
  1) Look up a barcode:
      kcal barcode 5449000000996
  2) Search by name:
      kcal search nutella
  3) Show the detail view for one product:
      kcal show 3017620422003
  4) Interactive mode:
      kcal interactive
"#,
    after_help = "Use `kcal <subcommand> --help` to get subcommand specific options and usage examples."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Disable request/response logging
    #[arg(long, global = true)]
    silent: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a product by barcode
    #[command(
        about = "Look up a product by barcode",
        long_about = "Fetch the product with the exact barcode and print its nutrient row. A barcode that is not in the database prints a 'not found' notice."
    )]
    Barcode { code: String },
    /// Search products by name
    #[command(
        about = "Search products by name",
        long_about = "Free-text search; prints up to 10 matching products with calories and macronutrients per 100g."
    )]
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show the detail view for one barcode
    #[command(
        about = "Show product details",
        long_about = "Fetch one product afresh and print quantity, serving size and nutrients per 100g and per serving. Lookup errors are printed in place of the details."
    )]
    Show { code: String },
    /// Interactive prompt
    #[command(
        about = "Interactive prompt",
        long_about = "Run searches from a prompt: `b <barcode>`, `t <name>`, `d <row>` for details of a result row, `help`, `quit`. New searches are refused while one is still running."
    )]
    Interactive,
    /// Validate configuration and API connectivity
    #[command(
        about = "Validate configuration and ensure API connectivity.",
        long_about = "Print the effective settings and run a one-result search against the configured API."
    )]
    CheckConfig,
}

fn build_client(settings: &Settings) -> NutritionClient {
    match NutritionClient::from_settings(settings) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(%e, "Failed to create API client");
            eprintln!("{}: {}", Paint::new("Failed to create API client").red(), e);
            process::exit(1);
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn prompt() {
    print!("{} ", Paint::new(">").green().bold());
    let _ = std::io::stdout().flush();
}

fn print_interactive_help() {
    println!("{}", Paint::new("Commands:").bold().underline());
    println!("  b <barcode>   look up a barcode, e.g. 5449000000996 (Coca-Cola),");
    println!("                3017620422003 (Nutella) or 7613034626844 (Nesquik)");
    println!("  t <name>      search by product name");
    println!("  d <row>       show details for a row of the last results");
    println!("  help          show this help");
    println!("  quit          leave");
}

/// Print an outcome the way the one-shot commands and the prompt share.
/// Returns false for a failed search.
fn report_outcome(outcome: &FetchOutcome) -> bool {
    match outcome {
        FetchOutcome::Completed(products) if products.is_empty() => {
            println!("{}", Paint::new("No products found").yellow());
            true
        }
        FetchOutcome::Completed(products) => {
            let table = display::results_table(products);
            println!("\n{table}\n");
            true
        }
        FetchOutcome::Failed(message) => {
            eprintln!("{}: {}", Paint::new("Search failed").red().bold(), message);
            false
        }
    }
}

fn report_session_error(e: &SessionError) {
    match e {
        SessionError::Busy => eprintln!(
            "{}",
            Paint::new("A search is already in progress; wait for it to finish").yellow()
        ),
        _ => eprintln!("{}", Paint::new(e.to_string()).yellow()),
    }
}

async fn run_search(client: NutritionClient, kind: SearchKind, query: &str) -> bool {
    let mut session = SearchSession::new(client);
    if let Err(e) = session.begin(kind, query) {
        report_session_error(&e);
        return false;
    }
    let pb = spinner(format!("Searching by {}...", kind.label()));
    let outcome = session.wait().await;
    pb.finish_and_clear();
    match outcome {
        Some(outcome) => report_outcome(&outcome),
        None => false,
    }
}

enum Event {
    Finished(FetchOutcome),
    Input(std::io::Result<Option<String>>),
}

async fn run_interactive(client: NutritionClient) {
    let mut session = SearchSession::new(client);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_interactive_help();
    prompt();
    loop {
        // Keep reading input while a search runs so a second one can be refused
        let event = match session.in_flight_mut() {
            Some(handle) => tokio::select! {
                outcome = handle.outcome() => Event::Finished(outcome),
                line = lines.next_line() => Event::Input(line),
            },
            None => Event::Input(lines.next_line().await),
        };

        match event {
            Event::Finished(outcome) => {
                session.finish(&outcome);
                println!();
                report_outcome(&outcome);
                prompt();
            }
            Event::Input(Ok(Some(line))) => {
                if !handle_line(&mut session, line.trim()).await {
                    break;
                }
                prompt();
            }
            Event::Input(Ok(None)) => {
                if let Some(outcome) = session.wait().await {
                    println!();
                    report_outcome(&outcome);
                }
                break;
            }
            Event::Input(Err(e)) => {
                tracing::error!(%e, "Failed to read input");
                break;
            }
        }
    }
}

/// Returns false when the user asked to leave.
async fn handle_line(session: &mut SearchSession, line: &str) -> bool {
    let (cmd, rest) = line
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((line, ""));

    match cmd {
        "" => {}
        "q" | "quit" | "exit" => return false,
        "h" | "help" => print_interactive_help(),
        "b" | "barcode" => start_search(session, SearchKind::Barcode, rest),
        "t" | "text" | "search" => start_search(session, SearchKind::Text, rest),
        "d" | "details" => {
            let code = rest
                .parse::<usize>()
                .ok()
                .and_then(|row| session.selected(row))
                .map(|product| product.code.clone());
            match code {
                Some(Some(code)) => {
                    println!("{}", display::load_details(session.client(), &code).await);
                }
                Some(None) => eprintln!("{}", Paint::new("That product has no barcode").yellow()),
                None => eprintln!("{}", Paint::new("No such row in the last results").yellow()),
            }
        }
        other => eprintln!(
            "{} '{}' {}",
            Paint::new("Unknown command").red(),
            other,
            Paint::new("(type `help`)").dim()
        ),
    }
    true
}

fn start_search(session: &mut SearchSession, kind: SearchKind, query: &str) {
    match session.begin(kind, query) {
        Ok(()) => println!("{}", Paint::new(format!("Searching by {}...", kind.label())).dim()),
        Err(e) => report_session_error(&e),
    }
}

async fn check_config(settings: &Settings, client: &NutritionClient) {
    let mut table = display::new_table();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec!["OFF_BASE_URL", settings.base_url.as_str()]);
    table.add_row(vec!["OFF_LOCALE", settings.locale.as_str()]);
    table.add_row(vec!["OFF_REGION", settings.region.as_str()]);
    println!("\n{table}\n");

    match client.search_by_text("water", Some(1)).await {
        Ok(_) => {
            println!("{}", Paint::new("Configuration looks valid (search returned)").green());
        }
        Err(e) => {
            eprintln!("{}: {}", Paint::new("Configuration appears invalid").red(), e);
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    config::load_env_file(cli.env_file.as_deref());
    let settings = Settings::from_env();
    let client = build_client(&settings);

    // The prompt prints its own notices; request echo would interleave with typing
    if cli.silent || matches!(cli.command, None | Some(Commands::Interactive)) {
        api::set_silent(true);
    }

    let ok = match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Barcode { code } => run_search(client, SearchKind::Barcode, &code).await,
        Commands::Search { query } => run_search(client, SearchKind::Text, &query.join(" ")).await,
        Commands::Show { code } => {
            println!("{}", display::load_details(&client, &code).await);
            true
        }
        Commands::Interactive => {
            run_interactive(client).await;
            true
        }
        Commands::CheckConfig => {
            check_config(&settings, &client).await;
            true
        }
    };

    if !ok {
        process::exit(1);
    }
}
