use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures::future::join_all;
use serde::Serialize;
use tracing::info;

use rfq_ledger_rs::ledger::{
    BidRequest, BidResponse, LedgerClient, ManualClock, MockLedgerClient, RfqRequest,
    RfqResponse, SystemClock,
};
use rfq_ledger_rs::settings::LedgerSettings;
use rfq_ledger_rs::telemetry;

#[derive(Parser)]
#[command(name = "rfq-ledger", about = "Simulated blockchain calls for RFQ bidding")]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip real waiting; simulated latency only advances a manual clock
    #[arg(long, global = true)]
    instant: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    CreateRfq(RfqArgs),
    GetRfq { id: String },
    SubmitBid(BidArgs),
    GetBid { id: String },
    /// Fire N concurrent create-rfq calls and count distinct ids
    Burst {
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Interactive prompt
    Shell,
}

#[derive(Args)]
struct RfqArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    scope: String,
    #[arg(long, default_value = "")]
    deadline: String,
    #[arg(long, default_value = "")]
    criteria: String,
    #[arg(long, default_value = "")]
    budget: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    location: String,
}

impl From<RfqArgs> for RfqRequest {
    fn from(a: RfqArgs) -> Self {
        RfqRequest {
            title: a.title,
            scope: a.scope,
            deadline: a.deadline,
            evaluation_criteria: a.criteria,
            budget: a.budget,
            category: a.category,
            location: a.location,
        }
    }
}

#[derive(Args)]
struct BidArgs {
    #[arg(long, default_value = "")]
    rfq_id: String,
    #[arg(long, default_value = "")]
    price: String,
    #[arg(long, default_value = "")]
    timeline: String,
    #[arg(long, default_value = "")]
    qualifications: String,
    #[arg(long, default_value = "")]
    document_hash: String,
}

impl From<BidArgs> for BidRequest {
    fn from(a: BidArgs) -> Self {
        BidRequest {
            rfq_id: a.rfq_id,
            price: a.price,
            timeline: a.timeline,
            qualifications: a.qualifications,
            document_hash: a.document_hash,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("  {label}: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

async fn burst(client: &dyn LedgerClient, count: usize) -> anyhow::Result<()> {
    let request = RfqRequest {
        title: "Burst RFQ".into(),
        ..RfqRequest::default()
    };
    let results = join_all((0..count).map(|_| client.create_rfq(&request))).await;
    let mut ids = HashSet::new();
    for result in results {
        ids.insert(result?.entity.into_string());
    }
    println!("{} calls, {} distinct ids", count, ids.len());
    Ok(())
}

async fn run_shell(client: &dyn LedgerClient) -> anyhow::Result<()> {
    loop {
        print!("\nRFQ LEDGER> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let command = input.trim().to_lowercase();

        let outcome = match command.as_str() {
            "help" | "h" => {
                println!("Available commands:");
                println!("  1, create_rfq   - Create an RFQ");
                println!("  2, get_rfq      - Fetch an RFQ by id");
                println!("  3, submit_bid   - Submit a bid");
                println!("  4, get_bid      - Fetch a bid by id");
                println!("  quit, q         - Exit");
                Ok(())
            }
            "1" | "create_rfq" => {
                let request = RfqRequest {
                    title: prompt("title")?,
                    scope: prompt("scope")?,
                    deadline: prompt("deadline")?,
                    evaluation_criteria: prompt("evaluation criteria")?,
                    budget: prompt("budget")?,
                    category: prompt("category")?,
                    location: prompt("location")?,
                };
                match client.create_rfq(&request).await {
                    Ok(result) => print_json(&result),
                    Err(e) => Err(e.into()),
                }
            }
            "2" | "get_rfq" => {
                let id = prompt("rfq id")?;
                match client.get_rfq(&id).await {
                    Ok(rfq) => print_json(&RfqResponse::from(rfq)),
                    Err(e) => Err(e.into()),
                }
            }
            "3" | "submit_bid" => {
                let request = BidRequest {
                    rfq_id: prompt("rfq id")?,
                    price: prompt("price")?,
                    timeline: prompt("timeline")?,
                    qualifications: prompt("qualifications")?,
                    document_hash: prompt("document hash")?,
                };
                match client.submit_bid(&request).await {
                    Ok(result) => print_json(&result),
                    Err(e) => Err(e.into()),
                }
            }
            "4" | "get_bid" => {
                let id = prompt("bid id")?;
                match client.get_bid(&id).await {
                    Ok(bid) => print_json(&BidResponse::from(bid)),
                    Err(e) => Err(e.into()),
                }
            }
            "quit" | "q" | "exit" => {
                println!("Goodbye!");
                break;
            }
            "" => continue,
            _ => {
                println!("Unknown command. Type 'help' for available commands.");
                Ok(())
            }
        };

        // keep the shell alive on failures
        if let Err(e) = outcome {
            eprintln!("❌ {e:#}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    let settings = LedgerSettings::load(cli.config.as_deref()).context("loading settings")?;

    telemetry::init_tracing(&settings.log_filter);
    telemetry::init_metrics()?;

    let profile = settings.profile();
    info!(?profile, instant = cli.instant, "starting mock ledger client");

    let client: Arc<dyn LedgerClient> = if cli.instant {
        Arc::new(MockLedgerClient::with_clock(Arc::new(ManualClock::default()), profile))
    } else {
        Arc::new(MockLedgerClient::with_clock(Arc::new(SystemClock), profile))
    };

    match cli.command {
        Command::CreateRfq(args) => print_json(&client.create_rfq(&args.into()).await?)?,
        Command::GetRfq { id } => print_json(&RfqResponse::from(client.get_rfq(&id).await?))?,
        Command::SubmitBid(args) => print_json(&client.submit_bid(&args.into()).await?)?,
        Command::GetBid { id } => print_json(&BidResponse::from(client.get_bid(&id).await?))?,
        Command::Burst { count } => burst(client.as_ref(), count).await?,
        Command::Shell => run_shell(client.as_ref()).await?,
    }

    Ok(())
}
