use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use prospectus::{
    AnalysisPlan, GeneratorConfig, HumanReport, OllamaClient, OllamaConfig, ReportEnvelope,
    RetryConfig, SectionPlan, TreeComposer, esg_plan, format_instructions, technical_plan,
};

#[derive(Parser)]
#[command(name = "prospectus")]
#[command(author, version, about = "Structured financial analysis report generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a technical analysis report for a ticker
    Technical {
        /// Ticker symbol to analyze
        #[arg(short, long, default_value = "AAPL")]
        ticker: String,

        /// Output file for the report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable rendering (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Shorter timeframe wording used in the prompts
        #[arg(long, default_value = "5 minutes")]
        short_timeframe: String,

        /// Longer timeframe wording used in the prompts
        #[arg(long, default_value = "1 hour")]
        long_timeframe: String,

        #[command(flatten)]
        backend: BackendArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate an ESG analysis report for a ticker
    Esg {
        /// Ticker symbol to analyze
        #[arg(short, long, default_value = "AAPL")]
        ticker: String,

        /// Output file for the report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable rendering (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        #[command(flatten)]
        backend: BackendArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a domain's section plan and shape contracts without calling the backend
    Describe {
        /// Domain to describe
        #[arg(short, long, value_enum, default_value_t = Domain::Technical)]
        domain: Domain,

        /// Also print the full shape contract of every section
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Domain {
    Technical,
    Esg,
}

#[derive(Debug, Clone, clap::Args)]
struct BackendArgs {
    /// Model to run (defaults to OLLAMA_MODEL or the built-in default)
    #[arg(long)]
    model: Option<String>,

    /// Ollama base URL (defaults to OLLAMA_BASE_URL or localhost)
    #[arg(long)]
    base_url: Option<String>,

    /// Corrective attempts allowed after the initial one, per section
    #[arg(long, default_value = "15")]
    max_retries: u32,

    /// Per-attempt timeout in seconds; 0 disables it
    #[arg(long, default_value = "300")]
    attempt_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Technical {
            ticker,
            output,
            human_readable,
            short_timeframe,
            long_timeframe,
            backend,
            verbose,
        } => {
            setup_logging(verbose);
            let plan = technical_plan(&ticker, &short_timeframe, &long_timeframe);
            run_report(plan, "technical", output, human_readable, backend).await
        }
        Commands::Esg {
            ticker,
            output,
            human_readable,
            backend,
            verbose,
        } => {
            setup_logging(verbose);
            let plan = esg_plan(&ticker);
            run_report(plan, "esg", output, human_readable, backend).await
        }
        Commands::Describe { domain, verbose } => {
            let plan = match domain {
                Domain::Technical => technical_plan("TICKER", "5 minutes", "1 hour"),
                Domain::Esg => esg_plan("TICKER"),
            };
            describe_plan(&plan, verbose);
            Ok(())
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run_report(
    plan: AnalysisPlan,
    domain: &str,
    output: PathBuf,
    human_readable: Option<PathBuf>,
    backend: BackendArgs,
) -> Result<()> {
    let mut backend_config = OllamaConfig::from_env();
    if let Some(model) = backend.model {
        backend_config.model = model;
    }
    if let Some(base_url) = backend.base_url {
        backend_config.base_url = base_url;
    }

    info!(
        ticker = %plan.ticker,
        model = %backend_config.model,
        sections = plan.root.node_count(),
        "generating {} report",
        domain
    );

    let client = OllamaClient::new(backend_config);
    let config = GeneratorConfig {
        retry: RetryConfig {
            max_retries: backend.max_retries,
            attempt_timeout_secs: (backend.attempt_timeout > 0).then_some(backend.attempt_timeout),
        },
        ..Default::default()
    };

    let composer = TreeComposer::new(&client, config);
    let document = composer.evaluate(&plan).await?;

    let envelope = ReportEnvelope::new(&plan.ticker, domain, &document);
    envelope.write_json(&output)?;
    info!("Report written to {:?}", output);

    if let Some(path) = human_readable {
        HumanReport::new(&document).write_file(&path)?;
        info!("Human-readable report written to {:?}", path);
    }

    Ok(())
}

fn describe_plan(plan: &AnalysisPlan, verbose: bool) {
    println!("Plan: {} ({} sections)", plan.label, plan.root.node_count());
    println!("Role: {}", plan.role);
    println!();
    print_section(&plan.root, 0);

    if verbose {
        println!();
        println!("Shape contracts");
        println!("---------------");
        for shape_text in plan_contracts(&plan.root) {
            println!("{}", shape_text);
        }
    }
}

fn print_section(node: &SectionPlan, depth: usize) {
    let indent = "  ".repeat(depth);
    let timeframe = node
        .timeframe
        .as_deref()
        .map(|tf| format!(" [{}]", tf))
        .unwrap_or_default();
    println!("{}{} -> {}{}", indent, node.name, node.shape.name, timeframe);
    for child in &node.children {
        print_section(child, depth + 1);
    }
}

/// Contracts of every distinct shape in the plan, leaves first.
fn plan_contracts(node: &SectionPlan) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    collect_contracts(node, &mut seen, &mut out);
    out
}

fn collect_contracts(
    node: &SectionPlan,
    seen: &mut std::collections::HashSet<String>,
    out: &mut Vec<String>,
) {
    for child in &node.children {
        collect_contracts(child, seen, out);
    }
    if seen.insert(node.shape.name.clone()) {
        out.push(format_instructions(&node.shape));
    }
}
