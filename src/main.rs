mod cli;
mod core;

use clap::{Parser, Subcommand};

use crate::cli::credits_cmd::CreditsArgs;
use crate::core::config::AppConfig;
use crate::core::models::subscription::DEFAULT_VALIDITY_DAYS;

#[derive(Parser)]
#[command(name = "navi", about = "Navi credit, overage and billing tracker", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Use this many credits as the period usage
    #[arg(long)]
    used: Option<i64>,

    /// Read dashboard stats from a JSON file
    #[arg(long, value_name = "FILE")]
    stats: Option<std::path::PathBuf>,

    /// Don't contact the dashboard API
    #[arg(long)]
    offline: bool,
}

impl From<SourceArgs> for CreditsArgs {
    fn from(args: SourceArgs) -> Self {
        Self {
            used: args.used,
            stats_file: args.stats,
            offline: args.offline,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show plan, additional and total credits with billing estimate
    Credits(SourceArgs),
    /// Show credit alerts only
    Alerts(SourceArgs),
    /// List available plans
    Plans,
    /// Inspect or change the locally stored subscription
    Subscription {
        #[command(subcommand)]
        action: SubscriptionAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum SubscriptionAction {
    /// Show plan and additional credit batches
    Show,
    /// Switch plans (interactive when no name is given)
    SetPlan {
        /// Plan name, e.g. "Family Plus"
        name: Option<String>,
    },
    /// Buy a batch of additional credits
    Buy {
        /// Number of credits
        amount: i64,
        /// Price paid in dollars (default: plan overage rate per credit)
        #[arg(long)]
        price: Option<f64>,
        /// Days until the batch expires
        #[arg(long, default_value_t = DEFAULT_VALIDITY_DAYS)]
        days: i64,
    },
    /// Record consumption of additional credits
    Consume {
        /// Number of credits consumed
        credits: i64,
    },
    /// Delete the stored subscription
    Reset,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init {
        /// Account id to query
        #[arg(long)]
        account: Option<String>,
        /// Dashboard API base URL
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Validate config file
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    crate::core::logging::init_logging(cli.verbose);

    let settings = AppConfig::load().unwrap_or_default().settings;
    let output_opts = cli::output::OutputOptions {
        format: cli::output::OutputFormat::resolve(
            cli.json,
            cli.format.as_deref(),
            &settings.default_format,
        ),
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color, &settings.color),
    };

    match cli.command {
        None => {
            cli::credits_cmd::run(CreditsArgs::default(), false, &output_opts).await?;
        }
        Some(Commands::Credits(args)) => {
            cli::credits_cmd::run(args.into(), false, &output_opts).await?;
        }
        Some(Commands::Alerts(args)) => {
            cli::credits_cmd::run(args.into(), true, &output_opts).await?;
        }
        Some(Commands::Plans) => cli::subscription_cmd::plans(&output_opts)?,
        Some(Commands::Subscription { action }) => match action {
            SubscriptionAction::Show => cli::subscription_cmd::show(&output_opts)?,
            SubscriptionAction::SetPlan { name } => {
                cli::subscription_cmd::set_plan(name, &output_opts)?
            }
            SubscriptionAction::Buy {
                amount,
                price,
                days,
            } => cli::subscription_cmd::buy(amount, price, days, &output_opts)?,
            SubscriptionAction::Consume { credits } => {
                cli::subscription_cmd::consume(credits, &output_opts)?
            }
            SubscriptionAction::Reset => cli::subscription_cmd::reset(&output_opts)?,
        },
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { account, api_url } => {
                cli::config_cmd::init(account, api_url, &output_opts)?
            }
            ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
        },
    }

    Ok(())
}
