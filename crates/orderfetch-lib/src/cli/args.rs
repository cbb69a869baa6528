use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber;

#[derive(Debug, Clone)]
pub enum Command {
    Download {
        config_path: Option<String>,
        orders_path: Option<String>,
        output_dir: Option<String>,
        concurrency_limit: Option<usize>,
        attempt_timeout_ms: Option<u64>,
        max_attempts: Option<u32>,
        retry_delay_ms: Option<u64>,
    },
    Plan {
        config_path: Option<String>,
        orders_path: Option<String>,
        output_dir: Option<String>,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "orderfetch",
    version,
    about = "Archive the delivery photos and product thumbnails referenced by exported order history"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Download every image that is not yet present in the output directory
    Download {
        #[arg(
            short = 'c',
            long = "config",
            value_name = "FILE",
            help = "Optional config file with orders path, output path and download tuning"
        )]
        config: Option<String>,

        #[arg(
            short = 'i',
            long = "orders",
            value_name = "FILE",
            help = "Exported orders JSON file (overrides orders_path from the config)"
        )]
        orders: Option<String>,

        #[arg(
            short = 'o',
            long = "output-dir",
            value_name = "DIR",
            help = "Directory receiving delivery_photos/, product_thumbnails/ and failed_downloads.json"
        )]
        output_dir: Option<String>,

        #[arg(
            long = "concurrency",
            value_name = "N",
            help = "Maximum number of simultaneous downloads [default: 5]"
        )]
        concurrency_limit: Option<usize>,

        #[arg(
            long = "timeout-ms",
            value_name = "MS",
            help = "Time budget for a single download attempt [default: 30000]"
        )]
        attempt_timeout_ms: Option<u64>,

        #[arg(
            long = "max-attempts",
            value_name = "N",
            help = "Attempts per image before giving up [default: 3]"
        )]
        max_attempts: Option<u32>,

        #[arg(
            long = "retry-delay-ms",
            value_name = "MS",
            help = "Fixed pause between attempts [default: 1000]"
        )]
        retry_delay_ms: Option<u64>,
    },

    /// List the images that a download would fetch, without touching the network
    Plan {
        #[arg(
            short = 'c',
            long = "config",
            value_name = "FILE",
            help = "Optional config file with orders path and output path"
        )]
        config: Option<String>,

        #[arg(
            short = 'i',
            long = "orders",
            value_name = "FILE",
            help = "Exported orders JSON file (overrides orders_path from the config)"
        )]
        orders: Option<String>,

        #[arg(
            short = 'o',
            long = "output-dir",
            value_name = "DIR",
            help = "Directory that would receive the downloads"
        )]
        output_dir: Option<String>,
    },
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("hyper_util=warn".parse().unwrap())
                .add_directive("reqwest=warn".parse().unwrap()),
        )
        .init();

    let command = match cli.command {
        CliCommand::Download {
            config,
            orders,
            output_dir,
            concurrency_limit,
            attempt_timeout_ms,
            max_attempts,
            retry_delay_ms,
        } => Command::Download {
            config_path: config,
            orders_path: orders,
            output_dir,
            concurrency_limit,
            attempt_timeout_ms,
            max_attempts,
            retry_delay_ms,
        },
        CliCommand::Plan {
            config,
            orders,
            output_dir,
        } => Command::Plan {
            config_path: config,
            orders_path: orders,
            output_dir,
        },
    };

    Args { command, log_level }
}
