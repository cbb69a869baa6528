use crate::cli::args::Command;
use crate::cli::params::{DownloadParams, PlanParams};
use crate::config::{Config, load_config};
use crate::error::OrderFetchError;
use crate::orders::{OrderRecord, load_orders};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Download(DownloadParams),
    Plan(PlanParams),
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, OrderFetchError> {
    match command {
        Command::Download {
            config_path,
            orders_path,
            output_dir,
            concurrency_limit,
            attempt_timeout_ms,
            max_attempts,
            retry_delay_ms,
        } => {
            let app_config = load_optional_config(config_path.as_deref())?;

            // Command-line flags win over the config file.
            let mut options = app_config.download.to_options();
            if let Some(value) = concurrency_limit {
                options.concurrency_limit = value;
            }
            if let Some(value) = attempt_timeout_ms {
                options.attempt_timeout = Duration::from_millis(value);
            }
            if let Some(value) = max_attempts {
                options.max_attempts = value;
            }
            if let Some(value) = retry_delay_ms {
                options.retry_delay = Duration::from_millis(value);
            }

            for (name, is_zero) in [
                ("concurrency", options.concurrency_limit == 0),
                ("timeout-ms", options.attempt_timeout.is_zero()),
                ("max-attempts", options.max_attempts == 0),
            ] {
                if is_zero {
                    return Err(OrderFetchError::CliArgumentValidation {
                        details: format!("{name} must be greater than 0."),
                    });
                }
            }
            if options.concurrency_limit > Semaphore::MAX_PERMITS {
                return Err(OrderFetchError::CliArgumentValidation {
                    details: format!(
                        "concurrency must be at most {}.",
                        Semaphore::MAX_PERMITS
                    ),
                });
            }

            let orders = resolve_orders(orders_path, &app_config)?;
            let output_dir = resolve_output_dir(output_dir, &app_config)?;

            Ok(ResolvedCommand::Download(DownloadParams {
                orders,
                output_dir,
                options,
            }))
        }
        Command::Plan {
            config_path,
            orders_path,
            output_dir,
        } => {
            let app_config = load_optional_config(config_path.as_deref())?;
            let orders = resolve_orders(orders_path, &app_config)?;
            let output_dir = resolve_output_dir(output_dir, &app_config)?;

            Ok(ResolvedCommand::Plan(PlanParams { orders, output_dir }))
        }
    }
}

fn load_optional_config(config_path: Option<&str>) -> Result<Config, OrderFetchError> {
    match config_path {
        Some(config_path) => {
            tracing::info!("Loading configuration from {}", config_path);
            load_config(config_path)
        }
        None => Ok(Config::default()),
    }
}

fn resolve_orders(
    orders_path: Option<String>,
    app_config: &Config,
) -> Result<Vec<OrderRecord>, OrderFetchError> {
    let orders_path = orders_path
        .map(PathBuf::from)
        .or_else(|| app_config.orders_path.clone())
        .ok_or_else(|| OrderFetchError::CliArgumentValidation {
            details: "No orders file provided. Pass --orders or configure orders_path."
                .to_string(),
        })?;

    tracing::info!("Loading orders from {}", orders_path.display());
    let orders = load_orders(&orders_path)?;
    tracing::info!("Loaded {} orders", orders.len());
    Ok(orders)
}

fn resolve_output_dir(
    output_dir: Option<String>,
    app_config: &Config,
) -> Result<PathBuf, OrderFetchError> {
    output_dir
        .map(PathBuf::from)
        .or_else(|| app_config.output.path.clone())
        .ok_or_else(|| OrderFetchError::CliArgumentValidation {
            details: "No output directory provided. Pass --output-dir or configure output.path."
                .to_string(),
        })
}
