use orderfetch_lib::cli::{
    ResolvedCommand, exit_code, parse_args, resolve_command, run_download, run_plan,
};
use orderfetch_lib::error::OrderFetchError;
use std::process::ExitCode;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<ExitCode, OrderFetchError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    let code = match command {
        ResolvedCommand::Download(params) => {
            let report = run_download(params).await?;
            exit_code(&report)
        }
        ResolvedCommand::Plan(params) => {
            run_plan(params)?;
            0
        }
    };

    Ok(ExitCode::from(code))
}
