mod cli;

use clap::Parser;
use cli::Cli;
use dotenv::dotenv;
use tenant_archiver::{config, date_window, logging, Archiver, RunContext, ShellRunner};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger(&logging::default_log_path())?;

    let args = Cli::parse();

    if let Err(err) = run(&args) {
        error!("{:?}", err);
        return Err(err.into());
    }

    Ok(())
}

fn run(args: &Cli) -> tenant_archiver::Result<()> {
    let config = config::load_configuration(args.config.as_deref())?;

    let offset = date_window::fixed_offset(config.utc_offset_hours)?;
    let now = date_window::now_in(&offset);

    let mut ctx = RunContext::prepare(
        &config,
        &args.accounts,
        args.time_from.as_deref(),
        &args.time_to,
        now,
    )?;

    let runner = ShellRunner::new(config.command_timeout_secs);
    let report = Archiver::new(&mut ctx, &runner).run()?;
    info!("{:?}", report);

    Ok(())
}
