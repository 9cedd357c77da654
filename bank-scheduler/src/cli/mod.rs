pub mod config;
mod db;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use self::config::{Config, EnvOverride};
use crate::maintenance::MaintenanceJob;

#[derive(Parser)]
#[clap(long_about = None)]
struct Cli {
    #[clap(short, long, env = "BANK_LEDGER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
    /// Run a single sweep and exit
    #[clap(long)]
    once: bool,
    #[clap(env = "PG_CON")]
    pg_con: String,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_config(cli.config, EnvOverride { db_con: cli.pg_con })?;

    run_cmd(config, cli.once).await?;

    Ok(())
}

async fn run_cmd(config: Config, once: bool) -> anyhow::Result<()> {
    use bank_ledger::{exchange::StaticExchangeRates, BankLedger, BankLedgerConfig};
    bank_tracing::init_tracer(config.tracing)?;
    let pool = db::init_pool(&config.db)
        .await
        .context("Couldn't connect to database")?;
    let exchange_rates = StaticExchangeRates::from_config(&config.ledger.exchange)?;
    let (clock, clock_ctrl) = config.ledger.clock.build();
    let ledger_config = BankLedgerConfig::builder()
        .pool(pool)
        .exec_migrations(config.ledger.exec_migrations)
        .clock(clock)
        .exchange_rates(exchange_rates)
        .build()?;
    let ledger = BankLedger::init(ledger_config).await?;
    let mut job = MaintenanceJob::new(ledger, config.maintenance);
    if let Some(ctrl) = clock_ctrl {
        job = job.with_sim_time(ctrl);
    }
    if once {
        let summary = job.sweep().await?;
        println!(
            "blocked: {}, accrued: {}, failed: {}",
            summary.blocked, summary.accrued, summary.failed
        );
    } else {
        job.run().await;
    }
    Ok(())
}
