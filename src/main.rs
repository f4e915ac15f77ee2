use std::fs::File;

use anyhow::{anyhow, Context};
use clap::Parser;
use colored::Colorize;
use drep_account_rpc::{
    config::{
        cli::{parse_param, Cli, Command},
        ClientConfig,
    },
    namespaces::ACCOUNT_METHODS,
    observability::Observability,
    provider::HttpProvider,
    Drep,
};
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Cli::parse();

    let mut config =
        ClientConfig::try_load(&opt.config).map_err(|err| anyhow!("invalid config: {err}"))?;
    config.override_with_opts(&opt);

    let log_file = match &config.log_file_path {
        Some(path) => Some(
            File::create(path).with_context(|| format!("failed creating log file {path}"))?,
        ),
        None => None,
    };
    let log_level_filter = LevelFilter::from(config.log_level);
    let _observability = Observability::init(
        String::from("drep_account_rpc"),
        log_level_filter,
        log_file,
    )?;

    match opt.command {
        Command::Methods => {
            println!("{:<16}{:<24}{}", "name", "remote call", "params");
            for descriptor in ACCOUNT_METHODS.iter() {
                println!(
                    "{:<16}{:<24}{}",
                    descriptor.name.cyan(),
                    descriptor.remote_call,
                    descriptor.param_count
                );
            }
        }
        Command::Call { method, params } => {
            let provider = HttpProvider::with_timeout(config.url.clone(), config.timeout())?;
            let drep = Drep::new(provider);

            let bound = drep.account.get(&method).ok_or_else(|| {
                anyhow!(
                    "unknown account method '{}', see `drep-account methods`",
                    method
                )
            })?;
            let args = params.iter().map(|raw| parse_param(raw)).collect();

            tracing::info!("calling {} on {}", bound.remote_call(), config.url);
            let result = bound
                .call(args)
                .await
                .with_context(|| format!("{} failed", bound.remote_call()))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
