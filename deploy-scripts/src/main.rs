use clap::Parser;
use deploy_scripts::{cli::Cli, commands, errors::ScriptError, utils::setup_client};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let client = setup_client(&cli.owner_key, &cli.rpc_url)?;

    commands::run(&cli, &client).await?;

    Ok(())
}
