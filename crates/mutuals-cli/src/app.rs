//! Run orchestration: configuration, prompt, session, fetch, write.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use mutuals_core::{find_common_followers, parse_profiles, Config};

use crate::cli::Cli;

/// Apply command-line overrides on top of the environment configuration
pub fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency.max(1);
    }
    if let Some(ref dir) = cli.session_dir {
        config.session_dir = dir.clone();
    }
    if let Some(ref dir) = cli.results_dir {
        config.results_dir = dir.clone();
    }
    config.fail_fast = cli.fail_fast;
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);

    let mut session = config.session();

    if cli.logout {
        session.clear()?;
        println!("Removed stored session for {}", config.username());
        return Ok(());
    }

    let profiles = match cli.usernames {
        Some(ref list) => parse_profiles(list),
        None => parse_profiles(&prompt_profiles()?),
    };

    let client = config.client().context("Failed to create HTTP client")?;

    // Only ask for a password when there is no stored session to reuse
    if !session.load() && !config.credentials.has_password() {
        let password = rpassword::prompt_password(format!("Password for {}: ", config.username()))?;
        config.credentials.set_password(password);
    }

    // A failed login is fatal and exits non-zero
    let session_data = session.ensure(&client, &config.credentials).await?;
    let client = client.with_session(session_data);

    let summary = find_common_followers(
        &client,
        &profiles,
        &config.intersect_options(),
        &config.result_writer(),
    )
    .await;
    summary.log();

    match summary.output {
        Some(ref path) => println!(
            "{} common followers saved to {}",
            summary.common.followers.len(),
            path.display()
        ),
        None if profiles.is_empty() => println!("No usernames provided"),
        None => println!("Common followers could not be saved, see log"),
    }

    info!("mutuals finished");
    Ok(())
}

fn prompt_profiles() -> Result<String> {
    print!("Enter Instagram usernames separated by commas: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input)
}
