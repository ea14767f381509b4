//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Find the followers that several Instagram profiles have in common.
///
/// Credentials are read from INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD
/// (a .env file in the working directory is loaded first).
#[derive(Parser, Debug)]
#[command(name = "mutuals")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Profiles to compare, comma separated; prompted for when omitted
    pub usernames: Option<String>,

    /// Number of profiles fetched at the same time
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Stop fetching once no common follower can remain
    #[arg(long)]
    pub fail_fast: bool,

    /// Directory holding the session-<username> file
    #[arg(long)]
    pub session_dir: Option<PathBuf>,

    /// Directory the results file is written to
    #[arg(long)]
    pub results_dir: Option<PathBuf>,

    /// Remove the stored session and exit
    #[arg(long)]
    pub logout: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
