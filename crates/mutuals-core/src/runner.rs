//! One run: fetch, intersect, write.
//!
//! The session must already be established; `source` is the authenticated
//! client (or a fake in tests).

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::followers::FollowerSource;
use crate::intersect::{intersect, CommonFollowers, IntersectOptions, ProfileStatus};
use crate::results::ResultWriter;

/// Outcome of a whole run
#[derive(Debug)]
pub struct RunSummary {
    pub profiles: Vec<String>,
    pub common: CommonFollowers,
    /// `None` when nothing was requested or the file could not be written
    pub output: Option<PathBuf>,
}

impl RunSummary {
    /// Log what happened, one line per failed profile
    pub fn log(&self) {
        for report in &self.common.reports {
            match &report.status {
                ProfileStatus::Failed(reason) => {
                    warn!(profile = %report.profile, reason = %reason, "Profile contributed no followers")
                }
                ProfileStatus::Skipped => info!(profile = %report.profile, "Profile skipped"),
                ProfileStatus::Fetched { .. } => {}
            }
        }
        info!(
            requested = self.profiles.len(),
            fetched = self.common.fetched_count(),
            failed = self.common.failed().count(),
            common = self.common.followers.len(),
            output = ?self.output,
            "Run complete"
        );
    }
}

/// Split the comma separated prompt answer into profile names.
/// Entries are trimmed; blanks and repeats are dropped, first occurrence wins.
pub fn parse_profiles(input: &str) -> Vec<String> {
    let mut profiles: Vec<String> = Vec::new();
    for name in input.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !profiles.iter().any(|p| p == name) {
            profiles.push(name.to_string());
        }
    }
    profiles
}

/// Intersect the followers of `profiles` and write them out.
/// A write failure is logged and leaves `output` empty; it never aborts.
pub async fn find_common_followers<S>(
    source: &S,
    profiles: &[String],
    options: &IntersectOptions,
    writer: &ResultWriter,
) -> RunSummary
where
    S: FollowerSource + ?Sized,
{
    let common = intersect(source, profiles, options).await;

    let output = if profiles.is_empty() {
        None
    } else {
        match writer.write(profiles, &common.followers) {
            Ok(path) => Some(path),
            Err(e) => {
                error!(error = %e, "Error saving followers to file");
                None
            }
        }
    };

    RunSummary {
        profiles: profiles.to_vec(),
        common,
        output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profiles() {
        assert_eq!(parse_profiles(" alice , bob,carol "), vec!["alice", "bob", "carol"]);
        assert_eq!(parse_profiles("alice"), vec!["alice"]);
    }

    #[test]
    fn test_parse_profiles_blank_input() {
        assert!(parse_profiles("").is_empty());
        assert!(parse_profiles("   ").is_empty());
        assert!(parse_profiles(" , ,").is_empty());
    }

    #[test]
    fn test_parse_profiles_drops_repeats() {
        assert_eq!(parse_profiles("bob,alice,bob, alice"), vec!["bob", "alice"]);
    }

    #[test]
    fn test_repeated_profile_names_the_file_once() {
        let writer = ResultWriter::new("results");
        assert_eq!(
            writer.output_path(&parse_profiles("bob,bob")),
            PathBuf::from("results/common_followers_bob.txt")
        );
    }
}
