//! Intersection of follower sets across profiles.
//!
//! Fetches run concurrently up to `concurrency` at a time but are folded in
//! input order, so the result and the per-profile report do not depend on
//! which request finishes first.

use std::pin::pin;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::followers::{fetch_followers, FetchFailure, FetchOutcome, FollowerSource};
use crate::models::FollowerSet;

/// Default number of follower fetches in flight
pub const DEFAULT_CONCURRENCY: usize = 1;

#[derive(Debug, Clone, Copy)]
pub struct IntersectOptions {
    /// Maximum fetches in flight; 1 fetches strictly one after another
    pub concurrency: usize,
    /// Stop fetching once the running intersection is empty
    pub fail_fast: bool,
}

impl Default for IntersectOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            fail_fast: false,
        }
    }
}

/// What happened to one requested profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileStatus {
    Fetched { followers: usize },
    Failed(FetchFailure),
    /// Not fetched because `fail_fast` already emptied the result
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileReport {
    pub profile: String,
    pub status: ProfileStatus,
}

/// Followers common to every requested profile, plus how each fetch went
#[derive(Debug, Clone, Default)]
pub struct CommonFollowers {
    pub followers: FollowerSet,
    pub reports: Vec<ProfileReport>,
}

impl CommonFollowers {
    pub fn failed(&self) -> impl Iterator<Item = &ProfileReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, ProfileStatus::Failed(_)))
    }

    pub fn fetched_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, ProfileStatus::Fetched { .. }))
            .count()
    }
}

/// Narrow the running intersection by `set`; the first set starts it.
fn narrow(common: Option<FollowerSet>, set: FollowerSet) -> FollowerSet {
    match common {
        None => set,
        Some(mut running) => {
            running.retain(|f| set.contains(f));
            running
        }
    }
}

/// Find the followers shared by every profile in `profiles`.
///
/// A failed fetch counts as an empty follower set, which empties the
/// result. Remaining profiles are still fetched unless `fail_fast` is set.
pub async fn intersect<S>(source: &S, profiles: &[String], options: &IntersectOptions) -> CommonFollowers
where
    S: FollowerSource + ?Sized,
{
    if profiles.is_empty() {
        info!("No usernames provided");
        return CommonFollowers::default();
    }

    let concurrency = options.concurrency.max(1);
    debug!(profiles = profiles.len(), concurrency, "Fetching follower sets");

    let mut fetches = pin!(stream::iter(profiles)
        .map(|profile| async move { (profile, fetch_followers(source, profile).await) })
        .buffered(concurrency));

    let mut common: Option<FollowerSet> = None;
    let mut reports = Vec::with_capacity(profiles.len());

    while let Some((profile, outcome)) = fetches.next().await {
        let status = match &outcome {
            FetchOutcome::Fetched(set) => ProfileStatus::Fetched { followers: set.len() },
            FetchOutcome::Failed(reason) => ProfileStatus::Failed(reason.clone()),
        };
        reports.push(ProfileReport {
            profile: profile.clone(),
            status,
        });

        let running = narrow(common.take(), outcome.into_set());
        let exhausted = running.is_empty();
        common = Some(running);

        if exhausted && options.fail_fast && reports.len() < profiles.len() {
            info!(after = %profile, "No common followers left, skipping remaining profiles");
            break;
        }
    }

    for profile in &profiles[reports.len()..] {
        reports.push(ProfileReport {
            profile: profile.clone(),
            status: ProfileStatus::Skipped,
        });
    }

    info!(usernames = %profiles.join(", "), "Common followers retrieved");
    CommonFollowers {
        followers: common.unwrap_or_default(),
        reports,
    }
}
