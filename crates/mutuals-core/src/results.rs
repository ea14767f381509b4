//! Writing common followers to `results/common_followers_<a>_<b>.txt`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::info;

use crate::error::MutualsError;
use crate::models::FollowerSet;

/// Default directory for result files
pub const DEFAULT_RESULTS_DIR: &str = "results";

const FILE_PREFIX: &str = "common_followers_";

pub struct ResultWriter {
    dir: PathBuf,
}

impl ResultWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output path for a run over `profiles`, joined with `_` in input order
    pub fn output_path(&self, profiles: &[String]) -> PathBuf {
        let joined = profiles
            .iter()
            .map(|p| sanitize(p))
            .collect::<Vec<_>>()
            .join("_");
        self.dir.join(format!("{}{}.txt", FILE_PREFIX, joined))
    }

    /// Write one display name per line, replacing any previous file.
    /// Names are sorted so reruns over the same data produce the same file.
    pub fn write(&self, profiles: &[String], followers: &FollowerSet) -> Result<PathBuf, MutualsError> {
        let path = self.output_path(profiles);
        let write_failed = |source: std::io::Error| MutualsError::WriteFailed {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_failed)?;

        let mut names: Vec<&str> = followers.iter().map(|f| f.display_name()).collect();
        names.sort_unstable();

        let file = File::create(&path).map_err(write_failed)?;
        let mut out = BufWriter::new(file);
        for name in &names {
            writeln!(out, "{}", name).map_err(write_failed)?;
        }
        out.flush().map_err(write_failed)?;

        info!(path = %path.display(), followers = names.len(), "Common followers saved");
        Ok(path)
    }
}

// Usernames are [A-Za-z0-9._]; path separators must not reach the file name
fn sanitize(profile: &str) -> String {
    profile
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '_' { c } else { '-' })
        .collect()
}
