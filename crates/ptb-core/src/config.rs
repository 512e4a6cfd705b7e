use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// How many places `/list` shows by default.
pub const DEFAULT_LIST_LIMIT: usize = 11;

/// Typed configuration, read from the environment (and `.env` when present).
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// JSON snapshot file; `None` keeps everything in memory.
    pub store_file: Option<PathBuf>,

    pub list_limit: usize,

    // Outbound throttling
    pub throttle_global_interval: Duration,
    pub throttle_per_chat_interval: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let store_file = lookup("PLACES_STORE_FILE")
            .and_then(non_empty)
            .map(PathBuf::from);

        let list_limit = match lookup("LIST_LIMIT") {
            None => DEFAULT_LIST_LIMIT,
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::Config(format!("LIST_LIMIT must be a non-negative integer, got {raw:?}"))
            })?,
        };

        let throttle_global_interval =
            Duration::from_millis(parse_u64(lookup("THROTTLE_GLOBAL_MS")).unwrap_or(40));
        let throttle_per_chat_interval =
            Duration::from_millis(parse_u64(lookup("THROTTLE_PER_CHAT_MS")).unwrap_or(1050));

        Ok(Self {
            telegram_bot_token,
            store_file,
            list_limit,
            throttle_global_interval,
            throttle_per_chat_interval,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
