// Reading the votes from the collection endpoint.

use log::{debug, info, warn};
use std::time::Duration;

use vote_merge::Record;

use crate::collect::io_common::{default_origin, records_from_json};

fn fetch_text(url: &str, timeout: Duration) -> reqwest::Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(default_origin())
        .build()?;
    client.get(url).send()?.error_for_status()?.text()
}

/// All the votes held by the endpoint.
///
/// An endpoint that is not configured, cannot be reached, or answers with
/// something other than a JSON array contributes no votes.
pub fn fetch_remote(url: Option<&str>, timeout: Duration) -> Vec<Record> {
    let url = match url.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(u) => u,
        None => {
            info!("fetch_remote: no endpoint configured, skipping");
            return vec![];
        }
    };
    debug!("fetch_remote: GET {} (timeout {:?})", url, timeout);
    match fetch_text(url, timeout) {
        Ok(body) => {
            let res = records_from_json(&body, url);
            info!("fetch_remote: {} votes from {}", res.len(), url);
            res
        }
        Err(e) => {
            warn!("fetch_remote: could not read {}: {}", url, e);
            vec![]
        }
    }
}
