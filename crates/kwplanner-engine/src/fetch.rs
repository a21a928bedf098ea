// KW Planner
// Copyright (C) 2025 KW Planner contributors

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Blocking page fetches and link discovery for crawled analyses.

use anyhow::{Context, Result, ensure};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"'#]+)["']"#).unwrap());

const USER_AGENT: &str = concat!("kwplanner/", env!("CARGO_PKG_VERSION"));
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client used by the engine. The engine runs as blocking
/// work off the async runtime, so a blocking client is the right shape.
pub struct PageFetcher {
    client: reqwest::blocking::Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch a page body, failing on non-success statuses.
    pub fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).with_context(|| format!("invalid URL: {url}"))?;
        ensure!(
            matches!(parsed.scheme(), "http" | "https"),
            "unsupported URL scheme: {}",
            parsed.scheme()
        );

        let response = self
            .client
            .get(parsed)
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        ensure!(status.is_success(), "{url} returned status {status}");
        response.text().with_context(|| format!("failed to read body of {url}"))
    }
}

/// Absolute same-site links found in a page, deduplicated, in document
/// order. With `include_subdomains`, hosts ending in the base host also
/// qualify (e.g. `blog.example.com` for `example.com`).
pub fn extract_links(html: &str, base: &Url, include_subdomains: bool, limit: usize) -> Vec<String> {
    let base_host = match base.host_str() {
        Some(h) => h.to_string(),
        None => return Vec::new(),
    };

    let mut links = Vec::new();
    for capture in HREF_RE.captures_iter(html) {
        if links.len() >= limit {
            break;
        }
        let Ok(resolved) = base.join(&capture[1]) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        let Some(host) = resolved.host_str() else {
            continue;
        };
        let same_site = host == base_host
            || (include_subdomains && host.ends_with(&format!(".{base_host}")));
        if !same_site {
            continue;
        }
        let link = resolved.to_string();
        if link != base.as_str() && !links.contains(&link) {
            links.push(link);
        }
    }
    links
}
