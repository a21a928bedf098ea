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

//! The eight analysis routines behind the [`Engine`] seam.

use crate::fetch::{PageFetcher, extract_links};
use crate::store::{LEARNING_STORE_FILE, LearningStore};
use crate::text::{self, ScoredKeyword};
use crate::variations;
use anyhow::{Context, Result, ensure};
use kwplanner_core::{Engine, EngineFactory, Session};
use std::fmt::Write;
use tracing::info;
use url::Url;

const KEYWORD_LIMIT: usize = 30;
const PRUNING_PAGE_LIMIT: usize = 5;
const THIN_CONTENT_WORDS: usize = 300;
const DASHBOARD_TOP: usize = 10;

/// Keyword-research engine working against live pages and the persisted
/// learning store. One instance serves exactly one invocation.
pub struct KeywordEngine {
    fetcher: PageFetcher,
}

impl KeywordEngine {
    pub fn new() -> Result<Self> {
        Ok(Self { fetcher: PageFetcher::new()? })
    }

    fn extract_page_keywords(&self, session: &mut Session, url: &str) -> Result<(String, Vec<ScoredKeyword>)> {
        let html = self.fetcher.fetch(url)?;
        if let Some(title) = text::page_title(&html) {
            writeln!(session, "Page title: {title}")?;
        }
        let rendered = text::strip_html(&html);
        writeln!(session, "Rendered {} words of content", text::word_count(&rendered))?;
        let keywords = text::extract_keywords(&rendered, KEYWORD_LIMIT);
        Ok((html, keywords))
    }

    fn record_keywords(&self, session: &Session, keywords: &[ScoredKeyword], source: &str) -> Result<()> {
        let path = session.data_path(LEARNING_STORE_FILE);
        let mut store = LearningStore::load(&path)?;
        for kw in keywords {
            store.record(&kw.keyword, kw.score, source);
        }
        store.save(&path)?;
        info!(count = keywords.len(), source, "recorded keywords in learning store");
        Ok(())
    }

    fn print_keywords(&self, session: &mut Session, keywords: &[ScoredKeyword]) -> Result<()> {
        if keywords.is_empty() {
            writeln!(session, "No recurring keywords found.")?;
            return Ok(());
        }
        for (rank, kw) in keywords.iter().enumerate() {
            writeln!(
                session,
                "{:>2}. {} (score {:.1}, {} occurrences)",
                rank + 1,
                kw.keyword,
                kw.score,
                kw.occurrences
            )?;
        }
        Ok(())
    }

    fn export_keywords(&self, session: &mut Session, name: &str, keywords: &[ScoredKeyword]) -> Result<()> {
        let rows = keywords
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .context("failed to serialize keyword rows")?;
        session.record_export(name, rows);
        Ok(())
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "s" | "sim" | "y" | "yes")
}

impl Engine for KeywordEngine {
    fn run_site_analysis(&mut self, session: &mut Session) -> Result<()> {
        let url = session.read_answer("Site URL: ");
        let include_subdomains = is_yes(&session.read_answer("Include subdomains? (s/n): "));
        ensure!(!url.is_empty(), "no site URL provided");

        writeln!(session, "=== Site analysis: {url} ===")?;
        let (html, keywords) = self.extract_page_keywords(session, &url)?;

        let base = Url::parse(&url).with_context(|| format!("invalid URL: {url}"))?;
        let links = extract_links(&html, &base, include_subdomains, KEYWORD_LIMIT);
        writeln!(session, "Discovered {} internal pages", links.len())?;

        self.print_keywords(session, &keywords)?;
        self.record_keywords(session, &keywords, "site analysis")?;
        self.export_keywords(session, "site_keywords", &keywords)
    }

    fn run_niche_analysis(&mut self, session: &mut Session) -> Result<()> {
        let niche = session.read_answer("Niche: ");
        ensure!(!niche.is_empty(), "no niche provided");

        writeln!(session, "=== Niche analysis: {niche} ===")?;
        let seeds = variations::expand(&niche);
        let total = seeds.len();
        let keywords: Vec<ScoredKeyword> = seeds
            .into_iter()
            .enumerate()
            .map(|(i, keyword)| ScoredKeyword {
                keyword,
                occurrences: 1,
                // Earlier modifier groups are stronger seeds.
                score: (total - i) as f64,
            })
            .collect();

        self.print_keywords(session, &keywords)?;
        self.record_keywords(session, &keywords, "niche analysis")?;
        self.export_keywords(session, "niche_keywords", &keywords)
    }

    fn run_url_analysis(&mut self, session: &mut Session) -> Result<()> {
        let url = session.read_answer("Page URL: ");
        ensure!(!url.is_empty(), "no page URL provided");

        writeln!(session, "=== URL analysis: {url} ===")?;
        let (_, keywords) = self.extract_page_keywords(session, &url)?;

        self.print_keywords(session, &keywords)?;
        self.record_keywords(session, &keywords, &url)?;
        self.export_keywords(session, "url_keywords", &keywords)
    }

    fn run_keyword_variations(&mut self, session: &mut Session) -> Result<()> {
        let keyword = session.read_answer("Keyword: ");
        ensure!(!keyword.is_empty(), "no keyword provided");

        writeln!(session, "=== Variations for: {keyword} ===")?;
        let expanded = variations::expand(&keyword);
        for variation in &expanded {
            writeln!(session, "- {variation}")?;
        }

        let rows = expanded
            .iter()
            .map(|v| serde_json::json!({ "keyword": v, "seed": keyword }))
            .collect();
        session.record_export("keyword_variations", rows);
        Ok(())
    }

    fn run_theme_analysis(&mut self, session: &mut Session) -> Result<()> {
        let url = session.read_answer("Site URL: ");
        let theme = session.read_answer("Theme: ");
        ensure!(!url.is_empty() && !theme.is_empty(), "site URL and theme are required");

        writeln!(session, "=== Theme analysis: {url} (theme: {theme}) ===")?;
        let (_, keywords) = self.extract_page_keywords(session, &url)?;
        let themed: Vec<ScoredKeyword> = keywords
            .into_iter()
            .filter(|kw| text::matches_theme(&kw.keyword, &theme))
            .collect();

        writeln!(session, "{} keywords match the theme", themed.len())?;
        self.print_keywords(session, &themed)?;
        self.record_keywords(session, &themed, "theme analysis")?;
        self.export_keywords(session, "theme_keywords", &themed)
    }

    fn run_content_pruning(&mut self, session: &mut Session) -> Result<()> {
        let url = session.read_answer("Site URL: ");
        let include_subdomains = is_yes(&session.read_answer("Include subdomains? (s/n): "));
        ensure!(!url.is_empty(), "no site URL provided");

        writeln!(session, "=== Content pruning: {url} ===")?;
        let html = self.fetcher.fetch(&url)?;
        let base = Url::parse(&url).with_context(|| format!("invalid URL: {url}"))?;

        let mut pages = vec![url.clone()];
        pages.extend(extract_links(&html, &base, include_subdomains, PRUNING_PAGE_LIMIT));

        let mut rows = Vec::new();
        let mut thin_pages = 0usize;
        for page in &pages {
            let page_html = if page == &url {
                html.clone()
            } else {
                match self.fetcher.fetch(page) {
                    Ok(body) => body,
                    Err(e) => {
                        writeln!(session, "skipping {page}: {e:#}")?;
                        continue;
                    }
                }
            };
            let rendered = text::strip_html(&page_html);
            let words = text::word_count(&rendered);
            let top_keyword = text::extract_keywords(&rendered, 1).into_iter().next();
            let thin = words < THIN_CONTENT_WORDS;
            if thin {
                thin_pages += 1;
            }
            writeln!(
                session,
                "{page}: {words} words{}",
                if thin { " [prune candidate]" } else { "" }
            )?;
            rows.push(serde_json::json!({
                "url": page,
                "words": words,
                "top_keyword": top_keyword.map(|kw| kw.keyword),
                "prune_candidate": thin,
            }));
        }

        writeln!(session, "{thin_pages} of {} pages look thin", rows.len())?;
        session.record_export("content_pruning", rows);
        Ok(())
    }

    fn show_learning_dashboard(&mut self, session: &mut Session) -> Result<()> {
        writeln!(session, "=== Learning dashboard ===")?;
        let store = LearningStore::load(&session.data_path(LEARNING_STORE_FILE))?;
        if store.is_empty() {
            writeln!(session, "Learning store is empty.")?;
            return Ok(());
        }

        writeln!(session, "{} keywords learned, {} total sightings", store.len(), store.total_hits())?;
        for (rank, (keyword, stats)) in store.top(DASHBOARD_TOP).into_iter().enumerate() {
            writeln!(
                session,
                "{:>2}. {} ({} hits, best score {:.1}, last seen {})",
                rank + 1,
                keyword,
                stats.hits,
                stats.best_score,
                stats.last_seen.format("%Y-%m-%d")
            )?;
        }
        Ok(())
    }

    fn export_learning_data(&mut self, session: &mut Session) -> Result<()> {
        let store = LearningStore::load(&session.data_path(LEARNING_STORE_FILE))?;
        writeln!(session, "Exporting {} learned keywords", store.len())?;
        session.record_export("learning_data", store.to_export_payload());
        Ok(())
    }
}

/// Builds a [`KeywordEngine`] per invocation.
#[derive(Debug, Default, Clone)]
pub struct KeywordEngineFactory;

impl EngineFactory for KeywordEngineFactory {
    fn create(&self) -> Result<Box<dyn Engine + Send>> {
        Ok(Box::new(KeywordEngine::new()?))
    }
}
