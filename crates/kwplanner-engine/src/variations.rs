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

//! Keyword variation generation from modifier patterns.

const PREFIXES: &[&str] = &["best", "top", "cheap", "free", "buy", "how to choose"];

const SUFFIXES: &[&str] = &["online", "near me", "review", "price", "guide", "for beginners", "alternatives"];

const QUESTIONS: &[&str] = &["what is", "how does", "why use", "is it worth"];

/// Commercial, informational and question variations for a seed keyword.
/// Order is deterministic: prefixes, then suffixes, then questions; the
/// bare seed is not included and duplicates are dropped.
pub fn expand(seed: &str) -> Vec<String> {
    let seed = seed.trim().to_lowercase();
    let mut out: Vec<String> = Vec::new();

    for prefix in PREFIXES {
        push_unique(&mut out, format!("{prefix} {seed}"));
    }
    for suffix in SUFFIXES {
        push_unique(&mut out, format!("{seed} {suffix}"));
    }
    for question in QUESTIONS {
        push_unique(&mut out, format!("{question} {seed}"));
    }

    out
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if !out.contains(&candidate) {
        out.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_with_all_modifier_groups() {
        let variations = expand("standing desk");
        assert_eq!(variations.len(), PREFIXES.len() + SUFFIXES.len() + QUESTIONS.len());
        assert!(variations.contains(&"best standing desk".to_string()));
        assert!(variations.contains(&"standing desk near me".to_string()));
        assert!(variations.contains(&"what is standing desk".to_string()));
    }

    #[test]
    fn seed_is_trimmed_and_lowercased() {
        let variations = expand("  Standing Desk ");
        assert!(variations.contains(&"best standing desk".to_string()));
    }

    #[test]
    fn order_is_deterministic() {
        assert_eq!(expand("x"), expand("x"));
        assert_eq!(expand("x")[0], "best x");
    }
}
