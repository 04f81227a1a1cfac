//! Fuzzy name matching for directory listings.
//!
//! Modes are tried in a fixed order:
//!
//! 1. regex (`contains` style search, nothing else runs),
//! 2. plain substring,
//! 3. typo tolerant near matches (whole name, any-order tokens, token
//!    windows, leading prefix),
//! 4. plain any-order tokens when typo tolerance is off.
//!
//! A directory that fails on its own name can still match through any
//! descendant when `consider_folder_contents` is set.

mod levenshtein;

use std::{borrow::Cow, path::PathBuf};

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use reelshelf_model::FilterRequest;
use thiserror::Error;
use tracing::debug;

use crate::listing::{DirectoryLister, ListedEntry};

pub use levenshtein::within_one_edit;

/// Folder recursion stops this many levels below the listed entry.
pub const MAX_FOLDER_DEPTH: usize = 32;

static NON_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\W+").expect("NON_WORD pattern is valid")
});

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A [`FilterRequest`] prepared for repeated evaluation.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    request: FilterRequest,
    /// Pattern after case normalization
    pattern: String,
    /// Pattern tokens for the typo tolerant checks
    tokens: Vec<String>,
    regex: Option<Regex>,
}

impl CompiledFilter {
    pub fn new(request: &FilterRequest) -> Result<Self, FilterError> {
        let regex = if request.regex_mode {
            let compiled = RegexBuilder::new(&request.pattern)
                .case_insensitive(!request.match_case)
                .build()
                .map_err(|source| FilterError::InvalidRegex {
                    pattern: request.pattern.clone(),
                    source,
                })?;
            Some(compiled)
        } else {
            None
        };

        let pattern = if request.match_case {
            request.pattern.clone()
        } else {
            request.pattern.to_lowercase()
        };
        let tokens = pattern
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Self {
            request: request.clone(),
            pattern,
            tokens,
            regex,
        })
    }

    /// Whether `entry` survives the filter, recursing into folders when
    /// the request asks for it.
    ///
    /// Folders already on the walk (the entry's parent included) are not
    /// entered again, so linked cycles end early.
    pub fn passes(&self, entry: &ListedEntry, lister: &dyn DirectoryLister) -> bool {
        let mut ancestors: Vec<PathBuf> = entry
            .path
            .parent()
            .map(|parent| lister.canonical(parent))
            .into_iter()
            .collect();
        self.passes_at(entry, lister, &mut ancestors, 0)
    }

    fn passes_at(
        &self,
        entry: &ListedEntry,
        lister: &dyn DirectoryLister,
        ancestors: &mut Vec<PathBuf>,
        depth: usize,
    ) -> bool {
        if self.matches_name(&entry.name) {
            return true;
        }

        if !(self.request.consider_folder_contents && entry.is_dir) {
            return false;
        }
        if depth >= MAX_FOLDER_DEPTH {
            debug!(path = %entry.path.display(), "folder depth limit reached");
            return false;
        }
        let key = lister.canonical(&entry.path);
        if ancestors.contains(&key) {
            debug!(path = %entry.path.display(), "folder already on the walk");
            return false;
        }

        match lister.list(&entry.path) {
            Ok(children) => {
                ancestors.push(key);
                let found = children
                    .iter()
                    .any(|child| self.passes_at(child, lister, &mut *ancestors, depth + 1));
                ancestors.pop();
                found
            }
            Err(err) => {
                debug!(path = %entry.path.display(), "cannot list folder: {err}");
                false
            }
        }
    }

    /// Name-only check, no recursion.
    pub fn matches_name(&self, name: &str) -> bool {
        if let Some(regex) = &self.regex {
            return regex.is_match(name);
        }

        let name: Cow<'_, str> = if self.request.match_case {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(name.to_lowercase())
        };

        if name.contains(self.pattern.as_str()) {
            return true;
        }

        if self.request.typo_tolerant {
            self.near_match(&name)
        } else if self.request.any_order_tokens {
            self.pattern.split(' ').all(|token| name.contains(token))
        } else {
            false
        }
    }

    fn near_match(&self, name: &str) -> bool {
        let pattern = self.pattern.as_str();
        if within_one_edit(pattern, name) {
            return true;
        }

        let name_tokens: Vec<&str> = NON_WORD.split(name).collect();

        // A single name token may satisfy several pattern tokens
        if self.request.any_order_tokens
            && self.tokens.iter().all(|token| {
                name_tokens
                    .iter()
                    .any(|candidate| within_one_edit(candidate, token))
            })
        {
            return true;
        }

        let window = self.tokens.len();
        if window <= name_tokens.len() {
            for start in 0..=name_tokens.len() - window {
                let joined = name_tokens[start..start + window].join(" ");
                if within_one_edit(pattern, &joined) {
                    return true;
                }
            }
        }

        let pattern_len = pattern.chars().count();
        if name.chars().count() > pattern_len {
            let prefix: String = name.chars().take(pattern_len).collect();
            if within_one_edit(pattern, &prefix) {
                return true;
            }
        }

        false
    }
}

/// One-shot form of [`CompiledFilter::passes`].
pub fn passes_filter(
    entry: &ListedEntry,
    request: &FilterRequest,
    lister: &dyn DirectoryLister,
) -> Result<bool, FilterError> {
    Ok(CompiledFilter::new(request)?.passes(entry, lister))
}
