#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// User supplied name filter applied to directory listings.
///
/// The flags are independent; see the matcher in `reelshelf-core` for how
/// they combine. Regex mode takes precedence over every other flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct FilterRequest {
    pub pattern: String,
    pub match_case: bool,
    pub consider_folder_contents: bool,
    pub regex_mode: bool,
    pub typo_tolerant: bool,
    pub any_order_tokens: bool,
}

impl FilterRequest {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn match_case(mut self, value: bool) -> Self {
        self.match_case = value;
        self
    }

    pub fn consider_folder_contents(mut self, value: bool) -> Self {
        self.consider_folder_contents = value;
        self
    }

    pub fn regex_mode(mut self, value: bool) -> Self {
        self.regex_mode = value;
        self
    }

    pub fn typo_tolerant(mut self, value: bool) -> Self {
        self.typo_tolerant = value;
        self
    }

    pub fn any_order_tokens(mut self, value: bool) -> Self {
        self.any_order_tokens = value;
        self
    }
}
