//! Query-string shapes accepted by the HTTP layer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::FilterRequest;

/// `?path=` on its own, relative to the media root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathQuery {
    pub path: String,
}

/// Directory listing query. Flag names follow the browser front end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct DirContentsQuery {
    pub path: String,
    pub filter: Option<String>,
    pub match_case: bool,
    pub consider_folder_contents: bool,
    pub regex: bool,
    pub typo_tolerance: bool,
    pub any_order: bool,
}

impl DirContentsQuery {
    /// `None` when no filter text was sent.
    pub fn filter_request(&self) -> Option<FilterRequest> {
        let pattern = self.filter.as_deref()?;
        Some(
            FilterRequest::new(pattern)
                .match_case(self.match_case)
                .consider_folder_contents(self.consider_folder_contents)
                .regex_mode(self.regex)
                .typo_tolerant(self.typo_tolerance)
                .any_order_tokens(self.any_order),
        )
    }
}

/// `POST /update-progress?path=&progress=`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressUpdate {
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: String,
    pub progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filter_text_means_no_filter() {
        let query = DirContentsQuery {
            typo_tolerance: true,
            ..Default::default()
        };
        assert_eq!(query.filter_request(), None);
    }

    #[test]
    fn flags_carry_over_to_the_filter() {
        let query = DirContentsQuery {
            path: "Shows".into(),
            filter: Some("office".into()),
            consider_folder_contents: true,
            any_order: true,
            ..Default::default()
        };
        let request = query.filter_request().unwrap();
        assert_eq!(request.pattern, "office");
        assert!(request.consider_folder_contents);
        assert!(request.any_order_tokens);
        assert!(!request.typo_tolerant);
        assert!(!request.regex_mode);
        assert!(!request.match_case);
    }
}
