//! Per-page visibility inside a dashboard.
//!
//! A user with no rows for a dashboard may open every page. As soon as one
//! row exists for the pair, the user is restricted to the listed pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{PagePermissionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PagePermission {
    pub id: PagePermissionId,
    pub dashboard_id: String,
    pub page_name: String,
    pub page_display_name: Option<String>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// What a user may see of one dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "mode", content = "pages", rename_all = "snake_case")]
pub enum PageAccess {
    All,
    Only(BTreeSet<String>),
}

impl PageAccess {
    /// Builds access from the page names stored for a user; no rows means `All`.
    pub fn from_rows<I, S>(page_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages: BTreeSet<String> = page_names.into_iter().map(Into::into).collect();
        if pages.is_empty() {
            Self::All
        } else {
            Self::Only(pages)
        }
    }

    pub fn allows(&self, page_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(pages) => pages.contains(page_name),
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Only(_))
    }
}

/// Outcome of a page-change attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum NavigationDecision {
    Allow,
    /// The viewer must switch back to `to`.
    Revert { to: String },
}

/// Decides whether a viewer may move to `target_page`.
///
/// When the target is not allowed the fallback is, in order: the current page
/// if it is allowed, the first allowed page in `report_pages` order, then the
/// lexicographically first allowed page.
pub fn check_navigation(
    access: &PageAccess,
    target_page: &str,
    current_page: Option<&str>,
    report_pages: Option<&[String]>,
) -> NavigationDecision {
    let PageAccess::Only(allowed) = access else {
        return NavigationDecision::Allow;
    };

    if allowed.contains(target_page) {
        return NavigationDecision::Allow;
    }

    let fallback = current_page
        .filter(|page| allowed.contains(*page))
        .map(str::to_string)
        .or_else(|| {
            report_pages.and_then(|pages| pages.iter().find(|p| allowed.contains(*p)).cloned())
        })
        .or_else(|| allowed.iter().next().cloned());

    match fallback {
        Some(to) => NavigationDecision::Revert { to },
        // `Only` is never built from an empty set by `from_rows`
        None => NavigationDecision::Allow,
    }
}

/// Keeps the report pages `access` allows, preserving input order.
pub fn filter_pages<T, F>(access: &PageAccess, pages: Vec<T>, name_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    match access {
        PageAccess::All => pages,
        PageAccess::Only(allowed) => pages
            .into_iter()
            .filter(|page| allowed.contains(name_of(page)))
            .collect(),
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReplacePageUsersDto {
    #[validate(length(min = 1, max = 200))]
    pub page_name: String,
    #[validate(length(max = 200))]
    pub page_display_name: Option<String>,
    /// Users who may see this page. Empty clears the page.
    #[serde(default)]
    pub user_ids: Vec<UserId>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NavigationCheckRequest {
    #[validate(length(min = 1))]
    pub target_page: String,
    pub current_page: Option<String>,
    /// Page names in report order, used to pick a fallback page
    pub report_pages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageAccessResponse {
    pub dashboard_id: String,
    pub access: PageAccess,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(pages: &[&str]) -> PageAccess {
        PageAccess::from_rows(pages.iter().copied())
    }

    #[test]
    fn test_no_rows_means_all() {
        let access = PageAccess::from_rows(Vec::<String>::new());
        assert_eq!(access, PageAccess::All);
        assert!(!access.is_restricted());
    }

    #[test]
    fn test_unrestricted_user_can_go_anywhere() {
        for page in ["ReportSection", "ReportSection2", "anything"] {
            assert_eq!(
                check_navigation(&PageAccess::All, page, None, None),
                NavigationDecision::Allow
            );
        }
    }

    #[test]
    fn test_listed_page_is_allowed() {
        let access = only(&["A", "B"]);
        assert_eq!(
            check_navigation(&access, "B", Some("A"), None),
            NavigationDecision::Allow
        );
    }

    #[test]
    fn test_unlisted_page_reverts_to_current() {
        let access = only(&["A", "B"]);
        assert_eq!(
            check_navigation(&access, "C", Some("B"), None),
            NavigationDecision::Revert { to: "B".to_string() }
        );
    }

    #[test]
    fn test_unlisted_page_reverts_to_first_in_report_order() {
        let access = only(&["A", "B"]);
        let order = vec!["C".to_string(), "B".to_string(), "A".to_string()];
        assert_eq!(
            check_navigation(&access, "C", Some("C"), Some(&order)),
            NavigationDecision::Revert { to: "B".to_string() }
        );
    }

    #[test]
    fn test_unlisted_page_reverts_lexicographically_without_order() {
        let access = only(&["B", "A"]);
        assert_eq!(
            check_navigation(&access, "C", None, None),
            NavigationDecision::Revert { to: "A".to_string() }
        );
    }

    #[test]
    fn test_revert_target_is_always_allowed() {
        let access = only(&["A", "B"]);
        let order = vec!["X".to_string(), "Y".to_string()];
        match check_navigation(&access, "C", Some("Z"), Some(&order)) {
            NavigationDecision::Revert { to } => assert!(access.allows(&to)),
            NavigationDecision::Allow => panic!("C must not be allowed"),
        }
    }

    #[test]
    fn test_filter_pages_keeps_order() {
        let access = only(&["p3", "p1"]);
        let pages = vec!["p1", "p2", "p3"];
        assert_eq!(filter_pages(&access, pages, |p| *p), vec!["p1", "p3"]);

        let pages = vec!["p1", "p2"];
        assert_eq!(filter_pages(&PageAccess::All, pages, |p| *p), vec!["p1", "p2"]);
    }

    #[test]
    fn test_page_access_serialization() {
        assert_eq!(
            serde_json::to_value(PageAccess::All).unwrap(),
            serde_json::json!({"mode": "all"})
        );
        assert_eq!(
            serde_json::to_value(only(&["b", "a"])).unwrap(),
            serde_json::json!({"mode": "only", "pages": ["a", "b"]})
        );
    }

    #[test]
    fn test_decision_serialization() {
        assert_eq!(
            serde_json::to_value(NavigationDecision::Revert { to: "A".to_string() }).unwrap(),
            serde_json::json!({"decision": "revert", "to": "A"})
        );
    }
}
