//! First-match keyword classification.

use crate::IssueCatalog;
use helpdesk_types::IssueCategory;

/// A classified description: the category and the keyword that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueMatch<'a> {
    pub category: &'a IssueCategory,
    pub keyword: &'a str,
}

/// Resolves free text to the first matching catalog category.
///
/// Returns `None` when no keyword occurs in the text.
pub fn classify<'a>(catalog: &'a IssueCatalog, text: &str) -> Option<&'a IssueCategory> {
    classify_match(catalog, text).map(|m| m.category)
}

/// Like [`classify`], but also reports which keyword matched.
///
/// Categories are scanned in catalog order and keywords in their configured
/// order; there is no scoring, so text mentioning two categories resolves
/// to whichever comes first in the catalog.
pub fn classify_match<'a>(catalog: &'a IssueCatalog, text: &str) -> Option<IssueMatch<'a>> {
    let text = text.to_lowercase();
    if text.trim().is_empty() {
        return None;
    }

    for category in catalog.all() {
        if let Some(keyword) = category.keywords.iter().find(|k| text.contains(k.as_str())) {
            tracing::debug!(
                category = %category.key,
                keyword = %keyword,
                "classified issue description"
            );
            return Some(IssueMatch {
                category,
                keyword: keyword.as_str(),
            });
        }
    }

    tracing::debug!("issue description matched no catalog keyword");
    None
}
