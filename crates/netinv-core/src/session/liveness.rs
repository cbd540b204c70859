// ── Liveness check ──
//
// The portal gives no session API; the only reliable signal is the title of
// its base page. An authenticated session renders the VLAN summary, every
// other outcome (login form, CAS error, expired cookie) renders something
// else.

use std::sync::LazyLock;

use scraper::{Html, Selector};

/// Exact title of the authenticated VLAN summary page, surrounding spaces
/// included.
pub const LIVENESS_MARKER: &str = " VLAN SUMMARY ";

/// Looser fragment polled for in the browser title right after login.
pub const MARKER_FRAGMENT: &str = "VLAN SUMMARY";

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));

/// Text of the first `<title>` element, untrimmed. `None` if the document
/// has no title.
pub fn page_title(page: &str) -> Option<String> {
    let document = Html::parse_document(page);
    document
        .select(&TITLE)
        .next()
        .map(|title| title.text().collect())
}

/// `true` only when the page title equals [`LIVENESS_MARKER`] exactly.
pub fn is_live(page: &str) -> bool {
    page_title(page).is_some_and(|title| is_live_title(&title))
}

pub fn is_live_title(title: &str) -> bool {
    title == LIVENESS_MARKER
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str) -> String {
        format!("<html><head><title>{title}</title></head><body></body></html>")
    }

    #[test]
    fn exact_marker_is_live() {
        assert!(is_live(&page(" VLAN SUMMARY ")));
    }

    #[test]
    fn near_misses_are_not_live() {
        assert!(!is_live(&page("VLAN SUMMARY")));
        assert!(!is_live(&page("")));
        assert!(!is_live(&page("Central Authentication Service")));
        assert!(!is_live(&page("  VLAN SUMMARY  ")));
        assert!(!is_live("<html><body><pre>VLAN SUMMARY</pre></body></html>"));
    }

    #[test]
    fn title_is_returned_untrimmed() {
        assert_eq!(page_title(&page(" VLAN SUMMARY ")).as_deref(), Some(" VLAN SUMMARY "));
        assert_eq!(page_title("<p>no head</p>"), None);
    }
}
