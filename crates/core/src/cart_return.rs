//! Cart-return handling.
//!
//! The external checkout sends visitors back with `cart_return=true` in the
//! query string. On seeing it we open the cart aside once and replace the
//! current URL with the same URL minus the marker, so a reload or a shared
//! link does not open the cart again.

use url::form_urlencoded;

use crate::aside::AsideKind;

/// Query parameter set by the checkout redirect.
pub const CART_RETURN_PARAM: &str = "cart_return";

/// Value of [`CART_RETURN_PARAM`] that triggers the handler.
pub const CART_RETURN_VALUE: &str = "true";

/// Opens named aside panels.
pub trait AsidePanel {
    /// Open `kind`. Fire-and-forget.
    fn open(&mut self, kind: AsideKind);
}

/// Replaces the current history entry.
pub trait Navigator {
    /// Navigate to `url` without pushing a new history entry.
    fn replace(&mut self, url: &str);
}

/// What the handler did for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartReturn {
    /// No marker (or no panel to open); nothing happened.
    Ignored,
    /// Cart opened and the URL replaced with `location`.
    Consumed {
        /// The scrubbed path and query.
        location: String,
    },
}

impl CartReturn {
    /// Run the handler for the URL made of `path` and `query`.
    ///
    /// Without a `panel` the handler does nothing at all, leaving the marker
    /// in place for a later navigation that has one.
    pub fn handle<P, N>(path: &str, query: Option<&str>, panel: Option<&mut P>, nav: &mut N) -> Self
    where
        P: AsidePanel + ?Sized,
        N: Navigator + ?Sized,
    {
        let Some(panel) = panel else {
            return Self::Ignored;
        };
        let Some(location) = scrubbed_location(path, query) else {
            return Self::Ignored;
        };

        panel.open(AsideKind::Cart);
        nav.replace(&location);
        Self::Consumed { location }
    }

    /// Whether the marker was consumed.
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed { .. })
    }
}

/// Whether `query` carries the marker.
///
/// Only the first `cart_return` pair counts, and its value must be exactly
/// `true`.
#[must_use]
pub fn has_marker(query: &str) -> bool {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == CART_RETURN_PARAM)
        .is_some_and(|(_, value)| value == CART_RETURN_VALUE)
}

/// Whether `path` stays on this site when used as a redirect target.
///
/// It must start with a single `/`; `//host` is protocol-relative and
/// browsers read `\` as `/`.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

/// The URL to replace the current one with, or `None` when there is no
/// marker or `path` is not a local path.
///
/// Every `cart_return` pair is removed; the remaining pairs keep their order
/// and are re-encoded as `application/x-www-form-urlencoded`.
#[must_use]
pub fn scrubbed_location(path: &str, query: Option<&str>) -> Option<String> {
    let query = query?;
    if !has_marker(query) || !is_local_path(path) {
        return None;
    }

    let remaining = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(
            form_urlencoded::parse(query.as_bytes()).filter(|(key, _)| key != CART_RETURN_PARAM),
        )
        .finish();

    if remaining.is_empty() {
        Some(path.to_string())
    } else {
        Some(format!("{path}?{remaining}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingPanel {
        opened: Vec<AsideKind>,
    }

    impl AsidePanel for RecordingPanel {
        fn open(&mut self, kind: AsideKind) {
            self.opened.push(kind);
        }
    }

    /// Navigator over a single-entry history.
    struct History {
        entries: Vec<String>,
    }

    impl History {
        fn at(url: &str) -> Self {
            Self {
                entries: vec![url.to_string()],
            }
        }

        fn current(&self) -> &str {
            self.entries.last().map_or("", String::as_str)
        }

        fn split(&self) -> (String, Option<String>) {
            match self.current().split_once('?') {
                Some((path, query)) => (path.to_string(), Some(query.to_string())),
                None => (self.current().to_string(), None),
            }
        }

        fn run(&mut self, panel: &mut RecordingPanel) -> CartReturn {
            let (path, query) = self.split();
            CartReturn::handle(&path, query.as_deref(), Some(panel), self)
        }
    }

    impl Navigator for History {
        fn replace(&mut self, url: &str) {
            if let Some(last) = self.entries.last_mut() {
                *last = url.to_string();
            }
        }
    }

    #[test]
    fn test_marker_opens_cart_and_scrubs_url() {
        let mut history = History::at("/?cart_return=true&foo=bar");
        let mut panel = RecordingPanel::default();

        let result = history.run(&mut panel);

        assert_eq!(
            result,
            CartReturn::Consumed {
                location: "/?foo=bar".to_string()
            }
        );
        assert_eq!(panel.opened, vec![AsideKind::Cart]);
        assert_eq!(history.current(), "/?foo=bar");
        assert_eq!(history.entries.len(), 1);
    }

    #[test]
    fn test_no_marker_is_noop() {
        let mut history = History::at("/?foo=bar");
        let mut panel = RecordingPanel::default();

        assert_eq!(history.run(&mut panel), CartReturn::Ignored);
        assert!(panel.opened.is_empty());
        assert_eq!(history.current(), "/?foo=bar");
    }

    #[test]
    fn test_rerun_after_scrub_is_noop() {
        let mut history = History::at("/products/bio-trace-mix?cart_return=true");
        let mut panel = RecordingPanel::default();

        assert!(history.run(&mut panel).is_consumed());
        assert_eq!(history.current(), "/products/bio-trace-mix");

        assert_eq!(history.run(&mut panel), CartReturn::Ignored);
        assert_eq!(history.run(&mut panel), CartReturn::Ignored);
        assert_eq!(panel.opened, vec![AsideKind::Cart]);
    }

    #[test]
    fn test_only_exact_true_triggers() {
        for query in ["cart_return=1", "cart_return=TRUE", "cart_return=", "cart_return"] {
            assert!(!has_marker(query), "{query} should not trigger");
        }
        assert!(has_marker("cart_return=true"));
        assert!(has_marker("a=1&cart_return=true"));
    }

    #[test]
    fn test_first_occurrence_decides() {
        assert!(!has_marker("cart_return=false&cart_return=true"));
        assert!(has_marker("cart_return=true&cart_return=false"));
    }

    #[test]
    fn test_all_marker_pairs_removed_order_preserved() {
        assert_eq!(
            scrubbed_location("/shop", Some("z=1&cart_return=true&a=2&cart_return=x&m=3")),
            Some("/shop?z=1&a=2&m=3".to_string())
        );
    }

    #[test]
    fn test_marker_only_leaves_bare_path() {
        assert_eq!(
            scrubbed_location("/", Some("cart_return=true")),
            Some("/".to_string())
        );
    }

    #[test]
    fn test_no_query() {
        assert_eq!(scrubbed_location("/", None), None);
    }

    #[test]
    fn test_remaining_pairs_are_form_encoded() {
        assert_eq!(
            scrubbed_location("/search", Some("q=trace%20minerals&cart_return=true")),
            Some("/search?q=trace+minerals".to_string())
        );
    }

    #[test]
    fn test_off_site_paths_are_left_alone() {
        for path in ["//evil.example/", "///evil.example", "/\\evil.example", "evil.example"] {
            assert_eq!(
                scrubbed_location(path, Some("cart_return=true")),
                None,
                "{path} must not become a redirect"
            );
        }

        let mut history = History::at("//evil.example/?cart_return=true");
        let mut panel = RecordingPanel::default();
        assert_eq!(history.run(&mut panel), CartReturn::Ignored);
        assert!(panel.opened.is_empty());
        assert_eq!(history.current(), "//evil.example/?cart_return=true");
    }

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/"));
        assert!(is_local_path("/search?q=rose"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("/\\evil.example"));
        assert!(!is_local_path("https://evil.example"));
        assert!(!is_local_path(""));
    }

    #[test]
    fn test_missing_panel_skips_everything() {
        let mut history = History::at("/?cart_return=true");
        let result = CartReturn::handle::<RecordingPanel, _>(
            "/",
            Some("cart_return=true"),
            None,
            &mut history,
        );

        assert_eq!(result, CartReturn::Ignored);
        assert_eq!(history.current(), "/?cart_return=true");
    }
}
