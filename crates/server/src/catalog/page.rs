//! Pagination window calculation.

use crate::error::ValidationErrors;

/// The sentinel `limit` value meaning "no pagination window".
const UNLIMITED: &str = "all";

/// A validated pagination window.
///
/// `page` is 1-based and already clamped: a client asking for page 0 or a
/// negative page gets page 1, never a negative skip. `limit` absent, `0` or
/// the `all` sentinel means unlimited, in which case no window is applied
/// and no page count is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageWindow {
    #[default]
    Unlimited,
    Bounded { page: u64, limit: u64 },
}

impl PageWindow {
    /// Normalize raw `page` and `limit` values.
    ///
    /// # Errors
    ///
    /// Returns field-keyed [`ValidationErrors`] for non-numeric values or a
    /// negative limit.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let page = match page.map(str::trim).filter(|p| !p.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) => u64::try_from(n.max(1)).unwrap_or(1),
                Err(_) => {
                    errors.add("page", format!("expected an integer, got {raw:?}"));
                    1
                }
            },
        };

        let limit = match limit.map(str::trim).filter(|l| !l.is_empty()) {
            None => None,
            Some(raw) if raw.eq_ignore_ascii_case(UNLIMITED) => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(0) => None,
                Ok(n) if n > 0 => Some(n.unsigned_abs()),
                Ok(n) => {
                    errors.add("limit", format!("expected a non-negative page size, got {n}"));
                    None
                }
                Err(_) => {
                    errors.add("limit", format!("expected an integer or \"all\", got {raw:?}"));
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(limit.map_or(Self::Unlimited, |limit| Self::Bounded { page, limit }))
    }

    /// Whether a window is applied at all.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        matches!(self, Self::Bounded { .. })
    }

    /// Documents to skip before the window: `(page - 1) * limit`.
    #[must_use]
    pub const fn skip(&self) -> Option<u64> {
        match self {
            Self::Unlimited => None,
            Self::Bounded { page, limit } => Some((*page - 1) * *limit),
        }
    }

    /// Window size, in the store's signed form.
    #[must_use]
    pub const fn limit(&self) -> Option<i64> {
        match self {
            Self::Unlimited => None,
            #[allow(clippy::cast_possible_wrap)] // page sizes never approach i64::MAX
            Self::Bounded { limit, .. } => Some(*limit as i64),
        }
    }

    /// Total page count for `matched` documents: `ceil(matched / limit)`.
    ///
    /// `None` when unlimited; bounded windows over an empty result report
    /// zero pages.
    #[must_use]
    pub const fn total_pages(&self, matched: u64) -> Option<u64> {
        match self {
            Self::Unlimited => None,
            Self::Bounded { limit, .. } => Some(matched.div_ceil(*limit)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_unlimited() {
        assert_eq!(PageWindow::from_raw(None, None).unwrap(), PageWindow::Unlimited);
    }

    #[test]
    fn test_bounded_window_math() {
        let window = PageWindow::from_raw(Some("3"), Some("12")).unwrap();
        assert_eq!(window, PageWindow::Bounded { page: 3, limit: 12 });
        assert_eq!(window.skip(), Some(24));
        assert_eq!(window.limit(), Some(12));
    }

    #[test]
    fn test_page_clamps_to_one() {
        for raw in ["0", "-5"] {
            let window = PageWindow::from_raw(Some(raw), Some("10")).unwrap();
            assert_eq!(window.skip(), Some(0), "page {raw} should clamp to 1");
        }
    }

    #[test]
    fn test_unlimited_sentinels() {
        for raw in ["all", "ALL", "0"] {
            let window = PageWindow::from_raw(Some("2"), Some(raw)).unwrap();
            assert_eq!(window, PageWindow::Unlimited, "limit {raw:?}");
            assert_eq!(window.skip(), None);
            assert_eq!(window.limit(), None);
            assert_eq!(window.total_pages(99), None);
        }
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        let window = PageWindow::from_raw(Some("1"), Some("12")).unwrap();
        assert_eq!(window.total_pages(15), Some(2));
        assert_eq!(window.total_pages(24), Some(2));
        assert_eq!(window.total_pages(25), Some(3));
        assert_eq!(window.total_pages(0), Some(0));
    }

    #[test]
    fn test_non_numeric_page_is_field_keyed_error() {
        let err = PageWindow::from_raw(Some("first"), None).unwrap_err();
        assert!(err.fields().any(|f| f == "page"));
    }

    #[test]
    fn test_negative_limit_is_field_keyed_error() {
        let err = PageWindow::from_raw(None, Some("-3")).unwrap_err();
        assert!(err.fields().any(|f| f == "limit"));
    }

    #[test]
    fn test_blank_values_fall_back() {
        let window = PageWindow::from_raw(Some("  "), Some("")).unwrap();
        assert_eq!(window, PageWindow::Unlimited);
    }
}
