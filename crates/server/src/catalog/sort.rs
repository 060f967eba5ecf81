//! Catalog sort selection.

use crate::error::ValidationErrors;

/// Direction of a requested sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The value the store's sort document expects: 1 or -1.
    #[must_use]
    pub const fn as_order(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }
}

/// The sort key a request asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price(SortDirection),
    Rating(SortDirection),
}

/// Requested sort criteria, at most one of which is honored.
///
/// `sort_by_price` and `sort_by_rating` are separate parameters on the wire;
/// when a client sends both, price wins. Neither means store order (or
/// whatever ordering the filter itself couples in, such as availability or
/// proximity).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSelector {
    pub price: Option<SortDirection>,
    pub rating: Option<SortDirection>,
}

impl SortSelector {
    /// Normalize raw query pairs into a selector. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns field-keyed [`ValidationErrors`] when a direction value is
    /// neither `asc` nor `desc`.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ValidationErrors>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut selector = Self::default();
        let mut errors = ValidationErrors::new();

        for (key, value) in pairs {
            let field = match key {
                "sort_by_price" | "sort_by_rating" => key,
                _ => continue,
            };
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            match SortDirection::parse(trimmed) {
                Some(direction) if field == "sort_by_price" => selector.price = Some(direction),
                Some(direction) => selector.rating = Some(direction),
                None => errors.add(field, format!("expected asc or desc, got {trimmed:?}")),
            }
        }

        if errors.is_empty() {
            Ok(selector)
        } else {
            Err(errors)
        }
    }

    /// The single criterion this request sorts by, price taking precedence.
    #[must_use]
    pub const fn requested(&self) -> Option<SortKey> {
        match (self.price, self.rating) {
            (Some(direction), _) => Some(SortKey::Price(direction)),
            (None, Some(direction)) => Some(SortKey::Rating(direction)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_means_store_order() {
        let selector = SortSelector::from_pairs([]).unwrap();
        assert_eq!(selector.requested(), None);
    }

    #[test]
    fn test_price_directions() {
        let asc = SortSelector::from_pairs([("sort_by_price", "asc")]).unwrap();
        assert_eq!(asc.requested(), Some(SortKey::Price(SortDirection::Asc)));

        let desc = SortSelector::from_pairs([("sort_by_price", "DESC")]).unwrap();
        assert_eq!(desc.requested(), Some(SortKey::Price(SortDirection::Desc)));
    }

    #[test]
    fn test_rating_sort() {
        let selector = SortSelector::from_pairs([("sort_by_rating", "desc")]).unwrap();
        assert_eq!(
            selector.requested(),
            Some(SortKey::Rating(SortDirection::Desc))
        );
    }

    #[test]
    fn test_price_wins_over_rating() {
        let selector =
            SortSelector::from_pairs([("sort_by_rating", "desc"), ("sort_by_price", "asc")])
                .unwrap();
        assert_eq!(selector.requested(), Some(SortKey::Price(SortDirection::Asc)));
    }

    #[test]
    fn test_invalid_direction_is_field_keyed_error() {
        let err = SortSelector::from_pairs([("sort_by_price", "upwards")]).unwrap_err();
        assert!(err.fields().any(|f| f == "sort_by_price"));
    }

    #[test]
    fn test_as_order() {
        assert_eq!(SortDirection::Asc.as_order(), 1);
        assert_eq!(SortDirection::Desc.as_order(), -1);
    }
}
