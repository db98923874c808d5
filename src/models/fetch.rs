//! Fail-soft fetch results

/// Value returned by the market data gateway.
///
/// A failed fetch still yields an (empty) value, so callers that only care
/// about data can call [`Fetch::into_inner`] and treat empty as "no data".
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Fresh(T),
    Fallback { value: T, reason: String },
}

impl<T> Fetch<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Fetch::Fallback { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Fetch::Fresh(value) => value,
            Fetch::Fallback { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Fetch::Fresh(value) => value,
            Fetch::Fallback { value, .. } => value,
        }
    }
}

impl<T: Default> Fetch<T> {
    pub fn fallback(reason: impl Into<String>) -> Self {
        Fetch::Fallback {
            value: T::default(),
            reason: reason.into(),
        }
    }
}
