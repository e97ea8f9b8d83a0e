//! Value-or-fallback results for collaborator boundaries.
//!
//! Every external call in an assessment (classifier, knowledge retrieval,
//! facility lookup, email) degrades to a safe default instead of failing
//! the request. `Recovered` keeps the reason for the fallback so callers
//! can log it without changing what the client sees.

/// Which collaborator boundary produced a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Classifier,
    Knowledge,
    FacilityLookup,
    Notification,
}

impl Boundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Boundary::Classifier => "classifier",
            Boundary::Knowledge => "knowledge",
            Boundary::FacilityLookup => "facility_lookup",
            Boundary::Notification => "notification",
        }
    }
}

/// A collaborator result: either the real value or a substituted default.
#[derive(Debug, Clone, PartialEq)]
pub enum Recovered<T> {
    Value(T),
    Fallback {
        value: T,
        boundary: Boundary,
        reason: String,
    },
}

impl<T> Recovered<T> {
    /// Convert a `Result`, substituting `fallback()` on error and logging the reason.
    pub fn from_result<E, F>(result: Result<T, E>, boundary: Boundary, fallback: F) -> Self
    where
        E: std::fmt::Display,
        F: FnOnce() -> T,
    {
        match result {
            Ok(value) => Recovered::Value(value),
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(boundary = boundary.as_str(), reason = %reason, "Falling back to default");
                Recovered::Fallback {
                    value: fallback(),
                    boundary,
                    reason,
                }
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Recovered::Fallback { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Recovered::Value(value) | Recovered::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Recovered::Value(value) | Recovered::Fallback { value, .. } => value,
        }
    }

    /// The fallback reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Recovered::Value(_) => None,
            Recovered::Fallback { reason, .. } => Some(reason),
        }
    }
}
