use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps an identity or e-mail address so `Debug`/`Display` (and therefore
/// `tracing` fields) only show a redacted form. Serialization is unchanged,
/// API responses still carry the real value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T: AsRef<str>> Masked<T> {
    /// Redacted rendering: first character of the local part, then the domain.
    /// `john@example.com` -> `j***@example.com`, `alice` -> `a***`.
    pub fn redacted(&self) -> String {
        let value = self.0.as_ref();
        let (local, domain) = match value.split_once('@') {
            Some((local, domain)) => (local, Some(domain)),
            None => (value, None),
        };
        let head: String = local.chars().take(1).collect();
        match domain {
            Some(domain) => format!("{}***@{}", head, domain),
            None => format!("{}***", head),
        }
    }
}

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Masked({})", self.redacted())
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}
