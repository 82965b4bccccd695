use std::fmt::Display;

/// Deterministic cache key for one logical read call.
///
/// Rendered as `prefix:operation:name=value:...` with argument pairs in
/// declaration order. Two calls with the same prefix, operation, and
/// textual argument values always render the same key, independent of
/// call site. The receiver is never part of the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    rendered: String,
}

impl CacheKey {
    pub fn new(key_prefix: &str, operation: &str) -> Self {
        Self {
            rendered: format!("{key_prefix}:{operation}"),
        }
    }

    /// Append one named argument in declaration order.
    pub fn arg(mut self, name: &str, value: impl Display) -> Self {
        self.rendered.push(':');
        self.rendered.push_str(name);
        self.rendered.push('=');
        self.rendered.push_str(&value.to_string());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
