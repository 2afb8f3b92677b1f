//! Load tokens: which `load_page` call is the newest.

/// Identifies one `load_page` call. Later calls get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadToken(u64);

impl LoadToken {
    /// Raw counter value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LoadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing [`LoadToken`]s.
#[derive(Debug, Clone, Default)]
pub struct LoadTokenSource {
    next: u64,
}

impl LoadTokenSource {
    /// Issue the next token.
    pub fn issue(&mut self) -> LoadToken {
        self.next += 1;
        LoadToken(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_strictly_increase() {
        let mut source = LoadTokenSource::default();
        let a = source.issue();
        let b = source.issue();
        let c = source.issue();
        assert!(a < b && b < c);
        assert_ne!(a, c);
        assert_eq!(c.to_string(), "#3");
    }
}
