use std::collections::HashSet;

/// Prompts already shown during one play-through.
///
/// Insertion order is kept so the exclusion list sent to the generator reads
/// oldest first. Entries are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskedQuestions {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl AskedQuestions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a prompt; returns `false` if it was already present.
    pub fn record(&mut self, prompt: &str) -> bool {
        if self.seen.contains(prompt) {
            return false;
        }
        self.seen.insert(prompt.to_string());
        self.order.push(prompt.to_string());
        true
    }

    #[must_use]
    pub fn contains(&self, prompt: &str) -> bool {
        self.seen.contains(prompt)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_seen_order_and_ignores_duplicates() {
        let mut asked = AskedQuestions::new();
        assert!(asked.record("b"));
        assert!(asked.record("a"));
        assert!(!asked.record("b"));
        assert_eq!(asked.to_vec(), vec!["b".to_string(), "a".to_string()]);
        assert!(asked.contains("a"));
        assert!(!asked.contains("A"));
    }
}
