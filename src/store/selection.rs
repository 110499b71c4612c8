//! Which person the detail panel is focused on.

/// At most one selected person, by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus on `id`, replacing any previous selection.
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn current(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.current() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_and_clear() {
        let mut selection = Selection::new();
        assert_eq!(selection.current(), None);

        selection.select("p1");
        assert!(selection.is_selected("p1"));

        selection.select("p2");
        assert!(!selection.is_selected("p1"));
        assert_eq!(selection.current(), Some("p2"));

        selection.clear();
        assert_eq!(selection.current(), None);
    }
}
