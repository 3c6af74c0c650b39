/// Directories saved by `pushd`, most recent on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirStack {
    entries: Vec<String>,
}

impl DirStack {
    pub fn new() -> Self {
        DirStack { entries: Vec::new() }
    }

    pub fn push(&mut self, dir: String) {
        self.entries.push(dir);
    }

    pub fn pop(&mut self) -> Option<String> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<&str> {
        self.entries.last().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = DirStack::new();
        assert!(stack.is_empty());
        stack.push("/a".to_string());
        stack.push("/b".to_string());
        assert_eq!(stack.top(), Some("/b"));
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec!["/b", "/a"]);
        assert_eq!(stack.pop().as_deref(), Some("/b"));
        assert_eq!(stack.pop().as_deref(), Some("/a"));
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.len(), 0);
    }
}
