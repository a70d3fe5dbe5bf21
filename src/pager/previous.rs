//! Remembers the last observed value of a piece of state

/// Holds the value seen at the previous observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Previous<T> {
    value: Option<T>,
}

impl<T> Previous<T> {
    /// Create a tracker that has not observed anything yet
    pub fn new() -> Self {
        Self { value: None }
    }

    /// The previously observed value, if any
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Record `value` and return what was observed before it
    pub fn observe(&mut self, value: T) -> Option<T> {
        self.value.replace(value)
    }
}

impl<T> Default for Previous<T> {
    fn default() -> Self {
        Self::new()
    }
}
