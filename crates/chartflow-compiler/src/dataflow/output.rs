//! Output nodes

/// Named checkpoint other components read by name
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNode {
    pub name: String,
    /// Survives dead node elimination
    pub required: bool,
    /// Record this output resolves to, set during assembly
    pub resolved: Option<String>,
}

impl OutputNode {
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
            resolved: None,
        }
    }

    pub fn mark_required(&mut self) {
        self.required = true;
    }
}
