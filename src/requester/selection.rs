/// A file-browser selection event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Folder the browser is showing, if any.
    pub target: Option<String>,
    /// Selected items, in browser order.
    pub items: Vec<String>,
}

impl Selection {
    pub fn new(target: Option<String>, items: Vec<String>) -> Self {
        Self { target, items }
    }

    pub fn of_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target: None,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Paths the action would apply to: the selected items, or the target
    /// folder when nothing is selected.
    pub fn candidates(&self) -> Vec<&str> {
        if self.items.is_empty() {
            self.target.as_deref().into_iter().collect()
        } else {
            self.items.iter().map(String::as_str).collect()
        }
    }
}
