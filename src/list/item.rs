//! The decoded, immutable unit shown as one list row.

/// A title/description pair produced by the record decoder.
///
/// Items are never mutated after construction; the store only appends them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    title: String,
    description: String,
}

impl DisplayItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Length of the title in characters, the boundary used to split match offsets.
    pub fn title_len(&self) -> usize {
        self.title.chars().count()
    }

    /// Text the filter matches against: `title ++ description`.
    pub fn filter_value(&self) -> String {
        let mut value = String::with_capacity(self.title.len() + self.description.len());
        value.push_str(&self.title);
        value.push_str(&self.description);
        value
    }
}
