use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of the results list. Rows have no identity beyond their position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayItem {
    Text {
        content: String,
    },
    Paper {
        title: String,
        authors: Vec<String>,
        summary: String,
    },
}

impl DisplayItem {
    pub fn text(content: impl Into<String>) -> Self {
        DisplayItem::Text {
            content: content.into(),
        }
    }

    /// First line shown for the item in a list
    pub fn headline(&self) -> &str {
        match self {
            DisplayItem::Text { content } => content,
            DisplayItem::Paper { title, .. } => title,
        }
    }

    /// All lines of the item, for multi-line rendering and plain output
    pub fn lines(&self) -> Vec<String> {
        match self {
            DisplayItem::Text { content } => content.lines().map(str::to_string).collect(),
            DisplayItem::Paper {
                title,
                authors,
                summary,
            } => {
                let mut lines = vec![title.clone()];
                if !authors.is_empty() {
                    lines.push(format!("  {}", authors.join(", ")));
                }
                if !summary.is_empty() {
                    lines.push(format!("  {}", summary));
                }
                lines
            }
        }
    }
}

impl fmt::Display for DisplayItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lines_split_on_newlines() {
        let item = DisplayItem::text("first\nsecond");
        assert_eq!(item.lines(), vec!["first", "second"]);
        assert_eq!(item.headline(), "first\nsecond");
    }

    #[test]
    fn test_paper_lines_skip_empty_parts() {
        let item = DisplayItem::Paper {
            title: "Attention Is All You Need".to_string(),
            authors: vec!["Vaswani".to_string(), "Shazeer".to_string()],
            summary: String::new(),
        };
        assert_eq!(
            item.lines(),
            vec!["Attention Is All You Need", "  Vaswani, Shazeer"]
        );
        assert_eq!(item.to_string(), "Attention Is All You Need\n  Vaswani, Shazeer");
    }
}
