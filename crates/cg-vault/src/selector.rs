//! Note selectors.

use std::path::PathBuf;

/// Which notes a fetch returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every note in the vault.
    All,
    /// Notes under a folder, relative to the vault root.
    Folder(PathBuf),
    /// Notes carrying a tag, without the leading `#`.
    Tag(String),
}

impl Selector {
    /// Parses `/`, `#tag`, `folder` or `"folder"`.
    ///
    /// Blank input selects everything; callers going through
    /// `aggregate_from_source` never reach this with a blank selector.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Some(tag) = input.strip_prefix('#') {
            return Self::Tag(tag.trim().to_string());
        }

        let folder = input
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(input)
            .trim_matches('/');
        if folder.is_empty() {
            Self::All
        } else {
            Self::Folder(PathBuf::from(folder))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_form() {
        assert_eq!(Selector::parse("/"), Selector::All);
        assert_eq!(Selector::parse("#daily"), Selector::Tag("daily".to_string()));
        assert_eq!(
            Selector::parse("\"journal/2024\""),
            Selector::Folder(PathBuf::from("journal/2024"))
        );
        assert_eq!(
            Selector::parse(" projects/ "),
            Selector::Folder(PathBuf::from("projects"))
        );
        assert_eq!(Selector::parse("\"\""), Selector::All);
    }
}
