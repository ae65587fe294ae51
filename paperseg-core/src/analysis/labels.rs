use serde::{Deserialize, Serialize};

use crate::error::{SegmentError, UnknownLabelSnafu};

/// PubLayNet layout classes, in the order the detector emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Text,
    Title,
    List,
    Table,
    Figure,
}

impl Label {
    pub const ALL: [Label; 5] = [
        Label::Text,
        Label::Title,
        Label::List,
        Label::Table,
        Label::Figure,
    ];

    /// Spelling used in segment file names, e.g. `003_Table.png`.
    pub const fn name(&self) -> &'static str {
        match self {
            Label::Text => "Text",
            Label::Title => "Title",
            Label::List => "List",
            Label::Table => "Table",
            Label::Figure => "Figure",
        }
    }

    pub const fn idx(&self) -> usize {
        match self {
            Label::Text => 0,
            Label::Title => 1,
            Label::List => 2,
            Label::Table => 3,
            Label::Figure => 4,
        }
    }

    pub const fn color(&self) -> [u8; 3] {
        match self {
            Label::Text => [0, 128, 0],     // Dark Green
            Label::Title => [255, 20, 147], // Deep Pink
            Label::List => [255, 165, 0],   // Orange
            Label::Table => [0, 0, 255],    // Blue
            Label::Figure => [128, 0, 128], // Purple
        }
    }

    pub const fn label_size() -> usize {
        5
    }

    /// Body-text classes, the only ones column statistics look at.
    pub const fn is_body_text(&self) -> bool {
        matches!(self, Label::Text | Label::List)
    }
}

impl TryFrom<usize> for Label {
    type Error = SegmentError;

    fn try_from(idx: usize) -> Result<Self, Self::Error> {
        Label::ALL
            .get(idx)
            .copied()
            .ok_or_else(|| UnknownLabelSnafu { idx }.build())
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_index_roundtrip() {
        for label in Label::ALL {
            assert_eq!(Label::try_from(label.idx()).unwrap(), label);
        }
        assert_eq!(Label::ALL.len(), Label::label_size());
    }

    #[test]
    fn test_label_unknown_index() {
        let err = Label::try_from(5).unwrap_err();
        assert!(matches!(err, SegmentError::UnknownLabel { idx: 5 }));
    }

    #[test]
    fn test_label_body_text() {
        assert!(Label::Text.is_body_text());
        assert!(Label::List.is_body_text());
        assert!(!Label::Title.is_body_text());
        assert!(!Label::Figure.is_body_text());
        assert_eq!(Label::Figure.to_string(), "Figure");
    }
}
