//! Node Attributes
//!
//! Typed attribute keys for accessibility node data.

use serde::{Deserialize, Serialize};

/// String-valued attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringAttribute {
    Name,
    Value,
    Description,
    /// aria-live on the live region root itself
    LiveStatus,
    /// aria-relevant on the live region root itself
    LiveRelevant,
    /// aria-live of the enclosing live region
    ContainerLiveStatus,
    /// aria-relevant of the enclosing live region
    ContainerLiveRelevant,
    FontFamily,
}

/// Boolean attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolAttribute {
    /// aria-busy
    Busy,
    /// aria-atomic on this node
    LiveAtomic,
    /// Inside an aria-atomic container
    ContainerLiveAtomic,
    IsLineBreakingObject,
}

/// Integer attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntAttribute {
    NextOnLineId,
    PreviousOnLineId,
    /// ARGB
    Color,
    /// ARGB
    BackgroundColor,
    /// Bit set of [`TextStyles`] flags
    TextStyle,
    FontWeight,
}

/// Integer list attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntListAttribute {
    WordStarts,
    WordEnds,
    CharacterOffsets,
}

/// Text formatting of a node, collected from its style attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyles {
    pub color: Option<i32>,
    pub background_color: Option<i32>,
    pub text_style: Option<i32>,
    pub font_weight: Option<i32>,
    pub font_family: Option<String>,
}

impl TextStyles {
    pub const BOLD: i32 = 1 << 0;
    pub const ITALIC: i32 = 1 << 1;
    pub const UNDERLINE: i32 = 1 << 2;
    pub const LINE_THROUGH: i32 = 1 << 3;
    pub const OVERLINE: i32 = 1 << 4;

    /// No style attribute was present
    pub fn is_unset(&self) -> bool {
        self.color.is_none()
            && self.background_color.is_none()
            && self.text_style.is_none()
            && self.font_weight.is_none()
            && self.font_family.is_none()
    }

    /// Check a style flag such as [`TextStyles::BOLD`]
    pub fn has_style(&self, flag: i32) -> bool {
        self.text_style.map_or(false, |bits| bits & flag != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_styles() {
        assert!(TextStyles::default().is_unset());

        let styles = TextStyles {
            text_style: Some(TextStyles::BOLD | TextStyles::UNDERLINE),
            ..Default::default()
        };
        assert!(!styles.is_unset());
        assert!(styles.has_style(TextStyles::BOLD));
        assert!(styles.has_style(TextStyles::UNDERLINE));
        assert!(!styles.has_style(TextStyles::ITALIC));
    }
}
