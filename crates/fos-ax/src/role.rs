//! Accessibility Roles
//!
//! ARIA roles plus the engine-internal roles that carry text
//! (static text, inline text boxes, line breaks).

use serde::{Deserialize, Serialize};

/// Role of an accessibility node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Unknown,

    // === Engine Roles ===
    RootWebArea,
    StaticText,
    InlineTextBox,
    LineBreak,
    ListMarker,
    Iframe,
    GenericContainer,

    // === Landmark Roles ===
    Banner,
    Complementary,
    ContentInfo,
    Form,
    Main,
    Navigation,
    Region,
    Search,

    // === Widget Roles ===
    Button,
    Checkbox,
    Combobox,
    Link,
    Listbox,
    MenuItem,
    Option,
    ProgressBar,
    Radio,
    Slider,
    SpinButton,
    Switch,
    Tab,
    TabPanel,
    TextField,

    // === Document Structure Roles ===
    Article,
    Cell,
    Document,
    Figure,
    Group,
    Heading,
    Image,
    List,
    ListItem,
    Paragraph,
    Row,
    Table,
    Toolbar,

    // === Live Region Roles ===
    Alert,
    Log,
    Marquee,
    Status,
    Timer,

    // === Window Roles ===
    AlertDialog,
    Dialog,
    ToolTip,
}

impl Role {
    /// Parse an ARIA role attribute value
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().as_str() {
            "banner" => Self::Banner,
            "complementary" => Self::Complementary,
            "contentinfo" => Self::ContentInfo,
            "form" => Self::Form,
            "main" => Self::Main,
            "navigation" => Self::Navigation,
            "region" => Self::Region,
            "search" => Self::Search,

            "button" => Self::Button,
            "checkbox" => Self::Checkbox,
            "combobox" => Self::Combobox,
            "link" => Self::Link,
            "listbox" => Self::Listbox,
            "menuitem" => Self::MenuItem,
            "option" => Self::Option,
            "progressbar" => Self::ProgressBar,
            "radio" => Self::Radio,
            "slider" => Self::Slider,
            "spinbutton" => Self::SpinButton,
            "switch" => Self::Switch,
            "tab" => Self::Tab,
            "tabpanel" => Self::TabPanel,
            "textbox" | "searchbox" => Self::TextField,

            "article" => Self::Article,
            "cell" | "gridcell" => Self::Cell,
            "document" => Self::Document,
            "figure" => Self::Figure,
            "generic" => Self::GenericContainer,
            "group" => Self::Group,
            "heading" => Self::Heading,
            "img" | "image" => Self::Image,
            "list" => Self::List,
            "listitem" => Self::ListItem,
            "paragraph" => Self::Paragraph,
            "row" => Self::Row,
            "table" => Self::Table,
            "toolbar" => Self::Toolbar,

            "alert" => Self::Alert,
            "log" => Self::Log,
            "marquee" => Self::Marquee,
            "status" => Self::Status,
            "timer" => Self::Timer,

            "alertdialog" => Self::AlertDialog,
            "dialog" => Self::Dialog,
            "tooltip" => Self::ToolTip,

            _ => return None,
        })
    }

    /// Text-bearing role: its name is the text itself
    pub fn is_text(&self) -> bool {
        matches!(self, Self::StaticText | Self::InlineTextBox | Self::LineBreak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(Role::parse("button"), Some(Role::Button));
        assert_eq!(Role::parse(" Status "), Some(Role::Status));
        assert_eq!(Role::parse("searchbox"), Some(Role::TextField));
        assert_eq!(Role::parse("bogus"), None);
    }

    #[test]
    fn test_text_roles() {
        assert!(Role::StaticText.is_text());
        assert!(Role::InlineTextBox.is_text());
        assert!(Role::LineBreak.is_text());
        assert!(!Role::Group.is_text());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Role::StaticText).unwrap();
        assert_eq!(json, "\"static_text\"");
        let role: Role = serde_json::from_str("\"inline_text_box\"").unwrap();
        assert_eq!(role, Role::InlineTextBox);
    }
}
