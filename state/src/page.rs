use newtab_core::search_url::DEFAULT_SEARCH_TEMPLATE;
use serde::Deserialize;
use serde::Serialize;

/// Store key the page state lives under.
pub const PAGE_STATE_KEY: &str = "search_state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    pub kind: BackgroundKind,
    /// URL or local path of the media.
    pub source: String,
}

impl Background {
    /// Classify a background source the way the page does: `.mp4` is video,
    /// everything else is an image.
    pub fn from_source(source: String) -> Self {
        let kind = if source.to_lowercase().ends_with(".mp4") {
            BackgroundKind::Video
        } else {
            BackgroundKind::Image
        };
        Self { kind, source }
    }
}

/// One icon link on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardItem {
    pub link_url: String,
    pub icon_url: String,
    pub id: u64,
}

/// Everything the page persists between loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageState {
    pub background: Option<Background>,
    pub items: Vec<BoardItem>,
    pub style: String,
    pub text_color: Option<String>,
    pub search_engine_name: String,
    pub search_engine_template: String,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            background: None,
            items: Vec::new(),
            style: "1".to_string(),
            text_color: None,
            search_engine_name: "google".to_string(),
            search_engine_template: DEFAULT_SEARCH_TEMPLATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mp4_sources_are_video() {
        let bg = Background::from_source("https://cdn.example.com/clip.MP4".to_string());
        assert_eq!(bg.kind, BackgroundKind::Video);
        let bg = Background::from_source("https://cdn.example.com/pic.png".to_string());
        assert_eq!(bg.kind, BackgroundKind::Image);
    }

    #[test]
    fn default_page_state_uses_google() {
        let page = PageState::default();
        assert_eq!(page.search_engine_name, "google");
        assert_eq!(page.search_engine_template, DEFAULT_SEARCH_TEMPLATE);
        assert_eq!(page.style, "1");
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let page: PageState = serde_json::from_str(r#"{"style":"2"}"#).expect("page state");
        assert_eq!(page.style, "2");
        assert!(page.items.is_empty());
    }
}
