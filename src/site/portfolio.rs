//! Public portfolio gallery

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::collection::DataList;
use crate::error::Result;
use crate::models::PortfolioItem;
use crate::scope::ViewScope;
use crate::Reelhouse;

/// Bundled images used when an item has neither an image nor a video link
pub const FALLBACK_IMAGES: [&str; 4] = [
    "/assets/portfolio-wedding-1.jpg",
    "/assets/portfolio-couple-1.jpg",
    "/assets/portfolio-event-1.jpg",
    "/assets/portfolio-video-1.jpg",
];

static YOUTUBE_ID: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|v/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .ok()
});

/// The 11-character video id inside a watch, short, embed or shorts URL
pub fn youtube_id(url: &str) -> Option<&str> {
    YOUTUBE_ID
        .as_ref()?
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

pub fn youtube_thumbnail(url: &str) -> Option<String> {
    youtube_id(url).map(|id| format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id))
}

/// Image shown for the item at `position`: its own image, else the video's
/// thumbnail, else one of the bundled fallbacks.
pub fn display_image(item: &PortfolioItem, position: usize) -> String {
    if let Some(url) = item.image_url.as_deref().filter(|url| !url.is_empty()) {
        return url.to_string();
    }

    if let Some(thumbnail) = item.youtube_url.as_deref().and_then(youtube_thumbnail) {
        return thumbnail;
    }

    FALLBACK_IMAGES[position % FALLBACK_IMAGES.len()].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileAction {
    /// Open the link in a new browsing context
    OpenInNewContext(String),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryTile {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub image: String,
    pub is_video: bool,
    pub display_order: i32,
    pub action: TileAction,
}

impl GalleryTile {
    fn new(item: &PortfolioItem, position: usize) -> Self {
        let action = match item.youtube_url.as_deref() {
            Some(url) if !url.trim().is_empty() => TileAction::OpenInNewContext(url.to_string()),
            _ => TileAction::None,
        };

        Self {
            id: item.id,
            title: item.title.clone(),
            category: item.category.clone(),
            image: display_image(item, position),
            is_video: item.is_video,
            display_order: item.display_order,
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryState {
    Loading,
    ComingSoon,
    Ready(Vec<GalleryTile>),
}

/// The "Featured Work" section
pub struct PortfolioGallery {
    list: DataList<PortfolioItem>,
    state: GalleryState,
}

impl PortfolioGallery {
    pub fn new(client: Reelhouse) -> Self {
        let list = DataList::new(client, ViewScope::new()).with_filter("is_active", true);
        Self {
            list,
            state: GalleryState::Loading,
        }
    }

    /// Fetch the active items. A failed fetch shows the same "coming soon"
    /// state as an empty portfolio.
    pub async fn mount(&mut self) -> Result<&GalleryState> {
        match self.list.load().await {
            Ok(_) => {
                let mut items = self.list.items().to_vec();
                items.sort_by_key(|item| item.display_order);

                self.state = if items.is_empty() {
                    GalleryState::ComingSoon
                } else {
                    GalleryState::Ready(
                        items
                            .iter()
                            .enumerate()
                            .map(|(position, item)| GalleryTile::new(item, position))
                            .collect(),
                    )
                };
            }
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                tracing::warn!("portfolio gallery fetch failed: {}", e);
                self.state = GalleryState::ComingSoon;
            }
        }

        Ok(&self.state)
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn tiles(&self) -> &[GalleryTile] {
        match &self.state {
            GalleryState::Ready(tiles) => tiles,
            _ => &[],
        }
    }

    /// What clicking the tile at `position` does
    pub fn click(&self, position: usize) -> TileAction {
        self.tiles()
            .get(position)
            .map(|tile| tile.action.clone())
            .unwrap_or(TileAction::None)
    }

    pub fn unmount(&self) {
        self.list.scope().cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(image_url: Option<&str>, youtube_url: Option<&str>) -> PortfolioItem {
        PortfolioItem {
            id: Uuid::new_v4(),
            title: "The Ceremony".to_string(),
            category: "Wedding Film".to_string(),
            image_url: image_url.map(str::to_string),
            youtube_url: youtube_url.map(str::to_string),
            is_video: youtube_url.is_some(),
            display_order: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_youtube_id_forms() {
        assert_eq!(youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_id("https://youtu.be/dQw4w9WgXcQ?t=30"), Some("dQw4w9WgXcQ"));
        assert_eq!(youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(youtube_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(youtube_id("https://vimeo.com/123456"), None);
        assert_eq!(youtube_id("https://youtu.be/short"), None);
    }

    #[test]
    fn test_display_image_precedence() {
        let own = item(Some("https://cdn/x.jpg"), Some("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(display_image(&own, 0), "https://cdn/x.jpg");

        let video = item(None, Some("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(
            display_image(&video, 0),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"
        );

        let bare = item(None, Some("not a video link"));
        assert_eq!(display_image(&bare, 5), FALLBACK_IMAGES[1]);

        let empty = item(Some(""), None);
        assert_eq!(display_image(&empty, 4), FALLBACK_IMAGES[0]);
    }

    #[test]
    fn test_tile_action() {
        let video = GalleryTile::new(&item(None, Some("https://youtu.be/dQw4w9WgXcQ")), 0);
        assert_eq!(
            video.action,
            TileAction::OpenInNewContext("https://youtu.be/dQw4w9WgXcQ".to_string())
        );

        let still = GalleryTile::new(&item(Some("https://cdn/x.jpg"), Some("  ")), 0);
        assert_eq!(still.action, TileAction::None);
    }
}
