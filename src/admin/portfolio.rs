//! Portfolio manager panel

use std::path::Path;

use chrono::Utc;
use reelhouse_storage::FileOptions;
use uuid::Uuid;

use crate::collection::{DataList, Refresh};
use crate::error::{Error, Result};
use crate::models::{PortfolioItem, PortfolioItemInput};
use crate::notice::{Notice, Notices};
use crate::scope::ViewScope;
use crate::Reelhouse;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this item?";

/// An image picked in the editor, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| Error::validation(format!("not a file: {}", path.display())))?;
        Ok(Self { file_name, bytes })
    }

    /// Text after the last dot; the whole name when there is none
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or(&self.file_name)
    }

    /// Name of the stored object: upload time in millis plus the extension
    pub fn object_name(&self, unix_millis: i64) -> String {
        format!("{}.{}", unix_millis, self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// A freshly picked file, shown by name
    Upload(String),
    /// The image the item already has
    Existing(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioDraft {
    pub title: String,
    pub category: String,
    pub youtube_url: String,
    pub is_video: bool,
    image: Option<ImageUpload>,
    current_image_url: Option<String>,
}

impl PortfolioDraft {
    fn from_item(item: &PortfolioItem) -> Self {
        Self {
            title: item.title.clone(),
            category: item.category.clone(),
            youtube_url: item.youtube_url.clone().unwrap_or_default(),
            is_video: item.is_video,
            image: None,
            current_image_url: item.image_url.clone(),
        }
    }

    /// Pick a new image; it replaces the current one on save
    pub fn set_image(&mut self, upload: ImageUpload) {
        self.image = Some(upload);
    }

    pub fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<Preview> {
        match (&self.image, &self.current_image_url) {
            (Some(upload), _) => Some(Preview::Upload(upload.file_name.clone())),
            (None, Some(url)) => Some(Preview::Existing(url.clone())),
            (None, None) => None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.category.trim().is_empty() {
            return Err(Error::validation("Title and category are required"));
        }
        Ok(())
    }
}

/// The add/edit dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioEditor {
    editing: Option<Uuid>,
    pub draft: PortfolioDraft,
}

impl PortfolioEditor {
    /// Id of the item being edited; `None` when adding
    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }
}

pub struct PortfolioManager {
    client: Reelhouse,
    list: DataList<PortfolioItem>,
    editor: Option<PortfolioEditor>,
    submitting: bool,
    notices: Notices,
}

impl PortfolioManager {
    pub fn new(client: Reelhouse, scope: ViewScope) -> Self {
        Self {
            list: DataList::new(client.clone(), scope),
            client,
            editor: None,
            submitting: false,
            notices: Notices::default(),
        }
    }

    /// Every item, active or not, by display order
    pub fn items(&self) -> &[PortfolioItem] {
        self.list.items()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub async fn mount(&mut self) -> Result<()> {
        match self.list.load().await {
            Ok(_) => Ok(()),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!("portfolio fetch failed: {}", e);
                self.notices.push(Notice::error("Failed to fetch portfolio items"));
                Err(e)
            }
        }
    }

    pub fn open_new(&mut self) -> &mut PortfolioEditor {
        self.editor.insert(PortfolioEditor {
            editing: None,
            draft: PortfolioDraft::default(),
        })
    }

    pub fn open_edit(&mut self, id: Uuid) -> Result<&mut PortfolioEditor> {
        let item = self
            .list
            .get(id)
            .ok_or_else(|| Error::general(format!("Portfolio item {} not found", id)))?;
        let draft = PortfolioDraft::from_item(item);

        Ok(self.editor.insert(PortfolioEditor {
            editing: Some(id),
            draft,
        }))
    }

    pub fn editor(&self) -> Option<&PortfolioEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut PortfolioEditor> {
        self.editor.as_mut()
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Save the open editor. The editor closes on success and stays open,
    /// contents intact, on failure.
    pub async fn submit(&mut self) -> Result<()> {
        let editor = self
            .editor
            .clone()
            .ok_or_else(|| Error::general("No portfolio item is being edited"))?;

        if let Err(e) = editor.draft.validate() {
            self.notices.push(Notice::error(&e.notice_text()));
            return Err(e);
        }

        self.submitting = true;
        let result = self.save(&editor).await;

        match result {
            Ok(()) => {
                self.submitting = false;
                let description = if editor.editing.is_some() {
                    "Portfolio item updated successfully"
                } else {
                    "Portfolio item added successfully"
                };
                self.notices.push(Notice::new("Success", description));
                self.editor = None;
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                self.submitting = false;
                tracing::warn!("saving portfolio item failed: {}", e);
                self.notices.push(Notice::error(&e.notice_text()));
                Err(e)
            }
        }
    }

    async fn save(&mut self, editor: &PortfolioEditor) -> Result<()> {
        let draft = &editor.draft;
        let mut image_url = draft.current_image_url.clone();

        if let Some(upload) = &draft.image {
            image_url = Some(self.upload(upload).await?);
        }

        let youtube_url = Some(draft.youtube_url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        let mut input = PortfolioItemInput {
            title: draft.title.trim().to_string(),
            category: draft.category.trim().to_string(),
            image_url,
            youtube_url,
            is_video: draft.is_video,
            display_order: None,
        };

        match editor.editing {
            Some(id) => self.list.update(id, &input, Refresh::Refetch).await,
            None => {
                input.display_order = Some(i32::try_from(self.list.len()).unwrap_or(i32::MAX));
                self.list.create(&input, Refresh::Refetch).await
            }
        }
    }

    async fn upload(&self, upload: &ImageUpload) -> Result<String> {
        let storage = self.client.storage();
        let bucket = storage.from(&self.client.options().portfolio_bucket);
        let object_name = upload.object_name(Utc::now().timestamp_millis());
        let options = FileOptions::new().with_content_type(reelhouse_storage::content_type_for(&upload.file_name));

        self.list
            .scope()
            .run(async {
                Ok(bucket
                    .upload_bytes(&object_name, upload.bytes.clone(), Some(options))
                    .await?)
            })
            .await?;

        tracing::info!(object = %object_name, "portfolio image uploaded");
        Ok(bucket.get_public_url(&object_name))
    }

    /// Delete after `confirm` accepts [`DELETE_PROMPT`]. Returns whether
    /// anything was deleted.
    pub async fn delete(&mut self, id: Uuid, confirm: impl FnOnce(&str) -> bool) -> Result<bool> {
        if !confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        match self.list.remove(id, Refresh::Local).await {
            Ok(()) => {
                self.notices
                    .push(Notice::new("Deleted", "Portfolio item deleted successfully"));
                Ok(true)
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!(%id, "deleting portfolio item failed: {}", e);
                self.notices.push(Notice::error("Failed to delete item"));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_image_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("first-dance.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let upload = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "first-dance.png");
        assert_eq!(upload.bytes.len(), 4);
        assert_eq!(upload.object_name(42), "42.png");

        let missing = ImageUpload::from_path(&dir.path().join("gone.jpg")).await;
        assert!(matches!(missing, Err(Error::Io(_))));
    }

    #[test]
    fn test_object_name_keeps_extension() {
        let upload = ImageUpload::new("ceremony.final.JPG", vec![]);
        assert_eq!(upload.extension(), "JPG");
        assert_eq!(upload.object_name(1700000000000), "1700000000000.JPG");

        let bare = ImageUpload::new("cover", vec![]);
        assert_eq!(bare.object_name(1), "1.cover");
    }

    #[test]
    fn test_preview_prefers_new_upload() {
        let item = PortfolioItem {
            id: Uuid::new_v4(),
            title: "Golden Hour".to_string(),
            category: "Wedding Photography".to_string(),
            image_url: Some("https://cdn/old.jpg".to_string()),
            youtube_url: None,
            is_video: false,
            display_order: 1,
            is_active: true,
        };

        let mut draft = PortfolioDraft::from_item(&item);
        assert_eq!(draft.preview(), Some(Preview::Existing("https://cdn/old.jpg".to_string())));

        draft.set_image(ImageUpload::new("new.png", vec![1]));
        assert_eq!(draft.preview(), Some(Preview::Upload("new.png".to_string())));

        assert_eq!(PortfolioDraft::default().preview(), None);
    }

    #[test]
    fn test_draft_requires_title_and_category() {
        let mut draft = PortfolioDraft::default();
        draft.title = "The Ceremony".to_string();
        assert!(draft.validate().is_err());

        draft.category = "Wedding Film".to_string();
        assert!(draft.validate().is_ok());
    }
}
