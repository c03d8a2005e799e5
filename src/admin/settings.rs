//! Site settings editor

use futures::future::join_all;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{SiteSetting, Table};
use crate::notice::{Notice, Notices};
use crate::scope::ViewScope;
use crate::Reelhouse;

/// Every key the editor knows, in form order
pub const SETTING_KEYS: [&str; 6] = [
    "owner_name",
    "email",
    "phone",
    "location",
    "instagram_url",
    "youtube_url",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub instagram_url: String,
    pub youtube_url: String,
}

impl Settings {
    /// Fold rows into the fixed shape; unknown keys are ignored and missing
    /// ones stay empty.
    pub fn from_rows(rows: &[SiteSetting]) -> Self {
        let mut settings = Settings::default();
        for row in rows {
            if let Some(slot) = settings.field_mut(&row.key) {
                *slot = row.value.clone().unwrap_or_default();
            }
        }
        settings
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "owner_name" => &self.owner_name,
            "email" => &self.email,
            "phone" => &self.phone,
            "location" => &self.location,
            "instagram_url" => &self.instagram_url,
            "youtube_url" => &self.youtube_url,
            _ => return None,
        };
        Some(value)
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "owner_name" => Some(&mut self.owner_name),
            "email" => Some(&mut self.email),
            "phone" => Some(&mut self.phone),
            "location" => Some(&mut self.location),
            "instagram_url" => Some(&mut self.instagram_url),
            "youtube_url" => Some(&mut self.youtube_url),
            _ => None,
        }
    }

    fn entries(&self) -> Vec<(&'static str, String)> {
        SETTING_KEYS
            .iter()
            .map(|key| (*key, self.get(key).unwrap_or_default().to_string()))
            .collect()
    }
}

/// Outcome of a save: which keys went through and which didn't
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: Vec<String>,
    /// Key and the reason it wasn't saved
    pub failed: Vec<(String, String)>,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Serialize)]
struct ValueUpdate<'a> {
    value: &'a str,
}

pub struct SiteSettings {
    client: Reelhouse,
    scope: ViewScope,
    settings: Settings,
    loading: bool,
    saving: bool,
    notices: Notices,
}

impl SiteSettings {
    pub fn new(client: Reelhouse, scope: ViewScope) -> Self {
        Self {
            client,
            scope,
            settings: Settings::default(),
            loading: true,
            saving: false,
            notices: Notices::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub async fn mount(&mut self) -> Result<&Settings> {
        let query = self.client.from(Table::SiteSettings)?.select("key,value");
        let result = self
            .scope
            .run(async { Ok(query.execute::<SiteSetting>().await?) })
            .await;

        match result {
            Ok(rows) => {
                self.settings = Settings::from_rows(&rows);
                self.loading = false;
                Ok(&self.settings)
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                self.loading = false;
                tracing::warn!("settings fetch failed: {}", e);
                self.notices.push(Notice::error("Failed to fetch settings"));
                Err(e)
            }
        }
    }

    /// Write every key in parallel. Keys that fail are reported; the ones
    /// that went through stay written.
    pub async fn save(&mut self) -> Result<SaveReport> {
        let entries = self.settings.entries();
        let client = self.client.clone();

        self.saving = true;
        let outcome = self
            .scope
            .run(async move {
                let updates = entries.into_iter().map(|(key, value)| {
                    let client = client.clone();
                    async move {
                        let outcome = save_one(&client, key, &value).await;
                        (key, outcome)
                    }
                });
                Ok(join_all(updates).await)
            })
            .await;
        self.saving = false;
        let outcome = outcome?;

        let mut report = SaveReport::default();
        for (key, outcome) in outcome {
            match outcome {
                Ok(()) => report.saved.push(key.to_string()),
                Err(e) => report.failed.push((key.to_string(), e.notice_text())),
            }
        }

        if report.is_success() {
            tracing::info!("site settings saved");
            self.notices.push(Notice::new("Success", "Settings saved successfully"));
        } else {
            let keys: Vec<&str> = report.failed.iter().map(|(key, _)| key.as_str()).collect();
            tracing::warn!(failed = ?keys, "site settings partially saved");
            let first_reason = &report.failed[0].1;
            self.notices.push(Notice::error(&format!(
                "Could not save {}: {}",
                keys.join(", "),
                first_reason
            )));
        }

        Ok(report)
    }
}

async fn save_one(client: &Reelhouse, key: &str, value: &str) -> Result<()> {
    let updated = client
        .from(Table::SiteSettings)?
        .eq("key", key)
        .update(&ValueUpdate { value })
        .await?;

    // An empty representation means no row carries this key.
    match updated {
        serde_json::Value::Array(rows) if rows.is_empty() => {
            Err(Error::general(format!("setting {} does not exist", key)))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_ignores_unknown_and_defaults_missing() {
        let rows = vec![
            SiteSetting {
                key: "owner_name".to_string(),
                value: Some("Muhammad Ali".to_string()),
            },
            SiteSetting {
                key: "phone".to_string(),
                value: None,
            },
            SiteSetting {
                key: "tiktok_url".to_string(),
                value: Some("https://tiktok.com/@x".to_string()),
            },
        ];

        let settings = Settings::from_rows(&rows);
        assert_eq!(settings.owner_name, "Muhammad Ali");
        assert_eq!(settings.phone, "");
        assert_eq!(settings.email, "");
        assert_eq!(settings.get("tiktok_url"), None);
    }

    #[test]
    fn test_entries_cover_every_key() {
        let entries = Settings::default().entries();
        let keys: Vec<&str> = entries.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, SETTING_KEYS.to_vec());
    }
}
