//! Rows of the site's tables

use std::fmt;

use chrono::{DateTime, Utc};
use reelhouse_postgrest::SortOrder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    ContactSubmissions,
    PortfolioItems,
    SiteSettings,
    UserRoles,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::ContactSubmissions => "contact_submissions",
            Table::PortfolioItems => "portfolio_items",
            Table::SiteSettings => "site_settings",
            Table::UserRoles => "user_roles",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row type that a [`DataList`](crate::collection::DataList) can manage
pub trait Record: DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: Table;

    /// Column and direction the list is fetched in
    const ORDER: (&'static str, SortOrder);

    fn id(&self) -> Uuid;
}

/// A message left through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub event_type: Option<String>,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// `created_at` as shown in the inbox, e.g. `Mar 4, 2025`
    pub fn received_on(&self) -> String {
        self.created_at.format("%b %-d, %Y").to_string()
    }
}

impl Record for ContactSubmission {
    const TABLE: Table = Table::ContactSubmissions;
    const ORDER: (&'static str, SortOrder) = ("created_at", SortOrder::Descending);

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Insert payload for [`ContactSubmission`]; `is_read` is left to the
/// server default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub event_type: Option<String>,
    pub message: String,
}

/// Kind of event a visitor can pick on the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Wedding,
    Corporate,
    Portrait,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Wedding,
        EventType::Corporate,
        EventType::Portrait,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Wedding => "wedding",
            EventType::Corporate => "corporate",
            EventType::Portrait => "portrait",
            EventType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Wedding => "Wedding",
            EventType::Corporate => "Corporate Event",
            EventType::Portrait => "Portrait Session",
            EventType::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Categories offered by the portfolio editor
pub const PORTFOLIO_CATEGORIES: [&str; 6] = [
    "Wedding Film",
    "Wedding Photography",
    "Event Coverage",
    "Videography",
    "Portrait",
    "Corporate",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub image_url: Option<String>,
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Record for PortfolioItem {
    const TABLE: Table = Table::PortfolioItems;
    const ORDER: (&'static str, SortOrder) = ("display_order", SortOrder::Ascending);

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Insert/update payload for [`PortfolioItem`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioItemInput {
    pub title: String,
    pub category: String,
    pub image_url: Option<String>,
    pub youtube_url: Option<String>,
    pub is_video: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSetting {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    User,
}

impl AppRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Admin => "admin",
            AppRole::User => "user",
        }
    }
}

/// Role row in `user_roles`, as selected by the gate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRole {
    pub role: AppRole,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_submission_sends_explicit_nulls() {
        let submission = NewContactSubmission {
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            phone: None,
            event_type: None,
            message: "Hi".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            json!({
                "name": "Jane",
                "email": "jane@x.com",
                "phone": null,
                "event_type": null,
                "message": "Hi"
            })
        );
    }

    #[test]
    fn test_received_on_format() {
        let submission: ContactSubmission = serde_json::from_value(json!({
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "name": "Jane",
            "email": "jane@x.com",
            "phone": null,
            "event_type": "wedding",
            "message": "Hi",
            "is_read": false,
            "created_at": "2025-03-04T10:15:00.123456+00:00"
        }))
        .unwrap();

        assert_eq!(submission.received_on(), "Mar 4, 2025");
    }

    #[test]
    fn test_portfolio_item_defaults() {
        let item: PortfolioItem = serde_json::from_value(json!({
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "title": "The Ceremony",
            "category": "Wedding Film",
            "image_url": null,
            "youtube_url": null
        }))
        .unwrap();

        assert!(item.is_active);
        assert!(!item.is_video);
        assert_eq!(item.display_order, 0);
    }

    #[test]
    fn test_event_type_parse() {
        assert_eq!(EventType::parse("Wedding"), Some(EventType::Wedding));
        assert_eq!(EventType::parse("birthday"), None);
    }

    #[test]
    fn test_input_omits_display_order_on_update() {
        let input = PortfolioItemInput {
            title: "Golden Hour".to_string(),
            category: "Portrait".to_string(),
            image_url: None,
            youtube_url: None,
            is_video: false,
            display_order: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert!(value.get("display_order").is_none());
        assert_eq!(value["image_url"], serde_json::Value::Null);
    }
}
