//! Public contact form and its confirmation

use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::models::{EventType, NewContactSubmission, SiteSetting, Table};
use crate::notice::{Notice, Notices};
use crate::scope::ViewScope;
use crate::Reelhouse;
use reelhouse_postgrest::Returning;

pub const CONFIRMATION_MESSAGE: &str = "Your message has been received. You will be contacted soon!";

/// Shown after a successful submission until dismissed or timed out
#[derive(Debug, Clone)]
pub struct Confirmation {
    shown_at: Instant,
    timeout: Duration,
    phone: String,
}

impl Confirmation {
    pub fn new(phone: &str, timeout: Duration) -> Self {
        Self {
            shown_at: Instant::now(),
            timeout,
            phone: phone.to_string(),
        }
    }

    pub fn message(&self) -> &'static str {
        CONFIRMATION_MESSAGE
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn call_prompt(&self) -> String {
        format!("Feel free to call: {}", self.phone)
    }

    /// `tel:` link for the phone number, whitespace removed
    pub fn tel_href(&self) -> String {
        let digits: String = self.phone.chars().filter(|c| !c.is_whitespace()).collect();
        format!("tel:{}", digits)
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= self.timeout
    }

    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.shown_at.elapsed())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// One of the [`EventType`] values, or empty
    pub event_type: String,
    pub message: String,
}

impl ContactFields {
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// The "Let's Create Together" form
pub struct ContactForm {
    client: Reelhouse,
    scope: ViewScope,
    fields: ContactFields,
    submitting: bool,
    confirmation: Option<Confirmation>,
    phone: String,
    notices: Notices,
}

impl ContactForm {
    pub fn new(client: Reelhouse) -> Self {
        let phone = client.options().contact_phone.clone();
        Self {
            client,
            scope: ViewScope::new(),
            fields: ContactFields::default(),
            submitting: false,
            confirmation: None,
            phone,
            notices: Notices::default(),
        }
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut ContactFields {
        &mut self.fields
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

    /// Phone number the confirmation offers
    pub fn contact_phone(&self) -> &str {
        &self.phone
    }

    /// Pick up the phone number from the site settings. Keeps the configured
    /// default when the setting is missing, empty or unreadable.
    pub async fn load_contact_phone(&mut self) -> Result<&str> {
        let query = self
            .client
            .from(Table::SiteSettings)?
            .select("key,value")
            .eq("key", "phone");
        let result = self
            .scope
            .run(async { Ok(query.maybe_single::<SiteSetting>().await?) })
            .await;

        match result {
            Ok(Some(SiteSetting { value: Some(value), .. })) if !value.trim().is_empty() => {
                self.phone = value;
            }
            Ok(_) => {}
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => tracing::warn!("could not read phone setting, keeping default: {}", e),
        }

        Ok(&self.phone)
    }

    /// Check the fields and build the row to insert
    pub fn validate(&self) -> Result<NewContactSubmission> {
        let fields = &self.fields;

        if fields.name.trim().is_empty() {
            return Err(Error::validation("Name is required"));
        }
        if !looks_like_email(fields.email.trim()) {
            return Err(Error::validation("A valid email address is required"));
        }
        if fields.message.trim().is_empty() {
            return Err(Error::validation("Message is required"));
        }

        let event_type = match optional(&fields.event_type) {
            Some(value) => match EventType::parse(&value) {
                Some(kind) => Some(kind.as_str().to_string()),
                None => return Err(Error::validation(format!("Unknown event type: {}", value))),
            },
            None => None,
        };

        Ok(NewContactSubmission {
            name: fields.name.trim().to_string(),
            email: fields.email.trim().to_string(),
            phone: optional(&fields.phone),
            event_type,
            message: fields.message.trim().to_string(),
        })
    }

    /// Insert the submission. On success the fields are cleared and the
    /// confirmation comes up; on failure the fields stay as they were.
    pub async fn submit(&mut self) -> Result<()> {
        let submission = match self.validate() {
            Ok(submission) => submission,
            Err(e) => {
                self.notices.push(Notice::error(&e.notice_text()));
                return Err(e);
            }
        };

        // The visitor may insert but not read submissions back.
        let query = self
            .client
            .from(Table::ContactSubmissions)?
            .returning(Returning::Minimal);

        self.submitting = true;
        let result = self
            .scope
            .run(async { Ok(query.insert(&submission).await?) })
            .await;

        match result {
            Ok(_) => {
                self.submitting = false;
                tracing::info!("contact submission received");
                self.fields = ContactFields::default();
                self.show_confirmation();
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                self.submitting = false;
                tracing::warn!("contact submission failed: {}", e);
                self.notices.push(Notice::error(&e.notice_text()));
                Err(e)
            }
        }
    }

    fn show_confirmation(&mut self) {
        let timeout = self.client.options().confirmation_timeout;
        self.confirmation = Some(Confirmation::new(&self.phone, timeout));
    }

    /// The visible confirmation, if any. Expires on its own after the
    /// configured timeout.
    pub fn confirmation(&mut self) -> Option<&Confirmation> {
        if self.confirmation.as_ref().map_or(false, Confirmation::is_expired) {
            self.confirmation = None;
        }
        self.confirmation.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.confirmation = None;
    }

    /// Clicking outside the confirmation closes it
    pub fn outside_click(&mut self) {
        self.dismiss();
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn form() -> ContactForm {
        let client = Reelhouse::new(SiteConfig::new("http://localhost:54321", "anon-key").unwrap()).unwrap();
        ContactForm::new(client)
    }

    #[test]
    fn test_validate_requires_name_email_message() {
        let mut form = form();
        assert!(matches!(form.validate(), Err(Error::Validation(_))));

        form.fields_mut().name = "Jane".to_string();
        form.fields_mut().email = "jane".to_string();
        form.fields_mut().message = "Hi".to_string();
        assert!(matches!(form.validate(), Err(Error::Validation(_))));

        form.fields_mut().email = "jane@x.com".to_string();
        let submission = form.validate().unwrap();
        assert_eq!(submission.phone, None);
        assert_eq!(submission.event_type, None);
    }

    #[test]
    fn test_validate_event_type() {
        let mut form = form();
        *form.fields_mut() = ContactFields {
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            phone: " +31 6 1 ".to_string(),
            event_type: "Corporate".to_string(),
            message: "Hi".to_string(),
        };
        let submission = form.validate().unwrap();
        assert_eq!(submission.event_type.as_deref(), Some("corporate"));
        assert_eq!(submission.phone.as_deref(), Some("+31 6 1"));

        form.fields_mut().event_type = "birthday".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_tel_href_strips_whitespace() {
        let confirmation = Confirmation::new("+31 6 12345678", Duration::from_secs(5));
        assert_eq!(confirmation.tel_href(), "tel:+31612345678");
        assert_eq!(confirmation.call_prompt(), "Feel free to call: +31 6 12345678");
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_auto_dismisses_after_timeout() {
        let mut form = form();
        form.show_confirmation();

        tokio::time::advance(Duration::from_millis(4_900)).await;
        assert!(form.confirmation().is_some());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(form.confirmation().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_outside_click_dismisses() {
        let mut form = form();
        form.show_confirmation();
        form.outside_click();
        assert!(form.confirmation().is_none());
    }
}
