//! `/admin/login`

use crate::admin::gate::{admin_role_or_deny, PendingSession, NO_ADMIN_ACCESS};
use crate::error::{Error, Result};
use crate::notice::{Notice, Notices};
use crate::routes::Route;
use crate::scope::ViewScope;
use crate::Reelhouse;

const MASK: char = '•';

pub struct LoginForm {
    client: Reelhouse,
    scope: ViewScope,
    pub email: String,
    pub password: String,
    password_visible: bool,
    submitting: bool,
    notices: Notices,
}

impl LoginForm {
    pub fn new(client: Reelhouse) -> Self {
        Self {
            client,
            scope: ViewScope::new(),
            email: String::new(),
            password: String::new(),
            password_visible: false,
            submitting: false,
            notices: Notices::default(),
        }
    }

    pub fn toggle_password_visibility(&mut self) {
        self.password_visible = !self.password_visible;
    }

    pub fn is_password_visible(&self) -> bool {
        self.password_visible
    }

    /// The password as the field shows it
    pub fn password_display(&self) -> String {
        if self.password_visible {
            self.password.clone()
        } else {
            self.password.chars().map(|_| MASK).collect()
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// An admin who is already signed in skips the form.
    pub async fn mount(&mut self) -> Result<Option<Route>> {
        let session = match self.client.auth().get_session() {
            Some(session) => session,
            None => return Ok(None),
        };

        let client = self.client.clone();
        let granted = self
            .scope
            .run(async move { Ok(admin_role_or_deny(&client, &session.user.id).await) })
            .await?;

        Ok(granted.then_some(Route::Admin))
    }

    /// Sign in and check the role before declaring success. The form keeps
    /// its contents on failure.
    pub async fn submit(&mut self) -> Result<Route> {
        self.submitting = true;
        let result = self.try_sign_in().await;

        match result {
            Ok(route) => {
                self.submitting = false;
                self.notices
                    .push(Notice::new("Welcome back!", "You've been logged in successfully."));
                Ok(route)
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                self.submitting = false;
                self.notices.push(Notice::error(&e.notice_text()));
                Err(e)
            }
        }
    }

    async fn try_sign_in(&self) -> Result<Route> {
        let email = self.email.trim().to_string();
        if email.is_empty() || self.password.is_empty() {
            return Err(Error::validation("Email and password are required"));
        }

        let client = self.client.clone();
        let password = self.password.clone();

        self.scope
            .run(async move {
                let session = client.auth().sign_in_with_password(&email, &password).await?;
                let pending = PendingSession::new(&client, &session);

                if !admin_role_or_deny(&client, &session.user.id).await {
                    pending.revoke().await;
                    return Err(Error::unauthorized(NO_ADMIN_ACCESS));
                }

                pending.settle();
                tracing::info!(user_id = %session.user.id, "admin signed in");
                Ok(Route::Admin)
            })
            .await
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_password_masking() {
        let client = Reelhouse::new(SiteConfig::new("http://localhost:54321", "anon-key").unwrap()).unwrap();
        let mut form = LoginForm::new(client);
        form.password = "secret".to_string();

        assert_eq!(form.password_display(), "••••••");
        form.toggle_password_visibility();
        assert_eq!(form.password_display(), "secret");
    }

    #[tokio::test]
    async fn test_empty_credentials_are_rejected_locally() {
        let client = Reelhouse::new(SiteConfig::new("http://localhost:54321", "anon-key").unwrap()).unwrap();
        let mut form = LoginForm::new(client);

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(form.notices().latest().unwrap().is_error());
        assert!(!form.is_submitting());
    }
}
