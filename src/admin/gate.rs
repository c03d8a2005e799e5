//! Session + role gate in front of the dashboard

use reelhouse_auth::{AuthSubscription, Session};

use crate::error::Result;
use crate::models::{AppRole, Table, UserRole};
use crate::routes::Route;
use crate::scope::ViewScope;
use crate::Reelhouse;

/// Shown when a signed-in user has no admin role row
pub const NO_ADMIN_ACCESS: &str = "You don't have admin access";

#[derive(Debug, Clone)]
pub enum GateState {
    Unauthenticated,
    SessionPending,
    Authorized(Session),
    Unauthorized,
}

impl GateState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GateState::Authorized(_))
    }
}

/// Whether `user_id` holds an `admin` row in `user_roles`
pub async fn has_admin_role(client: &Reelhouse, user_id: &str) -> Result<bool> {
    let row = client
        .from(Table::UserRoles)?
        .select("role")
        .eq("user_id", user_id)
        .eq("role", AppRole::Admin.as_str())
        .maybe_single::<UserRole>()
        .await?;

    Ok(matches!(row, Some(UserRole { role: AppRole::Admin })))
}

/// Like [`has_admin_role`], but a failed lookup counts as no role.
pub(crate) async fn admin_role_or_deny(client: &Reelhouse, user_id: &str) -> bool {
    match has_admin_role(client, user_id).await {
        Ok(granted) => granted,
        Err(e) => {
            tracing::warn!(user_id, "role lookup failed, denying access: {}", e);
            false
        }
    }
}

/// A session whose role check is still running. Dropped while pending (the
/// view went away mid-check) it ends the session locally at once and on the
/// server in the background.
pub(crate) struct PendingSession {
    client: Reelhouse,
    session: Option<Session>,
}

impl PendingSession {
    pub(crate) fn new(client: &Reelhouse, session: &Session) -> Self {
        Self {
            client: client.clone(),
            session: Some(session.clone()),
        }
    }

    /// The role check passed; keep the session
    pub(crate) fn settle(mut self) {
        self.session = None;
    }

    /// The role check failed; end the session and wait for the server
    pub(crate) async fn revoke(mut self) {
        if let Some(session) = self.take_local() {
            if let Err(e) = self.client.auth().revoke_session(&session).await {
                tracing::warn!("sign-out during revocation failed: {}", e);
            }
        }
    }

    /// Clear the store if it still holds this session
    fn take_local(&mut self) -> Option<Session> {
        let session = self.session.take()?;
        let store = self.client.auth().store();
        if store.get().map(|current| current.access_token) == Some(session.access_token.clone()) {
            store.clear();
        }
        Some(session)
    }
}

impl Drop for PendingSession {
    fn drop(&mut self) {
        let session = match self.take_local() {
            Some(session) => session,
            None => return,
        };
        tracing::info!(user_id = %session.user.id, "role check abandoned, ending session");

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let client = self.client.clone();
            handle.spawn(async move {
                if let Err(e) = client.auth().revoke_session(&session).await {
                    tracing::warn!("background sign-out failed: {}", e);
                }
            });
        }
    }
}

pub struct AdminGate {
    client: Reelhouse,
    scope: ViewScope,
    state: GateState,
    subscription: Option<AuthSubscription>,
}

impl AdminGate {
    pub fn new(client: Reelhouse, scope: ViewScope) -> Self {
        Self {
            client,
            scope,
            state: GateState::Unauthenticated,
            subscription: None,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Run the gate. Returns [`Route::Admin`] when the dashboard may render
    /// and [`Route::AdminLogin`] otherwise.
    pub async fn check(&mut self) -> Result<Route> {
        self.state = GateState::SessionPending;

        let session = match self.client.auth().get_session() {
            Some(session) => session,
            None => {
                self.state = GateState::Unauthenticated;
                return Ok(Route::AdminLogin);
            }
        };

        // Subscribe first so no sign-out falls between the lookup and the
        // re-check below.
        let mut subscription = self.client.auth().on_auth_state_change();

        let client = self.client.clone();
        let user_id = session.user.id.clone();
        let granted = self
            .scope
            .run(async move { Ok(admin_role_or_deny(&client, &user_id).await) })
            .await?;

        if !granted {
            tracing::info!(user_id = %session.user.id, "session without admin role, signing out");
            PendingSession::new(&self.client, &session).revoke().await;
            self.state = GateState::Unauthorized;
            return Ok(Route::AdminLogin);
        }

        // Whatever happened during the lookup, the store now decides.
        while subscription.try_recv().is_some() {}
        let current = self
            .client
            .auth()
            .get_session()
            .filter(|current| current.user.id == session.user.id);

        match current {
            Some(current) => {
                self.subscription = Some(subscription);
                self.state = GateState::Authorized(current);
                Ok(Route::Admin)
            }
            None => {
                tracing::info!(user_id = %session.user.id, "session ended during role check");
                self.state = GateState::Unauthenticated;
                Ok(Route::AdminLogin)
            }
        }
    }

    /// Redirect already signalled by the session store, without waiting
    pub fn poll_redirect(&mut self) -> Option<Route> {
        if !self.state.is_authorized() {
            return None;
        }

        // A read purges an expired session, which queues a sign-out event.
        let _ = self.client.auth().get_session();

        loop {
            let event = self.subscription.as_mut()?.try_recv()?;
            if event.ends_session() {
                return Some(self.lose_session());
            }
        }
    }

    /// Wait until the session ends and return where to go
    pub async fn wait_for_redirect(&mut self) -> Option<Route> {
        if !self.state.is_authorized() {
            return None;
        }

        loop {
            let subscription = self.subscription.as_mut()?;
            let event = tokio::select! {
                biased;
                _ = self.scope.cancelled() => return None,
                event = subscription.recv() => event,
            };

            match event {
                Some(event) if event.ends_session() => return Some(self.lose_session()),
                Some(_) => continue,
                None => return Some(self.lose_session()),
            }
        }
    }

    fn lose_session(&mut self) -> Route {
        tracing::info!("admin session ended, returning to login");
        self.release();
        Route::AdminLogin
    }

    /// Stop watching the session, e.g. before an explicit logout
    pub fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.state = GateState::Unauthenticated;
    }

    pub fn unmount(&mut self) {
        self.scope.cancel();
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
