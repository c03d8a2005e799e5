//! `/admin`: the gated dashboard and its four panels

pub mod dashboard;
pub mod gate;
pub mod login;
pub mod messages;
pub mod portfolio;
pub mod settings;

pub use dashboard::{DashboardOverview, DashboardStats, QuickAction, StatCard};
pub use gate::{has_admin_role, AdminGate, GateState, NO_ADMIN_ACCESS};
pub use login::LoginForm;
pub use messages::ContactSubmissions;
pub use portfolio::{ImageUpload, PortfolioDraft, PortfolioEditor, PortfolioManager, Preview};
pub use settings::{SaveReport, Settings, SiteSettings, SETTING_KEYS};

use crate::error::Result;
use crate::notice::{Notice, Notices};
use crate::routes::Route;
use crate::scope::ViewScope;
use crate::Reelhouse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Dashboard,
    Portfolio,
    Messages,
    Settings,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [
        AdminTab::Dashboard,
        AdminTab::Portfolio,
        AdminTab::Messages,
        AdminTab::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Dashboard => "Dashboard",
            AdminTab::Portfolio => "Portfolio",
            AdminTab::Messages => "Messages",
            AdminTab::Settings => "Settings",
        }
    }
}

/// The panel currently on screen
pub enum Panel {
    Dashboard(DashboardOverview),
    Portfolio(PortfolioManager),
    Messages(ContactSubmissions),
    Settings(SiteSettings),
}

impl Panel {
    fn open(tab: AdminTab, client: Reelhouse, scope: ViewScope) -> Self {
        match tab {
            AdminTab::Dashboard => Panel::Dashboard(DashboardOverview::new(client, scope)),
            AdminTab::Portfolio => Panel::Portfolio(PortfolioManager::new(client, scope)),
            AdminTab::Messages => Panel::Messages(ContactSubmissions::new(client, scope)),
            AdminTab::Settings => Panel::Settings(SiteSettings::new(client, scope)),
        }
    }

    pub fn tab(&self) -> AdminTab {
        match self {
            Panel::Dashboard(_) => AdminTab::Dashboard,
            Panel::Portfolio(_) => AdminTab::Portfolio,
            Panel::Messages(_) => AdminTab::Messages,
            Panel::Settings(_) => AdminTab::Settings,
        }
    }

    /// Fetch-on-mount for whichever panel this is
    pub async fn mount(&mut self) -> Result<()> {
        match self {
            Panel::Dashboard(view) => view.load().await.map(|_| ()),
            Panel::Portfolio(view) => view.mount().await,
            Panel::Messages(view) => view.mount().await,
            Panel::Settings(view) => view.mount().await.map(|_| ()),
        }
    }

    /// Notices raised by the panel since the last drain
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        match self {
            Panel::Dashboard(_) => Vec::new(),
            Panel::Portfolio(view) => view.notices_mut().drain(),
            Panel::Messages(view) => view.notices_mut().drain(),
            Panel::Settings(view) => view.notices_mut().drain(),
        }
    }
}

/// Layout around the panels: header, tabs, mobile menu, logout
pub struct AdminShell {
    client: Reelhouse,
    scope: ViewScope,
    gate: AdminGate,
    panel: Option<Panel>,
    panel_scope: ViewScope,
    mobile_menu_open: bool,
    notices: Notices,
}

impl AdminShell {
    pub fn new(client: Reelhouse) -> Self {
        let scope = ViewScope::new();
        Self {
            gate: AdminGate::new(client.clone(), scope.child()),
            panel_scope: scope.child(),
            client,
            scope,
            panel: None,
            mobile_menu_open: false,
            notices: Notices::default(),
        }
    }

    /// Gate the dashboard. On [`Route::Admin`] the overview panel is open
    /// (not yet fetched).
    pub async fn mount(&mut self) -> Result<Route> {
        let route = self.gate.check().await?;
        if route == Route::Admin {
            self.select_tab(AdminTab::Dashboard);
        }
        Ok(route)
    }

    pub fn gate(&self) -> &GateState {
        self.gate.state()
    }

    pub fn active_tab(&self) -> Option<AdminTab> {
        self.panel.as_ref().map(Panel::tab)
    }

    /// Switch panels. The previous panel is unmounted and anything it still
    /// had in flight is dropped.
    pub fn select_tab(&mut self, tab: AdminTab) -> &mut Panel {
        self.mobile_menu_open = false;
        self.panel_scope.cancel();
        self.panel_scope = self.scope.child();

        let panel = Panel::open(tab, self.client.clone(), self.panel_scope.clone());
        self.panel.insert(panel)
    }

    /// Jump to the panel a dashboard shortcut points at
    pub fn quick_action(&mut self, action: QuickAction) -> &mut Panel {
        self.select_tab(action.target())
    }

    pub fn panel(&self) -> Option<&Panel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut Panel> {
        self.panel.as_mut()
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    pub fn is_mobile_menu_open(&self) -> bool {
        self.mobile_menu_open
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Session loss already signalled by the store. When this returns a
    /// route the dashboard is gone, whichever panel was active.
    pub fn session_redirect(&mut self) -> Option<Route> {
        let route = self.gate.poll_redirect()?;
        self.close_panels();
        Some(route)
    }

    /// Wait for the session to end
    pub async fn wait_for_redirect(&mut self) -> Option<Route> {
        let route = self.gate.wait_for_redirect().await?;
        self.close_panels();
        Some(route)
    }

    pub async fn logout(&mut self) -> Route {
        self.gate.release();
        self.close_panels();

        if let Err(e) = self.client.auth().sign_out().await {
            tracing::warn!("logout call failed, local session cleared anyway: {}", e);
        }

        self.notices
            .push(Notice::new("Logged out", "You've been logged out successfully."));
        Route::AdminLogin
    }

    fn close_panels(&mut self) {
        self.panel_scope.cancel();
        self.panel = None;
        self.mobile_menu_open = false;
    }

    pub fn unmount(&mut self) {
        self.gate.unmount();
        self.scope.cancel();
        self.panel = None;
    }
}
