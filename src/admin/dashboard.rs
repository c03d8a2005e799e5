//! Overview panel: counters and shortcuts

use crate::admin::AdminTab;
use crate::error::Result;
use crate::models::Table;
use crate::scope::ViewScope;
use crate::Reelhouse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub portfolio_items: u64,
    pub total_messages: u64,
    pub unread_messages: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    AddPortfolioItem,
    UpdateContactInfo,
}

impl QuickAction {
    pub const ALL: [QuickAction; 2] = [QuickAction::AddPortfolioItem, QuickAction::UpdateContactInfo];

    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::AddPortfolioItem => "Add Portfolio Item",
            QuickAction::UpdateContactInfo => "Update Contact Info",
        }
    }

    pub fn target(&self) -> AdminTab {
        match self {
            QuickAction::AddPortfolioItem => AdminTab::Portfolio,
            QuickAction::UpdateContactInfo => AdminTab::Settings,
        }
    }
}

pub struct DashboardOverview {
    client: Reelhouse,
    scope: ViewScope,
    stats: DashboardStats,
    loading: bool,
}

impl DashboardOverview {
    pub fn new(client: Reelhouse, scope: ViewScope) -> Self {
        Self {
            client,
            scope,
            stats: DashboardStats::default(),
            loading: true,
        }
    }

    /// Fetch the three counters at once. A counter that fails to load
    /// shows 0.
    pub async fn load(&mut self) -> Result<DashboardStats> {
        let client = self.client.clone();
        let stats = self
            .scope
            .run(async move {
                let (portfolio_items, total_messages, unread_messages) = tokio::join!(
                    count_or_zero(&client, Table::PortfolioItems, None),
                    count_or_zero(&client, Table::ContactSubmissions, None),
                    count_or_zero(&client, Table::ContactSubmissions, Some(("is_read", "false"))),
                );
                Ok(DashboardStats {
                    portfolio_items,
                    total_messages,
                    unread_messages,
                })
            })
            .await?;

        self.stats = stats;
        self.loading = false;
        Ok(stats)
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn cards(&self) -> [StatCard; 3] {
        [
            StatCard {
                label: "Portfolio Items",
                value: self.stats.portfolio_items,
            },
            StatCard {
                label: "Total Messages",
                value: self.stats.total_messages,
            },
            StatCard {
                label: "Unread Messages",
                value: self.stats.unread_messages,
            },
        ]
    }
}

async fn count_or_zero(client: &Reelhouse, table: Table, filter: Option<(&str, &str)>) -> u64 {
    let counted = async {
        let mut query = client.from(table)?.select("id");
        if let Some((column, value)) = filter {
            query = query.eq(column, value);
        }
        Ok::<_, crate::error::Error>(query.count().await?)
    };

    match counted.await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(%table, "count failed, showing 0: {}", e);
            0
        }
    }
}
