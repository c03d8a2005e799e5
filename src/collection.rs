//! Fetch-on-mount list of table rows with mutations
//!
//! Every admin panel and the public gallery follow the same shape: load the
//! rows when the view mounts, mutate one row on an action, then either
//! refetch the whole list or patch the local copy. [`DataList`] is that
//! shape, parameterised by the row type.

use reelhouse_postgrest::{PostgrestClient, Returning};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Record;
use crate::scope::ViewScope;
use crate::Reelhouse;

/// How the list catches up after a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Fetch the whole list again
    Refetch,
    /// Apply the change to the local copy only
    Local,
}

pub struct DataList<R: Record> {
    client: Reelhouse,
    scope: ViewScope,
    filters: Vec<(String, String)>,
    items: Vec<R>,
    loading: bool,
}

impl<R: Record> DataList<R> {
    pub fn new(client: Reelhouse, scope: ViewScope) -> Self {
        Self {
            client,
            scope,
            filters: Vec::new(),
            items: Vec::new(),
            loading: true,
        }
    }

    /// Restrict every fetch to rows where `column` equals `value`
    pub fn with_filter(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn get(&self, id: Uuid) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True until the first fetch settles
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    fn table(&self) -> Result<PostgrestClient> {
        self.client.from(R::TABLE)
    }

    /// Fetch the rows. A failed fetch keeps whatever was loaded before.
    pub async fn load(&mut self) -> Result<&[R]> {
        let (column, order) = R::ORDER;
        let mut query = self.table()?.select("*").order(column, order);
        for (column, value) in &self.filters {
            query = query.eq(column, value);
        }

        let result = self.scope.run(async { Ok(query.execute::<R>().await?) }).await;

        match result {
            Ok(rows) => {
                tracing::debug!(table = %R::TABLE, rows = rows.len(), "list loaded");
                self.items = rows;
                self.loading = false;
                Ok(&self.items)
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                self.loading = false;
                Err(e)
            }
        }
    }

    // The mutation already went through; a failed refetch only leaves the
    // list stale.
    async fn refetch(&mut self) -> Result<()> {
        match self.load().await {
            Ok(_) => Ok(()),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!(table = %R::TABLE, "refetch after mutation failed: {}", e);
                Ok(())
            }
        }
    }

    pub async fn create<T: Serialize + Sync>(&mut self, values: &T, refresh: Refresh) -> Result<()> {
        let query = self.table()?;
        let created = self
            .scope
            .run(async { Ok(query.insert(values).await?) })
            .await?;
        tracing::info!(table = %R::TABLE, "row created");

        match refresh {
            Refresh::Refetch => self.refetch().await,
            Refresh::Local => {
                self.items.extend(rows_from::<R>(created));
                Ok(())
            }
        }
    }

    /// Update one row by id. With [`Refresh::Local`] the rows the server
    /// hands back replace their local copies.
    pub async fn update<T: Serialize + Sync>(&mut self, id: Uuid, values: &T, refresh: Refresh) -> Result<()> {
        let query = self.table()?.eq("id", id);
        let updated = self
            .scope
            .run(async { Ok(query.update(values).await?) })
            .await?;
        tracing::info!(table = %R::TABLE, %id, "row updated");

        match refresh {
            Refresh::Refetch => self.refetch().await,
            Refresh::Local => {
                for row in rows_from::<R>(updated) {
                    if let Some(slot) = self.items.iter_mut().find(|item| item.id() == row.id()) {
                        *slot = row;
                    }
                }
                Ok(())
            }
        }
    }

    pub async fn remove(&mut self, id: Uuid, refresh: Refresh) -> Result<()> {
        let query = self.table()?.eq("id", id).returning(Returning::Minimal);
        self.scope.run(async { Ok(query.delete().await?) }).await?;
        tracing::info!(table = %R::TABLE, %id, "row deleted");

        match refresh {
            Refresh::Refetch => self.refetch().await,
            Refresh::Local => {
                self.items.retain(|item| item.id() != id);
                Ok(())
            }
        }
    }

    /// Change the local copy of a row without talking to the server
    pub fn patch(&mut self, id: Uuid, apply: impl FnOnce(&mut R)) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                apply(item);
                true
            }
            None => false,
        }
    }
}

// A representation that doesn't parse as rows is ignored; the list just
// doesn't pick up the change locally.
fn rows_from<R: Record>(value: Value) -> Vec<R> {
    match value {
        Value::Array(_) => serde_json::from_value(value).unwrap_or_default(),
        Value::Object(_) => serde_json::from_value::<R>(value).map(|row| vec![row]).unwrap_or_default(),
        _ => Vec::new(),
    }
}
