//! Cancellation scope tying a view's requests to its lifetime

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Owned by a view. Unmounting the view cancels the scope; anything still in
/// flight resolves to [`Error::Cancelled`] and must not touch view state.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope that is cancelled along with this one
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the scope is cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Drive `operation` unless the scope is cancelled first
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Cancelled),
            result = operation => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let scope = ViewScope::new();
        let value = scope.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_scope_short_circuits() {
        let scope = ViewScope::new();
        scope.cancel();

        let result = scope.run(async { Ok(7) }).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_pending_operation() {
        let scope = ViewScope::new();
        let handle = scope.clone();

        let (result, _) = tokio::join!(
            scope.run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }),
            async move { handle.cancel() }
        );

        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_child_follows_parent() {
        let parent = ViewScope::new();
        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
