use crate::utils::error::{DeployError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 遠端呼叫的取消與逾時載體
///
/// 所有部署操作都明確傳入同一個 context；取消後或超過期限的呼叫
/// 會以 [`DeployError::Cancelled`] / [`DeployError::Timeout`] 失敗。
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 在此 context 下執行一個遠端呼叫
    pub async fn run<F, T>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(DeployError::Cancelled {
                operation: operation.to_string(),
            });
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, call).await {
                    Ok(result) => result,
                    Err(_) => Err(DeployError::Timeout {
                        operation: operation.to_string(),
                    }),
                },
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(DeployError::Cancelled {
                operation: operation.to_string(),
            }),
            result = bounded => result,
        }
    }
}
