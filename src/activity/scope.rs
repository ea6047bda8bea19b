use std::future::Future;

use crate::activity::throttle::ActivityHandle;
use crate::error::AppError;

tokio::task_local! {
    static ACTIVITY: ActivityHandle;
}

/// Runs `fut` with `handle` installed as the ambient activity provider.
pub async fn provide<F>(handle: ActivityHandle, fut: F) -> F::Output
where
    F: Future,
{
    ACTIVITY.scope(handle, fut).await
}

/// The activity handle of the enclosing provider. Calling this outside
/// [`provide`] is an integration bug and fails immediately.
pub fn current() -> Result<ActivityHandle, AppError> {
    ACTIVITY.try_with(|handle| handle.clone()).map_err(|_| {
        AppError::Contract("activity handle must be used within an activity provider".to_string())
    })
}
