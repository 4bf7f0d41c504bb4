use crate::error::SkylogError;
use tokio_util::sync::CancellationToken;

pub type FlushCallback = Box<dyn Fn() + Send + Sync>;

/// Minimal recurring-schedule capability consumed by buffered transports.
///
/// `schedule` invokes `callback` each time `spec` matches until the returned
/// handle is cancelled. The spec grammar is the scheduler's own; the bundled
/// [`IntervalScheduler`](crate::adapter::IntervalScheduler) accepts interval
/// expressions such as `"30s"` or `"5m"`.
pub trait FlushScheduler: Send + Sync {
    fn schedule(&self, spec: &str, callback: FlushCallback) -> Result<ScheduleHandle, SkylogError>;
}

/// Cancellation handle for a registered schedule.
///
/// Cancelling stops future invocations. The handle also cancels on drop, so
/// a torn-down owner cannot leak a callback that flushes a dead transport.
#[derive(Debug)]
pub struct ScheduleHandle {
    token: CancellationToken,
}

impl ScheduleHandle {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
