use core::{future::Future, time::Duration};

/// Abstracts over how to sleep for a given [`Duration`] in async contexts.
///
/// This lets overflow waits stay generic over runtimes like `Tokio` or `Smol`.
pub trait SleepProvider {
    /// The future must be `Send` so waits can move across worker threads.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
