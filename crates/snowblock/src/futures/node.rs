use crate::{
    futures::SleepProvider,
    generator::{Overflow, SnowflakeNode},
    id::SnowflakeId,
    time::TimeSource,
};

impl Overflow {
    /// Suspends the current task for [`Overflow::duration_to_clear`] using
    /// `S` to sleep.
    ///
    /// Dropping the future cancels the wait. As with
    /// [`Overflow::wait_until_cleared`], the generator is not re-checked
    /// afterwards.
    pub async fn wait_until_cleared_async<S>(&self)
    where
        S: SleepProvider,
    {
        let remaining = self.duration_to_clear();
        if remaining.is_zero() {
            return;
        }
        S::sleep_for(remaining).await;
    }
}

impl<T> SnowflakeNode<T>
where
    T: TimeSource,
{
    /// Async counterpart of [`SnowflakeNode::generate`].
    ///
    /// The wait for a batch overflow to clear suspends the task instead of the
    /// thread, so it can be raced against a timeout or cancelled by dropping
    /// the future. The short spin on sequence exhaustion still runs inline.
    ///
    /// # Example
    ///
    /// ```
    /// # #[cfg(feature = "async-tokio")]
    /// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
    /// use snowblock::{Config, SnowflakeNode, TokioSleep};
    ///
    /// let node = SnowflakeNode::with_config(1, Config::default().with_max_overflow_ms(3)).unwrap();
    /// let (block, _) = node.generate_batch(3 * 4096);
    ///
    /// let next = node.generate_async::<TokioSleep>().await;
    /// assert!(block.iter().all(|id| id < next));
    /// # });
    /// ```
    pub async fn generate_async<S>(&self) -> SnowflakeId
    where
        S: SleepProvider,
    {
        if self.max_overflow_ms() > 0 {
            self.overflow().wait_until_cleared_async::<S>().await;
        }
        self.generate_now()
    }
}
