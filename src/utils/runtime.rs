use anyhow::Result;

/// Every planner event is handled to completion before the next one is read, so a single thread
/// is all the application ever needs.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
