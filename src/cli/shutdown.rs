use tokio::select;
use tokio_util::sync::CancellationToken;

/// Detects Ctrl-C and turns it into a cancellation of the session, so the planner still gets its
/// final save. Returns once either happened.
///
/// Closing the terminal or killing the process skips this, and the last edit is only as safe as
/// the save that followed it.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
