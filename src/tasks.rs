//! Join Combinators
//!
//! Install-time fan-out runs under two different join semantics:
//! [`require_all`] for the mandatory shell manifest (any failure is fatal)
//! and [`settle_all`] for the curated fonts (individual failures are
//! dropped). Keeping them as separate named primitives prevents the two
//! from being conflated at call sites.

use std::future::Future;

use futures::future;

/// Run all tasks concurrently; the first error aborts the join and
/// propagates. Results are returned in task order.
pub async fn require_all<I, F, T, E>(tasks: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    future::try_join_all(tasks).await
}

/// Run all tasks concurrently to completion; failures are logged and
/// dropped, successes are returned in task order.
pub async fn settle_all<I, F, T, E>(tasks: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    future::join_all(tasks)
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(value) => Some(value),
            Err(err) => {
                log::debug!("best-effort task skipped: {}", err);
                None
            }
        })
        .collect()
}
