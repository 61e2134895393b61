//! Join combinator which waits for every future to settle.
//!
//! Unlike `try_join`, a failure never aborts the sibling futures: each outcome
//! is reported on its own.

use std::future::Future;

/// Run both futures concurrently, returning both outcomes
pub async fn pair<A, B>(a: A, b: B) -> (A::Output, B::Output)
where
    A: Future,
    B: Future,
{
    futures::join!(a, b)
}
