//! Concurrency helper: bound how many files are worked on at once.

use anyhow::Result;
use rayon::prelude::*;

/// Map `f` over `items` with at most `limit` calls in flight. Output order matches input
/// order, and the first error aborts the run.
pub fn map_limited<T, R, F>(items: &[T], limit: usize, f: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Sync + Fn(&T) -> Result<R>,
{
    if limit <= 1 {
        return items.iter().map(&f).collect();
    }
    let mut out = Vec::with_capacity(items.len());
    for chunk in items.chunks(limit) {
        let part = chunk.par_iter().map(&f).collect::<Result<Vec<_>>>()?;
        out.extend(part);
    }
    Ok(out)
}

/// Side-effect variant of `map_limited`.
pub fn for_each_limited<T, F>(items: &[T], limit: usize, f: F) -> Result<()>
where
    T: Sync,
    F: Sync + Fn(&T) -> Result<()>,
{
    if limit <= 1 {
        for item in items {
            f(item)?;
        }
        return Ok(());
    }
    for chunk in items.chunks(limit) {
        chunk.par_iter().try_for_each(&f)?;
    }
    Ok(())
}
