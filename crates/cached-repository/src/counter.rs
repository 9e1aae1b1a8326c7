//! Denormalized child counters on parent records.

use common::AppResult;
use domain::{Record, RecordKey};

use crate::traits::Repository;

/// Move one unit of `count_field` from the old parent to the new parent.
///
/// Either side may be absent. Returns `false` when the parent did not change.
pub async fn update_parent_count<P, R>(
    parents: &R,
    count_field: &str,
    old_parent: Option<&P::Key>,
    new_parent: Option<&P::Key>,
) -> AppResult<bool>
where
    P: Record,
    R: Repository<P> + ?Sized,
{
    let old_parent = old_parent.filter(|id| !id.is_empty());
    let new_parent = new_parent.filter(|id| !id.is_empty());
    if old_parent == new_parent {
        return Ok(false);
    }

    if let Some(id) = old_parent {
        if let Some(mut parent) = parents.find(id).await? {
            parents.decrement(&mut parent, count_field, 1).await?;
        }
    }

    if let Some(id) = new_parent {
        if let Some(mut parent) = parents.find(id).await? {
            parents.increment(&mut parent, count_field, 1).await?;
        }
    }

    tracing::debug!(
        parent = P::NAME,
        field = count_field,
        from = ?old_parent,
        to = ?new_parent,
        "Updated parent count"
    );
    Ok(true)
}
