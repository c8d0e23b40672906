use serde_json::Value;
use tracing::debug;

use crate::handler::{field, HandlerContext, HandlerOutput};
use crate::{requests, QueryError};

/// Shared by every paginated route: keep page one, queue the rest, and
/// collect them into a sub-query seeded with page one.
pub(crate) fn paginated(ctx: &mut HandlerContext<'_>, payload: Value) -> Result<HandlerOutput, QueryError> {
    let items = field(ctx, &payload, "items")?;
    if ctx.is_follow_up() {
        return Ok(HandlerOutput::Items(items));
    }
    let Some(spec) = ctx.options().pages.get(ctx.path()) else {
        return Ok(HandlerOutput::Items(items));
    };

    let reported = payload
        .get("count")
        .and_then(Value::as_u64)
        .unwrap_or_default() as usize;
    let rest = requests::remaining_pages(ctx.builder(), ctx.path(), spec, reported)?;
    if rest.is_empty() {
        return Ok(HandlerOutput::Items(items));
    }

    let params = spec.params.clone();
    debug!(path = %ctx.path(), reported, pages = rest.len(), "queueing remaining pages");
    let ids = ctx.submit(rest)?;
    let first = ctx.request_id();
    let subquery = ctx
        .subquery(ids)
        .params(params)
        .seed(first, items)
        .build();
    Ok(HandlerOutput::SubQuery(subquery))
}
