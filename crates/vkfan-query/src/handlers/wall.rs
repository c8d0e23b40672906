use serde_json::Value;

use super::paging::paginated;
use crate::handler::{HandlerContext, HandlerOutput};
use crate::QueryError;

/// Wall posts, paginated when the call asked for more than one page.
pub fn get(ctx: &mut HandlerContext<'_>, payload: Value) -> Result<HandlerOutput, QueryError> {
    paginated(ctx, payload)
}
