use serde_json::Value;

use super::paging::paginated;
use crate::handler::{HandlerContext, HandlerOutput};
use crate::QueryError;

pub fn get_by_id(_ctx: &mut HandlerContext<'_>, payload: Value) -> Result<HandlerOutput, QueryError> {
    Ok(HandlerOutput::Items(payload))
}

pub fn is_member(_ctx: &mut HandlerContext<'_>, payload: Value) -> Result<HandlerOutput, QueryError> {
    Ok(HandlerOutput::Items(payload))
}

pub fn get_members(ctx: &mut HandlerContext<'_>, payload: Value) -> Result<HandlerOutput, QueryError> {
    paginated(ctx, payload)
}
