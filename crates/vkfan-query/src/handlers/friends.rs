use serde_json::Value;

use crate::handler::{field, idents, HandlerContext, HandlerOutput};
use crate::{requests, QueryError};

/// Friend ids, or with `data_friends` the friends' full profiles.
pub fn get(ctx: &mut HandlerContext<'_>, payload: Value) -> Result<HandlerOutput, QueryError> {
    let items = field(ctx, &payload, "items")?;
    if !ctx.options().data_friends {
        return Ok(HandlerOutput::Items(items));
    }

    let friends = idents(&items);
    if friends.is_empty() {
        return Ok(HandlerOutput::empty());
    }
    let follow_up = requests::users_get(ctx.builder(), &friends)?;
    let ids = ctx.submit(follow_up)?;
    Ok(HandlerOutput::SubQuery(ctx.subquery(ids).build()))
}
