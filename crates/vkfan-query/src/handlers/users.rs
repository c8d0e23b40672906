use serde_json::Value;
use vkfan_core::Ident;

use crate::handler::{field, idents, HandlerContext, HandlerOutput};
use crate::{requests, GroupSpec, QueryError};

pub fn get(_ctx: &mut HandlerContext<'_>, payload: Value) -> Result<HandlerOutput, QueryError> {
    Ok(HandlerOutput::Items(payload))
}

/// Subscribed users and groups. With `data_subscriptions` both lists are
/// expanded into profiles, grouped under `users` and `groups`.
pub fn get_subscriptions(
    ctx: &mut HandlerContext<'_>,
    payload: Value,
) -> Result<HandlerOutput, QueryError> {
    if !ctx.options().data_subscriptions {
        return Ok(HandlerOutput::Items(payload));
    }

    let users = subscribed(ctx, &payload, "users")?;
    let groups = subscribed(ctx, &payload, "groups")?;

    let user_requests = requests::users_get(ctx.builder(), &users)?;
    let group_requests = requests::groups_get_by_id(ctx.builder(), &groups)?;
    let user_ids = ctx.submit(user_requests)?;
    let group_ids = ctx.submit(group_requests)?;

    let all = user_ids.iter().chain(&group_ids).copied().collect();
    let spec = GroupSpec::from([
        ("users".to_string(), user_ids),
        ("groups".to_string(), group_ids),
    ]);
    Ok(HandlerOutput::SubQuery(ctx.subquery(all).group(spec).build()))
}

/// Follower ids, or with `data_followers` their profiles.
pub fn get_followers(ctx: &mut HandlerContext<'_>, payload: Value) -> Result<HandlerOutput, QueryError> {
    if !ctx.options().data_followers {
        return Ok(HandlerOutput::Items(payload));
    }

    let followers = idents(&field(ctx, &payload, "items")?);
    if followers.is_empty() {
        return Ok(HandlerOutput::empty());
    }
    let follow_up = requests::users_get(ctx.builder(), &followers)?;
    let ids = ctx.submit(follow_up)?;
    Ok(HandlerOutput::SubQuery(ctx.subquery(ids).build()))
}

fn subscribed(ctx: &HandlerContext<'_>, payload: &Value, kind: &str) -> Result<Vec<Ident>, QueryError> {
    let section = field(ctx, payload, kind)?;
    Ok(idents(&field(ctx, &section, "items")?))
}
