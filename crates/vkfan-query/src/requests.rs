//! Request templates shared by the façades and the follow-up handlers.

use vkfan_core::{
    CoreError, Ident, PageRange, Params, QueryBuilder, QueryPath, RequestDescriptor,
};

use crate::PageSpec;

pub const USER_FIELDS: &[&str] = &[
    "bdate",
    "about",
    "status",
    "sex",
    "domain",
    "activities",
    "books",
    "city",
    "country",
    "contacts",
    "photo_id",
    "photo_max",
    "nickname",
    "schools",
    "site",
    "photo_50",
    "photo_100",
    "photo_200",
    "verified",
    "online",
    "last_seen",
    "quotes",
    "relation",
    "followers_count",
    "career",
    "counters",
    "education",
    "has_photo",
    "home_town",
    "interests",
    "occupation",
    "personal",
    "screen_name",
    "universities",
];

pub const GROUP_FIELDS: &[&str] = &[
    "activity",
    "addresses",
    "age_limits",
    "city",
    "contacts",
    "counters",
    "country",
    "cover",
    "description",
    "has_photo",
    "links",
    "main_section",
    "members_count",
    "place",
    "site",
    "start_date",
    "finish_date",
    "status",
    "verified",
    "wall",
];

fn with_fields(fields: &[&str]) -> Params {
    Params::from([("fields".to_string(), fields.join(","))])
}

pub fn users_get(builder: &QueryBuilder, ids: &[Ident]) -> Result<Vec<RequestDescriptor>, CoreError> {
    builder.build(
        &QueryPath::new("users", "get"),
        ids,
        Some("user_ids"),
        &with_fields(USER_FIELDS),
    )
}

/// `users.getSubscriptions` or `users.getFollowers` for one user.
pub fn users_connections(
    builder: &QueryBuilder,
    submethod: &str,
    user_id: &Ident,
) -> Result<Vec<RequestDescriptor>, CoreError> {
    builder.build(
        &QueryPath::new("users", submethod),
        std::slice::from_ref(user_id),
        Some("user_ids"),
        &Params::new(),
    )
}

pub fn groups_get_by_id(
    builder: &QueryBuilder,
    ids: &[Ident],
) -> Result<Vec<RequestDescriptor>, CoreError> {
    builder.build(
        &QueryPath::new("groups", "getbyid"),
        ids,
        Some("group_ids"),
        &with_fields(GROUP_FIELDS),
    )
}

pub fn groups_is_member(
    builder: &QueryBuilder,
    group_id: &Ident,
    user_ids: &[Ident],
) -> Result<Vec<RequestDescriptor>, CoreError> {
    let params = Params::from([("group_id".to_string(), group_id.to_string())]);
    builder.build(
        &QueryPath::new("groups", "ismember"),
        user_ids,
        Some("user_ids"),
        &params,
    )
}

pub fn friends_get(
    builder: &QueryBuilder,
    user_ids: &[Ident],
) -> Result<Vec<RequestDescriptor>, CoreError> {
    builder.build(
        &QueryPath::new("friends", "get"),
        user_ids,
        Some("user_ids"),
        &Params::new(),
    )
}

/// Request for the first page described by `spec`.
pub fn first_page(
    builder: &QueryBuilder,
    path: &QueryPath,
    spec: &PageSpec,
) -> Result<Vec<RequestDescriptor>, CoreError> {
    builder.build(
        path,
        std::slice::from_ref(&spec.owner),
        Some(&spec.param),
        &spec.first_page_params(),
    )
}

/// Requests for every page after the first, up to `spec.max` capped by `reported`.
pub fn remaining_pages(
    builder: &QueryBuilder,
    path: &QueryPath,
    spec: &PageSpec,
    reported: usize,
) -> Result<Vec<RequestDescriptor>, CoreError> {
    let pages = PageRange {
        start: spec.offset + spec.count,
        end: spec.max.end(reported),
        step: spec.count,
    };
    builder.paginate(
        path,
        std::slice::from_ref(&spec.owner),
        Some(&spec.param),
        &spec.params,
        pages,
    )
}
