//! End-to-end flows against a mock API server.

use serde_json::{json, Value};
use vkfan::{
    persist, ClientConfig, ClientError, FriendsGet, GroupMembers, Ident, Limit, Params,
    UsersGet, VkClient,
};
use vkfan_store::{DbSettings, RedbTables, TableFactory};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> VkClient {
    let config = ClientConfig {
        api_url: format!("{}/method/", server.uri()),
        ..ClientConfig::with_tokens(["tok-a", "tok-b"])
    };
    VkClient::new(&config).unwrap()
}

fn ok(response: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "response": response }))
}

fn member_page(offset: usize, count: usize, total: usize) -> Value {
    let items: Vec<usize> = (offset..(offset + count).min(total)).collect();
    json!({ "count": total, "items": items })
}

async fn mount_member_pages(server: &MockServer, total: usize, failing: Option<usize>) {
    for offset in (0..total).step_by(1000) {
        let response = if Some(offset) == failing {
            ResponseTemplate::new(500)
        } else {
            ok(member_page(offset, 1000, total))
        };
        Mock::given(method("GET"))
            .and(path("/method/groups.getMembers"))
            .and(query_param("group_id", "42"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn several_users_share_one_batched_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/method/users.get"))
        .and(body_string_contains("user_ids=1%2C+2%2C+3"))
        .and(body_string_contains("v=5.132"))
        .respond_with(ok(json!([{"id": 1}, {"id": 2}, {"id": 3}])))
        .expect(1)
        .mount(&server)
        .await;

    let profiles = client_for(&server)
        .users()
        .get(UsersGet::ids([1i64, 2, 3]))
        .await
        .unwrap();
    assert_eq!(profiles.users.len(), 3);
    assert!(profiles.friends.is_empty());
}

#[tokio::test]
async fn friend_profiles_arrive_in_a_second_wave() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/users.get"))
        .and(query_param("user_id", "1"))
        .respond_with(ok(json!([{"id": 1, "first_name": "Pavel"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/method/friends.get"))
        .and(query_param("user_id", "1"))
        .respond_with(ok(json!({"count": 2, "items": [2, 3]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/method/users.get"))
        .and(body_string_contains("user_ids=2%2C+3"))
        .respond_with(ok(json!([{"id": 2}, {"id": 3}])))
        .expect(1)
        .mount(&server)
        .await;

    let params = UsersGet {
        friends: true,
        data_friends: true,
        ..UsersGet::ids([1i64])
    };
    let profiles = client_for(&server).users().get(params).await.unwrap();
    assert_eq!(profiles.users[0]["first_name"], "Pavel");
    assert_eq!(profiles.friends, vec![json!({"id": 2}), json!({"id": 3})]);
}

#[tokio::test]
async fn members_are_collected_across_pages() {
    let server = MockServer::start().await;
    mount_member_pages(&server, 2500, None).await;

    let members = client_for(&server)
        .groups()
        .get_members(GroupMembers::new(42i64))
        .await
        .unwrap();
    assert_eq!(members.len(), 2500);
    let mut ids: Vec<u64> = members.iter().filter_map(Value::as_u64).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 2500);
}

#[tokio::test]
async fn failed_page_is_left_out_without_an_error() {
    let server = MockServer::start().await;
    mount_member_pages(&server, 2500, Some(2000)).await;

    let members = client_for(&server)
        .groups()
        .get_members(GroupMembers::new(42i64))
        .await
        .unwrap();
    assert_eq!(members.len(), 2000);
}

#[tokio::test]
async fn max_limits_the_pages_requested() {
    let server = MockServer::start().await;
    for offset in [0usize, 1000] {
        Mock::given(method("GET"))
            .and(path("/method/groups.getMembers"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ok(member_page(offset, 1000, 5000)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let params = GroupMembers {
        max: Limit::Count(2000),
        ..GroupMembers::new(42i64)
    };
    let members = client_for(&server).groups().get_members(params).await.unwrap();
    assert_eq!(members.len(), 2000);
}

#[tokio::test]
async fn api_errors_become_empty_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/friends.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"error_code": 30, "error_msg": "This profile is private"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let friends = client_for(&server)
        .friends()
        .get(FriendsGet::of(1i64))
        .await
        .unwrap();
    assert!(friends.is_empty());
}

#[tokio::test]
async fn unknown_route_sends_nothing() {
    let server = MockServer::start().await;
    let err = client_for(&server)
        .call("photos", "get", &[Ident::Id(1)], &Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Core(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn results_can_be_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/method/groups.getById"))
        .respond_with(ok(json!([{"id": 1, "name": "API"}, {"id": 2, "name": "Club"}])))
        .mount(&server)
        .await;

    let ids = [Ident::Id(1), Ident::Id(2)];
    let groups = client_for(&server).groups().get_by_id(&ids).await.unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let tables = RedbTables::open(&DbSettings::at(tmp.path().join("out.redb"))).unwrap();
    assert_eq!(persist::save_items(&tables, "groups", &groups).unwrap(), 2);
    let table = tables.create_table(&persist::results_schema("groups")).unwrap();
    assert_eq!(table.get("2").unwrap().unwrap()["data"]["name"], "Club");
}
