use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linctl::commands::Session;
use linctl::commands::auth::{login, status};
use linctl::config::types::AppConfig;
use linctl::filter::{FilterCriteria, RawFilterInputs, ResourceDefaultPolicy, SortOrder, compose_at};
use linctl::linear::client::LinearClient;
use linctl::linear::graphql::{
    fetch_issue_detail, fetch_project_detail, fetch_team, fetch_user_by_email, fetch_viewer,
    list_comments, list_issues, list_projects, list_team_members, list_users, search_issues,
};
use linctl::linear::rate_limit::is_rate_limited;
use linctl::output::{OutputFormat, Renderer};

const API_KEY: &str = "lin_api_test";

fn client(server: &MockServer) -> LinearClient {
    LinearClient::new(server.uri(), API_KEY).unwrap()
}

fn issue_node(n: u32) -> Value {
    json!({
        "id": format!("issue-{n}"),
        "identifier": format!("ENG-{n}"),
        "title": format!("Issue {n}"),
        "description": null,
        "priority": 2,
        "estimate": null,
        "createdAt": "2024-05-01T09:00:00.000Z",
        "updatedAt": "2024-05-02T09:00:00.000Z",
        "dueDate": null,
        "url": format!("https://linear.app/acme/issue/ENG-{n}"),
        "state": { "id": "s1", "name": "Todo", "type": "unstarted", "color": "#e2e2e2" },
        "assignee": null,
        "team": { "id": "t1", "key": "ENG", "name": "Engineering" },
        "labels": { "nodes": [] }
    })
}

fn page(root: &str, nodes: Vec<Value>, next: Option<&str>) -> Value {
    let mut data = serde_json::Map::new();
    data.insert(
        root.to_owned(),
        json!({
            "nodes": nodes,
            "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next }
        }),
    );
    json!({ "data": data })
}

fn my_recent_issues() -> FilterCriteria {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let inputs = RawFilterInputs {
        assignee: Some("me".to_owned()),
        newer_than: "2_weeks_ago".to_owned(),
        ..RawFilterInputs::default()
    };
    compose_at(&inputs, &ResourceDefaultPolicy::for_issues(), now).unwrap()
}

#[tokio::test]
async fn viewer_is_fetched_with_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "viewer": {
                "id": "u1", "name": "Ada Lovelace",
                "email": "ada@example.com", "displayName": "ada"
            } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let viewer = fetch_viewer(&client(&server)).await.unwrap();
    assert_eq!(viewer.name, "Ada Lovelace");
    assert_eq!(viewer.display_name, "ada");
}

#[tokio::test]
async fn list_sends_composed_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": {
                "first": 10,
                "orderBy": "createdAt",
                "filter": {
                    "assignee": { "isMe": { "eq": true } },
                    "state": { "type": { "nin": ["completed", "canceled"] } },
                    "createdAt": { "gte": "2024-06-01T12:00:00Z" }
                }
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page("issues", vec![issue_node(1)], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listing = list_issues(&client(&server), &my_recent_issues(), SortOrder::Created, 10)
        .await
        .unwrap();
    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.items[0].identifier, "ENG-1");
    assert_eq!(listing.items[0].description, "");
    assert!(!listing.has_more);
}

#[tokio::test]
async fn pagination_stops_at_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "after": "c1", "first": 1 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            "issues",
            vec![issue_node(3)],
            Some("c2"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "first": 3 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            "issues",
            vec![issue_node(1), issue_node(2)],
            Some("c1"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let listing = list_issues(&client(&server), &FilterCriteria::default(), SortOrder::Linear, 3)
        .await
        .unwrap();
    let ids: Vec<_> = listing.items.iter().map(|i| i.identifier.as_str()).collect();
    assert_eq!(ids, ["ENG-1", "ENG-2", "ENG-3"]);
    assert!(listing.has_more);
}

#[tokio::test]
async fn pagination_stops_when_no_next_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page("issues", vec![issue_node(1), issue_node(2)], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listing = list_issues(&client(&server), &FilterCriteria::default(), SortOrder::Linear, 50)
        .await
        .unwrap();
    assert_eq!(listing.items.len(), 2);
    assert!(!listing.has_more);
}

#[tokio::test]
async fn search_passes_term_and_archived_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": { "term": "login", "includeArchived": true, "first": 5 }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page("searchIssues", vec![issue_node(7)], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let criteria = FilterCriteria {
        include_archived: true,
        ..FilterCriteria::default()
    };
    let listing = search_issues(&client(&server), "login", &criteria, SortOrder::Linear, 5)
        .await
        .unwrap();
    assert_eq!(listing.items[0].identifier, "ENG-7");
}

#[tokio::test]
async fn projects_use_project_filter_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": {
                "filter": {
                    "state": { "nin": ["completed", "canceled"] },
                    "accessibleTeams": { "some": { "key": { "eq": "ENG" } } }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            "projects",
            vec![json!({
                "id": "p1", "name": "Q3 launch", "description": "",
                "state": "started", "progress": 0.5,
                "startDate": "2024-07-01", "targetDate": null,
                "url": "https://linear.app/acme/project/q3",
                "createdAt": "2024-06-01T00:00:00Z", "updatedAt": "2024-06-10T00:00:00Z",
                "lead": null,
                "teams": { "nodes": [{ "id": "t1", "key": "ENG", "name": "Engineering" }] }
            })],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let inputs = RawFilterInputs {
        team: Some("ENG".to_owned()),
        ..RawFilterInputs::default()
    };
    let criteria = compose_at(&inputs, &ResourceDefaultPolicy::for_projects(), now).unwrap();
    let listing = list_projects(&client(&server), &criteria, SortOrder::Linear, 10)
        .await
        .unwrap();
    assert_eq!(listing.items[0].name, "Q3 launch");
    assert_eq!(listing.items[0].team_keys(), "ENG");
}

#[tokio::test]
async fn issue_detail_missing_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "id": "ENG-404" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "issue": null } })))
        .mount(&server)
        .await;

    let err = fetch_issue_detail(&client(&server), "ENG-404").await.unwrap_err();
    assert!(format!("{err:#}").contains("issue ENG-404 not found"));
}

#[tokio::test]
async fn graphql_errors_surface() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{ "message": "Argument Validation Error" }]
        })))
        .mount(&server)
        .await;

    let err = fetch_viewer(&client(&server)).await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("GraphQL errors: Argument Validation Error"), "{msg}");
    assert!(!is_rate_limited(&err));
}

#[tokio::test]
async fn ratelimited_code_is_detected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{
                "message": "Too many requests",
                "extensions": { "code": "RATELIMITED" }
            }]
        })))
        .mount(&server)
        .await;

    let err = list_issues(&client(&server), &FilterCriteria::default(), SortOrder::Linear, 5)
        .await
        .unwrap_err();
    assert!(is_rate_limited(&err));
}

#[tokio::test]
async fn http_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = fetch_viewer(&client(&server)).await.unwrap_err();
    assert!(format!("{err:#}").contains("HTTP status code: 500"));
}

#[tokio::test]
async fn login_validates_then_stores_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "lin_api_new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "viewer": { "id": "u1", "name": "Ada", "email": "ada@example.com" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = AppConfig::default();
    config.api.endpoint = server.uri();
    let session = Session::new(config, Renderer::new(OutputFormat::Table, ""));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth.json");

    let out = login(&session, &mut "lin_api_new\n".as_bytes(), &path)
        .await
        .unwrap();
    assert_eq!(out, "Logged in as Ada <ada@example.com>\n");
    assert_eq!(
        linctl::linear::auth::load_api_key(&path).unwrap().as_deref(),
        Some("lin_api_new")
    );
}

#[tokio::test]
async fn login_rejected_key_is_not_stored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut config = AppConfig::default();
    config.api.endpoint = server.uri();
    let session = Session::new(config, Renderer::new(OutputFormat::Table, ""));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth.json");

    assert!(login(&session, &mut "bad\n".as_bytes(), &path).await.is_err());
    assert!(!path.exists());
    assert!(login(&session, &mut "\n".as_bytes(), &path).await.is_err());
}

#[tokio::test]
async fn status_reports_key_owner() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "lin_api_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "viewer": { "id": "u1", "name": "Ada", "email": "ada@example.com" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = AppConfig::default();
    config.api.endpoint = server.uri();
    let session = Session::new(config, Renderer::new(OutputFormat::Table, ""));

    let out = status(&session, Some("lin_api_status".to_owned()))
        .await
        .unwrap();
    assert_eq!(out, "Logged in as Ada <ada@example.com>\n");
}

fn member_node(name: &str, admin: bool) -> Value {
    json!({
        "id": format!("u-{name}"),
        "name": name,
        "email": format!("{name}@example.com"),
        "displayName": name,
        "isMe": false,
        "active": true,
        "admin": admin
    })
}

#[tokio::test]
async fn team_members_follow_nested_cursor() {
    let server = MockServer::start().await;
    let members = |nodes: Vec<Value>, next: Option<&str>| {
        json!({ "data": { "team": { "members": {
            "nodes": nodes,
            "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next }
        } } } })
    };
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "id": "ENG", "after": "m1" } })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(members(vec![member_node("bob", false)], None)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "id": "ENG", "first": 5 } })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(members(vec![member_node("ada", true)], Some("m1"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listing = list_team_members(&client(&server), "ENG", 5).await.unwrap();
    let names: Vec<_> = listing.items.iter().map(|m| m.user.name.as_str()).collect();
    assert_eq!(names, ["ada", "bob"]);
    assert!(listing.items[0].admin);
    assert!(!listing.has_more);
}

#[tokio::test]
async fn active_users_are_filtered_by_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": { "filter": { "active": { "eq": true } }, "first": 50 }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page("users", vec![member_node("ada", false)], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listing = list_users(&client(&server), true, SortOrder::Linear, 50)
        .await
        .unwrap();
    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.items[0].status(), "Active");
}

#[tokio::test]
async fn unknown_user_email_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": { "filter": { "email": { "eq": "nobody@example.com" } }, "first": 1 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page("users", vec![], None)))
        .mount(&server)
        .await;

    let err = fetch_user_by_email(&client(&server), "nobody@example.com")
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("user nobody@example.com not found"));
}

#[tokio::test]
async fn comments_on_missing_issue_are_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "issue": null } })))
        .mount(&server)
        .await;

    let err = list_comments(&client(&server), "ENG-404", SortOrder::Created, 10)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("issue.comments"));
}

#[tokio::test]
async fn comments_are_listed_with_authors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "id": "ENG-1", "orderBy": "createdAt" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "issue": { "comments": {
                "nodes": [{
                    "body": "Looks good",
                    "createdAt": "2024-05-03T10:00:00.000Z",
                    "user": { "id": "u1", "name": "Ada" }
                }],
                "pageInfo": { "hasNextPage": false, "endCursor": null }
            } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = list_comments(&client(&server), "ENG-1", SortOrder::Created, 10)
        .await
        .unwrap();
    assert_eq!(listing.items[0].body, "Looks good");
    assert_eq!(listing.items[0].author.as_ref().unwrap().name, "Ada");
}

#[tokio::test]
async fn team_and_project_lookups() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "id": "ENG" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "team": {
                "id": "t1", "key": "ENG", "name": "Engineering",
                "description": null, "private": true, "issueCount": 12
            } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "id": "missing" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "project": null } })))
        .mount(&server)
        .await;

    let team = fetch_team(&client(&server), "ENG").await.unwrap();
    assert_eq!(team.team.key, "ENG");
    assert!(team.private);
    assert_eq!(team.issue_count, 12);
    assert_eq!(team.description, "");

    let err = fetch_project_detail(&client(&server), "missing")
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("project missing not found"));
}
