//! GitHub client tests against a local mock server.

use orgbot_github::{GithubClient, GithubError, InviteOutcome};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> GithubClient {
    GithubClient::new(
        "acme".to_string(),
        "test-token".to_string(),
        Some(server.uri()),
    )
    .expect("client should build")
}

#[tokio::test]
async fn membership_204_means_member() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/members/alice"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(client.check_membership("alice").await.unwrap());
}

#[tokio::test]
async fn membership_404_means_not_member() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/members/bob"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(!client.check_membership("bob").await.unwrap());
}

#[tokio::test]
async fn membership_unexpected_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/members/carol"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.check_membership("carol").await.unwrap_err();
    match err {
        GithubError::UnexpectedMembershipStatus { status, .. } => assert_eq!(status, 500),
        other => panic!("expected UnexpectedMembershipStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn invite_201_is_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orgs/acme/invitations"))
        .and(body_partial_json(json!({
            "email": "a@x.com",
            "role": "direct_member"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let outcome = client.invite("alice", "a@x.com").await.unwrap();
    assert_eq!(outcome, InviteOutcome::Created);
}

#[tokio::test]
async fn invite_already_member_body_is_already_invited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orgs/acme/invitations"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed",
            "errors": [{
                "resource": "OrganizationInvitation",
                "code": "unprocessable",
                "message": "A user with this email address is already a part of this organization"
            }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let outcome = client.invite("alice", "a@x.com").await.unwrap();
    assert_eq!(outcome, InviteOutcome::AlreadyInvited);
}

#[tokio::test]
async fn invite_other_rejection_is_hard_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orgs/acme/invitations"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "API rate limit exceeded"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.invite("alice", "a@x.com").await.unwrap_err();
    match err {
        GithubError::InvitationRejected { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "API rate limit exceeded");
        }
        other => panic!("expected InvitationRejected, got {other:?}"),
    }
}
