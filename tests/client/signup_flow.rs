use crate::helpers::{spawn_service, testers_path};
use claims::{assert_err, assert_none, assert_ok};
use prefinery_client::domain::{ClientContext, TesterEmailAddress, TesterSignup, TesterStatus};
use prefinery_client::tester_client::PrefineryError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signup(email: &str, invitation_code: Option<&str>, referrer_id: Option<u64>) -> TesterSignup {
    TesterSignup {
        email: TesterEmailAddress::parse(email.to_string()).unwrap(),
        invitation_code: invitation_code.map(String::from),
        referrer_id,
        client_context: ClientContext {
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: Some("test-agent/1.0".to_string()),
        },
    }
}

async fn mount_empty_lookup(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(testers_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn a_fresh_signup_creates_a_tester_and_returns_the_redacted_record() {
    // Arrange
    let service = spawn_service().await;
    mount_empty_lookup(&service.server).await;
    Mock::given(method("POST"))
        .and(path(testers_path()))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 21,
            "email": "tester@example.com",
            "status": "active",
            "invitation_code": "ABC123",
            "referrer_id": 17
        })))
        .expect(1)
        .mount(&service.server)
        .await;
    // Act
    let tester = assert_ok!(
        service
            .client
            .find_or_create_tester(signup("tester@example.com", Some("ABC123"), Some(17)))
            .await
    );
    // Assert
    assert_eq!(tester.id, Some(21));
    assert_eq!(tester.status, Some(TesterStatus::Active));
    assert_eq!(tester.referrer_id, Some(17));
    assert_none!(tester.invitation_code);
}

#[tokio::test]
async fn remote_validation_failures_are_reported_in_order() {
    // Arrange
    let service = spawn_service().await;
    mount_empty_lookup(&service.server).await;
    Mock::given(method("POST"))
        .and(path(testers_path()))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "errors": [
                {"message": "Email has already been taken"},
                {"message": "Invitation code is invalid"}
            ]
        })))
        .expect(1)
        .mount(&service.server)
        .await;
    // Act
    let error = assert_err!(
        service
            .client
            .find_or_create_tester(signup("tester@example.com", Some("BAD"), None))
            .await
    );
    // Assert
    assert_eq!(
        error.to_string(),
        "Email has already been taken\nInvitation code is invalid"
    );
    match error {
        PrefineryError::Remote { messages } => {
            assert_eq!(
                messages,
                vec!["Email has already been taken", "Invitation code is invalid"]
            );
        }
        other => panic!("expected a remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn a_blank_create_response_is_a_protocol_error() {
    // Arrange
    let service = spawn_service().await;
    mount_empty_lookup(&service.server).await;
    Mock::given(method("POST"))
        .and(path(testers_path()))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!(null)))
        .expect(1)
        .mount(&service.server)
        .await;
    // Act
    let error = assert_err!(
        service
            .client
            .find_or_create_tester(signup("tester@example.com", None, None))
            .await
    );
    // Assert
    assert!(matches!(error, PrefineryError::Protocol { .. }));
}

#[tokio::test]
async fn a_missing_create_body_is_a_transport_error() {
    // Arrange
    let service = spawn_service().await;
    mount_empty_lookup(&service.server).await;
    Mock::given(method("POST"))
        .and(path(testers_path()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&service.server)
        .await;
    // Act
    let error = assert_err!(
        service
            .client
            .find_or_create_tester(signup("tester@example.com", None, None))
            .await
    );
    // Assert
    assert!(matches!(error, PrefineryError::Transport(None)));
}
