//! AI-assisted extraction tests against a mocked completion collaborator.

use checkin_board::contract::MockCompletionClient;
use checkin_board::extract::{parse_items_from_csv_with_ai, ExtractError};

fn client_returning(response: &'static str) -> MockCompletionClient {
    let mut client = MockCompletionClient::new();
    client
        .expect_complete()
        .returning(move |_, _| Ok(response.to_string()));
    client
}

#[tokio::test]
async fn array_response_becomes_items_with_fresh_uids() {
    let client = client_returning(
        r#"[
            {"Name": "Ana", "lastname": "Silva", "ID": "f0012345", "checkedIn": true},
            {"Name": "Luis", "lastname": "null", "ID": "f0098765", "checkedIn": false}
        ]"#,
    );

    let items = parse_items_from_csv_with_ai(&client, "whatever the user pasted")
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0].checked_in);
    assert!(!items[1].checked_in);
    assert_eq!(items[0].fields["Name"], "Ana");
    assert_ne!(items[0].uid, items[1].uid);
    assert!(!items[0].uid.is_empty());
}

#[tokio::test]
async fn double_encoded_array_is_unwrapped() {
    let client =
        client_returning(r#""[{\"Name\": \"Ana\", \"checkedIn\": false}]""#);
    let items = parse_items_from_csv_with_ai(&client, "csv").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].fields["Name"], "Ana");
}

#[tokio::test]
async fn collaborator_supplied_uids_are_discarded() {
    let client = client_returning(r#"[{"uid": "attacker-chosen", "Name": "Ana"}]"#);
    let items = parse_items_from_csv_with_ai(&client, "csv").await.unwrap();
    assert_ne!(items[0].uid, "attacker-chosen");
    assert!(!items[0].fields.contains_key("uid"));
}

#[tokio::test]
async fn prose_response_fails_with_the_raw_payload() {
    let client = client_returning("Sure! Here is your JSON: [...]");
    let err = parse_items_from_csv_with_ai(&client, "csv")
        .await
        .unwrap_err();
    match err {
        ExtractError::UnparseableJson { raw, .. } => {
            assert!(raw.contains("Sure!"));
        }
        other => panic!("expected UnparseableJson, got {other:?}"),
    }
}

#[tokio::test]
async fn non_array_json_fails_with_wrong_shape() {
    let client = client_returning(r#"{"rows": []}"#);
    let err = parse_items_from_csv_with_ai(&client, "csv")
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::WrongShape { .. }));
}

#[tokio::test]
async fn completion_failure_propagates() {
    let mut client = MockCompletionClient::new();
    client.expect_complete().returning(|_, _| {
        Err(checkin_board::contract::CompletionError::Transport(
            "connection refused".to_string(),
        ))
    });
    let err = parse_items_from_csv_with_ai(&client, "csv")
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Completion(_)));
}

#[tokio::test]
async fn prompt_contains_the_raw_csv() {
    let mut client = MockCompletionClient::new();
    client
        .expect_complete()
        .withf(|prompt, _| prompt.contains("Ana,1001") && prompt.contains("checkedIn"))
        .returning(|_, _| Ok("[]".to_string()));
    let items = parse_items_from_csv_with_ai(&client, "Name,ID\nAna,1001")
        .await
        .unwrap();
    assert!(items.is_empty());
}
