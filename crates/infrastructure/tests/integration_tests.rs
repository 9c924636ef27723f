//! DynamoDB Local（http://localhost:8000）を使う統合テスト
//!
//! `cargo test -p infrastructure -- --ignored` で実行する。

use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType,
    Projection, ProjectionType, ScalarAttributeType,
};
use chrono::Utc;
use domain::{OwnerId, RecordId, Todo, TodoId, TodoPatch};
use infrastructure::{
    DynamoDbClient, DynamoTodoRepository, StoreError, TodoRepository, UpdateAck, OWNER_INDEX,
};
use shared::{Config, StoreBackend};

/// 統合テスト用のセットアップ（テストごとに別テーブル）
async fn setup_test_environment() -> DynamoTodoRepository {
    let config = Config {
        dynamodb_table: format!("todox-test-{}", RecordId::new()),
        environment: "test".to_string(),
        aws_region: "ap-northeast-1".to_string(),
        dynamodb_endpoint: Some("http://localhost:8000".to_string()),
        store_backend: StoreBackend::DynamoDb,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        session_secret: "test-secret".to_string(),
        enforce_ownership: false,
        cors_allowed_origin: None,
    };
    let db = DynamoDbClient::new(&config).await;
    create_table(&db).await;
    DynamoTodoRepository::new(db)
}

async fn create_table(db: &DynamoDbClient) {
    let key = |name: &str, key_type: KeyType| {
        KeySchemaElement::builder()
            .attribute_name(name)
            .key_type(key_type)
            .build()
            .unwrap()
    };
    let attribute = |name: &str| {
        AttributeDefinition::builder()
            .attribute_name(name)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .unwrap()
    };

    db.client()
        .create_table()
        .table_name(db.table_name())
        .billing_mode(BillingMode::PayPerRequest)
        .key_schema(key("PK", KeyType::Hash))
        .key_schema(key("SK", KeyType::Range))
        .attribute_definitions(attribute("PK"))
        .attribute_definitions(attribute("SK"))
        .attribute_definitions(attribute("GSI1PK"))
        .attribute_definitions(attribute("GSI1SK"))
        .global_secondary_indexes(
            GlobalSecondaryIndex::builder()
                .index_name(OWNER_INDEX)
                .key_schema(key("GSI1PK", KeyType::Hash))
                .key_schema(key("GSI1SK", KeyType::Range))
                .projection(
                    Projection::builder()
                        .projection_type(ProjectionType::All)
                        .build(),
                )
                .build()
                .unwrap(),
        )
        .send()
        .await
        .expect("テーブル作成に失敗");
}

fn owner(id: &str) -> OwnerId {
    OwnerId::from_string(id.to_string()).unwrap()
}

fn todo_for(owner_id: &str, name: &str) -> Todo {
    Todo {
        todo_id: TodoId::new(),
        owner_id: owner(owner_id),
        name: name.to_string(),
        is_complete: false,
        created: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "DynamoDB Local が必要"]
async fn test_insert_and_find_by_owner() {
    let repo = setup_test_environment().await;

    let ack = repo.insert_one(&todo_for("U1", "Buy milk")).await.unwrap();
    repo.insert_one(&todo_for("U2", "Walk dog")).await.unwrap();

    let todos = repo.find_by_owner(&owner("U1")).await.unwrap();

    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, ack.inserted_id);
    assert_eq!(todos[0].todo.name, "Buy milk");
    assert!(!todos[0].todo.is_complete);
}

#[tokio::test]
#[ignore = "DynamoDB Local が必要"]
async fn test_partial_updates_are_independent() {
    let repo = setup_test_environment().await;
    let ack = repo.insert_one(&todo_for("U1", "Buy milk")).await.unwrap();
    let id = ack.inserted_id.to_string();

    let completed = repo
        .update_by_id(&id, &TodoPatch::new(Some(true), None))
        .await
        .unwrap();
    let again = repo
        .update_by_id(&id, &TodoPatch::new(Some(true), None))
        .await
        .unwrap();
    let renamed = repo
        .update_by_id(&id, &TodoPatch::new(None, Some("Buy oat milk".to_string())))
        .await
        .unwrap();

    assert_eq!(completed, UpdateAck::matched(true));
    assert_eq!(again, UpdateAck::matched(false));
    assert_eq!(renamed, UpdateAck::matched(true));

    let todos = repo.find_by_owner(&owner("U1")).await.unwrap();
    assert_eq!(todos[0].todo.name, "Buy oat milk");
    assert!(todos[0].todo.is_complete);
}

#[tokio::test]
#[ignore = "DynamoDB Local が必要"]
async fn test_update_misses_and_malformed_ids() {
    let repo = setup_test_environment().await;
    let ack = repo.insert_one(&todo_for("U1", "Buy milk")).await.unwrap();

    let missing = repo
        .update_by_id(
            &RecordId::new().to_string(),
            &TodoPatch::new(Some(true), None),
        )
        .await
        .unwrap();
    assert_eq!(missing, UpdateAck::unmatched());

    let foreign = repo
        .update_owned_by_id(
            &ack.inserted_id.to_string(),
            &owner("U2"),
            &TodoPatch::new(Some(true), None),
        )
        .await
        .unwrap();
    assert_eq!(foreign, UpdateAck::unmatched());

    let malformed = repo
        .update_by_id("bogus", &TodoPatch::new(Some(true), None))
        .await;
    assert_eq!(
        malformed,
        Err(StoreError::InvalidIdentifier("bogus".to_string()))
    );
}
