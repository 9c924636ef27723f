use crate::models::{
    item_to_stored_todo, todo_to_item, DynamoDbKeys, InsertAck, UpdateAck, UpdatePlan, OWNER_INDEX,
};
use crate::repositories::{StoreError, TodoRepository};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::{
    error::DisplayErrorContext,
    operation::update_item::UpdateItemError,
    types::{AttributeValue, ReturnValue},
    Client,
};
use domain::{OwnerId, RecordId, StoredTodo, Todo, TodoPatch};
use shared::Config;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));
        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        Self {
            client: Client::new(&aws_config),
            table_name: config.dynamodb_table.clone(),
        }
    }

    pub fn from_client(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// DynamoDB 上の Todo コレクション
///
/// 1 レコード 1 アイテム（`PK = TODO#<_id>`, `SK = TODO`）。所有者での検索は
/// `GSI1`（`GSI1PK = OWNER#<ownerId>`）を使う。
#[derive(Clone)]
pub struct DynamoTodoRepository {
    db: DynamoDbClient,
}

impl DynamoTodoRepository {
    pub fn new(db: DynamoDbClient) -> Self {
        Self { db }
    }

    async fn update(
        &self,
        id: &str,
        owner_id: Option<&OwnerId>,
        patch: &TodoPatch,
    ) -> Result<UpdateAck, StoreError> {
        let record_id = RecordId::parse(id)?;
        let (pk, sk) = DynamoDbKeys::primary(&record_id);

        let Some(plan) = UpdatePlan::for_patch(patch, owner_id) else {
            return self.match_only(&record_id, owner_id).await;
        };

        let result = self
            .db
            .client()
            .update_item()
            .table_name(self.db.table_name())
            .key("PK", AttributeValue::S(pk))
            .key("SK", AttributeValue::S(sk))
            .update_expression(plan.update_expression)
            .condition_expression(plan.condition_expression)
            .set_expression_attribute_names(Some(plan.names))
            .set_expression_attribute_values(Some(plan.values))
            .return_values(ReturnValue::AllOld)
            .send()
            .await;

        match result {
            Ok(output) => {
                let modified = match output.attributes() {
                    Some(old) => patch.modifies(&item_to_stored_todo(old)?.todo),
                    None => true,
                };
                info!(
                    table = self.db.table_name(),
                    record_id = %record_id,
                    modified,
                    "Todo updated"
                );
                Ok(UpdateAck::matched(modified))
            }
            Err(err)
                if matches!(
                    err.as_service_error(),
                    Some(UpdateItemError::ConditionalCheckFailedException(_))
                ) =>
            {
                info!(
                    table = self.db.table_name(),
                    record_id = %record_id,
                    "No todo matched update"
                );
                Ok(UpdateAck::unmatched())
            }
            Err(err) => Err(backend_error(err)),
        }
    }

    /// 空のパッチ用。書き込みはせず一致の有無だけを確認する
    async fn match_only(
        &self,
        record_id: &RecordId,
        owner_id: Option<&OwnerId>,
    ) -> Result<UpdateAck, StoreError> {
        let (pk, sk) = DynamoDbKeys::primary(record_id);

        let output = self
            .db
            .client()
            .get_item()
            .table_name(self.db.table_name())
            .key("PK", AttributeValue::S(pk))
            .key("SK", AttributeValue::S(sk))
            .consistent_read(true)
            .send()
            .await
            .map_err(backend_error)?;

        let matched = match output.item() {
            Some(item) => {
                let stored = item_to_stored_todo(item)?;
                owner_id.map_or(true, |owner| stored.todo.owner_id == *owner)
            }
            None => false,
        };

        Ok(if matched {
            UpdateAck::matched(false)
        } else {
            UpdateAck::unmatched()
        })
    }
}

#[async_trait]
impl TodoRepository for DynamoTodoRepository {
    #[instrument(skip(self, todo), fields(owner_id = %todo.owner_id))]
    async fn insert_one(&self, todo: &Todo) -> Result<InsertAck, StoreError> {
        let record_id = RecordId::new();
        let item = todo_to_item(&record_id, todo);

        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(backend_error)?;

        info!(
            table = self.db.table_name(),
            record_id = %record_id,
            todo_id = %todo.todo_id,
            "Todo inserted"
        );

        Ok(InsertAck::new(record_id))
    }

    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<StoredTodo>, StoreError> {
        let gsi1_pk = DynamoDbKeys::owner_partition(owner_id);
        let mut todos = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .db
                .client()
                .query()
                .table_name(self.db.table_name())
                .index_name(OWNER_INDEX)
                .key_condition_expression("GSI1PK = :gsi1_pk")
                .expression_attribute_values(":gsi1_pk", AttributeValue::S(gsi1_pk.clone()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(backend_error)?;

            for item in output.items() {
                todos.push(item_to_stored_todo(item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        info!(
            table = self.db.table_name(),
            count = todos.len(),
            "Todos queried by owner"
        );

        Ok(todos)
    }

    #[instrument(skip(self, patch))]
    async fn update_by_id(&self, id: &str, patch: &TodoPatch) -> Result<UpdateAck, StoreError> {
        self.update(id, None, patch).await
    }

    #[instrument(skip(self, patch))]
    async fn update_owned_by_id(
        &self,
        id: &str,
        owner_id: &OwnerId,
        patch: &TodoPatch,
    ) -> Result<UpdateAck, StoreError> {
        self.update(id, Some(owner_id), patch).await
    }
}

fn backend_error<E>(err: E) -> StoreError
where
    E: std::error::Error,
{
    let message = DisplayErrorContext(err).to_string();
    warn!(error = %message, "DynamoDB operation failed");
    StoreError::Backend(message)
}
