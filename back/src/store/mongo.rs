use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    Client, Collection,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NewTodo, StoreError, TodoId, TodoRecord, TodoStore};

#[derive(Clone, Debug)]
pub struct MongoStore {
    collection: Collection<TodoDocument>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    completed: bool,
    created_at: bson::DateTime,
}

impl MongoStore {
    /// Connects and pings the database so an unreachable server fails startup.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database);
        database.run_command(doc! { "ping": 1 }).await?;

        info!(
            database = %database.name(),
            collection = %collection,
            "connected to mongodb"
        );

        Ok(Self {
            collection: database.collection(collection),
        })
    }

    fn object_id(id: &TodoId) -> Result<ObjectId, StoreError> {
        // ids are only minted by this store, a bad one cannot match anything
        ObjectId::parse_str(id.as_str()).map_err(|_| StoreError::NotFound)
    }
}

impl TodoStore for MongoStore {
    fn parse_id(&self, raw: &str) -> Option<TodoId> {
        parse_object_id(raw)
    }

    async fn find_all(&self) -> Result<Vec<TodoRecord>, StoreError> {
        let cursor = self.collection.find(doc! {}).sort(creation_order()).await?;
        let documents: Vec<TodoDocument> = cursor.try_collect().await?;
        documents.into_iter().map(TodoRecord::try_from).collect()
    }

    async fn insert(&self, todo: NewTodo) -> Result<TodoId, StoreError> {
        let document = TodoDocument::new(ObjectId::new(), todo);
        self.collection.insert_one(&document).await?;
        Ok(TodoId::new(document.id.to_hex()))
    }

    async fn update(&self, id: &TodoId, title: &str, completed: bool) -> Result<(), StoreError> {
        let filter = by_id(Self::object_id(id)?);

        let result = self
            .collection
            .update_one(filter, set_fields(title, completed))
            .await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: &TodoId) -> Result<(), StoreError> {
        let result = self
            .collection
            .delete_one(by_id(Self::object_id(id)?))
            .await?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

// $set leaves created_at untouched
fn set_fields(title: &str, completed: bool) -> Document {
    doc! { "$set": { "title": title, "completed": completed } }
}

fn creation_order() -> Document {
    doc! { "created_at": 1, "_id": 1 }
}

fn parse_object_id(raw: &str) -> Option<TodoId> {
    ObjectId::parse_str(raw)
        .ok()
        .map(|oid| TodoId::new(oid.to_hex()))
}

impl TodoDocument {
    fn new(id: ObjectId, todo: NewTodo) -> Self {
        Self {
            id,
            title: todo.title,
            completed: false,
            created_at: bson::DateTime::from_millis(todo.created_at.timestamp_millis()),
        }
    }
}

impl TryFrom<TodoDocument> for TodoRecord {
    type Error = StoreError;

    fn try_from(document: TodoDocument) -> Result<Self, Self::Error> {
        let millis = document.created_at.timestamp_millis();
        let created_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            StoreError::Backend(format!("todo {} has out of range created_at", document.id).into())
        })?;

        Ok(Self {
            id: TodoId::new(document.id.to_hex()),
            title: document.title,
            completed: document.completed,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("65f0c0ffee0000000000abcd")]
    #[case("65F0C0FFEE0000000000ABCD")]
    fn accepts_object_id_hex(#[case] raw: &str) {
        let id = parse_object_id(raw).unwrap();
        assert_eq!(id.as_str(), "65f0c0ffee0000000000abcd");
    }

    #[rstest]
    #[case("")]
    #[case("not-an-id")]
    #[case("65f0c0ffee0000000000abc")]
    #[case("65f0c0ffee0000000000abcz")]
    #[case("550e8400-e29b-41d4-a716-446655440000")]
    fn rejects_malformed_ids(#[case] raw: &str) {
        assert_eq!(parse_object_id(raw), None);
    }

    #[test]
    fn filter_matches_on_object_id() {
        let id = ObjectId::new();

        assert_eq!(by_id(id), doc! { "_id": id });
    }

    #[test]
    fn update_only_sets_title_and_completed() {
        let update = set_fields("buy oat milk", true);

        assert_eq!(update.keys().collect::<Vec<_>>(), ["$set"]);
        let fields = update.get_document("$set").unwrap();
        assert_eq!(fields, &doc! { "title": "buy oat milk", "completed": true });
        assert!(!fields.contains_key("created_at"));
    }

    #[test]
    fn listing_sorts_by_creation_then_id() {
        let order = creation_order();

        assert_eq!(order.keys().collect::<Vec<_>>(), ["created_at", "_id"]);
        assert_eq!(order.get_i32("created_at").unwrap(), 1);
        assert_eq!(order.get_i32("_id").unwrap(), 1);
    }

    #[test]
    fn new_documents_start_uncompleted() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let todo = NewTodo {
            title: "buy milk".into(),
            created_at,
        };
        let id = ObjectId::new();

        let document = TodoDocument::new(id, todo);

        assert_eq!(document.id, id);
        assert!(!document.completed);
        assert_eq!(document.created_at.timestamp_millis(), created_at.timestamp_millis());
    }

    #[test]
    fn document_maps_to_record() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let id = ObjectId::new();
        let document = TodoDocument {
            id,
            title: "buy milk".into(),
            completed: true,
            created_at: bson::DateTime::from_millis(created_at.timestamp_millis()),
        };

        let record = TodoRecord::try_from(document).unwrap();

        assert_eq!(record.id.as_str(), id.to_hex());
        assert_eq!(record.title, "buy milk");
        assert!(record.completed);
        assert_eq!(record.created_at, created_at);
    }

    #[test]
    fn document_serializes_with_mongo_field_names() {
        let document = TodoDocument::new(ObjectId::new(), NewTodo::now("buy milk"));

        let bson = bson::to_document(&document).unwrap();

        assert!(bson.get_object_id("_id").is_ok());
        assert_eq!(bson.get_str("title").unwrap(), "buy milk");
        assert!(!bson.get_bool("completed").unwrap());
        assert!(bson.get_datetime("created_at").is_ok());
    }
}
