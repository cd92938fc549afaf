use crate::config::settings::MongoConfig;
use crate::models::user::User;
use crate::{Error, Result};
use chrono::Utc;
use log::info;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document},
    options::{ClientOptions, ReturnDocument, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};

pub const USERS_COLLECTION: &str = "users";

pub async fn initialize_db(config: &MongoConfig) -> Result<Database> {
    let mut uri = format!("mongodb://{}:{}", config.host, config.port);

    if let (Some(user), Some(pass)) = (&config.user, &config.password) {
        uri = format!(
            "mongodb://{}:{}@{}:{}",
            user, pass, config.host, config.port
        );
    }

    let mut client_options = ClientOptions::parse(uri)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    // Small pool, direct connection to a standalone instance
    client_options.min_pool_size = Some(0);
    client_options.max_pool_size = Some(10);
    client_options.direct_connection = Some(true);

    client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
    client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

    let client = Client::with_options(client_options).map_err(|e| Error::Database(e.to_string()))?;

    let database = client.database(&config.database);

    // Connectivity check before serving requests
    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    info!("connected to MongoDB database '{}'", config.database);

    Ok(database)
}

/// Persistence boundary for the `users` collection. Every mutation is a
/// single atomic per-document operation; there is no cross-document
/// transaction anywhere in this service.
#[derive(Clone)]
pub struct UserStore {
    users: Collection<Document>,
}

impl UserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(USERS_COLLECTION),
        }
    }

    /// Looks a user up by username. With `active_only` the lookup ignores
    /// soft-deleted accounts, which is also the scope of username
    /// uniqueness.
    pub async fn find_by_username(
        &self,
        username: &str,
        active_only: bool,
    ) -> Result<Option<Document>> {
        let mut filter = doc! { "username": username };
        if active_only {
            filter.insert("is_deleted", false);
        }

        let opt = self
            .users
            .find_one(filter)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(opt.map(normalize_document_dates))
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Document>> {
        let opt = self
            .users
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(opt.map(normalize_document_dates))
    }

    pub async fn insert(&self, user: &User) -> Result<ObjectId> {
        let document =
            bson::to_document(user).map_err(|e| Error::Internal(e.to_string()))?;

        let result = self
            .users
            .insert_one(document)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| Error::Database("Failed to get inserted ID".to_string()))
    }

    /// `$set`s the given fields and returns the document in one round
    /// trip: the pre-image with `ReturnDocument::Before`, the updated
    /// document with `After`. `None` means the id did not resolve.
    /// Callers include the `updated_at` stamp in `changes`.
    pub async fn find_and_update_by_id(
        &self,
        id: &ObjectId,
        changes: Document,
        return_document: ReturnDocument,
    ) -> Result<Option<Document>> {
        let opt = self
            .users
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": changes })
            .return_document(return_document)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(opt.map(normalize_document_dates))
    }

    /// Idempotent set-add on the actor's block list.
    pub async fn add_blocked(&self, actor: &ObjectId, target: &ObjectId) -> Result<()> {
        self.users
            .update_one(
                doc! { "_id": actor },
                doc! {
                    "$addToSet": { "blocked_users": target },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
            )
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Idempotent set-remove; pulling an absent id is still success.
    pub async fn remove_blocked(&self, actor: &ObjectId, target: &ObjectId) -> Result<()> {
        self.users
            .update_one(
                doc! { "_id": actor },
                doc! {
                    "$pull": { "blocked_users": target },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
            )
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Runs an aggregation pipeline server-side and collects the results.
    pub async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        let mut cursor = self
            .users
            .aggregate(pipeline)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut results = Vec::new();

        while cursor
            .advance()
            .await
            .map_err(|e| Error::Database(e.to_string()))?
        {
            let doc = cursor
                .deserialize_current()
                .map_err(|e| Error::Database(e.to_string()))?;
            results.push(normalize_document_dates(doc));
        }

        Ok(results)
    }
}

// Convert BSON dates to ISO strings on the way out (recursive)
pub(crate) fn normalize_document_dates(doc: Document) -> Document {
    fn normalize_bson(value: Bson) -> Bson {
        match value {
            Bson::DateTime(dt) => {
                Bson::String(chrono::DateTime::<Utc>::from(dt.to_system_time()).to_rfc3339())
            }
            Bson::Document(d) => {
                let mut new_doc = Document::new();
                for (k, v) in d.into_iter() {
                    new_doc.insert(k, normalize_bson(v));
                }
                Bson::Document(new_doc)
            }
            Bson::Array(arr) => Bson::Array(arr.into_iter().map(normalize_bson).collect()),
            other => other,
        }
    }

    let mut new = Document::new();
    for (k, v) in doc.into_iter() {
        new.insert(k, normalize_bson(v));
    }
    new
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dates_recursively_and_keeps_ids() {
        let id = ObjectId::new();
        let dt = bson::DateTime::from_millis(0);
        let doc = doc! {
            "_id": id,
            "birthdate": dt,
            "nested": { "created_at": dt },
            "history": [ dt ],
            "blocked_users": [ id ],
        };

        let out = normalize_document_dates(doc);

        assert_eq!(
            out.get_str("birthdate").unwrap(),
            "1970-01-01T00:00:00+00:00"
        );
        assert_eq!(
            out.get_document("nested").unwrap().get_str("created_at").unwrap(),
            "1970-01-01T00:00:00+00:00"
        );
        assert_eq!(out.get_object_id("_id").unwrap(), id);
        assert_eq!(
            out.get_array("blocked_users").unwrap()[0],
            Bson::ObjectId(id)
        );
    }
}
