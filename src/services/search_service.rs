use crate::services::db_service::UserStore;
use crate::{Error, Result};
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};

/// Fixed 365-day year in milliseconds; the derived age deliberately
/// ignores leap years.
pub const YEAR_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Optional search criteria. `None` means "no bound"; an explicit `0`
/// is a real bound.
#[derive(Debug, Default)]
pub struct SearchFilter {
    pub username: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
}

/// Blocking-aware directory search, executed server-side as an
/// aggregation pipeline: exclude the caller's blocked ids, optional
/// case-insensitive username substring, derive `age` from `birthdate`,
/// optional age bounds. No pagination, natural iteration order.
pub struct SearchService {
    store: UserStore,
}

impl SearchService {
    pub fn new(store: UserStore) -> Self {
        Self { store }
    }

    pub async fn search(&self, actor: &ObjectId, filter: SearchFilter) -> Result<Vec<Document>> {
        let actor_doc = self
            .store
            .find_by_id(actor)
            .await?
            .ok_or_else(|| Error::Forbidden("account no longer exists".to_string()))?;

        let blocked: Vec<ObjectId> = actor_doc
            .get_array("blocked_users")
            .map(|ids| ids.iter().filter_map(|b| b.as_object_id()).collect())
            .unwrap_or_default();

        let pipeline = build_pipeline(&blocked, &filter, bson::DateTime::now());
        self.store.aggregate(pipeline).await
    }
}

fn build_pipeline(
    blocked: &[ObjectId],
    filter: &SearchFilter,
    now: bson::DateTime,
) -> Vec<Document> {
    let mut pipeline = Vec::new();

    // Only the caller's own block list matters here: a user blocked by
    // somebody else remains visible to this caller.
    let blocked: Vec<Bson> = blocked.iter().map(|id| Bson::ObjectId(*id)).collect();
    pipeline.push(doc! {
        "$match": { "_id": { "$nin": blocked } }
    });

    if let Some(username) = &filter.username {
        pipeline.push(doc! {
            "$match": { "username": { "$regex": username, "$options": "i" } }
        });
    }

    // Derived at query time, never persisted
    pipeline.push(doc! {
        "$addFields": {
            "age": {
                "$floor": {
                    "$divide": [
                        { "$subtract": [now, "$birthdate"] },
                        YEAR_MS,
                    ]
                }
            }
        }
    });

    let mut bounds = Document::new();
    if let Some(min) = filter.min_age {
        bounds.insert("$gte", min);
    }
    if let Some(max) = filter.max_age {
        bounds.insert("$lte", max);
    }
    if !bounds.is_empty() {
        pipeline.push(doc! { "$match": { "age": bounds } });
    }

    pipeline
}
