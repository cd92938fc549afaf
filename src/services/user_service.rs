use crate::models::user::{parse_birthdate, User};
use crate::services::db_service::{normalize_document_dates, UserStore};
use crate::services::token_service::TokenSigner;
use crate::utils::cache::{self, PROFILE_CACHE};
use crate::{Error, Result};
use log::info;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub name: String,
    pub surname: String,
    pub birthdate: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birthdate: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub username: String,
    pub token: String,
}

/// Account lifecycle facade: sign-up/sign-in, profile reads (cached),
/// profile updates and soft deletion. Block/unblock and search live in
/// their own services.
pub struct UserService {
    store: UserStore,
    signer: TokenSigner,
}

impl UserService {
    pub fn new(store: UserStore, signer: TokenSigner) -> Self {
        Self { store, signer }
    }

    /// Creates an account and issues a token for it. The username must
    /// not collide with a non-deleted user; a soft-deleted user's
    /// username is free for reuse.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<AuthResponse> {
        let birthdate = parse_birthdate(&request.birthdate)?;

        if self
            .store
            .find_by_username(&request.username, true)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(
                "user with that username already exists".to_string(),
            ));
        }

        let user = User::new(request.username, request.name, request.surname, birthdate);
        let id = self.store.insert(&user).await?;
        let token = self.signer.issue(&id.to_hex())?;

        info!("signed up user '{}' ({})", user.username, id.to_hex());

        Ok(AuthResponse {
            user_id: id.to_hex(),
            username: user.username,
            token,
        })
    }

    /// Username-only authentication: the delivered design carries no
    /// password or credential check.
    pub async fn sign_in(&self, request: SignInRequest) -> Result<AuthResponse> {
        let user = self
            .store
            .find_by_username(&request.username, true)
            .await?
            .ok_or_else(|| Error::Forbidden("no user with that username exists".to_string()))?;

        let id = user
            .get_object_id("_id")
            .map_err(|e| Error::Internal(e.to_string()))?;
        let token = self.signer.issue(&id.to_hex())?;

        Ok(AuthResponse {
            user_id: id.to_hex(),
            username: request.username,
            token,
        })
    }

    /// Single-profile lookup; no blocking logic applies here, only the
    /// plural search filters by block list. Cached by username.
    pub async fn get_profile(&self, username: &str) -> Result<serde_json::Value> {
        if let Some(cached) = cache::get(&PROFILE_CACHE, &username.to_string()).await {
            let value = serde_json::from_str(&cached).map_err(|e| Error::Internal(e.to_string()))?;
            return Ok(value);
        }

        let user = self
            .store
            .find_by_username(username, true)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        let value =
            serde_json::to_value(&user).map_err(|e| Error::Internal(e.to_string()))?;
        cache::put(&PROFILE_CACHE, username.to_string(), value.to_string()).await;

        Ok(value)
    }

    /// Merges the provided fields into the caller's own document and
    /// stamps `updated_at`. The target is always the authenticated
    /// caller, never an id from the request body.
    pub async fn update_profile(
        &self,
        actor: &ObjectId,
        update: ProfileUpdate,
    ) -> Result<Document> {
        let mut changes = Document::new();
        if let Some(username) = update.username {
            changes.insert("username", username);
        }
        if let Some(name) = update.name {
            changes.insert("name", name);
        }
        if let Some(surname) = update.surname {
            changes.insert("surname", surname);
        }
        if let Some(birthdate) = update.birthdate {
            let parsed = parse_birthdate(&birthdate)?;
            changes.insert(
                "birthdate",
                bson::DateTime::from_millis(parsed.timestamp_millis()),
            );
        }
        changes.insert("updated_at", bson::DateTime::now());

        // Single round trip; the pre-image supplies the old username
        // for cache invalidation
        let before = self
            .store
            .find_and_update_by_id(actor, changes.clone(), ReturnDocument::Before)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        let old_username = before.get_str("username").unwrap_or_default().to_string();

        let updated = apply_changes(before, changes);

        cache::remove(&PROFILE_CACHE, &old_username).await;
        if let Ok(new_username) = updated.get_str("username") {
            if new_username != old_username {
                cache::remove(&PROFILE_CACHE, &new_username.to_string()).await;
            }
        }

        Ok(updated)
    }

    /// Marks the caller's account deleted. Terminal and idempotent:
    /// re-deleting an already-deleted account is not an error, and
    /// nothing in this service reverses the flag.
    pub async fn soft_delete(&self, actor: &ObjectId) -> Result<Document> {
        let updated = self
            .store
            .find_and_update_by_id(
                actor,
                doc! { "is_deleted": true, "updated_at": bson::DateTime::now() },
                ReturnDocument::After,
            )
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        if let Ok(username) = updated.get_str("username") {
            cache::remove(&PROFILE_CACHE, &username.to_string()).await;
        }

        info!("soft-deleted user {}", actor.to_hex());

        Ok(updated)
    }
}

/// Overlays the applied `$set` fields onto the pre-image, yielding the
/// post-update view without a second read.
fn apply_changes(before: Document, changes: Document) -> Document {
    let mut updated = before;
    for (key, value) in normalize_document_dates(changes) {
        updated.insert(key, value);
    }
    updated
}
