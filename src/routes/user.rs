use crate::services::relationship_service::RelationshipService;
use crate::services::search_service::{SearchFilter, SearchService};
use crate::services::user_service::{
    AuthResponse, ProfileUpdate, SignInRequest, SignUpRequest, UserService,
};
use crate::utils::auth::AuthenticatedUser;
use crate::utils::response::ApiResponse;
use crate::{Error, Result};
use rocket::serde::json::Json;
use rocket::{delete, get, patch, post, routes, Route, State};
use serde::Deserialize;

#[post("/sign_up", data = "<request>")]
async fn sign_up(
    request: Json<SignUpRequest>,
    users: &State<UserService>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    let session = users.sign_up(request.into_inner()).await?;
    Ok(ApiResponse::success(session, "user created"))
}

#[post("/sign_in", data = "<request>")]
async fn sign_in(
    request: Json<SignInRequest>,
    users: &State<UserService>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    let session = users.sign_in(request.into_inner()).await?;
    Ok(ApiResponse::success(session, "signed in"))
}

// Single-profile lookup; unauthenticated and served from the profile
// cache when possible
#[get("/?<username>")]
async fn profile(
    username: Option<&str>,
    users: &State<UserService>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let username =
        username.ok_or_else(|| Error::BadRequest("username is required".to_string()))?;

    let user = users.get_profile(username).await?;
    Ok(ApiResponse::success(user, "User found"))
}

#[get("/search?<username>&<min_age>&<max_age>")]
async fn search(
    username: Option<String>,
    min_age: Option<i64>,
    max_age: Option<i64>,
    auth: AuthenticatedUser,
    searches: &State<SearchService>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let users = searches
        .search(
            &auth.user_id,
            SearchFilter {
                username,
                min_age,
                max_age,
            },
        )
        .await?;

    Ok(ApiResponse::success(
        serde_json::json!({ "users": users }),
        "search results",
    ))
}

#[patch("/update", data = "<request>")]
async fn update_profile(
    request: Json<ProfileUpdate>,
    auth: AuthenticatedUser,
    users: &State<UserService>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let updated = users
        .update_profile(&auth.user_id, request.into_inner())
        .await?;

    Ok(ApiResponse::success(
        serde_json::to_value(&updated).map_err(|e| Error::Internal(e.to_string()))?,
        "user updated",
    ))
}

#[delete("/delete")]
async fn delete_account(
    auth: AuthenticatedUser,
    users: &State<UserService>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let updated = users.soft_delete(&auth.user_id).await?;

    Ok(ApiResponse::success(
        serde_json::to_value(&updated).map_err(|e| Error::Internal(e.to_string()))?,
        "user deleted",
    ))
}

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub user_id: String,
}

#[patch("/block", data = "<request>")]
async fn block_user(
    request: Json<BlockRequest>,
    auth: AuthenticatedUser,
    relationships: &State<RelationshipService>,
) -> Result<Json<ApiResponse<()>>> {
    relationships.block(&auth.user_id, &request.user_id).await?;
    Ok(ApiResponse::message(&format!(
        "user {} blocked",
        request.user_id
    )))
}

#[patch("/unblock", data = "<request>")]
async fn unblock_user(
    request: Json<BlockRequest>,
    auth: AuthenticatedUser,
    relationships: &State<RelationshipService>,
) -> Result<Json<ApiResponse<()>>> {
    relationships
        .unblock(&auth.user_id, &request.user_id)
        .await?;
    Ok(ApiResponse::message(&format!(
        "user {} unblocked",
        request.user_id
    )))
}

pub fn routes() -> Vec<Route> {
    routes![
        sign_up,
        sign_in,
        profile,
        search,
        update_profile,
        delete_account,
        block_user,
        unblock_user,
    ]
}
