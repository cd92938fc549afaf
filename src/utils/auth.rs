use crate::services::token_service::TokenSigner;
use crate::Error;
use mongodb::bson::oid::ObjectId;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

/// Caller identity resolved from the `Authorization: Bearer` header.
/// Routes taking this guard only ever act on this id, never on an id
/// supplied in the request body.
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
}

fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(header) = req.headers().get_one("Authorization") else {
            return Outcome::Error((
                Status::Unauthorized,
                Error::Unauthorized("missing Authorization header".to_string()),
            ));
        };

        let Some(token) = parse_bearer(header) else {
            return Outcome::Error((
                Status::Unauthorized,
                Error::Unauthorized("expected a Bearer token".to_string()),
            ));
        };

        let Some(signer) = req.rocket().state::<TokenSigner>() else {
            return Outcome::Error((
                Status::InternalServerError,
                Error::Internal("token signer not configured".to_string()),
            ));
        };

        let claims = match signer.verify(token) {
            Ok(claims) => claims,
            Err(e) => return Outcome::Error((Status::Forbidden, e.into())),
        };

        match ObjectId::parse_str(&claims.sub) {
            Ok(user_id) => Outcome::Success(AuthenticatedUser { user_id }),
            Err(_) => Outcome::Error((
                Status::Forbidden,
                Error::Forbidden("token subject is not a valid user id".to_string()),
            )),
        }
    }
}
