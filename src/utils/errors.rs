use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use serde_json::json;
use std::fmt;
use std::fmt::Display;
use std::io::Cursor;

#[derive(Debug)]
pub enum Error {
    Database(String),
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database(msg) => write!(f, "Database error: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Error::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Error::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Error::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn status(&self) -> Status {
        match self {
            Error::Database(_) => Status::InternalServerError,
            Error::NotFound(_) => Status::NotFound,
            Error::BadRequest(_) => Status::BadRequest,
            Error::Unauthorized(_) => Status::Unauthorized,
            Error::Forbidden(_) => Status::Forbidden,
            Error::Conflict(_) => Status::Conflict,
            Error::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let code = status.code.to_string();
        let message = self.to_string();

        let body = json!({
            "code": code,
            "message": message,
            "status": "failed",
            "data": null
        });

        Response::build()
            .status(status)
            .header(rocket::http::ContentType::JSON)
            .sized_body(body.to_string().len(), Cursor::new(body.to_string()))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_expected_statuses() {
        assert_eq!(Error::Conflict("x".into()).status(), Status::Conflict);
        assert_eq!(Error::Forbidden("x".into()).status(), Status::Forbidden);
        assert_eq!(Error::NotFound("x".into()).status(), Status::NotFound);
        assert_eq!(Error::BadRequest("x".into()).status(), Status::BadRequest);
        assert_eq!(Error::Unauthorized("x".into()).status(), Status::Unauthorized);
        assert_eq!(
            Error::Database("x".into()).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn display_includes_kind_and_message() {
        let e = Error::Conflict("user with that username already exists".into());
        assert_eq!(
            e.to_string(),
            "Conflict: user with that username already exists"
        );
    }
}
