use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Directory entry. Accounts are never physically removed; `is_deleted`
/// marks them inactive and frees the username for reuse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub username: String,
    pub name: String,
    pub surname: String,
    pub birthdate: bson::DateTime,
    pub is_deleted: bool,
    /// One-directional block list: ids this user has blocked.
    #[serde(default)]
    pub blocked_users: Vec<ObjectId>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl User {
    pub fn new(username: String, name: String, surname: String, birthdate: DateTime<Utc>) -> Self {
        let now = bson::DateTime::now();

        Self {
            id: None,
            username,
            name,
            surname,
            birthdate: bson::DateTime::from_millis(birthdate.timestamp_millis()),
            is_deleted: false,
            blocked_users: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Accepts RFC3339 timestamps or plain `YYYY-MM-DD` dates.
pub fn parse_birthdate(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            Error::BadRequest(format!(
                "invalid birthdate '{}', expected YYYY-MM-DD or RFC3339",
                raw
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn parses_plain_date_and_rfc3339() {
        let plain = parse_birthdate("1990-06-15").unwrap();
        assert_eq!(plain.to_rfc3339(), "1990-06-15T00:00:00+00:00");

        let full = parse_birthdate("1990-06-15T12:30:00+02:00").unwrap();
        assert_eq!(full.timestamp(), plain.timestamp() + 12 * 3600 + 30 * 60 - 2 * 3600);
    }

    #[test]
    fn rejects_malformed_birthdate() {
        assert!(matches!(
            parse_birthdate("15/06/1990"),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(parse_birthdate(""), Err(Error::BadRequest(_))));
    }

    #[test]
    fn new_user_starts_active_with_empty_block_list() {
        let user = User::new(
            "anna".into(),
            "Anna".into(),
            "Smith".into(),
            parse_birthdate("1995-01-01").unwrap(),
        );

        assert!(user.id.is_none());
        assert!(!user.is_deleted);
        assert!(user.blocked_users.is_empty());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn bson_round_trip_preserves_fields() {
        let user = User::new(
            "stefan".into(),
            "Stefan".into(),
            "Novak".into(),
            parse_birthdate("1988-12-01").unwrap(),
        );

        let doc = bson::to_document(&user).unwrap();
        // Unset id must not be serialized, the store assigns it
        assert!(!doc.contains_key("_id"));

        let back: User = bson::from_document(doc).unwrap();
        assert_eq!(back.username, "stefan");
        assert_eq!(back.birthdate, user.birthdate);
    }

    #[test]
    fn blocked_users_defaults_to_empty_when_absent() {
        let doc = doc! {
            "username": "anna",
            "name": "Anna",
            "surname": "Smith",
            "birthdate": bson::DateTime::now(),
            "is_deleted": false,
            "created_at": bson::DateTime::now(),
            "updated_at": bson::DateTime::now(),
        };

        let user: User = bson::from_document(doc).unwrap();
        assert!(user.blocked_users.is_empty());
    }
}
