use rocket::serde::{json::Json, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub code: String,
    pub message: String,
    pub status: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: &str) -> Json<Self> {
        Json(Self {
            code: "200".to_string(),
            message: message.to_string(),
            status: "success".to_string(),
            data: Some(data),
        })
    }
}

// Confirmation-only responses (block/unblock, delete acknowledgements)
impl ApiResponse<()> {
    pub fn message(message: &str) -> Json<Self> {
        Json(Self {
            code: "200".to_string(),
            message: message.to_string(),
            status: "success".to_string(),
            data: None,
        })
    }
}
