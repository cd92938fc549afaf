use crate::utils::response::ApiResponse;
use rocket::serde::json::Json;
use rocket::{get, routes, Route};

#[get("/")]
fn index() -> Json<ApiResponse<serde_json::Value>> {
    ApiResponse::success(
        serde_json::json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
        "ok",
    )
}

pub fn routes() -> Vec<Route> {
    routes![index]
}

#[cfg(test)]
mod tests {
    use rocket::http::Status;
    use rocket::local::blocking::Client;

    #[test]
    fn health_endpoint_reports_service_name() {
        let rocket = rocket::build().mount("/", super::routes());
        let client = Client::tracked(rocket).unwrap();

        let response = client.get("/").dispatch();
        assert_eq!(response.status(), Status::Ok);

        let body: serde_json::Value = response.into_json().unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["service"], env!("CARGO_PKG_NAME"));
    }
}
