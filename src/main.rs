use dotenv::dotenv;
use log::info;
use user_directory_api::config;
use user_directory_api::routes;
use user_directory_api::services::db_service::{self, UserStore};
use user_directory_api::services::relationship_service::RelationshipService;
use user_directory_api::services::search_service::SearchService;
use user_directory_api::services::token_service::TokenSigner;
use user_directory_api::services::user_service::UserService;

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let config = config::settings::load_config();

    let database = match db_service::initialize_db(&config.mongo).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("database initialization failed: {}", e);
            return Err(e.into());
        }
    };

    let store = UserStore::new(&database);
    let signer = TokenSigner::from_config(&config.auth)?;

    let rocket = rocket::build()
        .mount("/", routes::index::routes())
        .mount("/user", routes::user::routes())
        .manage(UserService::new(store.clone(), signer.clone()))
        .manage(RelationshipService::new(store.clone()))
        .manage(SearchService::new(store))
        .manage(signer)
        .manage(config);

    info!(
        "user-directory-api v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    rocket.launch().await?;

    Ok(())
}
