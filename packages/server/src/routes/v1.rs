use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/paste", paste_routes(config.storage.max_blob_size))
        .nest("/user", user_routes())
}

fn paste_routes(max_blob_size: u64) -> OpenApiRouter<AppState> {
    use crate::handlers::paste::*;

    let save = OpenApiRouter::new()
        .routes(routes!(save_paste))
        .layer(save_body_limit(max_blob_size));

    OpenApiRouter::new()
        .routes(routes!(get_paste))
        .routes(routes!(delete_paste))
        .merge(save)
}

fn user_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::user::*;

    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(validate))
        .routes(routes!(list_pastes))
}
