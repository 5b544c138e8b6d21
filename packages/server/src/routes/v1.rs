use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/categories", category_routes())
        .nest("/locations", location_routes())
        .nest("/assets", asset_routes().merge(lifecycle_routes()))
        .nest("/transactions", transaction_routes())
        .nest("/dashboard", dashboard_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::refresh))
        .routes(routes!(handlers::auth::me))
        .routes(routes!(handlers::auth::my_assets))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::user::list_users,
            handlers::user::create_user
        ))
        .routes(routes!(
            handlers::user::get_user,
            handlers::user::update_user,
            handlers::user::delete_user
        ))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::category::list_categories,
            handlers::category::create_category
        ))
        .routes(routes!(
            handlers::category::get_category,
            handlers::category::update_category,
            handlers::category::delete_category
        ))
}

fn location_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::location::list_locations,
            handlers::location::create_location
        ))
        .routes(routes!(
            handlers::location::get_location,
            handlers::location::update_location,
            handlers::location::delete_location
        ))
}

fn asset_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::asset::list_assets,
            handlers::asset::create_asset
        ))
        .routes(routes!(handlers::asset::get_asset_by_tag))
        .routes(routes!(
            handlers::asset::get_asset,
            handlers::asset::update_asset,
            handlers::asset::delete_asset
        ))
        .routes(routes!(handlers::asset::asset_history))
}

fn lifecycle_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::lifecycle::checkout))
        .routes(routes!(handlers::lifecycle::checkin))
        .routes(routes!(handlers::lifecycle::transfer))
        .routes(routes!(handlers::lifecycle::repair))
        .routes(routes!(handlers::lifecycle::repair_complete))
        .routes(routes!(handlers::lifecycle::dispose))
}

fn transaction_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::transaction::list_transactions))
        .routes(routes!(handlers::transaction::get_transaction))
}

fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::dashboard::summary))
}
