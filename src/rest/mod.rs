use std::net::SocketAddr;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::auth::{self, AuthState};
use crate::catalog::Catalog;
use crate::storage::Storage;

mod handlers;
mod models;

use handlers::{
    add_recipe_ingredient, bulk_update_recipe_ingredients, create_ingredient, create_recipe,
    delete_ingredient, delete_recipe, get_ingredient, get_recipe, health, list_ingredients,
    list_recipes, not_found, obtain_token, refresh_token, remove_recipe_ingredient,
    update_ingredient,
};

#[derive(Clone)]
pub struct AppState<S: Storage> {
    pub catalog: Catalog<S>,
    pub auth: AuthState,
    pub started_at: std::time::SystemTime,
}

fn catalog_routes<S: Storage + Clone + Send + Sync + 'static>(state: &AppState<S>) -> Router<AppState<S>> {
    Router::new()
        .route(
            "/ingredients",
            get(list_ingredients::<S>).post(create_ingredient::<S>),
        )
        .route(
            "/ingredients/:id",
            get(get_ingredient::<S>)
                .put(update_ingredient::<S>)
                .delete(delete_ingredient::<S>),
        )
        .route("/recipes", get(list_recipes::<S>).post(create_recipe::<S>))
        .route(
            "/recipes/:id",
            get(get_recipe::<S>).delete(delete_recipe::<S>),
        )
        .route(
            "/recipes/:id/ingredients",
            post(add_recipe_ingredient::<S>).put(bulk_update_recipe_ingredients::<S>),
        )
        .route(
            "/recipes/:id/ingredients/:ingredient_id",
            delete(remove_recipe_ingredient::<S>),
        )
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth::require_auth,
        ))
}

pub fn router<S: Storage + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health::<S>))
        .route("/api/token", post(obtain_token::<S>))
        .route("/api/token/refresh", post(refresh_token::<S>))
        .merge(catalog_routes(&state))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve<S: Storage + Clone + Send + Sync + 'static>(
    addr: SocketAddr,
    catalog: Catalog<S>,
    auth: AuthState,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    log::info!("🌐 REST service on http://{}", addr);

    let state = AppState {
        catalog,
        auth,
        started_at: std::time::SystemTime::now(),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 REST shutdown requested");
        })
        .await?;
    log::info!("👋 REST server exited");
    Ok(())
}
