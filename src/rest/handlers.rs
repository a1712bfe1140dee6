use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::auth;
use crate::catalog::{CatalogError, IngredientInput, Page, RecipeIngredientInput, RecipeInput};
use crate::storage::Storage;

use super::{
    models::{
        AccessTokenResponse, BulkRecipeIngredientsRequest, CreateRecipeRequest, ErrorResponse,
        HealthResponse, IngredientRequest, IngredientResponse, IngredientsResponse, ListQuery,
        RecipeIngredientItem, RecipeResponse, RecipesResponse, TokenRefreshRequest, TokenRequest,
    },
    AppState,
};

fn error_body(status: StatusCode, message: impl Into<String>, code: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

fn catalog_error(err: CatalogError) -> Response {
    let status = match &err {
        CatalogError::NotFound(_) | CatalogError::RecipeIngredientNotFound => StatusCode::NOT_FOUND,
        CatalogError::DuplicateName { .. } | CatalogError::DuplicateRecipeIngredient => {
            StatusCode::CONFLICT
        }
        CatalogError::Storage(inner) => {
            log::error!("storage error: {:?}", inner);
            return error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
                err.code(),
            );
        }
        _ => StatusCode::BAD_REQUEST,
    };
    let code = err.code();
    error_body(status, err.to_string(), code)
}

fn parse_page(query: &ListQuery) -> Result<Page, CatalogError> {
    Page::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(crate::catalog::DEFAULT_PAGE_SIZE),
    )
}

pub async fn health<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            uptime_secs,
        }),
    )
}

pub async fn obtain_token<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Json(req): Json<TokenRequest>,
) -> impl IntoResponse {
    let user = match state.catalog.user(&req.username) {
        Ok(user) => user,
        Err(err) => return catalog_error(err),
    };

    let user = match user {
        Some(user) if auth::verify_password(&req.password, &user.password_hash) => user,
        _ => {
            log::warn!("failed login for {}", req.username);
            return error_body(
                StatusCode::UNAUTHORIZED,
                "invalid username or password",
                "INVALID_CREDENTIALS",
            );
        }
    };

    // the claim carries the stored canonical username
    match state.auth.issue_pair(&user.username) {
        Ok(pair) => Json(pair).into_response(),
        Err(err) => {
            log::error!("failed to issue token pair: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn refresh_token<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Json(req): Json<TokenRefreshRequest>,
) -> impl IntoResponse {
    match state.auth.refresh_access(&req.refresh) {
        Ok(access) => Json(AccessTokenResponse { access }).into_response(),
        Err(err) => {
            log::warn!("refresh rejected: {}", err);
            error_body(
                StatusCode::UNAUTHORIZED,
                "invalid refresh token",
                "INVALID_TOKEN",
            )
        }
    }
}

pub async fn get_ingredient<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.catalog.ingredient(id) {
        Ok(Some(ingredient)) => Json(IngredientResponse::from(ingredient)).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, "ingredient not found", "NOT_FOUND"),
        Err(err) => catalog_error(err),
    }
}

pub async fn list_ingredients<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let page = match parse_page(&query) {
        Ok(page) => page,
        Err(err) => return catalog_error(err),
    };
    match state.catalog.ingredients(page, query.search.as_deref()) {
        Ok(ingredients) => Json(IngredientsResponse {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
        })
        .into_response(),
        Err(err) => catalog_error(err),
    }
}

pub async fn create_ingredient<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Json(req): Json<IngredientRequest>,
) -> impl IntoResponse {
    match state.catalog.create_ingredient(IngredientInput {
        name: req.name,
        description: req.description,
        unit: req.unit,
    }) {
        Ok(ingredient) => (
            StatusCode::CREATED,
            Json(IngredientResponse::from(ingredient)),
        )
            .into_response(),
        Err(err) => catalog_error(err),
    }
}

pub async fn update_ingredient<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(req): Json<IngredientRequest>,
) -> impl IntoResponse {
    match state.catalog.update_ingredient(
        id,
        IngredientInput {
            name: req.name,
            description: req.description,
            unit: req.unit,
        },
    ) {
        Ok(ingredient) => Json(IngredientResponse::from(ingredient)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub async fn delete_ingredient<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.catalog.delete_ingredient(id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => catalog_error(err),
    }
}

pub async fn get_recipe<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.catalog.recipe(id) {
        Ok(Some(detail)) => Json(RecipeResponse::from(detail)).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, "recipe not found", "NOT_FOUND"),
        Err(err) => catalog_error(err),
    }
}

pub async fn list_recipes<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let page = match parse_page(&query) {
        Ok(page) => page,
        Err(err) => return catalog_error(err),
    };
    match state.catalog.recipes(page, query.search.as_deref()) {
        Ok(recipes) => Json(RecipesResponse {
            recipes: recipes.into_iter().map(Into::into).collect(),
        })
        .into_response(),
        Err(err) => catalog_error(err),
    }
}

fn recipe_input_from(req: CreateRecipeRequest) -> RecipeInput {
    RecipeInput {
        name: req.name,
        description: req.description,
        instructions: req.instructions,
        cooking_time_minutes: req.cooking_time_minutes,
        ingredients: req.ingredients.into_iter().map(recipe_item_from).collect(),
    }
}

fn recipe_item_from(item: RecipeIngredientItem) -> RecipeIngredientInput {
    RecipeIngredientInput {
        ingredient_id: item.ingredient_id,
        quantity: item.quantity,
        notes: item.notes,
    }
}

pub async fn create_recipe<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Json(req): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    match state.catalog.create_recipe(recipe_input_from(req)) {
        Ok(detail) => (StatusCode::CREATED, Json(RecipeResponse::from(detail))).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub async fn delete_recipe<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.catalog.delete_recipe(id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => catalog_error(err),
    }
}

pub async fn add_recipe_ingredient<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(item): Json<RecipeIngredientItem>,
) -> impl IntoResponse {
    match state
        .catalog
        .add_ingredient_to_recipe(id, item.ingredient_id, item.quantity, &item.notes)
    {
        Ok(detail) => (StatusCode::CREATED, Json(RecipeResponse::from(detail))).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub async fn remove_recipe_ingredient<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path((id, ingredient_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    match state
        .catalog
        .remove_ingredient_from_recipe(id, ingredient_id)
    {
        Ok(detail) => Json(RecipeResponse::from(detail)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub async fn bulk_update_recipe_ingredients<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(req): Json<BulkRecipeIngredientsRequest>,
) -> impl IntoResponse {
    let items: Vec<_> = req.ingredients.into_iter().map(recipe_item_from).collect();
    match state.catalog.bulk_update_recipe_ingredients(id, &items) {
        Ok(detail) => Json(RecipeResponse::from(detail)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub async fn not_found() -> impl IntoResponse {
    error_body(StatusCode::NOT_FOUND, "endpoint not found", "NOT_FOUND")
}
