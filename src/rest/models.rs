use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::RecipeDetail;
use crate::storage::traits::{Ingredient, RecipeIngredientDetail};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientsResponse {
    pub ingredients: Vec<IngredientResponse>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub quantity: f64,
    pub notes: String,
    pub ingredient: IngredientResponse,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub cooking_time_minutes: u32,
    pub ingredient_count: usize,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipesResponse {
    pub recipes: Vec<RecipeResponse>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub unit: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredientItem {
    pub ingredient_id: i64,
    pub quantity: f64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    pub cooking_time_minutes: u32,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredientItem>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRecipeIngredientsRequest {
    pub ingredients: Vec<RecipeIngredientItem>,
}

#[derive(Serialize, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

#[derive(Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            description: ingredient.description,
            unit: ingredient.unit,
            created_at: ingredient.created_at,
            updated_at: ingredient.updated_at,
        }
    }
}

impl From<RecipeIngredientDetail> for RecipeIngredientResponse {
    fn from(row: RecipeIngredientDetail) -> Self {
        Self {
            id: row.id,
            quantity: row.quantity,
            notes: row.notes,
            ingredient: row.ingredient.into(),
        }
    }
}

impl From<RecipeDetail> for RecipeResponse {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            id: detail.recipe.id,
            name: detail.recipe.name,
            description: detail.recipe.description,
            instructions: detail.recipe.instructions,
            cooking_time_minutes: detail.recipe.cooking_time_minutes,
            ingredient_count: detail.ingredients.len(),
            ingredients: detail.ingredients.into_iter().map(Into::into).collect(),
            created_at: detail.recipe.created_at,
            updated_at: detail.recipe.updated_at,
        }
    }
}
