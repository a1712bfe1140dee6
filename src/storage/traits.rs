use anyhow::Result;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub cooking_time_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One join row between a recipe and an ingredient.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub quantity: f64,
    pub notes: String,
}

/// Join row with its ingredient resolved, as served by the recipe queries.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeIngredientDetail {
    pub id: i64,
    pub quantity: f64,
    pub notes: String,
    pub ingredient: Ingredient,
}

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub trait StorageTx {
    fn commit(self) -> Result<()>;
}

pub trait CatalogRead {
    fn load_ingredient(&self, id: i64) -> Result<Option<Ingredient>>;
    /// Ordered by name; `search` is a case-insensitive substring match.
    fn list_ingredients(
        &self,
        search: Option<&str>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Ingredient>>;
    /// Case-insensitive name lookup, used for duplicate checks.
    fn ingredient_id_by_name(&self, name: &str) -> Result<Option<i64>>;

    fn load_recipe(&self, id: i64) -> Result<Option<Recipe>>;
    /// Ordered newest first; `search` is a case-insensitive substring match.
    fn list_recipes(&self, search: Option<&str>, limit: u32, offset: u64) -> Result<Vec<Recipe>>;
    fn recipe_id_by_name(&self, name: &str) -> Result<Option<i64>>;

    fn list_recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredientDetail>>;
    fn load_recipe_ingredient(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> Result<Option<RecipeIngredient>>;

    fn load_user(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
}

pub trait CatalogWrite {
    fn insert_ingredient(
        &self,
        name: &str,
        description: &str,
        unit: &str,
        now: DateTime<Utc>,
    ) -> Result<i64>;
    fn update_ingredient(
        &self,
        id: i64,
        name: &str,
        description: &str,
        unit: &str,
        now: DateTime<Utc>,
    ) -> Result<usize>;
    fn delete_ingredient(&self, id: i64) -> Result<usize>;

    fn insert_recipe(
        &self,
        name: &str,
        description: &str,
        instructions: &str,
        cooking_time_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<i64>;
    fn delete_recipe(&self, id: i64) -> Result<usize>;

    fn insert_recipe_ingredient(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
        quantity: f64,
        notes: &str,
    ) -> Result<i64>;
    /// Insert the pair or update quantity/notes if it already exists.
    fn upsert_recipe_ingredient(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
        quantity: f64,
        notes: &str,
    ) -> Result<()>;
    fn delete_recipe_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> Result<usize>;

    fn insert_user(&self, username: &str, password_hash: &str, now: DateTime<Utc>) -> Result<i64>;
}

pub trait Storage: CatalogRead {
    type Tx: CatalogRead + CatalogWrite + StorageTx;

    /// Begin a write transaction. Dropping it without committing rolls
    /// every change back.
    fn begin_tx(&self) -> Result<Self::Tx>;
}
