mod error;
mod ingredients;
mod recipes;
mod users;

pub use error::CatalogError;

use crate::storage::traits::{Recipe, RecipeIngredientDetail};
use crate::storage::Storage;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 1-based pagination window shared by the list queries.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    pub fn new(number: u32, size: u32) -> Result<Self, CatalogError> {
        if number == 0 || size == 0 {
            return Err(CatalogError::InvalidPage);
        }
        Ok(Self { number, size })
    }

    pub fn limit(&self) -> u32 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        (self.number as u64 - 1) * self.size as u64
    }
}

#[derive(Clone, Debug)]
pub struct IngredientInput {
    pub name: String,
    pub description: String,
    pub unit: String,
}

#[derive(Clone, Debug)]
pub struct RecipeIngredientInput {
    pub ingredient_id: i64,
    pub quantity: f64,
    pub notes: String,
}

#[derive(Clone, Debug)]
pub struct RecipeInput {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub cooking_time_minutes: u32,
    pub ingredients: Vec<RecipeIngredientInput>,
}

/// A recipe together with its resolved join rows.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredientDetail>,
}

impl RecipeDetail {
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }
}

/// Validation and transaction layer over a [`Storage`] backend. Queries go
/// through autocommit reads; every mutation runs inside a single write
/// transaction so uniqueness checks and multi-row changes are atomic.
#[derive(Clone)]
pub struct Catalog<S> {
    storage: S,
}

impl<S: Storage> Catalog<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }
}
