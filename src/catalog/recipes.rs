use anyhow::anyhow;
use chrono::Utc;

use crate::storage::traits::Recipe;
use crate::storage::{CatalogRead, CatalogWrite, Storage, StorageTx};

use super::{Catalog, CatalogError, Page, RecipeDetail, RecipeIngredientInput, RecipeInput};

fn read_recipe_detail<R: CatalogRead>(
    reader: &R,
    id: i64,
) -> Result<Option<RecipeDetail>, CatalogError> {
    let Some(recipe) = reader.load_recipe(id)? else {
        return Ok(None);
    };
    let ingredients = reader.list_recipe_ingredients(id)?;
    Ok(Some(RecipeDetail {
        recipe,
        ingredients,
    }))
}

impl<S: Storage> Catalog<S> {
    pub fn recipe(&self, id: i64) -> Result<Option<RecipeDetail>, CatalogError> {
        read_recipe_detail(self.storage(), id)
    }

    pub fn recipes(
        &self,
        page: Page,
        search: Option<&str>,
    ) -> Result<Vec<RecipeDetail>, CatalogError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let recipes = self
            .storage()
            .list_recipes(search, page.limit(), page.offset())?;
        let mut details = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            let ingredients = self.storage().list_recipe_ingredients(recipe.id)?;
            details.push(RecipeDetail {
                recipe,
                ingredients,
            });
        }
        Ok(details)
    }

    /// Creates the recipe and its initial ingredient list in one
    /// transaction; any unknown ingredient id aborts the whole creation.
    pub fn create_recipe(&self, input: RecipeInput) -> Result<RecipeDetail, CatalogError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let tx = self.storage().begin_tx()?;
        if tx.recipe_id_by_name(name)?.is_some() {
            return Err(CatalogError::DuplicateName {
                entity: "recipe",
                name: name.to_string(),
            });
        }

        let id = tx.insert_recipe(
            name,
            input.description.trim(),
            input.instructions.trim(),
            input.cooking_time_minutes,
            Utc::now(),
        )?;

        for item in &input.ingredients {
            if tx.load_ingredient(item.ingredient_id)?.is_none() {
                return Err(CatalogError::UnknownIngredient(item.ingredient_id));
            }
            if tx.load_recipe_ingredient(id, item.ingredient_id)?.is_some() {
                return Err(CatalogError::DuplicateRecipeIngredient);
            }
            tx.insert_recipe_ingredient(id, item.ingredient_id, item.quantity, item.notes.trim())?;
        }

        let detail = read_recipe_detail(&tx, id)?
            .ok_or_else(|| anyhow!("recipe {id} vanished after insert"))?;
        tx.commit()?;

        log::info!(
            "created recipe {} ({}) with {} ingredients",
            detail.recipe.name,
            detail.recipe.id,
            detail.ingredient_count()
        );
        Ok(detail)
    }

    /// Deletes the recipe; the cascade removes its join rows.
    pub fn delete_recipe(&self, id: i64) -> Result<Recipe, CatalogError> {
        let tx = self.storage().begin_tx()?;
        let recipe = tx.load_recipe(id)?.ok_or(CatalogError::NotFound("recipe"))?;
        tx.delete_recipe(id)?;
        tx.commit()?;

        log::info!("deleted recipe {} ({})", recipe.name, recipe.id);
        Ok(recipe)
    }

    pub fn add_ingredient_to_recipe(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
        quantity: f64,
        notes: &str,
    ) -> Result<RecipeDetail, CatalogError> {
        let tx = self.storage().begin_tx()?;
        if tx.load_recipe(recipe_id)?.is_none() {
            return Err(CatalogError::NotFound("recipe"));
        }
        if tx.load_ingredient(ingredient_id)?.is_none() {
            return Err(CatalogError::NotFound("ingredient"));
        }
        if tx.load_recipe_ingredient(recipe_id, ingredient_id)?.is_some() {
            return Err(CatalogError::DuplicateRecipeIngredient);
        }

        tx.insert_recipe_ingredient(recipe_id, ingredient_id, quantity, notes.trim())?;
        let detail = read_recipe_detail(&tx, recipe_id)?
            .ok_or_else(|| anyhow!("recipe {recipe_id} vanished"))?;
        tx.commit()?;
        Ok(detail)
    }

    pub fn remove_ingredient_from_recipe(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> Result<RecipeDetail, CatalogError> {
        let tx = self.storage().begin_tx()?;
        if tx.load_recipe(recipe_id)?.is_none() {
            return Err(CatalogError::NotFound("recipe"));
        }
        if tx.load_ingredient(ingredient_id)?.is_none() {
            return Err(CatalogError::NotFound("ingredient"));
        }
        if tx.delete_recipe_ingredient(recipe_id, ingredient_id)? == 0 {
            return Err(CatalogError::RecipeIngredientNotFound);
        }

        let detail = read_recipe_detail(&tx, recipe_id)?
            .ok_or_else(|| anyhow!("recipe {recipe_id} vanished"))?;
        tx.commit()?;
        Ok(detail)
    }

    /// Upserts each `(recipe, ingredient)` pair: existing pairs get their
    /// quantity/notes replaced, missing ones are inserted. All-or-nothing.
    pub fn bulk_update_recipe_ingredients(
        &self,
        recipe_id: i64,
        items: &[RecipeIngredientInput],
    ) -> Result<RecipeDetail, CatalogError> {
        let tx = self.storage().begin_tx()?;
        if tx.load_recipe(recipe_id)?.is_none() {
            return Err(CatalogError::NotFound("recipe"));
        }

        for item in items {
            if tx.load_ingredient(item.ingredient_id)?.is_none() {
                return Err(CatalogError::NotFound("ingredient"));
            }
            tx.upsert_recipe_ingredient(
                recipe_id,
                item.ingredient_id,
                item.quantity,
                item.notes.trim(),
            )?;
        }

        let detail = read_recipe_detail(&tx, recipe_id)?
            .ok_or_else(|| anyhow!("recipe {recipe_id} vanished"))?;
        tx.commit()?;
        Ok(detail)
    }
}
