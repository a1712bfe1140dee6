use anyhow::anyhow;
use chrono::Utc;

use crate::storage::traits::Ingredient;
use crate::storage::{CatalogRead, CatalogWrite, Storage, StorageTx};

use super::{Catalog, CatalogError, IngredientInput, Page};

impl<S: Storage> Catalog<S> {
    pub fn ingredient(&self, id: i64) -> Result<Option<Ingredient>, CatalogError> {
        Ok(self.storage().load_ingredient(id)?)
    }

    pub fn ingredients(
        &self,
        page: Page,
        search: Option<&str>,
    ) -> Result<Vec<Ingredient>, CatalogError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self
            .storage()
            .list_ingredients(search, page.limit(), page.offset())?)
    }

    pub fn create_ingredient(&self, input: IngredientInput) -> Result<Ingredient, CatalogError> {
        let name = input.name.trim();
        let description = input.description.trim();
        let unit = input.unit.trim().to_lowercase();

        if name.is_empty() || unit.is_empty() {
            return Err(CatalogError::EmptyField);
        }

        let tx = self.storage().begin_tx()?;
        if tx.ingredient_id_by_name(name)?.is_some() {
            return Err(CatalogError::DuplicateName {
                entity: "ingredient",
                name: name.to_string(),
            });
        }

        let id = tx.insert_ingredient(name, description, &unit, Utc::now())?;
        let ingredient = tx
            .load_ingredient(id)?
            .ok_or_else(|| anyhow!("ingredient {id} vanished after insert"))?;
        tx.commit()?;

        log::info!("created ingredient {} ({})", ingredient.name, ingredient.id);
        Ok(ingredient)
    }

    pub fn update_ingredient(
        &self,
        id: i64,
        input: IngredientInput,
    ) -> Result<Ingredient, CatalogError> {
        let name = input.name.trim();
        let description = input.description.trim();
        let unit = input.unit.trim().to_lowercase();

        let tx = self.storage().begin_tx()?;
        if tx.load_ingredient(id)?.is_none() {
            return Err(CatalogError::NotFound("ingredient"));
        }
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        // duplicate check must not trip over the row being updated
        if matches!(tx.ingredient_id_by_name(name)?, Some(other) if other != id) {
            return Err(CatalogError::DuplicateName {
                entity: "ingredient",
                name: name.to_string(),
            });
        }

        tx.update_ingredient(id, name, description, &unit, Utc::now())?;
        let ingredient = tx
            .load_ingredient(id)?
            .ok_or_else(|| anyhow!("ingredient {id} vanished after update"))?;
        tx.commit()?;
        Ok(ingredient)
    }

    /// Deletes the ingredient and, via the cascade, every join row that
    /// referenced it. Returns the deleted record.
    pub fn delete_ingredient(&self, id: i64) -> Result<Ingredient, CatalogError> {
        let tx = self.storage().begin_tx()?;
        let ingredient = tx
            .load_ingredient(id)?
            .ok_or(CatalogError::NotFound("ingredient"))?;
        tx.delete_ingredient(id)?;
        tx.commit()?;

        log::info!("deleted ingredient {} ({})", ingredient.name, ingredient.id);
        Ok(ingredient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use tempfile::TempDir;

    fn catalog() -> (TempDir, Catalog<SqliteStorage>) {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("cookbook.sqlite"));
        storage.init().unwrap();
        (dir, Catalog::new(storage))
    }

    fn input(name: &str, unit: &str) -> IngredientInput {
        IngredientInput {
            name: name.to_string(),
            description: String::new(),
            unit: unit.to_string(),
        }
    }

    #[test]
    fn create_trims_fields_and_lowercases_unit() {
        let (_dir, catalog) = catalog();
        let ingredient = catalog
            .create_ingredient(IngredientInput {
                name: "  Flour  ".to_string(),
                description: " plain white ".to_string(),
                unit: " Grams ".to_string(),
            })
            .unwrap();
        assert_eq!(ingredient.name, "Flour");
        assert_eq!(ingredient.description, "plain white");
        assert_eq!(ingredient.unit, "grams");
    }

    #[test]
    fn create_rejects_empty_name_or_unit() {
        let (_dir, catalog) = catalog();
        let err = catalog.create_ingredient(input("   ", "grams")).unwrap_err();
        assert_eq!(err.code(), "EMPTY_FIELD");
        let err = catalog.create_ingredient(input("Flour", "  ")).unwrap_err();
        assert_eq!(err.code(), "EMPTY_FIELD");
    }

    #[test]
    fn create_rejects_case_insensitive_duplicate() {
        let (_dir, catalog) = catalog();
        catalog.create_ingredient(input("Sugar", "grams")).unwrap();
        let err = catalog.create_ingredient(input("SUGAR", "cups")).unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_NAME");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let (_dir, catalog) = catalog();
        let err = catalog.update_ingredient(42, input("Salt", "grams")).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn update_rejects_empty_name() {
        let (_dir, catalog) = catalog();
        let ing = catalog.create_ingredient(input("Salt", "grams")).unwrap();
        let err = catalog.update_ingredient(ing.id, input("  ", "grams")).unwrap_err();
        assert_eq!(err.code(), "EMPTY_NAME");
    }

    #[test]
    fn update_duplicate_check_skips_own_row() {
        let (_dir, catalog) = catalog();
        let ing = catalog.create_ingredient(input("Salt", "grams")).unwrap();
        catalog.create_ingredient(input("Pepper", "grams")).unwrap();

        // renaming to itself (different case) is allowed
        let renamed = catalog.update_ingredient(ing.id, input("SALT", "grams")).unwrap();
        assert_eq!(renamed.name, "SALT");

        // renaming onto another ingredient is not
        let err = catalog
            .update_ingredient(ing.id, input("pepper", "grams"))
            .unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_NAME");
    }

    #[test]
    fn update_bumps_updated_at() {
        let (_dir, catalog) = catalog();
        let ing = catalog.create_ingredient(input("Salt", "grams")).unwrap();
        let updated = catalog
            .update_ingredient(ing.id, input("Sea Salt", "grams"))
            .unwrap();
        assert_eq!(updated.name, "Sea Salt");
        assert_eq!(updated.created_at, ing.created_at);
        assert!(updated.updated_at >= ing.updated_at);
    }

    #[test]
    fn delete_returns_record_and_missing_is_not_found() {
        let (_dir, catalog) = catalog();
        let ing = catalog.create_ingredient(input("Salt", "grams")).unwrap();
        let deleted = catalog.delete_ingredient(ing.id).unwrap();
        assert_eq!(deleted.id, ing.id);

        let err = catalog.delete_ingredient(ing.id).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn list_paginates_and_searches() {
        let (_dir, catalog) = catalog();
        for name in ["Anise", "Basil", "Bay Leaf", "Cumin"] {
            catalog.create_ingredient(input(name, "grams")).unwrap();
        }

        let page = catalog.ingredients(Page::new(1, 3).unwrap(), None).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].name, "Anise");

        let past_end = catalog.ingredients(Page::new(5, 3).unwrap(), None).unwrap();
        assert!(past_end.is_empty());

        let hits = catalog
            .ingredients(Page::default(), Some("ba"))
            .unwrap();
        assert_eq!(
            hits.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["Basil", "Bay Leaf"]
        );
    }

    #[test]
    fn page_rejects_zero() {
        assert!(matches!(Page::new(0, 10), Err(CatalogError::InvalidPage)));
        assert!(matches!(Page::new(1, 0), Err(CatalogError::InvalidPage)));
    }
}
