use thiserror::Error;

/// Domain errors for catalog queries and mutations. Each variant carries a
/// stable wire code so clients can branch without parsing messages.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("name and unit cannot be empty")]
    EmptyField,
    #[error("{entity} with name '{name}' already exists")]
    DuplicateName { entity: &'static str, name: String },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("ingredient with id {0} not found")]
    UnknownIngredient(i64),
    #[error("ingredient already exists in recipe")]
    DuplicateRecipeIngredient,
    #[error("ingredient not found in recipe")]
    RecipeIngredientNotFound,
    #[error("page number and page size must be greater than 0")]
    InvalidPage,
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::EmptyName => "EMPTY_NAME",
            CatalogError::EmptyField => "EMPTY_FIELD",
            CatalogError::DuplicateName { .. } => "DUPLICATE_NAME",
            CatalogError::NotFound(_) => "NOT_FOUND",
            CatalogError::UnknownIngredient(_) => "VALIDATION_ERROR",
            CatalogError::DuplicateRecipeIngredient => "DUPLICATE_INGREDIENT",
            CatalogError::RecipeIngredientNotFound => "NOT_FOUND",
            CatalogError::InvalidPage => "INVALID_PAGE",
            CatalogError::Storage(_) => "INTERNAL_ERROR",
        }
    }
}
