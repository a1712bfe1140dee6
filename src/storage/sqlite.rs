use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension};
use std::path::Path;

use super::traits::{
    CatalogRead, CatalogWrite, Ingredient, Recipe, RecipeIngredient, RecipeIngredientDetail,
    Storage, StorageTx, User,
};

const DB_SCHEMA_VERSION: i64 = 1;

#[derive(Clone)]
pub struct SqliteStorage {
    pub path: String,
}

pub struct SqliteTx {
    conn: Connection,
}

impl StorageTx for SqliteTx {
    fn commit(self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }
}

fn parse_ts(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn map_ingredient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        unit: row.get(3)?,
        created_at: parse_ts(4, row.get(4)?)?,
        updated_at: parse_ts(5, row.get(5)?)?,
    })
}

fn map_recipe_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipe> {
    let cooking_time_int: i64 = row.get(4)?;
    let cooking_time_minutes: u32 = cooking_time_int.try_into().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(err))
    })?;
    Ok(Recipe {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        instructions: row.get(3)?,
        cooking_time_minutes,
        created_at: parse_ts(5, row.get(5)?)?,
        updated_at: parse_ts(6, row.get(6)?)?,
    })
}

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: parse_ts(3, row.get(3)?)?,
    })
}

const INGREDIENT_COLUMNS: &str = "id, name, description, unit, created_at, updated_at";
const RECIPE_COLUMNS: &str =
    "id, name, description, instructions, cooking_time_minutes, created_at, updated_at";

fn db_load_ingredient(conn: &Connection, id: i64) -> rusqlite::Result<Option<Ingredient>> {
    conn.query_row(
        &format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1"),
        params![id],
        map_ingredient_row,
    )
    .optional()
}

// LIKE treats % and _ as wildcards; the search term must stay literal.
fn escape_like(search: Option<&str>) -> Option<String> {
    search.map(|s| {
        s.replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    })
}

fn db_list_ingredients(
    conn: &Connection,
    search: Option<&str>,
    limit: u32,
    offset: u64,
) -> rusqlite::Result<Vec<Ingredient>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {INGREDIENT_COLUMNS}
        FROM ingredients
        WHERE ?1 IS NULL OR name LIKE '%' || ?1 || '%' ESCAPE '\'
        ORDER BY name, id
        LIMIT ?2 OFFSET ?3
        "#
    ))?;
    let rows = stmt
        .query_map(
            params![escape_like(search), limit as i64, offset as i64],
            map_ingredient_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_ingredient_id_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM ingredients WHERE name = ?1 COLLATE NOCASE",
        params![name],
        |row| row.get(0),
    )
    .optional()
}

fn db_load_recipe(conn: &Connection, id: i64) -> rusqlite::Result<Option<Recipe>> {
    conn.query_row(
        &format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?1"),
        params![id],
        map_recipe_row,
    )
    .optional()
}

fn db_list_recipes(
    conn: &Connection,
    search: Option<&str>,
    limit: u32,
    offset: u64,
) -> rusqlite::Result<Vec<Recipe>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {RECIPE_COLUMNS}
        FROM recipes
        WHERE ?1 IS NULL OR name LIKE '%' || ?1 || '%' ESCAPE '\'
        ORDER BY created_at DESC, id DESC
        LIMIT ?2 OFFSET ?3
        "#
    ))?;
    let rows = stmt
        .query_map(
            params![escape_like(search), limit as i64, offset as i64],
            map_recipe_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_recipe_id_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM recipes WHERE name = ?1 COLLATE NOCASE",
        params![name],
        |row| row.get(0),
    )
    .optional()
}

fn db_list_recipe_ingredients(
    conn: &Connection,
    recipe_id: i64,
) -> rusqlite::Result<Vec<RecipeIngredientDetail>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT ri.id, ri.quantity, ri.notes,
               i.id, i.name, i.description, i.unit, i.created_at, i.updated_at
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?1
        ORDER BY ri.id
        "#,
    )?;
    let rows = stmt
        .query_map(params![recipe_id], |row| {
            Ok(RecipeIngredientDetail {
                id: row.get(0)?,
                quantity: row.get(1)?,
                notes: row.get(2)?,
                ingredient: Ingredient {
                    id: row.get(3)?,
                    name: row.get(4)?,
                    description: row.get(5)?,
                    unit: row.get(6)?,
                    created_at: parse_ts(7, row.get(7)?)?,
                    updated_at: parse_ts(8, row.get(8)?)?,
                },
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_load_recipe_ingredient(
    conn: &Connection,
    recipe_id: i64,
    ingredient_id: i64,
) -> rusqlite::Result<Option<RecipeIngredient>> {
    conn.query_row(
        r#"
        SELECT id, recipe_id, ingredient_id, quantity, notes
        FROM recipe_ingredients
        WHERE recipe_id = ?1 AND ingredient_id = ?2
        "#,
        params![recipe_id, ingredient_id],
        |row| {
            Ok(RecipeIngredient {
                id: row.get(0)?,
                recipe_id: row.get(1)?,
                ingredient_id: row.get(2)?,
                quantity: row.get(3)?,
                notes: row.get(4)?,
            })
        },
    )
    .optional()
}

fn db_load_user(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1 COLLATE NOCASE",
        params![username],
        map_user_row,
    )
    .optional()
}

fn db_list_users(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn
        .prepare("SELECT id, username, password_hash, created_at FROM users ORDER BY username")?;
    let rows = stmt
        .query_map([], map_user_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_insert_ingredient(
    conn: &Connection,
    name: &str,
    description: &str,
    unit: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO ingredients (name, description, unit, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
        params![name, description, unit, now.to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn db_update_ingredient(
    conn: &Connection,
    id: i64,
    name: &str,
    description: &str,
    unit: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE ingredients SET name = ?2, description = ?3, unit = ?4, updated_at = ?5 WHERE id = ?1",
        params![id, name, description, unit, now.to_rfc3339()],
    )
}

fn db_delete_ingredient(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM ingredients WHERE id = ?1", params![id])
}

fn db_insert_recipe(
    conn: &Connection,
    name: &str,
    description: &str,
    instructions: &str,
    cooking_time_minutes: u32,
    now: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    conn.execute(
        r#"
        INSERT INTO recipes (name, description, instructions, cooking_time_minutes, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        "#,
        params![
            name,
            description,
            instructions,
            cooking_time_minutes as i64,
            now.to_rfc3339()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn db_delete_recipe(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM recipes WHERE id = ?1", params![id])
}

fn db_insert_recipe_ingredient(
    conn: &Connection,
    recipe_id: i64,
    ingredient_id: i64,
    quantity: f64,
    notes: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, notes) VALUES (?1, ?2, ?3, ?4)",
        params![recipe_id, ingredient_id, quantity, notes],
    )?;
    Ok(conn.last_insert_rowid())
}

fn db_upsert_recipe_ingredient(
    conn: &Connection,
    recipe_id: i64,
    ingredient_id: i64,
    quantity: f64,
    notes: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, notes)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(recipe_id, ingredient_id)
        DO UPDATE SET quantity = excluded.quantity, notes = excluded.notes
        "#,
        params![recipe_id, ingredient_id, quantity, notes],
    )?;
    Ok(())
}

fn db_delete_recipe_ingredient(
    conn: &Connection,
    recipe_id: i64,
    ingredient_id: i64,
) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM recipe_ingredients WHERE recipe_id = ?1 AND ingredient_id = ?2",
        params![recipe_id, ingredient_id],
    )
}

fn db_insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now.to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

impl CatalogRead for SqliteTx {
    fn load_ingredient(&self, id: i64) -> Result<Option<Ingredient>> {
        Ok(db_load_ingredient(&self.conn, id)?)
    }

    fn list_ingredients(
        &self,
        search: Option<&str>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Ingredient>> {
        Ok(db_list_ingredients(&self.conn, search, limit, offset)?)
    }

    fn ingredient_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        Ok(db_ingredient_id_by_name(&self.conn, name)?)
    }

    fn load_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        Ok(db_load_recipe(&self.conn, id)?)
    }

    fn list_recipes(&self, search: Option<&str>, limit: u32, offset: u64) -> Result<Vec<Recipe>> {
        Ok(db_list_recipes(&self.conn, search, limit, offset)?)
    }

    fn recipe_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        Ok(db_recipe_id_by_name(&self.conn, name)?)
    }

    fn list_recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredientDetail>> {
        Ok(db_list_recipe_ingredients(&self.conn, recipe_id)?)
    }

    fn load_recipe_ingredient(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> Result<Option<RecipeIngredient>> {
        Ok(db_load_recipe_ingredient(&self.conn, recipe_id, ingredient_id)?)
    }

    fn load_user(&self, username: &str) -> Result<Option<User>> {
        Ok(db_load_user(&self.conn, username)?)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(db_list_users(&self.conn)?)
    }
}

impl CatalogWrite for SqliteTx {
    fn insert_ingredient(
        &self,
        name: &str,
        description: &str,
        unit: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(db_insert_ingredient(&self.conn, name, description, unit, now)?)
    }

    fn update_ingredient(
        &self,
        id: i64,
        name: &str,
        description: &str,
        unit: &str,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        Ok(db_update_ingredient(&self.conn, id, name, description, unit, now)?)
    }

    fn delete_ingredient(&self, id: i64) -> Result<usize> {
        Ok(db_delete_ingredient(&self.conn, id)?)
    }

    fn insert_recipe(
        &self,
        name: &str,
        description: &str,
        instructions: &str,
        cooking_time_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(db_insert_recipe(
            &self.conn,
            name,
            description,
            instructions,
            cooking_time_minutes,
            now,
        )?)
    }

    fn delete_recipe(&self, id: i64) -> Result<usize> {
        Ok(db_delete_recipe(&self.conn, id)?)
    }

    fn insert_recipe_ingredient(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
        quantity: f64,
        notes: &str,
    ) -> Result<i64> {
        Ok(db_insert_recipe_ingredient(
            &self.conn,
            recipe_id,
            ingredient_id,
            quantity,
            notes,
        )?)
    }

    fn upsert_recipe_ingredient(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
        quantity: f64,
        notes: &str,
    ) -> Result<()> {
        Ok(db_upsert_recipe_ingredient(
            &self.conn,
            recipe_id,
            ingredient_id,
            quantity,
            notes,
        )?)
    }

    fn delete_recipe_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> Result<usize> {
        Ok(db_delete_recipe_ingredient(&self.conn, recipe_id, ingredient_id)?)
    }

    fn insert_user(&self, username: &str, password_hash: &str, now: DateTime<Utc>) -> Result<i64> {
        Ok(db_insert_user(&self.conn, username, password_hash, now)?)
    }
}

impl Storage for SqliteStorage {
    type Tx = SqliteTx;

    fn begin_tx(&self) -> Result<Self::Tx> {
        let conn = self.open_conn()?;
        Self::migrate(&conn)?;
        conn.execute("BEGIN IMMEDIATE", [])?;
        Ok(SqliteTx { conn })
    }
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn reset_all(&self) -> Result<()> {
        if !std::path::Path::new(&self.path).exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.with_conn(|_conn| Ok(()))?;
        Ok(())
    }

    fn open_conn(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;
        Ok(conn)
    }

    fn with_conn<F, T>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.open_conn()?;
        Self::migrate(&conn)?;
        f(&conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        log::info!(
            "SQLite schema migration: {} -> {}",
            version,
            DB_SCHEMA_VERSION
        );

        if version == 0 {
            conn.execute_batch(
                r#"
            CREATE TABLE ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                unit TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE UNIQUE INDEX ingredients_name_nocase_idx
                ON ingredients(name COLLATE NOCASE);
            CREATE TABLE recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                instructions TEXT NOT NULL DEFAULT '',
                cooking_time_minutes INTEGER NOT NULL CHECK (cooking_time_minutes >= 0),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE UNIQUE INDEX recipes_name_nocase_idx
                ON recipes(name COLLATE NOCASE);
            CREATE TABLE recipe_ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
                quantity REAL NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                UNIQUE (recipe_id, ingredient_id)
            );
            CREATE INDEX recipe_ingredients_ingredient_idx
                ON recipe_ingredients(ingredient_id);
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE UNIQUE INDEX users_username_nocase_idx
                ON users(username COLLATE NOCASE);
        "#,
            )?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some("database schema version mismatch; please run with --reset option".to_string()),
        ))
    }
}

impl CatalogRead for SqliteStorage {
    fn load_ingredient(&self, id: i64) -> Result<Option<Ingredient>> {
        Ok(self.with_conn(|conn| db_load_ingredient(conn, id))?)
    }

    fn list_ingredients(
        &self,
        search: Option<&str>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Ingredient>> {
        Ok(self.with_conn(|conn| db_list_ingredients(conn, search, limit, offset))?)
    }

    fn ingredient_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.with_conn(|conn| db_ingredient_id_by_name(conn, name))?)
    }

    fn load_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        Ok(self.with_conn(|conn| db_load_recipe(conn, id))?)
    }

    fn list_recipes(&self, search: Option<&str>, limit: u32, offset: u64) -> Result<Vec<Recipe>> {
        Ok(self.with_conn(|conn| db_list_recipes(conn, search, limit, offset))?)
    }

    fn recipe_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.with_conn(|conn| db_recipe_id_by_name(conn, name))?)
    }

    fn list_recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredientDetail>> {
        Ok(self.with_conn(|conn| db_list_recipe_ingredients(conn, recipe_id))?)
    }

    fn load_recipe_ingredient(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> Result<Option<RecipeIngredient>> {
        Ok(self.with_conn(|conn| db_load_recipe_ingredient(conn, recipe_id, ingredient_id))?)
    }

    fn load_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.with_conn(|conn| db_load_user(conn, username))?)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.with_conn(db_list_users)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_storage() -> (TempDir, SqliteStorage) {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("cookbook.sqlite"));
        storage.init().unwrap();
        (dir, storage)
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn sqlite_reset_all_ok_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookbook.sqlite");
        let storage = SqliteStorage::new(&path);
        storage.reset_all().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn sqlite_init_initializes_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookbook.sqlite");
        let storage = SqliteStorage::new(&path);
        storage.init().unwrap();
        assert!(path.exists());

        let conn = Connection::open(&path).unwrap();
        let table = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='recipe_ingredients'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .unwrap();
        assert_eq!(table.as_deref(), Some("recipe_ingredients"));

        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, DB_SCHEMA_VERSION);
    }

    #[test]
    fn sqlite_fails_on_mismatched_schema_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookbook.sqlite");
        let storage = SqliteStorage::new(&path);

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();

        let err = storage
            .init()
            .expect_err("init should fail on version mismatch");
        let msg = format!("{err}");
        assert!(msg.contains("database schema version mismatch"));
        assert!(msg.contains("--reset"));
    }

    #[test]
    fn sqlite_insert_and_load_ingredient() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        let id = tx.insert_ingredient("Flour", "plain white", "grams", now()).unwrap();
        tx.commit().unwrap();

        let loaded = storage.load_ingredient(id).unwrap().unwrap();
        assert_eq!(loaded.name, "Flour");
        assert_eq!(loaded.description, "plain white");
        assert_eq!(loaded.unit, "grams");

        assert!(storage.load_ingredient(id + 1).unwrap().is_none());
    }

    #[test]
    fn sqlite_ingredient_name_lookup_is_case_insensitive() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        let id = tx.insert_ingredient("Sugar", "", "grams", now()).unwrap();
        tx.commit().unwrap();

        assert_eq!(storage.ingredient_id_by_name("sugar").unwrap(), Some(id));
        assert_eq!(storage.ingredient_id_by_name("SUGAR").unwrap(), Some(id));
        assert_eq!(storage.ingredient_id_by_name("salt").unwrap(), None);
    }

    #[test]
    fn sqlite_unique_index_rejects_nocase_duplicate() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        tx.insert_ingredient("Salt", "", "grams", now()).unwrap();
        let err = tx.insert_ingredient("salt", "", "grams", now()).unwrap_err();
        assert!(format!("{err}").to_lowercase().contains("unique"));
    }

    #[test]
    fn sqlite_list_ingredients_orders_and_paginates() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        for name in ["Cumin", "Anise", "Basil", "Dill"] {
            tx.insert_ingredient(name, "", "grams", now()).unwrap();
        }
        tx.commit().unwrap();

        let first = storage.list_ingredients(None, 2, 0).unwrap();
        assert_eq!(
            first.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["Anise", "Basil"]
        );
        let second = storage.list_ingredients(None, 2, 2).unwrap();
        assert_eq!(
            second.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["Cumin", "Dill"]
        );
        let past_end = storage.list_ingredients(None, 2, 4).unwrap();
        assert!(past_end.is_empty());
    }

    #[test]
    fn sqlite_list_ingredients_search_is_case_insensitive_substring() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        for name in ["Basil", "Bay Leaf", "Cumin"] {
            tx.insert_ingredient(name, "", "grams", now()).unwrap();
        }
        tx.commit().unwrap();

        let hits = storage.list_ingredients(Some("ba"), 10, 0).unwrap();
        assert_eq!(
            hits.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["Basil", "Bay Leaf"]
        );
    }

    #[test]
    fn sqlite_search_treats_like_wildcards_literally() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        for name in ["Sugar 100% cane", "Sugar 1000 crystals", "sea_salt", "seaXsalt"] {
            tx.insert_ingredient(name, "", "grams", now()).unwrap();
        }
        tx.insert_recipe("50% rye loaf", "", "", 90, now()).unwrap();
        tx.insert_recipe("500g boule", "", "", 90, now()).unwrap();
        tx.commit().unwrap();

        let hits = storage.list_ingredients(Some("100%"), 10, 0).unwrap();
        assert_eq!(
            hits.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["Sugar 100% cane"]
        );

        let hits = storage.list_ingredients(Some("a_s"), 10, 0).unwrap();
        assert_eq!(
            hits.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["sea_salt"]
        );

        let hits = storage.list_recipes(Some("50%"), 10, 0).unwrap();
        assert_eq!(
            hits.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["50% rye loaf"]
        );
    }

    #[test]
    fn sqlite_begin_tx_migrates_a_fresh_database() {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("cookbook.sqlite"));

        // no init() beforehand
        let tx = storage.begin_tx().unwrap();
        tx.insert_ingredient("Flour", "", "grams", now()).unwrap();
        tx.commit().unwrap();

        assert!(storage.ingredient_id_by_name("flour").unwrap().is_some());
    }

    #[test]
    fn sqlite_list_recipes_newest_first() {
        let (_dir, storage) = open_storage();
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);
        let tx = storage.begin_tx().unwrap();
        tx.insert_recipe("Older", "", "", 10, t0).unwrap();
        tx.insert_recipe("Newer", "", "", 10, t1).unwrap();
        tx.commit().unwrap();

        let recipes = storage.list_recipes(None, 10, 0).unwrap();
        assert_eq!(
            recipes.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["Newer", "Older"]
        );
    }

    #[test]
    fn sqlite_recipe_delete_cascades_join_rows() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        let ing = tx.insert_ingredient("Egg", "", "pieces", now()).unwrap();
        let rec = tx.insert_recipe("Omelette", "", "whisk and fry", 5, now()).unwrap();
        tx.insert_recipe_ingredient(rec, ing, 3.0, "beaten").unwrap();
        tx.commit().unwrap();

        assert_eq!(storage.list_recipe_ingredients(rec).unwrap().len(), 1);

        let tx = storage.begin_tx().unwrap();
        assert_eq!(tx.delete_recipe(rec).unwrap(), 1);
        tx.commit().unwrap();

        assert!(storage.list_recipe_ingredients(rec).unwrap().is_empty());
        // the ingredient itself survives
        assert!(storage.load_ingredient(ing).unwrap().is_some());
    }

    #[test]
    fn sqlite_ingredient_delete_cascades_join_rows() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        let ing = tx.insert_ingredient("Milk", "", "ml", now()).unwrap();
        let rec = tx.insert_recipe("Pancakes", "", "mix and fry", 20, now()).unwrap();
        tx.insert_recipe_ingredient(rec, ing, 250.0, "").unwrap();
        tx.commit().unwrap();

        let tx = storage.begin_tx().unwrap();
        assert_eq!(tx.delete_ingredient(ing).unwrap(), 1);
        tx.commit().unwrap();

        assert!(storage.list_recipe_ingredients(rec).unwrap().is_empty());
        assert!(storage.load_recipe(rec).unwrap().is_some());
    }

    #[test]
    fn sqlite_join_rows_unique_per_pair_and_upsertable() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        let ing = tx.insert_ingredient("Butter", "", "grams", now()).unwrap();
        let rec = tx.insert_recipe("Toast", "", "toast and spread", 3, now()).unwrap();
        tx.insert_recipe_ingredient(rec, ing, 10.0, "softened").unwrap();

        let err = tx.insert_recipe_ingredient(rec, ing, 20.0, "").unwrap_err();
        assert!(format!("{err}").to_lowercase().contains("unique"));

        tx.upsert_recipe_ingredient(rec, ing, 20.0, "melted").unwrap();
        tx.commit().unwrap();

        let rows = storage.list_recipe_ingredients(rec).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 20.0);
        assert_eq!(rows[0].notes, "melted");
        assert_eq!(rows[0].ingredient.name, "Butter");
    }

    #[test]
    fn sqlite_dropped_tx_rolls_back() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        tx.insert_ingredient("Ghost", "", "grams", now()).unwrap();
        drop(tx);

        assert!(storage.ingredient_id_by_name("Ghost").unwrap().is_none());
    }

    #[test]
    fn sqlite_user_roundtrip_and_nocase_username() {
        let (_dir, storage) = open_storage();
        let tx = storage.begin_tx().unwrap();
        tx.insert_user("alice", "hash", now()).unwrap();
        tx.commit().unwrap();

        let user = storage.load_user("ALICE").unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hash");

        let tx = storage.begin_tx().unwrap();
        let err = tx.insert_user("Alice", "other", now()).unwrap_err();
        assert!(format!("{err}").to_lowercase().contains("unique"));
        drop(tx);

        let users = storage.list_users().unwrap();
        assert_eq!(users.len(), 1);
    }
}
