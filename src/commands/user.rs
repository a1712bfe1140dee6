use super::CommandRunner;
use crate::auth;
use crate::catalog::Catalog;
use crate::cli;
use crate::storage::SqliteStorage;
use anyhow::{anyhow, Context, Result};

impl CommandRunner for cli::UserCmd {
    fn run(&self, catalog: &Catalog<SqliteStorage>) -> Result<()> {
        match self {
            cli::UserCmd::Add { username, password } => {
                let password = match password {
                    Some(password) => password.clone(),
                    None => rpassword::prompt_password("Password: ")
                        .context("reading password from terminal")?,
                };
                if password.is_empty() {
                    return Err(anyhow!("password must not be empty"));
                }
                let hash = auth::hash_password(&password)
                    .map_err(|e| anyhow!("hashing password: {e}"))?;
                let user = catalog
                    .add_user(username, &hash)
                    .context("creating API user")?;
                log::info!("created user {} (id={})", user.username, user.id);
                Ok(())
            }
            cli::UserCmd::List => {
                let users = catalog.users().context("listing API users")?;
                if users.is_empty() {
                    println!("no users");
                    return Ok(());
                }
                for user in users {
                    println!("{}\t{}\t{}", user.id, user.username, user.created_at);
                }
                Ok(())
            }
        }
    }
}
