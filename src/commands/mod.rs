use crate::catalog::Catalog;
use crate::cli::Command;
use crate::storage::SqliteStorage;

pub mod user;

pub trait CommandRunner {
    fn run(&self, catalog: &Catalog<SqliteStorage>) -> anyhow::Result<()>;
}

impl Command {
    pub fn run(&self, catalog: &Catalog<SqliteStorage>) -> anyhow::Result<()> {
        match self {
            Command::User { cmd } => cmd.run(catalog),
        }
    }
}
