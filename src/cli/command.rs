use clap::Subcommand;

use crate::cli::user_cmd::UserCmd;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(
        about = "API user management commands",
        long_about = "Create and list the accounts allowed to obtain API tokens. Passwords are hashed before they touch the database."
    )]
    User {
        #[command(subcommand)]
        cmd: UserCmd,
    },
}
