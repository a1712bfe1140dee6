use clap::Subcommand;

#[derive(Subcommand, Debug, Clone)]
pub enum UserCmd {
    #[command(
        about = "Add an API user",
        long_about = "Create an account that can obtain API tokens. Prompts for the password when --password is not given."
    )]
    Add {
        #[arg(value_name = "USERNAME", help = "Username of the new account")]
        username: String,
        #[arg(
            long,
            value_name = "PASSWORD",
            help = "Password for the new account (prompted when omitted)",
            required = false
        )]
        password: Option<String>,
    },
    #[command(about = "List API users")]
    List,
}
