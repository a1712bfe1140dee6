use crate::configuration::Configuration;

pub struct Context {
    pub config: Configuration,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        let cfg = Configuration {
            listen: cli.listen,
            data_dir: cli.data_dir.clone(),
            jwt_secret: cli.jwt_secret.clone(),
            access_ttl_minutes: cli.access_ttl_minutes,
            refresh_ttl_minutes: cli.refresh_ttl_minutes,
            log_file: cli.log_file.clone(),
            reset: cli.reset,
        };
        Self { config: cfg }
    }
}
