use std::net::SocketAddr;

#[derive(Clone)]
pub struct Configuration {
    pub listen: SocketAddr,
    pub data_dir: String,
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
    pub log_file: Option<String>,
    pub reset: bool,
}
