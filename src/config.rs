//! Process configuration, read once at startup

use std::collections::HashMap;
use std::error::Error;
use std::net::SocketAddr;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8081";
pub const DEFAULT_RANGE: &str = "Sheet1";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Clone, Debug)]
pub struct Config {
    /// Email of the Google service account
    pub client_email: String,
    /// PEM-encoded private key of the service account
    pub private_key: String,
    pub listen_address: SocketAddr,
    /// Origins that may call the relay from a browser
    pub cors_origins: Vec<String>,
    /// Range read when a request does not name one
    pub default_range: String,
    pub sheets_api_base: String,
    pub token_uri: String,
}

impl Config {
    /// Read the configuration from the environment, after loading a `.env` file if there is one
    pub fn from_env() -> Result<Self, Box<dyn Error + Send + Sync>> {
        match dotenv::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(err) => log::debug!("No .env file loaded ({})", err),
        }
        Self::from_vars(std::env::vars().collect())
    }

    /// Build a configuration from a set of variables, as they would be found in the environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let var = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| v.is_empty() == false);
        let required = |name: &str| var(name).ok_or_else(|| format!("Missing environment variable {}", name));

        let client_email = required("CLIENT_EMAIL")?.to_string();
        // Keys pasted into a single-line variable usually carry escaped newlines
        let private_key = required("PRIVATE_KEY")?.replace("\\n", "\n");

        let port = match var("PORT") {
            None => DEFAULT_PORT,
            Some(p) => p.parse::<u16>().map_err(|err| format!("Invalid PORT {:?}: {}", p, err))?,
        };
        let bind_address = var("BIND_ADDRESS").unwrap_or(DEFAULT_BIND_ADDRESS);
        let listen_address: SocketAddr = format!("{}:{}", bind_address, port)
            .parse()
            .map_err(|err| format!("Invalid BIND_ADDRESS {:?}: {}", bind_address, err))?;

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or(DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| origin.is_empty() == false)
            .collect();

        Ok(Self {
            client_email,
            private_key,
            listen_address,
            cors_origins,
            default_range: var("DEFAULT_RANGE").unwrap_or(DEFAULT_RANGE).to_string(),
            sheets_api_base: var("SHEETS_API_BASE").unwrap_or(DEFAULT_SHEETS_API_BASE).to_string(),
            token_uri: var("TOKEN_URI").unwrap_or(DEFAULT_TOKEN_URI).to_string(),
        })
    }
}
