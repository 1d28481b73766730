use crate::errors::MbResult;
use serde::{Deserialize, Serialize};

/// Environment variable holding the default server port.
pub const MB_PORT: &str = "MB_PORT";
pub const DEFAULT_PORT: u16 = 2525;
pub const HOST: &str = "localhost";

/// Connection settings of a client, resolved once and immutable afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ClientConfig {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Picks the port from the explicit argument, then from the raw `MB_PORT` value,
    /// then falls back to [`DEFAULT_PORT`].
    /// A zero port counts as absent, as does an empty environment value.
    pub fn resolve(explicit: Option<u16>, env_port: Option<&str>) -> MbResult<Self> {
        if let Some(port) = explicit.filter(|port| *port != 0) {
            return Ok(Self { port });
        }

        let port = match env_port.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => value.parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        Ok(Self { port })
    }

    /// Like [`ClientConfig::resolve`], reading `MB_PORT` from the process environment.
    pub fn from_env(explicit: Option<u16>) -> MbResult<Self> {
        let env_port = std::env::var(MB_PORT).ok();
        Self::resolve(explicit, env_port.as_deref())
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> &'static str {
        HOST
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", HOST, self.port)
    }
}

/// Optional settings as read from a settings file; unset fields fall through
/// to the environment and defaults.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    #[serde(alias = "mbPort")]
    #[serde(alias = "mb_port")]
    pub port: Option<u16>,
}

impl ClientSettings {
    /// The explicit port wins over the one from the settings.
    pub fn into_config(self, explicit: Option<u16>) -> MbResult<ClientConfig> {
        ClientConfig::from_env(explicit.or(self.port))
    }
}
