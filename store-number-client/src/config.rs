use std::path::PathBuf;

/// Endpoint of a locally running test validator.
pub const LOCAL_URL: &str = "http://127.0.0.1:8899";

/// Endpoint of the public development cluster.
pub const DEVNET_URL: &str = "http://api.devnet.solana.com";

/// Default location of the compiled store-number program.
pub const DEFAULT_PROGRAM_PATH: &str = "dist/program/storenumber.so";

/// Default location of the cached program record.
pub const DEFAULT_STORE_PATH: &str = "store/config.json";


/// Client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Plain RPC endpoint.
    pub url: String,
    /// TLS-secured variant of [`Self::url`].
    pub url_tls: String,
    /// Whether to talk to [`Self::url_tls`] rather than [`Self::url`].
    pub use_tls: bool,
    /// Path to the program binary uploaded when provisioning.
    pub program_path: PathBuf,
    /// Path to the JSON file caching program and store account addresses.
    pub store_path: PathBuf,
    /// Keypair file of an already funded payer.  If `None`, a new payer is
    /// funded through an airdrop.
    pub payer_keypair: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self { Self::from_vars(|_| None) }
}

impl Config {
    /// Reads configuration from environment variables.
    ///
    /// `RPC_URL` sets the endpoint explicitly, otherwise `LIVE` selects the
    /// development cluster over a local validator.  `USE_TLS` switches to the
    /// TLS-secured endpoint.  `STORE_NUMBER_PROGRAM`, `STORE_NUMBER_STORE` and
    /// `PAYER_KEYPAIR` override file locations.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name| var(name).filter(|value| !value.is_empty());
        let url = var("RPC_URL").unwrap_or_else(|| {
            let url = if var("LIVE").is_some() { DEVNET_URL } else { LOCAL_URL };
            url.to_owned()
        });
        let url_tls = tls_variant(&url);
        Self {
            url,
            url_tls,
            use_tls: var("USE_TLS").is_some(),
            program_path: var("STORE_NUMBER_PROGRAM")
                .unwrap_or_else(|| DEFAULT_PROGRAM_PATH.into())
                .into(),
            store_path: var("STORE_NUMBER_STORE")
                .unwrap_or_else(|| DEFAULT_STORE_PATH.into())
                .into(),
            payer_keypair: var("PAYER_KEYPAIR").map(PathBuf::from),
        }
    }

    /// Returns the endpoint the client connects to.
    pub fn endpoint(&self) -> &str {
        if self.use_tls { &self.url_tls } else { &self.url }
    }
}

/// Switches URL scheme to its TLS-secured counterpart.
fn tls_variant(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("ws://") {
        format!("wss://{rest}")
    } else {
        url.to_owned()
    }
}
