/// Name used for the configuration file and the environment prefix.
pub const APP_NAME: &str = "kunai";

/// Environment variable prefix for configuration overrides (`KUNAI_SERVER`, `KUNAI_BASE_PATH`, ...).
pub const ENV_PREFIX: &str = "KUNAI";

/// Optional configuration file, resolved relative to the working directory.
pub const CONFIG_FILE: &str = const_str::concat!(APP_NAME, ".toml");

/// Default `User-Agent` header sent with every request.
pub const USER_AGENT: &str = const_str::concat!(APP_NAME, "/", env!("CARGO_PKG_VERSION"));

/// Chunk size used when streaming request and response bodies.
pub const TRANSFER_CHUNK_SIZE: usize = 4096;
