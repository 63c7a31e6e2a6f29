/// Default per-call plugin timeout (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default number of results the dispatcher cache holds before evicting
pub const DEFAULT_CACHE_CAPACITY: usize = 256;
/// Prefix of environment variables read by the loader (`PROCESS_TIMEOUT_MS`, ...)
pub const DEFAULT_ENV_PREFIX: &str = "PROCESS";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Environment overlays live under `env_<environment>` in the config file
pub const ENV_SECTION_PREFIX: &str = "env_";

pub const TIMEOUT_MS_KEY: &str = "timeout_ms";
pub const CACHE_CAPACITY_KEY: &str = "cache_capacity";
pub const CACHE_TTL_SECS_KEY: &str = "cache_ttl_secs";
pub const ENVIRONMENT_KEY: &str = "environment";
pub const LOG_LEVEL_KEY: &str = "log_level";
pub const PLUGINS_KEY: &str = "plugins";
