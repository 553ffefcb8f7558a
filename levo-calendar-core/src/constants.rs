//! Defaults shared across the crate.

/// Hosted backend REST API.
pub const DEFAULT_BACKEND_URL: &str = "https://levo-calendar-frontend.fly.dev/api";

/// Calendarific v2 base URL.
pub const DEFAULT_HOLIDAYS_URL: &str = "https://calendarific.com/api/v2";

/// Country used for the holiday overlay when none is configured.
pub const DEFAULT_COUNTRY: &str = "US";

/// Header carrying the locally stored user id on mutating event calls.
pub const USER_ID_HEADER: &str = "user-id";

/// Storage key of the persisted identity record.
pub const USER_STORAGE_KEY: &str = "user";

/// Directory name used under the platform config and data directories.
pub const APP_DIR_NAME: &str = "levo-calendar";

/// Environment variable prefix for config overrides (`LEVOCAL_BACKEND_URL`, ...).
pub const ENV_PREFIX: &str = "LEVOCAL";
