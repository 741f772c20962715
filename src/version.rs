/// Build version: `APP_VERSION` at compile time, otherwise the crate version.
pub const VERSION: &str = match option_env!("APP_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Printed by `--version` and logged once at startup.
pub fn banner() -> String {
    format!("ICS server version: {VERSION}")
}
