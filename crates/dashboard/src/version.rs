const fn unwrap_or_cargo_version(opt: Option<&'static str>) -> &'static str {
    match opt {
        Some(val) => val,
        None => env!("CARGO_PKG_VERSION"),
    }
}

pub const VERSION: &str = unwrap_or_cargo_version(option_env!("DASHBOARD_VERSION"));

/// API revision the client speaks; the default base URL ends in it.
pub const API_VERSION: &str = "v0";
