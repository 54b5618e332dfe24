//! Version and build information for fdlink

/// Full version string: "fdlink {version} ({commit} {date})"
pub fn version() -> String {
    format!(
        "fdlink {} ({} {})",
        package_version(),
        build_commit(),
        build_date()
    )
}

/// Package version (e.g., "0.4.0")
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build commit SHA, "unknown" when built outside a git checkout
pub fn build_commit() -> &'static str {
    option_env!("FDLINK_COMMIT_SHA").unwrap_or("unknown")
}

/// Build date, "unknown" if not recorded
pub fn build_date() -> &'static str {
    option_env!("FDLINK_BUILD_DATE").unwrap_or("unknown")
}
