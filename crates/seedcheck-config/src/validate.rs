//! Field checks applied after loading and overrides.

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{AppConfig, SftpSettings};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];
const MAX_STAT_CONCURRENCY: usize = 64;

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for the first field that fails its check.
pub fn validate(config: &AppConfig) -> ConfigResult<()> {
    parse_rpc_url(&config.transmission.rpc.url)?;
    if config.transmission.rpc.timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "transmission.rpc",
            "timeout_secs",
            Some("0".into()),
            "must be greater than zero",
        ));
    }
    if let Some(sftp) = &config.transmission.sftp {
        validate_sftp(sftp)?;
    }

    let concurrency = config.reconcile.stat_concurrency;
    if !(1..=MAX_STAT_CONCURRENCY).contains(&concurrency) {
        return Err(ConfigError::invalid(
            "reconcile",
            "stat_concurrency",
            Some(concurrency.to_string()),
            "must be between 1 and 64",
        ));
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::invalid(
            "logging",
            "level",
            Some(config.logging.level.clone()),
            "must be one of trace, debug, info, warn, error",
        ));
    }
    if let Some(format) = &config.logging.format
        && !LOG_FORMATS.contains(&format.as_str())
    {
        return Err(ConfigError::invalid(
            "logging",
            "format",
            Some(format.clone()),
            "must be pretty or json",
        ));
    }
    Ok(())
}

/// Parse the RPC endpoint, requiring an `http` or `https` scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the URL is empty, malformed, or uses another scheme.
pub fn parse_rpc_url(raw: &str) -> ConfigResult<Url> {
    let invalid = |reason| {
        ConfigError::invalid("transmission.rpc", "url", Some(redact(raw)), reason)
    };
    if raw.trim().is_empty() {
        return Err(ConfigError::invalid(
            "transmission.rpc",
            "url",
            None,
            "is required",
        ));
    }
    let url = Url::parse(raw).map_err(|_| invalid("must be an absolute URL"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid("scheme must be http or https")),
    }
}

fn validate_sftp(sftp: &SftpSettings) -> ConfigResult<()> {
    const SECTION: &str = "transmission.sftp";
    let addr_ok = sftp
        .addr
        .rsplit_once(':')
        .is_some_and(|(host, port)| {
            !host.is_empty() && port.parse::<u16>().is_ok_and(|port| port > 0)
        });
    if !addr_ok {
        return Err(ConfigError::invalid(
            SECTION,
            "addr",
            Some(sftp.addr.clone()),
            "must be host:port",
        ));
    }
    if sftp.user.trim().is_empty() {
        return Err(ConfigError::invalid(SECTION, "user", None, "is required"));
    }
    if sftp.private_key.as_os_str().is_empty() {
        return Err(ConfigError::invalid(
            SECTION,
            "private_key",
            None,
            "is required",
        ));
    }
    if sftp.timeout_secs == 0 {
        return Err(ConfigError::invalid(
            SECTION,
            "timeout_secs",
            Some("0".into()),
            "must be greater than zero",
        ));
    }
    Ok(())
}

/// Strip any password from a URL before it lands in an error.
fn redact(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => raw.to_string(),
    }
}
