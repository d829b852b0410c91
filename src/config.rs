//! Token manager configuration: issuer endpoint, socket timeouts, and batch lifetime.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ConfigError};

/// Default issuer host.
pub const DEFAULT_ISSUER_HOST: &str = "server.local";
/// Default issuer port.
pub const DEFAULT_ISSUER_PORT: u16 = 18883;
/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Default batch lifetime (one week).
pub const DEFAULT_BATCH_LIFETIME_SECS: u64 = 7 * 24 * 60 * 60;

/// Host and port of the token issuer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuerEndpoint {
	host: String,
	port: u16,
}
impl IssuerEndpoint {
	/// Creates a validated endpoint.
	pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ConfigError> {
		let endpoint = Self { host: host.into(), port };

		endpoint.validate()?;

		Ok(endpoint)
	}

	/// Issuer host name or address.
	pub fn host(&self) -> &str {
		&self.host
	}

	/// Issuer TCP port.
	pub fn port(&self) -> u16 {
		self.port
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.host.is_empty() || self.host.chars().any(char::is_whitespace) {
			return Err(ConfigError::InvalidHost { host: self.host.clone() });
		}
		if self.port == 0 {
			return Err(ConfigError::InvalidPort);
		}

		Ok(())
	}
}
impl Default for IssuerEndpoint {
	fn default() -> Self {
		Self { host: DEFAULT_ISSUER_HOST.into(), port: DEFAULT_ISSUER_PORT }
	}
}
impl Display for IssuerEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.host.contains(':') {
			write!(f, "[{}]:{}", self.host, self.port)
		} else {
			write!(f, "{}:{}", self.host, self.port)
		}
	}
}

/// Runtime settings for [`TokenManager`](crate::manager::TokenManager) and its transport.
///
/// Every field has a default, so `{}` is a complete JSON configuration. Durations are stored as
/// integers to keep the serialized form stable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
	/// Token issuer endpoint.
	pub issuer: IssuerEndpoint,
	/// TCP connect timeout in milliseconds.
	pub connect_timeout_ms: u64,
	/// Socket read/write timeout in milliseconds; `None` blocks indefinitely.
	pub io_timeout_ms: Option<u64>,
	/// Age after which a batch is refilled even if tokens remain; `None` disables expiry.
	pub batch_lifetime_secs: Option<u64>,
}
impl ManagerConfig {
	/// Returns a builder seeded with defaults.
	pub fn builder() -> ManagerConfigBuilder {
		ManagerConfigBuilder::default()
	}

	/// Parses and validates a JSON configuration, reporting the failing field path.
	pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_slice(bytes);
		let config: Self = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::Parse { source })?;

		config.validate()?;

		Ok(config)
	}

	/// Checks endpoint and duration settings.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.issuer.validate()?;

		if self.connect_timeout_ms == 0 {
			return Err(ConfigError::ZeroDuration { field: "connect_timeout_ms" });
		}
		if self.io_timeout_ms == Some(0) {
			return Err(ConfigError::ZeroDuration { field: "io_timeout_ms" });
		}
		if self.batch_lifetime_secs == Some(0) {
			return Err(ConfigError::ZeroDuration { field: "batch_lifetime_secs" });
		}

		Ok(())
	}

	/// TCP connect timeout.
	pub fn connect_timeout(&self) -> StdDuration {
		StdDuration::from_millis(self.connect_timeout_ms)
	}

	/// Socket read/write timeout.
	pub fn io_timeout(&self) -> Option<StdDuration> {
		self.io_timeout_ms.map(StdDuration::from_millis)
	}

	/// Batch lifetime used for expiry checks.
	pub fn batch_lifetime(&self) -> Option<Duration> {
		self.batch_lifetime_secs
			.map(|secs| Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)))
	}
}
impl Default for ManagerConfig {
	fn default() -> Self {
		Self {
			issuer: IssuerEndpoint::default(),
			connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
			io_timeout_ms: None,
			batch_lifetime_secs: Some(DEFAULT_BATCH_LIFETIME_SECS),
		}
	}
}

/// Builder for [`ManagerConfig`].
#[derive(Clone, Debug, Default)]
pub struct ManagerConfigBuilder(ManagerConfig);
impl ManagerConfigBuilder {
	/// Sets the issuer host and port.
	pub fn issuer(mut self, host: impl Into<String>, port: u16) -> Self {
		self.0.issuer = IssuerEndpoint { host: host.into(), port };

		self
	}

	/// Sets the TCP connect timeout.
	pub fn connect_timeout(mut self, timeout: StdDuration) -> Self {
		self.0.connect_timeout_ms = duration_millis(timeout);

		self
	}

	/// Sets the socket read/write timeout.
	pub fn io_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.0.io_timeout_ms = timeout.map(duration_millis);

		self
	}

	/// Sets the batch lifetime; `None` disables expiry.
	pub fn batch_lifetime(mut self, lifetime: Option<Duration>) -> Self {
		self.0.batch_lifetime_secs =
			lifetime.map(|lifetime| u64::try_from(lifetime.whole_seconds()).unwrap_or(0));

		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<ManagerConfig, ConfigError> {
		self.0.validate()?;

		Ok(self.0)
	}
}

fn duration_millis(duration: StdDuration) -> u64 {
	u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_json_yields_defaults() {
		let config = ManagerConfig::from_json_slice(b"{}").expect("Empty object should parse.");

		assert_eq!(config, ManagerConfig::default());
		assert_eq!(config.issuer.to_string(), "server.local:18883");
		assert_eq!(config.batch_lifetime(), Some(Duration::days(7)));
		assert_eq!(config.io_timeout(), None);
	}

	#[test]
	fn parse_errors_carry_field_path() {
		let err = ManagerConfig::from_json_slice(br#"{"issuer":{"host":"a","port":"x"}}"#)
			.expect_err("A string port should be rejected.");

		match err {
			ConfigError::Parse { source } => assert_eq!(source.path().to_string(), "issuer.port"),
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn validation_rejects_zero_and_blank_settings() {
		assert!(matches!(
			ManagerConfig::builder().issuer("", 1).build(),
			Err(ConfigError::InvalidHost { .. })
		));
		assert!(matches!(
			ManagerConfig::builder().issuer("issuer.local", 0).build(),
			Err(ConfigError::InvalidPort)
		));
		assert!(matches!(
			ManagerConfig::builder().connect_timeout(StdDuration::ZERO).build(),
			Err(ConfigError::ZeroDuration { field: "connect_timeout_ms" })
		));
		assert!(matches!(
			ManagerConfig::from_json_slice(br#"{"batch_lifetime_secs":0}"#),
			Err(ConfigError::ZeroDuration { field: "batch_lifetime_secs" })
		));
	}

	#[test]
	fn integer_fields_convert_to_durations() {
		let config = ManagerConfig::from_json_slice(
			br#"{"connect_timeout_ms":2500,"io_timeout_ms":750,"batch_lifetime_secs":3600}"#,
		)
		.expect("Integer settings should parse.");

		assert_eq!(config.connect_timeout(), StdDuration::from_millis(2_500));
		assert_eq!(config.io_timeout(), Some(StdDuration::from_millis(750)));
		assert_eq!(config.batch_lifetime(), Some(Duration::hours(1)));
		assert!(matches!(
			ManagerConfig::from_json_slice(br#"{"connect_timeout":5}"#),
			Err(ConfigError::Parse { .. })
		));
	}

	#[test]
	fn builder_round_trips_through_json() {
		let config = ManagerConfig::builder()
			.issuer("::1", 18883)
			.io_timeout(Some(StdDuration::from_secs(5)))
			.batch_lifetime(None)
			.build()
			.expect("Builder settings should be valid.");
		let json = serde_json::to_vec(&config).expect("Config should serialize.");

		assert_eq!(config.issuer.to_string(), "[::1]:18883");
		assert_eq!(ManagerConfig::from_json_slice(&json).expect("Config should parse."), config);
	}
}
