//! Byte-stream primitives for talking to the token issuer.
//!
//! The manager's only dependency on a network stack is [`IssuerTransport`]. Callers provide an
//! implementation (plain TCP via [`TcpTransport`], or a mutual-TLS stream of their own) and the
//! manager opens one short-lived stream per issuance request. Dropping the stream closes it.

// std
use std::io::{ErrorKind, Read, Write};
#[cfg(feature = "tcp")]
use std::{
	net::{TcpStream, ToSocketAddrs},
	time::Duration as StdDuration,
};
// self
use crate::{_prelude::*, config::IssuerEndpoint, error::TransportError};

/// Blocking, exact-length byte stream.
///
/// Both operations loop until the whole buffer is transferred or an error occurs; a short read
/// caused by the peer closing the connection is an error.
pub trait ByteStream {
	/// Fills `buf` completely.
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

	/// Writes all of `buf`.
	fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError>;
}
impl<T> ByteStream for &mut T
where
	T: ?Sized + ByteStream,
{
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
		(**self).read_exact(buf)
	}

	fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError> {
		(**self).write_all(buf)
	}
}

/// Adapter that exposes any [`Read`] + [`Write`] stream as a [`ByteStream`].
#[derive(Debug)]
pub struct IoStream<S>(pub S);
impl<S> IoStream<S> {
	/// Wraps `stream`.
	pub fn new(stream: S) -> Self {
		Self(stream)
	}

	/// Returns the wrapped stream.
	pub fn into_inner(self) -> S {
		self.0
	}
}
impl<S> ByteStream for IoStream<S>
where
	S: Read + Write,
{
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
		let len = buf.len();

		Read::read_exact(&mut self.0, buf).map_err(|e| match e.kind() {
			ErrorKind::UnexpectedEof => TransportError::Io(std::io::Error::new(
				ErrorKind::UnexpectedEof,
				format!("issuer closed the stream before {len} bytes were read"),
			)),
			_ => TransportError::Io(e),
		})
	}

	fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError> {
		Write::write_all(&mut self.0, buf)?;
		self.0.flush()?;

		Ok(())
	}
}

/// Opens byte streams to the token issuer.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by the
/// manager across threads.
pub trait IssuerTransport
where
	Self: 'static + Send + Sync,
{
	/// Stream produced for one issuance exchange.
	type Stream: ByteStream;

	/// Connects to `endpoint`.
	fn open(&self, endpoint: &IssuerEndpoint) -> Result<Self::Stream, TransportError>;
}
impl<T> IssuerTransport for Arc<T>
where
	T: IssuerTransport,
{
	type Stream = T::Stream;

	fn open(&self, endpoint: &IssuerEndpoint) -> Result<Self::Stream, TransportError> {
		(**self).open(endpoint)
	}
}

/// Plain TCP transport with connect and I/O timeouts.
#[cfg(feature = "tcp")]
#[derive(Clone, Debug)]
pub struct TcpTransport {
	connect_timeout: StdDuration,
	io_timeout: Option<StdDuration>,
}
#[cfg(feature = "tcp")]
impl TcpTransport {
	/// Creates a transport with explicit timeouts. `io_timeout = None` blocks indefinitely.
	pub fn new(connect_timeout: StdDuration, io_timeout: Option<StdDuration>) -> Self {
		Self { connect_timeout, io_timeout }
	}

	/// Creates a transport using the timeouts from `config`.
	pub fn from_config(config: &crate::config::ManagerConfig) -> Self {
		Self::new(config.connect_timeout(), config.io_timeout())
	}
}
#[cfg(feature = "tcp")]
impl Default for TcpTransport {
	fn default() -> Self {
		Self::from_config(&crate::config::ManagerConfig::default())
	}
}
#[cfg(feature = "tcp")]
impl IssuerTransport for TcpTransport {
	type Stream = IoStream<TcpStream>;

	fn open(&self, endpoint: &IssuerEndpoint) -> Result<Self::Stream, TransportError> {
		let connect_err =
			|source| TransportError::Connect { endpoint: endpoint.to_string(), source };
		let addrs = (endpoint.host(), endpoint.port()).to_socket_addrs().map_err(connect_err)?;
		let mut last_err = None;

		for addr in addrs {
			match TcpStream::connect_timeout(&addr, self.connect_timeout) {
				Ok(stream) => {
					stream.set_read_timeout(self.io_timeout)?;
					stream.set_write_timeout(self.io_timeout)?;
					stream.set_nodelay(true)?;

					return Ok(IoStream::new(stream));
				},
				Err(e) => last_err = Some(e),
			}
		}

		Err(connect_err(last_err.unwrap_or_else(|| {
			std::io::Error::new(ErrorKind::NotFound, "issuer host resolved to no addresses")
		})))
	}
}
