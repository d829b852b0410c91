//! Moving-target-defense token manager for pub/sub clients: single-use channel tokens, per-batch
//! AEAD keys, and a compact issuer protocol behind one synchronous API.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod aead;
pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod obs;
pub mod protocol;
pub mod token;
pub mod transport;

pub mod prelude {
	//! Common re-exports for applications driving a [`TokenManager`](crate::manager::TokenManager).

	pub use crate::{
		aead::CipherKind,
		config::{IssuerEndpoint, ManagerConfig},
		error::{Error, Result},
		manager::{ChannelPublisher, LifecycleState, Platform, TokenManager},
		protocol::IssuanceRequest,
		token::{ChannelName, Direction, IssuedToken, Token},
		transport::{ByteStream, IoStream, IssuerTransport},
	};
	#[cfg(feature = "tcp")] pub use crate::transport::TcpTransport;
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use color_eyre as _;
