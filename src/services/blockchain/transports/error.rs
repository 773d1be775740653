//! Transport error types.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while talking to an RPC endpoint
#[derive(Debug, Error)]
pub enum TransportError {
	/// The request never produced a response (connection refused, timeout, ...)
	#[error("Network error: {message}")]
	Network {
		message: String,
		#[source]
		source: Option<BoxError>,
	},

	/// The endpoint answered with a non-success HTTP status
	#[error("HTTP error: status {status} from {url}: {body}")]
	Http {
		status: u16,
		url: String,
		body: String,
	},

	/// The response body was not valid JSON
	#[error("Response parse error: {message}")]
	ResponseParse {
		message: String,
		#[source]
		source: Option<BoxError>,
	},

	/// The request body could not be serialized
	#[error("Request serialization error: {message}")]
	RequestSerialization {
		message: String,
		#[source]
		source: Option<BoxError>,
	},

	/// Switching to a fallback endpoint failed
	#[error("URL rotation error: {message}")]
	UrlRotation {
		message: String,
		#[source]
		source: Option<BoxError>,
	},
}

impl TransportError {
	pub fn network(message: impl Into<String>, source: Option<BoxError>) -> Self {
		Self::Network {
			message: message.into(),
			source,
		}
	}

	pub fn http(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
		Self::Http {
			status,
			url: url.into(),
			body: body.into(),
		}
	}

	pub fn response_parse(message: impl Into<String>, source: Option<BoxError>) -> Self {
		Self::ResponseParse {
			message: message.into(),
			source,
		}
	}

	pub fn request_serialization(message: impl Into<String>, source: Option<BoxError>) -> Self {
		Self::RequestSerialization {
			message: message.into(),
			source,
		}
	}

	pub fn url_rotation(message: impl Into<String>, source: Option<BoxError>) -> Self {
		Self::UrlRotation {
			message: message.into(),
			source,
		}
	}
}
