//! Categorized transport error codes.
//!
//! Transports report failures as numeric codes. [`NetworkError`] gives each
//! known code a stable name, groups the codes into [`ErrorCategory`] ranges
//! and folds unknown codes into the generic bucket of their range.

use std::fmt;

/// The broad family a [`NetworkError`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// No error.
    None,
    /// Network layer errors relating to the destination server (1-99).
    Network,
    /// Proxy errors (100-199).
    Proxy,
    /// Content errors (200-299).
    Content,
    /// Protocol errors (300-399).
    Protocol,
    /// Server side errors (400-499).
    Server,
}

impl ErrorCategory {
    /// Stable key for this category.
    pub fn key(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Network => "Network",
            Self::Proxy => "Proxy",
            Self::Content => "Content",
            Self::Protocol => "Protocol",
            Self::Server => "Server",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error code of a finished exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum NetworkError {
    /// The exchange finished without error.
    #[default]
    None = 0,

    ConnectionRefused = 1,
    RemoteHostClosed = 2,
    HostNotFound = 3,
    Timeout = 4,
    /// The exchange was aborted before it finished.
    OperationCanceled = 5,
    SslHandshakeFailed = 6,
    TemporaryNetworkFailure = 7,
    NetworkSessionFailed = 8,
    BackgroundRequestNotAllowed = 9,
    TooManyRedirects = 10,
    InsecureRedirect = 11,
    UnknownNetwork = 99,

    ProxyConnectionRefused = 101,
    ProxyConnectionClosed = 102,
    ProxyNotFound = 103,
    ProxyTimeout = 104,
    ProxyAuthenticationRequired = 105,
    UnknownProxy = 199,

    ContentAccessDenied = 201,
    ContentOperationNotPermitted = 202,
    ContentNotFound = 203,
    AuthenticationRequired = 204,
    ContentReSend = 205,
    ContentConflict = 206,
    ContentGone = 207,
    UnknownContent = 299,

    ProtocolUnknown = 301,
    ProtocolInvalidOperation = 302,
    ProtocolFailure = 399,

    InternalServer = 401,
    OperationNotImplemented = 402,
    ServiceUnavailable = 403,
    UnknownServer = 499,
}

impl NetworkError {
    /// Map a numeric transport code onto the taxonomy.
    ///
    /// Unknown codes become the generic error of their range. Codes above
    /// the server range count as server errors, negative ones as network
    /// errors.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::ConnectionRefused,
            2 => Self::RemoteHostClosed,
            3 => Self::HostNotFound,
            4 => Self::Timeout,
            5 => Self::OperationCanceled,
            6 => Self::SslHandshakeFailed,
            7 => Self::TemporaryNetworkFailure,
            8 => Self::NetworkSessionFailed,
            9 => Self::BackgroundRequestNotAllowed,
            10 => Self::TooManyRedirects,
            11 => Self::InsecureRedirect,
            101 => Self::ProxyConnectionRefused,
            102 => Self::ProxyConnectionClosed,
            103 => Self::ProxyNotFound,
            104 => Self::ProxyTimeout,
            105 => Self::ProxyAuthenticationRequired,
            201 => Self::ContentAccessDenied,
            202 => Self::ContentOperationNotPermitted,
            203 => Self::ContentNotFound,
            204 => Self::AuthenticationRequired,
            205 => Self::ContentReSend,
            206 => Self::ContentConflict,
            207 => Self::ContentGone,
            301 => Self::ProtocolUnknown,
            302 => Self::ProtocolInvalidOperation,
            100..=199 => Self::UnknownProxy,
            200..=299 => Self::UnknownContent,
            300..=399 => Self::ProtocolFailure,
            401 => Self::InternalServer,
            402 => Self::OperationNotImplemented,
            403 => Self::ServiceUnavailable,
            400.. => Self::UnknownServer,
            _ => Self::UnknownNetwork,
        }
    }

    /// Map an HTTP status code to the error a transport reports for it.
    ///
    /// Returns `None` for statuses below 400.
    pub fn from_http_status(status: u16) -> Option<Self> {
        let error = match status {
            0..=399 => return None,
            400 => Self::ProtocolInvalidOperation,
            401 => Self::AuthenticationRequired,
            403 => Self::ContentAccessDenied,
            404 => Self::ContentNotFound,
            405 => Self::ContentOperationNotPermitted,
            407 => Self::ProxyAuthenticationRequired,
            409 => Self::ContentConflict,
            410 => Self::ContentGone,
            418 => Self::ProtocolInvalidOperation,
            500 => Self::InternalServer,
            501 => Self::OperationNotImplemented,
            503 => Self::ServiceUnavailable,
            400..=499 => Self::UnknownContent,
            _ => Self::UnknownServer,
        };
        Some(error)
    }

    /// The numeric code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether this represents a failure.
    pub fn is_error(self) -> bool {
        self != Self::None
    }

    /// The range this error belongs to.
    pub fn category(self) -> ErrorCategory {
        match self.code() {
            0 => ErrorCategory::None,
            1..=99 => ErrorCategory::Network,
            100..=199 => ErrorCategory::Proxy,
            200..=299 => ErrorCategory::Content,
            300..=399 => ErrorCategory::Protocol,
            _ => ErrorCategory::Server,
        }
    }

    /// Stable key naming this error, e.g. `"ContentNotFound"`.
    pub fn key(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::ConnectionRefused => "ConnectionRefused",
            Self::RemoteHostClosed => "RemoteHostClosed",
            Self::HostNotFound => "HostNotFound",
            Self::Timeout => "Timeout",
            Self::OperationCanceled => "OperationCanceled",
            Self::SslHandshakeFailed => "SslHandshakeFailed",
            Self::TemporaryNetworkFailure => "TemporaryNetworkFailure",
            Self::NetworkSessionFailed => "NetworkSessionFailed",
            Self::BackgroundRequestNotAllowed => "BackgroundRequestNotAllowed",
            Self::TooManyRedirects => "TooManyRedirects",
            Self::InsecureRedirect => "InsecureRedirect",
            Self::UnknownNetwork => "UnknownNetwork",
            Self::ProxyConnectionRefused => "ProxyConnectionRefused",
            Self::ProxyConnectionClosed => "ProxyConnectionClosed",
            Self::ProxyNotFound => "ProxyNotFound",
            Self::ProxyTimeout => "ProxyTimeout",
            Self::ProxyAuthenticationRequired => "ProxyAuthenticationRequired",
            Self::UnknownProxy => "UnknownProxy",
            Self::ContentAccessDenied => "ContentAccessDenied",
            Self::ContentOperationNotPermitted => "ContentOperationNotPermitted",
            Self::ContentNotFound => "ContentNotFound",
            Self::AuthenticationRequired => "AuthenticationRequired",
            Self::ContentReSend => "ContentReSend",
            Self::ContentConflict => "ContentConflict",
            Self::ContentGone => "ContentGone",
            Self::UnknownContent => "UnknownContent",
            Self::ProtocolUnknown => "ProtocolUnknown",
            Self::ProtocolInvalidOperation => "ProtocolInvalidOperation",
            Self::ProtocolFailure => "ProtocolFailure",
            Self::InternalServer => "InternalServer",
            Self::OperationNotImplemented => "OperationNotImplemented",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::UnknownServer => "UnknownServer",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Self::None => "no error",
            Self::ConnectionRefused => "connection refused",
            Self::RemoteHostClosed => "remote host closed the connection",
            Self::HostNotFound => "host not found",
            Self::Timeout => "connection timed out",
            Self::OperationCanceled => "operation canceled",
            Self::SslHandshakeFailed => "TLS handshake failed",
            Self::TemporaryNetworkFailure => "temporary network failure",
            Self::NetworkSessionFailed => "network session failed",
            Self::BackgroundRequestNotAllowed => "background request not allowed",
            Self::TooManyRedirects => "too many redirects",
            Self::InsecureRedirect => "insecure redirect",
            Self::UnknownNetwork => "unknown network error",
            Self::ProxyConnectionRefused => "proxy refused the connection",
            Self::ProxyConnectionClosed => "proxy closed the connection",
            Self::ProxyNotFound => "proxy not found",
            Self::ProxyTimeout => "proxy timed out",
            Self::ProxyAuthenticationRequired => "proxy authentication required",
            Self::UnknownProxy => "unknown proxy error",
            Self::ContentAccessDenied => "access denied",
            Self::ContentOperationNotPermitted => "operation not permitted",
            Self::ContentNotFound => "content not found",
            Self::AuthenticationRequired => "authentication required",
            Self::ContentReSend => "request must be sent again",
            Self::ContentConflict => "content conflict",
            Self::ContentGone => "content gone",
            Self::UnknownContent => "unknown content error",
            Self::ProtocolUnknown => "unknown protocol",
            Self::ProtocolInvalidOperation => "invalid operation for protocol",
            Self::ProtocolFailure => "protocol failure",
            Self::InternalServer => "internal server error",
            Self::OperationNotImplemented => "operation not implemented",
            Self::ServiceUnavailable => "service unavailable",
            Self::UnknownServer => "unknown server error",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl From<i32> for NetworkError {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [NetworkError; 34] = [
        NetworkError::None,
        NetworkError::ConnectionRefused,
        NetworkError::RemoteHostClosed,
        NetworkError::HostNotFound,
        NetworkError::Timeout,
        NetworkError::OperationCanceled,
        NetworkError::SslHandshakeFailed,
        NetworkError::TemporaryNetworkFailure,
        NetworkError::NetworkSessionFailed,
        NetworkError::BackgroundRequestNotAllowed,
        NetworkError::TooManyRedirects,
        NetworkError::InsecureRedirect,
        NetworkError::UnknownNetwork,
        NetworkError::ProxyConnectionRefused,
        NetworkError::ProxyConnectionClosed,
        NetworkError::ProxyNotFound,
        NetworkError::ProxyTimeout,
        NetworkError::ProxyAuthenticationRequired,
        NetworkError::UnknownProxy,
        NetworkError::ContentAccessDenied,
        NetworkError::ContentOperationNotPermitted,
        NetworkError::ContentNotFound,
        NetworkError::AuthenticationRequired,
        NetworkError::ContentReSend,
        NetworkError::ContentConflict,
        NetworkError::ContentGone,
        NetworkError::UnknownContent,
        NetworkError::ProtocolUnknown,
        NetworkError::ProtocolInvalidOperation,
        NetworkError::ProtocolFailure,
        NetworkError::InternalServer,
        NetworkError::OperationNotImplemented,
        NetworkError::ServiceUnavailable,
        NetworkError::UnknownServer,
    ];

    #[test]
    fn test_known_codes_map_to_themselves() {
        for error in ALL {
            assert_eq!(NetworkError::from_code(error.code()), error, "{}", error.key());
        }
    }

    #[test]
    fn test_unknown_codes_fall_into_range_bucket() {
        assert_eq!(NetworkError::from_code(42), NetworkError::UnknownNetwork);
        assert_eq!(NetworkError::from_code(100), NetworkError::UnknownProxy);
        assert_eq!(NetworkError::from_code(150), NetworkError::UnknownProxy);
        assert_eq!(NetworkError::from_code(250), NetworkError::UnknownContent);
        assert_eq!(NetworkError::from_code(303), NetworkError::ProtocolFailure);
        assert_eq!(NetworkError::from_code(404), NetworkError::UnknownServer);
        assert_eq!(NetworkError::from_code(-1), NetworkError::UnknownNetwork);
        assert_eq!(NetworkError::from_code(500), NetworkError::UnknownServer);
        assert_eq!(NetworkError::from_code(1000), NetworkError::UnknownServer);
    }

    #[test]
    fn test_categories() {
        assert_eq!(NetworkError::None.category(), ErrorCategory::None);
        assert_eq!(NetworkError::OperationCanceled.category(), ErrorCategory::Network);
        assert_eq!(NetworkError::UnknownNetwork.category(), ErrorCategory::Network);
        assert_eq!(NetworkError::ProxyTimeout.category(), ErrorCategory::Proxy);
        assert_eq!(NetworkError::ContentGone.category(), ErrorCategory::Content);
        assert_eq!(NetworkError::ProtocolFailure.category(), ErrorCategory::Protocol);
        assert_eq!(NetworkError::UnknownServer.category(), ErrorCategory::Server);
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(NetworkError::from_http_status(200), None);
        assert_eq!(NetworkError::from_http_status(304), None);
        assert_eq!(
            NetworkError::from_http_status(400),
            Some(NetworkError::ProtocolInvalidOperation)
        );
        assert_eq!(
            NetworkError::from_http_status(404),
            Some(NetworkError::ContentNotFound)
        );
        assert_eq!(
            NetworkError::from_http_status(401),
            Some(NetworkError::AuthenticationRequired)
        );
        assert_eq!(
            NetworkError::from_http_status(422),
            Some(NetworkError::UnknownContent)
        );
        assert_eq!(
            NetworkError::from_http_status(503),
            Some(NetworkError::ServiceUnavailable)
        );
        assert_eq!(
            NetworkError::from_http_status(502),
            Some(NetworkError::UnknownServer)
        );
    }

    #[test]
    fn test_keys_and_text() {
        assert_eq!(NetworkError::default(), NetworkError::None);
        assert!(!NetworkError::None.is_error());
        assert_eq!(NetworkError::ContentNotFound.key(), "ContentNotFound");
        assert_eq!(NetworkError::OperationCanceled.to_string(), "operation canceled");
        assert_eq!(ErrorCategory::Proxy.to_string(), "Proxy");
    }
}
