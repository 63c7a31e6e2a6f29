// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy: symbolic kinds, numeric codes and code bands.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Numeric band an error code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorBand {
    /// Codes 1-99.
    General,
    /// Codes 100-199.
    Engine,
    /// Codes 200-299.
    Service,
    /// Codes 300-399.
    Plugin,
    /// Codes 400-499.
    External,
}

impl ErrorBand {
    /// Inclusive code range covered by this band.
    pub fn range(&self) -> std::ops::RangeInclusive<u16> {
        match self {
            ErrorBand::General => 1..=99,
            ErrorBand::Engine => 100..=199,
            ErrorBand::Service => 200..=299,
            ErrorBand::Plugin => 300..=399,
            ErrorBand::External => 400..=499,
        }
    }
}

/// Symbolic error category. Every failure that leaves a component carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unknown,
    Configuration,
    Initialization,
    Validation,
    NotFound,
    PermissionDenied,
    Timeout,

    EngineFailure,
    ProcessingFailure,
    ResourceUnavailable,
    UnsupportedFormat,

    ServiceUnavailable,
    InvalidRequest,
    SerializationFailure,
    CommunicationFailure,

    PluginNotFound,
    PluginInitFailure,
    PluginExecutionFailure,

    ExternalServiceFailure,
    NetworkFailure,
    AuthFailure,
    RateLimited,
}

impl ErrorKind {
    /// Every kind, in code order.
    pub const ALL: [ErrorKind; 22] = [
        ErrorKind::Unknown,
        ErrorKind::Configuration,
        ErrorKind::Initialization,
        ErrorKind::Validation,
        ErrorKind::NotFound,
        ErrorKind::PermissionDenied,
        ErrorKind::Timeout,
        ErrorKind::EngineFailure,
        ErrorKind::ProcessingFailure,
        ErrorKind::ResourceUnavailable,
        ErrorKind::UnsupportedFormat,
        ErrorKind::ServiceUnavailable,
        ErrorKind::InvalidRequest,
        ErrorKind::SerializationFailure,
        ErrorKind::CommunicationFailure,
        ErrorKind::PluginNotFound,
        ErrorKind::PluginInitFailure,
        ErrorKind::PluginExecutionFailure,
        ErrorKind::ExternalServiceFailure,
        ErrorKind::NetworkFailure,
        ErrorKind::AuthFailure,
        ErrorKind::RateLimited,
    ];

    pub fn code(&self) -> u16 {
        match self {
            ErrorKind::Unknown => 1,
            ErrorKind::Configuration => 2,
            ErrorKind::Initialization => 3,
            ErrorKind::Validation => 4,
            ErrorKind::NotFound => 5,
            ErrorKind::PermissionDenied => 6,
            ErrorKind::Timeout => 7,

            ErrorKind::EngineFailure => 100,
            ErrorKind::ProcessingFailure => 101,
            ErrorKind::ResourceUnavailable => 102,
            ErrorKind::UnsupportedFormat => 103,

            ErrorKind::ServiceUnavailable => 200,
            ErrorKind::InvalidRequest => 201,
            ErrorKind::SerializationFailure => 202,
            ErrorKind::CommunicationFailure => 203,

            ErrorKind::PluginNotFound => 300,
            ErrorKind::PluginInitFailure => 301,
            ErrorKind::PluginExecutionFailure => 302,

            ErrorKind::ExternalServiceFailure => 400,
            ErrorKind::NetworkFailure => 401,
            ErrorKind::AuthFailure => 402,
            ErrorKind::RateLimited => 403,
        }
    }

    /// Look a kind up by its numeric code.
    pub fn from_code(code: u16) -> Option<ErrorKind> {
        Self::ALL.iter().copied().find(|kind| kind.code() == code)
    }

    pub fn band(&self) -> ErrorBand {
        match self.code() {
            1..=99 => ErrorBand::General,
            100..=199 => ErrorBand::Engine,
            200..=299 => ErrorBand::Service,
            300..=399 => ErrorBand::Plugin,
            _ => ErrorBand::External,
        }
    }

    /// Stable symbolic name used in serialized error documents.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Unknown => "UNKNOWN",
            ErrorKind::Configuration => "CONFIGURATION",
            ErrorKind::Initialization => "INITIALIZATION",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::EngineFailure => "ENGINE_FAILURE",
            ErrorKind::ProcessingFailure => "PROCESSING_FAILURE",
            ErrorKind::ResourceUnavailable => "RESOURCE_UNAVAILABLE",
            ErrorKind::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::SerializationFailure => "SERIALIZATION_FAILURE",
            ErrorKind::CommunicationFailure => "COMMUNICATION_FAILURE",
            ErrorKind::PluginNotFound => "PLUGIN_NOT_FOUND",
            ErrorKind::PluginInitFailure => "PLUGIN_INIT_FAILURE",
            ErrorKind::PluginExecutionFailure => "PLUGIN_EXECUTION_FAILURE",
            ErrorKind::ExternalServiceFailure => "EXTERNAL_SERVICE_FAILURE",
            ErrorKind::NetworkFailure => "NETWORK_FAILURE",
            ErrorKind::AuthFailure => "AUTH_FAILURE",
            ErrorKind::RateLimited => "RATE_LIMITED",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_code_sits_inside_its_band() {
        for kind in ErrorKind::ALL {
            assert!(
                kind.band().range().contains(&kind.code()),
                "{} (code {}) outside band {:?}",
                kind,
                kind.code(),
                kind.band()
            );
        }
    }

    #[test]
    fn test_codes_and_names_are_unique() {
        let codes: HashSet<u16> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
        let names: HashSet<&str> = ErrorKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
        assert_eq!(names.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_band_membership_table_driven() {
        struct TestCase {
            kind: ErrorKind,
            band: ErrorBand,
        }

        let test_cases = vec![
            TestCase { kind: ErrorKind::Timeout, band: ErrorBand::General },
            TestCase { kind: ErrorKind::UnsupportedFormat, band: ErrorBand::Engine },
            TestCase { kind: ErrorKind::SerializationFailure, band: ErrorBand::Service },
            TestCase { kind: ErrorKind::PluginNotFound, band: ErrorBand::Plugin },
            TestCase { kind: ErrorKind::RateLimited, band: ErrorBand::External },
        ];

        for test_case in test_cases {
            assert_eq!(test_case.kind.band(), test_case.band, "kind {}", test_case.kind);
        }
    }

    #[test]
    fn test_from_code() {
        assert_eq!(ErrorKind::from_code(302), Some(ErrorKind::PluginExecutionFailure));
        assert_eq!(ErrorKind::from_code(7), Some(ErrorKind::Timeout));
        assert_eq!(ErrorKind::from_code(999), None);
    }
}
