//! Numeric error taxonomy.
//!
//! Every code lives in exactly one band of a thousand (or, for the generic
//! band, a thousand at the top of the space). Band membership is a pure
//! range check on the raw number, so codes received from a server that this
//! build does not know about still classify correctly.

use serde::Serialize;

/// Declares [`ErrorCode`] together with its lookup tables.
///
/// Each entry is `Variant = number`. The macro generates the enum, the
/// `ALL` slice, reverse lookup from the raw number and the variant name.
macro_rules! error_codes {
    ($( $(#[$meta:meta])* $variant:ident = $value:literal ),+ $(,)?) => {
        /// A known taxonomy code. The discriminant is the wire value.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum ErrorCode {
            $( $(#[$meta])* $variant = $value, )+
        }

        impl ErrorCode {
            /// Every known code, in declaration order.
            pub const ALL: &'static [ErrorCode] = &[ $( ErrorCode::$variant, )+ ];

            pub const fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($variant), )+
                }
            }
        }
    };
}

error_codes! {
    // Network / transport
    NetworkUnreachable = 1001,
    NetworkTimeout = 1002,
    NetworkOffline = 1003,
    NetworkTlsFailure = 1004,
    NetworkRateLimited = 1005,
    /// A successful response whose body could not be decoded.
    NetworkInvalidResponse = 1006,

    // Authentication / authorization
    AuthUnauthorized = 2001,
    AuthSessionExpired = 2002,
    AuthForbidden = 2003,
    AuthCsrfInvalid = 2004,
    AuthTooManyAttempts = 2005,
    AuthInvalidCredentials = 2006,

    // External CLI integration
    CliNotFound = 3001,
    CliExecutionFailed = 3002,
    CliTimeout = 3003,
    CliInvalidCommand = 3004,
    CliPermissionDenied = 3005,
    CliOutputUnparsable = 3006,
    CliVersionMismatch = 3007,

    // Container runtime
    DockerNotRunning = 4001,
    DockerContainerNotFound = 4002,
    DockerImageNotFound = 4003,
    DockerStartFailed = 4004,
    DockerStopFailed = 4005,
    DockerRestartFailed = 4006,
    DockerNetworkError = 4007,
    DockerVolumeError = 4008,
    DockerOutOfMemory = 4009,
    DockerOutOfDisk = 4010,

    // Data store
    DbConnectionFailed = 5001,
    DbQueryError = 5002,
    DbTimeout = 5003,
    DbConstraintViolation = 5004,
    DbMigrationFailed = 5005,
    DbBackupFailed = 5006,
    DbRestoreFailed = 5007,

    // Input validation
    ValidationMissingField = 6001,
    ValidationInvalidFormat = 6002,
    ValidationOutOfRange = 6003,
    ValidationDuplicateKey = 6004,
    ValidationInvalidInput = 6005,

    // Filesystem
    FsNotFound = 7001,
    FsReadError = 7002,
    FsWriteError = 7003,
    FsDeleteError = 7004,
    FsPermissionDenied = 7005,
    FsPathTraversal = 7006,
    FsDiskFull = 7007,
    FsAlreadyExists = 7008,

    // Service lifecycle
    ServiceNotFound = 8001,
    ServiceStartFailed = 8002,
    ServiceStopFailed = 8003,
    ServiceRestartFailed = 8004,
    ServiceHealthCheckFailed = 8005,
    ServicePortConflict = 8006,
    ServiceAlreadyRunning = 8007,
    ServiceAlreadyStopped = 8008,

    // Project lifecycle
    ProjectNotInitialized = 9001,
    ProjectBuildFailed = 9002,
    ProjectConfigInvalid = 9003,
    ProjectConfigMissing = 9004,

    // Deployment
    DeployFailed = 10001,
    DeployTimeout = 10002,
    DeployRollbackFailed = 10003,
    DeployEnvironmentNotFound = 10004,

    // Plugins
    PluginNotFound = 11001,
    PluginInstallFailed = 11002,
    PluginLoadFailed = 11003,
    PluginIncompatible = 11004,

    // Backup / restore
    BackupCreateFailed = 12001,
    BackupRestoreFailed = 12002,
    BackupNotFound = 12003,
    BackupCorrupted = 12004,

    // Generic
    Unknown = 99001,
    Internal = 99002,
    NotFound = 99003,
    NotImplemented = 99004,
    /// The caller aborted the whole call.
    Cancelled = 99005,
}

/// Category of a code, one per numeric band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorBand {
    Network,
    Auth,
    Cli,
    Docker,
    Database,
    Validation,
    Filesystem,
    Service,
    Project,
    Deployment,
    Plugin,
    Backup,
    Generic,
}

impl ErrorBand {
    pub const ALL: &'static [ErrorBand] = &[
        Self::Network,
        Self::Auth,
        Self::Cli,
        Self::Docker,
        Self::Database,
        Self::Validation,
        Self::Filesystem,
        Self::Service,
        Self::Project,
        Self::Deployment,
        Self::Plugin,
        Self::Backup,
        Self::Generic,
    ];

    /// Inclusive numeric range owned by this band.
    pub const fn range(self) -> (u32, u32) {
        match self {
            Self::Network => (1000, 1999),
            Self::Auth => (2000, 2999),
            Self::Cli => (3000, 3999),
            Self::Docker => (4000, 4999),
            Self::Database => (5000, 5999),
            Self::Validation => (6000, 6999),
            Self::Filesystem => (7000, 7999),
            Self::Service => (8000, 8999),
            Self::Project => (9000, 9999),
            Self::Deployment => (10000, 10999),
            Self::Plugin => (11000, 11999),
            Self::Backup => (12000, 12999),
            Self::Generic => (99000, 99999),
        }
    }

    pub const fn includes(self, code: u32) -> bool {
        let (start, end) = self.range();
        code >= start && code <= end
    }

    /// The band owning `code`, if any.
    pub const fn of(code: u32) -> Option<Self> {
        let mut i = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i].includes(code) {
                return Some(Self::ALL[i]);
            }
            i += 1;
        }
        None
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Cli => "cli",
            Self::Docker => "docker",
            Self::Database => "database",
            Self::Validation => "validation",
            Self::Filesystem => "filesystem",
            Self::Service => "service",
            Self::Project => "project",
            Self::Deployment => "deployment",
            Self::Plugin => "plugin",
            Self::Backup => "backup",
            Self::Generic => "generic",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|band| band.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for ErrorBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Every declared code must sit inside a band; a stray literal fails the build.
const _: () = {
    let mut i = 0;
    while i < ErrorCode::ALL.len() {
        assert!(
            ErrorBand::of(ErrorCode::ALL[i] as u32).is_some(),
            "error code outside every band"
        );
        i += 1;
    }
};

impl ErrorCode {
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    pub const fn band(self) -> ErrorBand {
        match ErrorBand::of(self as u32) {
            Some(band) => band,
            None => ErrorBand::Generic,
        }
    }

    pub const fn is_not_found(self) -> bool {
        matches!(
            self,
            Self::CliNotFound
                | Self::DockerContainerNotFound
                | Self::DockerImageNotFound
                | Self::FsNotFound
                | Self::ServiceNotFound
                | Self::DeployEnvironmentNotFound
                | Self::PluginNotFound
                | Self::BackupNotFound
                | Self::NotFound
        )
    }

    pub const fn is_timeout(self) -> bool {
        matches!(
            self,
            Self::NetworkTimeout | Self::CliTimeout | Self::DbTimeout | Self::DeployTimeout
        )
    }

    pub const fn is_conflict(self) -> bool {
        matches!(
            self,
            Self::DbConstraintViolation
                | Self::FsAlreadyExists
                | Self::ServicePortConflict
                | Self::ServiceAlreadyRunning
                | Self::ServiceAlreadyStopped
        )
    }

    pub const fn is_unavailable(self) -> bool {
        matches!(
            self,
            Self::NetworkUnreachable
                | Self::NetworkOffline
                | Self::DockerNotRunning
                | Self::DbConnectionFailed
        )
    }

    /// Map an HTTP status with no structured body to a code.
    pub const fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::ValidationInvalidInput,
            401 => Self::AuthUnauthorized,
            403 => Self::AuthForbidden,
            404 => Self::NotFound,
            408 => Self::NetworkTimeout,
            409 => Self::ValidationDuplicateKey,
            429 => Self::NetworkRateLimited,
            503 => Self::DockerNotRunning,
            _ => Self::Internal,
        }
    }
}

impl From<ErrorCode> for u32 {
    fn from(code: ErrorCode) -> Self {
        code.as_u32()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// Transport status derived from a raw code.
///
/// Band rules win over per-code rules: every auth code is 401 unless it is
/// a permission or throttling code, and every validation code is 400.
pub const fn status_for(code: u32) -> u16 {
    let known = ErrorCode::from_u32(code);
    match ErrorBand::of(code) {
        Some(ErrorBand::Auth) => match known {
            Some(ErrorCode::AuthForbidden | ErrorCode::AuthCsrfInvalid) => 403,
            Some(ErrorCode::AuthTooManyAttempts) => 429,
            _ => 401,
        },
        Some(ErrorBand::Validation) => 400,
        _ => match known {
            Some(c) if c.is_not_found() => 404,
            Some(c) if c.is_timeout() => 408,
            Some(c) if c.is_conflict() => 409,
            Some(ErrorCode::NetworkRateLimited) => 429,
            Some(c) if c.is_unavailable() => 503,
            _ => 500,
        },
    }
}

#[cfg(test)]
mod tests;
