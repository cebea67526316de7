//! User-facing copy for every taxonomy code.
//!
//! The table is an exhaustive `match`, so adding a code without a message is a
//! compile error rather than a blank toast in the console.

use super::codes::ErrorCode;
use serde::Serialize;

/// Human-facing metadata for one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDescriptor {
    pub user_message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
    pub retryable: bool,
}

const fn desc(
    user_message: &'static str,
    action: Option<&'static str>,
    retryable: bool,
) -> ErrorDescriptor {
    ErrorDescriptor {
        user_message,
        action,
        retryable,
    }
}

/// Returned for numbers that are not in the taxonomy.
pub const FALLBACK: ErrorDescriptor = desc(
    "An unexpected error occurred.",
    Some("Try again or contact support."),
    true,
);

impl ErrorCode {
    pub const fn descriptor(self) -> ErrorDescriptor {
        use ErrorCode as C;
        match self {
            C::NetworkUnreachable => desc(
                "Unable to reach the server.",
                Some("Check your network connection and that the stack is running."),
                true,
            ),
            C::NetworkTimeout => desc(
                "The request timed out.",
                Some("The server may be busy. Try again in a moment."),
                true,
            ),
            C::NetworkOffline => desc(
                "You appear to be offline.",
                Some("Reconnect to the network and try again."),
                true,
            ),
            C::NetworkTlsFailure => desc(
                "A secure connection could not be established.",
                Some("Check the certificate configuration for this host."),
                false,
            ),
            C::NetworkRateLimited => desc(
                "Too many requests were sent in a short time.",
                Some("Wait a few seconds before trying again."),
                true,
            ),
            C::NetworkInvalidResponse => desc(
                "The server sent a response that could not be read.",
                Some("Refresh the page. If it keeps happening, check the server logs."),
                false,
            ),

            C::AuthUnauthorized => desc(
                "You need to sign in to continue.",
                Some("Sign in and try again."),
                false,
            ),
            C::AuthSessionExpired => desc(
                "Your session has expired.",
                Some("Sign in again to continue."),
                false,
            ),
            C::AuthForbidden => desc(
                "You do not have permission to do that.",
                Some("Ask an administrator for access."),
                false,
            ),
            C::AuthCsrfInvalid => desc(
                "Your security token is missing or out of date.",
                Some("Reload the page and try again."),
                false,
            ),
            C::AuthTooManyAttempts => desc(
                "Too many sign-in attempts.",
                Some("Wait a few minutes before trying again."),
                false,
            ),
            C::AuthInvalidCredentials => desc(
                "The username or password is incorrect.",
                Some("Check your credentials and try again."),
                false,
            ),

            C::CliNotFound => desc(
                "The command-line tool is not installed or not on the PATH.",
                Some("Install the CLI and make sure it is on the PATH."),
                false,
            ),
            C::CliExecutionFailed => desc(
                "The command-line tool reported an error.",
                Some("Check the command output for details."),
                true,
            ),
            C::CliTimeout => desc(
                "The command took too long to finish.",
                Some("Try again, or run the command manually to see where it stalls."),
                true,
            ),
            C::CliInvalidCommand => desc(
                "The command is not valid.",
                Some("Check the command and its arguments."),
                false,
            ),
            C::CliPermissionDenied => desc(
                "The command-line tool was denied permission.",
                Some("Check file permissions and the user running the console."),
                false,
            ),
            C::CliOutputUnparsable => desc(
                "The command output could not be understood.",
                Some("Make sure the CLI version matches the console."),
                false,
            ),
            C::CliVersionMismatch => desc(
                "The installed CLI version is not supported.",
                Some("Update the CLI to a supported version."),
                false,
            ),

            C::DockerNotRunning => desc(
                "The container runtime is not running.",
                Some("Start Docker and try again."),
                true,
            ),
            C::DockerContainerNotFound => desc(
                "The container could not be found.",
                Some("Rebuild the stack to recreate missing containers."),
                false,
            ),
            C::DockerImageNotFound => desc(
                "The container image could not be found.",
                Some("Pull or rebuild the image."),
                false,
            ),
            C::DockerStartFailed => desc(
                "The container failed to start.",
                Some("Check the container logs for the cause."),
                true,
            ),
            C::DockerStopFailed => desc(
                "The container failed to stop.",
                Some("Try again, or stop it manually."),
                true,
            ),
            C::DockerRestartFailed => desc(
                "The container failed to restart.",
                Some("Check the container logs for the cause."),
                true,
            ),
            C::DockerNetworkError => desc(
                "A container network error occurred.",
                Some("Check the container network configuration."),
                true,
            ),
            C::DockerVolumeError => desc(
                "A container volume error occurred.",
                Some("Check volume mounts and available disk space."),
                false,
            ),
            C::DockerOutOfMemory => desc(
                "The container runtime ran out of memory.",
                Some("Free memory or raise the runtime's memory limit."),
                false,
            ),
            C::DockerOutOfDisk => desc(
                "The container runtime ran out of disk space.",
                Some("Prune unused images and volumes."),
                false,
            ),

            C::DbConnectionFailed => desc(
                "Could not connect to the database.",
                Some("Make sure the database service is running."),
                true,
            ),
            C::DbQueryError => desc(
                "The database query failed.",
                Some("Check the query and the database logs."),
                false,
            ),
            C::DbTimeout => desc(
                "The database took too long to respond.",
                Some("Try again in a moment."),
                true,
            ),
            C::DbConstraintViolation => desc(
                "The change conflicts with existing data.",
                Some("Review the values and try again."),
                false,
            ),
            C::DbMigrationFailed => desc(
                "The database migration failed.",
                Some("Check the migration output and fix the failing step."),
                false,
            ),
            C::DbBackupFailed => desc(
                "The database backup failed.",
                Some("Check available disk space and database access."),
                true,
            ),
            C::DbRestoreFailed => desc(
                "The database restore failed.",
                Some("Verify the backup file and try again."),
                false,
            ),

            C::ValidationMissingField => desc(
                "A required field is missing.",
                Some("Fill in all required fields."),
                false,
            ),
            C::ValidationInvalidFormat => desc(
                "A value is not in the expected format.",
                Some("Correct the highlighted value."),
                false,
            ),
            C::ValidationOutOfRange => desc(
                "A value is outside the allowed range.",
                Some("Enter a value within the allowed range."),
                false,
            ),
            C::ValidationDuplicateKey => desc(
                "That name is already in use.",
                Some("Choose a different name."),
                false,
            ),
            C::ValidationInvalidInput => desc(
                "Some of the information provided is not valid.",
                Some("Review the form and try again."),
                false,
            ),

            C::FsNotFound => desc(
                "The file or directory could not be found.",
                Some("Check the path and try again."),
                false,
            ),
            C::FsReadError => desc(
                "The file could not be read.",
                Some("Check that the file exists and is readable."),
                true,
            ),
            C::FsWriteError => desc(
                "The file could not be written.",
                Some("Check permissions and available disk space."),
                true,
            ),
            C::FsDeleteError => desc(
                "The file could not be deleted.",
                Some("Check permissions and that the file is not in use."),
                true,
            ),
            C::FsPermissionDenied => desc(
                "Permission was denied for this file.",
                Some("Check file ownership and permissions."),
                false,
            ),
            C::FsPathTraversal => desc(
                "The path points outside the project.",
                Some("Use a path inside the project directory."),
                false,
            ),
            C::FsDiskFull => desc(
                "The disk is full.",
                Some("Free up disk space and try again."),
                false,
            ),
            C::FsAlreadyExists => desc(
                "A file with that name already exists.",
                Some("Choose a different name or remove the existing file."),
                false,
            ),

            C::ServiceNotFound => desc(
                "The service could not be found.",
                Some("Check the service name in your project configuration."),
                false,
            ),
            C::ServiceStartFailed => desc(
                "The service failed to start.",
                Some("Check the service logs for the cause."),
                true,
            ),
            C::ServiceStopFailed => desc(
                "The service failed to stop.",
                Some("Try again, or stop it from the command line."),
                true,
            ),
            C::ServiceRestartFailed => desc(
                "The service failed to restart.",
                Some("Check the service logs for the cause."),
                true,
            ),
            C::ServiceHealthCheckFailed => desc(
                "The service is not healthy.",
                Some("Check the service logs and its dependencies."),
                true,
            ),
            C::ServicePortConflict => desc(
                "The port is already in use by another process.",
                Some("Free the port or change it in the project configuration."),
                false,
            ),
            C::ServiceAlreadyRunning => desc(
                "The service is already running.",
                None,
                false,
            ),
            C::ServiceAlreadyStopped => desc(
                "The service is already stopped.",
                None,
                false,
            ),

            C::ProjectNotInitialized => desc(
                "The project has not been set up yet.",
                Some("Run the setup wizard to initialize the project."),
                false,
            ),
            C::ProjectBuildFailed => desc(
                "The project build failed.",
                Some("Check the build output for errors."),
                false,
            ),
            C::ProjectConfigInvalid => desc(
                "The project configuration is not valid.",
                Some("Fix the highlighted settings and rebuild."),
                false,
            ),
            C::ProjectConfigMissing => desc(
                "The project configuration file is missing.",
                Some("Run the setup wizard to create it."),
                false,
            ),

            C::DeployFailed => desc(
                "The deployment failed.",
                Some("Check the deployment log for the failing step."),
                true,
            ),
            C::DeployTimeout => desc(
                "The deployment took too long.",
                Some("Check the target host and try again."),
                true,
            ),
            C::DeployRollbackFailed => desc(
                "The deployment could not be rolled back.",
                Some("Restore the previous release manually."),
                false,
            ),
            C::DeployEnvironmentNotFound => desc(
                "The deployment environment could not be found.",
                Some("Check the environment name."),
                false,
            ),

            C::PluginNotFound => desc(
                "The plugin could not be found.",
                Some("Check the plugin name or install it first."),
                false,
            ),
            C::PluginInstallFailed => desc(
                "The plugin could not be installed.",
                Some("Check your network connection and try again."),
                true,
            ),
            C::PluginLoadFailed => desc(
                "The plugin failed to load.",
                Some("Reinstall the plugin."),
                false,
            ),
            C::PluginIncompatible => desc(
                "The plugin is not compatible with this version.",
                Some("Update the plugin or the stack."),
                false,
            ),

            C::BackupCreateFailed => desc(
                "The backup could not be created.",
                Some("Check available disk space and try again."),
                true,
            ),
            C::BackupRestoreFailed => desc(
                "The backup could not be restored.",
                Some("Verify the backup and try again."),
                false,
            ),
            C::BackupNotFound => desc(
                "The backup could not be found.",
                Some("Choose a backup from the list."),
                false,
            ),
            C::BackupCorrupted => desc(
                "The backup is damaged and cannot be used.",
                Some("Choose a different backup."),
                false,
            ),

            C::Unknown => FALLBACK,
            C::Internal => desc(
                "Something went wrong on the server.",
                Some("Try again. If it keeps happening, check the server logs."),
                true,
            ),
            C::NotFound => desc(
                "The requested item could not be found.",
                Some("It may have been moved or deleted."),
                false,
            ),
            C::NotImplemented => desc("This feature is not available yet.", None, false),
            C::Cancelled => desc("The request was cancelled.", None, false),
        }
    }
}

/// Descriptor for a raw code; unknown numbers get [`FALLBACK`].
pub fn lookup(code: u32) -> ErrorDescriptor {
    ErrorCode::from_u32(code).map_or(FALLBACK, ErrorCode::descriptor)
}
