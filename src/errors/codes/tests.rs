use super::*;
use proptest::prelude::*;

#[test]
fn bands_do_not_overlap() {
    for (i, a) in ErrorBand::ALL.iter().enumerate() {
        for b in &ErrorBand::ALL[i + 1..] {
            let (a_start, a_end) = a.range();
            let (b_start, b_end) = b.range();
            assert!(
                a_end < b_start || b_end < a_start,
                "{} overlaps {}",
                a,
                b
            );
        }
    }
}

#[test]
fn every_code_round_trips_through_u32() {
    for code in ErrorCode::ALL {
        assert_eq!(ErrorCode::from_u32(code.as_u32()), Some(*code));
    }
}

#[test]
fn code_names_carry_their_band_prefix() {
    for code in ErrorCode::ALL {
        let expected = match code.band() {
            ErrorBand::Network => "Network",
            ErrorBand::Auth => "Auth",
            ErrorBand::Cli => "Cli",
            ErrorBand::Docker => "Docker",
            ErrorBand::Database => "Db",
            ErrorBand::Validation => "Validation",
            ErrorBand::Filesystem => "Fs",
            ErrorBand::Service => "Service",
            ErrorBand::Project => "Project",
            ErrorBand::Deployment => "Deploy",
            ErrorBand::Plugin => "Plugin",
            ErrorBand::Backup => "Backup",
            ErrorBand::Generic => "",
        };
        assert!(code.name().starts_with(expected), "{}", code);
    }
}

#[test]
fn unknown_numbers_have_no_code() {
    assert_eq!(ErrorCode::from_u32(0), None);
    assert_eq!(ErrorCode::from_u32(1000), None);
    assert_eq!(ErrorCode::from_u32(42_000), None);
}

#[test]
fn band_of_out_of_range_is_none() {
    assert_eq!(ErrorBand::of(0), None);
    assert_eq!(ErrorBand::of(999), None);
    assert_eq!(ErrorBand::of(13_000), None);
    assert_eq!(ErrorBand::of(100_000), None);
}

#[test]
fn band_of_unlisted_code_still_classifies() {
    assert_eq!(ErrorBand::of(2999), Some(ErrorBand::Auth));
    assert_eq!(ErrorBand::of(6500), Some(ErrorBand::Validation));
}

#[test]
fn band_parse_is_case_insensitive() {
    assert_eq!(ErrorBand::parse("Docker"), Some(ErrorBand::Docker));
    assert_eq!(ErrorBand::parse("network"), Some(ErrorBand::Network));
    assert_eq!(ErrorBand::parse("nope"), None);
}

#[test]
fn status_for_auth_band() {
    assert_eq!(status_for(ErrorCode::AuthUnauthorized.as_u32()), 401);
    assert_eq!(status_for(ErrorCode::AuthSessionExpired.as_u32()), 401);
    assert_eq!(status_for(ErrorCode::AuthInvalidCredentials.as_u32()), 401);
    assert_eq!(status_for(ErrorCode::AuthForbidden.as_u32()), 403);
    assert_eq!(status_for(ErrorCode::AuthCsrfInvalid.as_u32()), 403);
    assert_eq!(status_for(ErrorCode::AuthTooManyAttempts.as_u32()), 429);
    // Unlisted auth-band numbers default to 401
    assert_eq!(status_for(2500), 401);
}

#[test]
fn status_for_validation_band_is_always_400() {
    for code in ErrorCode::ALL
        .iter()
        .filter(|c| c.band() == ErrorBand::Validation)
    {
        assert_eq!(status_for(code.as_u32()), 400, "{}", code);
    }
    assert_eq!(status_for(6999), 400);
}

#[test]
fn status_for_like_codes() {
    assert_eq!(status_for(ErrorCode::FsNotFound.as_u32()), 404);
    assert_eq!(status_for(ErrorCode::NotFound.as_u32()), 404);
    assert_eq!(status_for(ErrorCode::NetworkTimeout.as_u32()), 408);
    assert_eq!(status_for(ErrorCode::DbTimeout.as_u32()), 408);
    assert_eq!(status_for(ErrorCode::ServicePortConflict.as_u32()), 409);
    assert_eq!(status_for(ErrorCode::NetworkRateLimited.as_u32()), 429);
    assert_eq!(status_for(ErrorCode::DockerNotRunning.as_u32()), 503);
    assert_eq!(status_for(ErrorCode::Internal.as_u32()), 500);
    assert_eq!(status_for(ErrorCode::ProjectBuildFailed.as_u32()), 500);
    assert_eq!(status_for(0), 500);
}

#[test]
fn http_status_table() {
    assert_eq!(ErrorCode::from_http_status(400), ErrorCode::ValidationInvalidInput);
    assert_eq!(ErrorCode::from_http_status(401), ErrorCode::AuthUnauthorized);
    assert_eq!(ErrorCode::from_http_status(403), ErrorCode::AuthForbidden);
    assert_eq!(ErrorCode::from_http_status(404), ErrorCode::NotFound);
    assert_eq!(ErrorCode::from_http_status(408), ErrorCode::NetworkTimeout);
    assert_eq!(ErrorCode::from_http_status(409), ErrorCode::ValidationDuplicateKey);
    assert_eq!(ErrorCode::from_http_status(429), ErrorCode::NetworkRateLimited);
    assert_eq!(ErrorCode::from_http_status(503), ErrorCode::DockerNotRunning);
    assert_eq!(ErrorCode::from_http_status(500), ErrorCode::Internal);
    assert_eq!(ErrorCode::from_http_status(418), ErrorCode::Internal);
}

proptest! {
    #[test]
    fn band_membership_is_unique(code in 0u32..120_000) {
        let owners = ErrorBand::ALL.iter().filter(|b| b.includes(code)).count();
        prop_assert!(owners <= 1);
        prop_assert_eq!(owners == 1, ErrorBand::of(code).is_some());
    }

    #[test]
    fn status_for_is_total(code in any::<u32>()) {
        let status = status_for(code);
        prop_assert!((400..600).contains(&status));
    }
}
