use super::support::{HelperOptions, requester, spawn_helper};
use szcontext::error::{ErrorKind, IpcError, RequestError, SzError};
use szcontext::version::Version;

#[tokio::test]
async fn eligible_path_and_known_editor_succeeds() {
    let helper = spawn_helper(HelperOptions::default());
    let requester = requester(&helper.endpoint, &["/Users/u/Projects"]);

    assert!(requester.is_eligible("/Users/u/Projects/app/src"));
    requester
        .open("com.microsoft.VSCode", "/Users/u/Projects/app/src")
        .await
        .unwrap();
    assert_eq!(helper.launches(), 1);

    helper.stop().await;
}

#[tokio::test]
async fn path_outside_roots_never_builds_a_request() {
    let helper = spawn_helper(HelperOptions::default());
    let requester = requester(&helper.endpoint, &["/Users/u/Projects"]);

    assert!(!requester.is_eligible("/Users/u/Downloads/app"));
    assert!(matches!(
        requester.build_request("com.microsoft.VSCode", "/Users/u/Downloads/app"),
        Err(RequestError::PathNotEligible { .. })
    ));
    let err = requester
        .open("com.microsoft.VSCode", "/Users/u/Downloads/app")
        .await
        .unwrap_err();
    assert!(matches!(err, SzError::Request(RequestError::PathNotEligible { .. })));
    assert_eq!(helper.launches(), 0);

    helper.stop().await;
}

#[tokio::test]
async fn unknown_capability_is_rejected_before_transmission() {
    let helper = spawn_helper(HelperOptions::default());
    let requester = requester(&helper.endpoint, &["/Users/u/Projects"]);

    let err = requester
        .open("com.unknown.editor", "/Users/u/Projects/app")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SzError::Request(RequestError::UnknownCapability { .. })
    ));
    assert_eq!(err.kind(), Some(ErrorKind::UnknownCapability));
    assert_eq!(helper.launches(), 0);

    helper.stop().await;
}

#[tokio::test]
async fn major_version_mismatch_is_incompatible_with_zero_launches() {
    let helper = spawn_helper(HelperOptions {
        version: Version::new(2, 0),
        ..HelperOptions::default()
    });
    let requester = requester(&helper.endpoint, &["/Users/u/Projects"]);

    let err = requester
        .open("com.microsoft.VSCode", "/Users/u/Projects/app")
        .await
        .unwrap_err();
    match err {
        SzError::Ipc(IpcError::ProtocolIncompatible { requester, helper }) => {
            assert_eq!(requester, Version::new(1, 2));
            assert_eq!(helper, Version::new(2, 0));
        }
        other => panic!("expected protocol incompatibility, got {other:?}"),
    }
    assert_eq!(helper.launches(), 0);

    helper.stop().await;
}

#[tokio::test]
async fn launch_failure_is_reported_with_context() {
    let helper = spawn_helper(HelperOptions {
        fail_with: Some("Unable to find application".into()),
        ..HelperOptions::default()
    });
    let requester = requester(&helper.endpoint, &["/Users/u/Projects"]);

    let err = requester
        .open("com.apple.Terminal", "/Users/u/Projects")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::LaunchError));
    let text = err.to_string();
    assert!(text.contains("com.apple.Terminal"));
    assert!(text.contains("/Users/u/Projects"));
    assert!(text.contains("Unable to find application"));
    assert_eq!(helper.launches(), 1);

    helper.stop().await;
}

#[tokio::test]
async fn open_all_sends_one_request_per_path() {
    let helper = spawn_helper(HelperOptions::default());
    let requester = requester(&helper.endpoint, &["/Users/u/Projects"]);
    let paths = vec![
        "/Users/u/Projects/a".to_string(),
        "/Users/u/Downloads/b".to_string(),
        "/Users/u/Projects/c".to_string(),
    ];

    let results = requester.open_all("io.alacritty", &paths).await;
    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_ok());
    assert!(results[1].1.is_err());
    assert!(results[2].1.is_ok());
    assert_eq!(helper.launches(), 2);

    helper.stop().await;
}

#[tokio::test]
async fn url_scheme_goes_through_the_helper() {
    let helper = spawn_helper(HelperOptions::default());
    let requester = requester(&helper.endpoint, &["/Users/u/Projects"]);

    requester
        .open_url("szcontext://open?app=com.sublimetext.3&path=%2FUsers%2Fu%2FProjects%2Fapp")
        .await
        .unwrap();
    assert_eq!(helper.launches(), 1);

    helper.stop().await;
}
