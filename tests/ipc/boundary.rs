use super::support::{CountingLauncher, HelperOptions, SERVICE, requester, spawn_helper};
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::time::Duration;
use szcontext::error::{ErrorKind, IpcError};
use szcontext::capabilities::CapabilityRegistry;
use szcontext::ipc::{
    Endpoint, FailureReason, HelperServer, IpcCoordinator, LaunchRequest, Outcome, RequestHandler,
    SystemLauncher,
};
use szcontext::version::Version;

#[tokio::test]
async fn missing_socket_is_service_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Endpoint::new(dir.path().join("helper.sock"), SERVICE);
    let err = IpcCoordinator::connect(&endpoint).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
}

#[tokio::test]
async fn service_name_must_match_exactly() {
    let helper = spawn_helper(HelperOptions::default());
    let mut endpoint = helper.endpoint.clone();
    endpoint.service_name = format!("{SERVICE}.other");

    let err = IpcCoordinator::connect(&endpoint).await.unwrap_err();
    assert!(matches!(err, IpcError::ServiceUnavailable { .. }));
    assert_eq!(helper.launches(), 0);

    helper.stop().await;
}

#[tokio::test]
async fn other_user_is_denied_at_transport() {
    let me = nix::unistd::getuid().as_raw();
    let helper = spawn_helper(HelperOptions {
        allowed_uid: Some(me.wrapping_add(1)),
        ..HelperOptions::default()
    });

    let err = IpcCoordinator::connect(&helper.endpoint).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
    assert_eq!(helper.launches(), 0);

    helper.stop().await;
}

#[tokio::test]
async fn raw_mismatched_request_never_reaches_launcher() {
    let helper = spawn_helper(HelperOptions::default());
    let coordinator = IpcCoordinator::connect(&helper.endpoint).await.unwrap();

    for version in [Version::new(0, 9), Version::new(2, 0), Version::new(9, 1)] {
        let request =
            LaunchRequest::new("com.apple.Terminal", "/Users/u/Projects").with_version(version);
        let response = coordinator.send(request).await.unwrap();
        assert!(matches!(
            response.outcome,
            Outcome::Failure {
                reason: FailureReason::ProtocolIncompatible { .. }
            }
        ));
    }
    assert_eq!(helper.launches(), 0);

    helper.stop().await;
}

#[tokio::test]
async fn helper_rejects_unknown_capability_sent_directly() {
    let helper = spawn_helper(HelperOptions::default());
    let coordinator = IpcCoordinator::connect(&helper.endpoint).await.unwrap();

    let response = coordinator
        .send(LaunchRequest::new("/bin/sh", "/Users/u/Projects"))
        .await
        .unwrap();
    let err = response.into_result().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownCapability);
    assert_eq!(helper.launches(), 0);

    helper.stop().await;
}

#[tokio::test]
async fn ping_reports_helper_version() {
    let helper = spawn_helper(HelperOptions {
        version: Version::new(1, 5),
        ..HelperOptions::default()
    });
    let requester = requester(&helper.endpoint, &[]);

    assert_eq!(requester.status().await.unwrap(), Version::new(1, 5));

    helper.stop().await;
}

#[tokio::test]
async fn connection_is_reused_while_alive() {
    let helper = spawn_helper(HelperOptions::default());
    let requester = requester(&helper.endpoint, &["/Users/u/Projects"]);

    let first = requester.connect().await.unwrap();
    let second = requester.connect().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.helper_version(), szcontext::version::PROTOCOL_VERSION);

    helper.stop().await;
}

fn bind_at(socket: &std::path::Path) -> anyhow::Result<HelperServer<CountingLauncher>> {
    let handler =
        RequestHandler::new(CapabilityRegistry::builtin().unwrap(), CountingLauncher::default());
    HelperServer::bind(socket, SERVICE, handler)
}

#[tokio::test]
async fn leftover_socket_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("helper.sock");
    // Dropping a std listener leaves its socket file behind.
    drop(std::os::unix::net::UnixListener::bind(&socket).unwrap());
    assert!(socket.exists());

    let server = bind_at(&socket).unwrap();

    let mode = std::fs::metadata(&socket).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);

    let shutdown = tokio_util::sync::CancellationToken::new();
    let task = tokio::spawn(server.serve(shutdown.clone()));
    let endpoint = Endpoint::new(&socket, SERVICE).with_request_timeout(Duration::from_secs(2));
    assert!(IpcCoordinator::connect(&endpoint).await.is_ok());

    shutdown.cancel();
    task.await.unwrap().unwrap();
    assert!(!socket.exists());
}

#[tokio::test]
async fn regular_file_at_socket_path_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, b"version = \"1.1\"\n").unwrap();

    let err = bind_at(&path).err().unwrap();
    assert!(err.to_string().contains("not a socket"), "{err:#}");
    assert_eq!(std::fs::read(&path).unwrap(), b"version = \"1.1\"\n");
}

#[tokio::test]
async fn second_helper_does_not_take_over_live_socket() {
    let helper = spawn_helper(HelperOptions::default());

    let err = bind_at(&helper.endpoint.socket_path).err().unwrap();
    assert!(err.to_string().contains("already listening"), "{err:#}");

    let coordinator = IpcCoordinator::connect(&helper.endpoint).await.unwrap();
    assert_eq!(coordinator.ping().await.unwrap(), szcontext::version::PROTOCOL_VERSION);

    helper.stop().await;
}

#[tokio::test]
async fn long_running_launch_does_not_block_the_connection() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("helper.sock");
    let launcher = SystemLauncher::new(vec!["sleep".into(), "5".into()]);
    let handler = RequestHandler::new(CapabilityRegistry::builtin().unwrap(), launcher);
    let server = HelperServer::bind(&socket, SERVICE, handler).unwrap();
    let shutdown = tokio_util::sync::CancellationToken::new();
    let task = tokio::spawn(server.serve(shutdown.clone()));

    let endpoint = Endpoint::new(&socket, SERVICE).with_request_timeout(Duration::from_secs(2));
    let requester = requester(&endpoint, &["/Users/u/Projects"]);

    requester
        .open("net.kovidgoyal.kitty", "/Users/u/Projects/app")
        .await
        .unwrap();
    requester
        .open("com.apple.Terminal", "/Users/u/Projects/app")
        .await
        .unwrap();

    shutdown.cancel();
    task.await.unwrap().unwrap();
}
