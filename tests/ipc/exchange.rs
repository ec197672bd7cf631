use super::support::{HelperOptions, fake_helper, spawn_helper};
use futures_util::future::join_all;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use szcontext::error::{ErrorKind, IpcError};
use szcontext::ipc::{
    FailureReason, HelperFrame, IpcCoordinator, LaunchRequest, LaunchResponse, RequesterFrame,
};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn duplicate_response_is_discarded() {
    let (_dir, endpoint, helper) = fake_helper(Duration::from_secs(2), |mut framed| async move {
        let Some(Ok(RequesterFrame::Launch(first))) = framed.next().await else {
            panic!("expected first launch");
        };
        framed
            .send(HelperFrame::Response(LaunchResponse::success(first.token)))
            .await
            .unwrap();
        framed
            .send(HelperFrame::Response(LaunchResponse::failure(
                first.token,
                FailureReason::UnknownCapability {
                    identifier: first.capability.clone(),
                },
            )))
            .await
            .unwrap();

        let Some(Ok(RequesterFrame::Launch(second))) = framed.next().await else {
            panic!("expected second launch");
        };
        framed
            .send(HelperFrame::Response(LaunchResponse::success(second.token)))
            .await
            .unwrap();
    });

    let coordinator = IpcCoordinator::connect(&endpoint).await.unwrap();
    let first = coordinator
        .send(LaunchRequest::new("com.apple.Terminal", "/tmp/a"))
        .await
        .unwrap();
    assert!(first.is_success());

    let request = LaunchRequest::new("com.apple.Terminal", "/tmp/b");
    let token = request.token;
    let second = coordinator.send(request).await.unwrap();
    assert_eq!(second.token, token);
    assert!(second.is_success());

    helper.await.unwrap();
}

#[tokio::test]
async fn silent_helper_times_out_and_late_reply_is_ignored() {
    let (_dir, endpoint, helper) =
        fake_helper(Duration::from_millis(200), |mut framed| async move {
            let Some(Ok(RequesterFrame::Launch(slow))) = framed.next().await else {
                panic!("expected launch");
            };
            tokio::time::sleep(Duration::from_millis(400)).await;
            framed
                .send(HelperFrame::Response(LaunchResponse::success(slow.token)))
                .await
                .unwrap();

            let Some(Ok(RequesterFrame::Launch(next))) = framed.next().await else {
                panic!("expected second launch");
            };
            framed
                .send(HelperFrame::Response(LaunchResponse::failure(
                    next.token,
                    FailureReason::UnknownCapability {
                        identifier: next.capability.clone(),
                    },
                )))
                .await
                .unwrap();
        });

    let coordinator = IpcCoordinator::connect(&endpoint).await.unwrap();
    let err = coordinator
        .send(LaunchRequest::new("com.apple.Terminal", "/tmp/a"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TimedOut);

    // Let the late success arrive before the next request goes out.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let response = coordinator
        .send(LaunchRequest::new("com.unknown.editor", "/tmp/b"))
        .await
        .unwrap();
    assert!(!response.is_success());

    helper.await.unwrap();
}

#[tokio::test]
async fn dropped_channel_is_connection_lost() {
    let (_dir, endpoint, helper) = fake_helper(Duration::from_secs(2), |mut framed| async move {
        let _ = framed.next().await;
        drop(framed);
    });

    let coordinator = IpcCoordinator::connect(&endpoint).await.unwrap();
    let err = coordinator
        .send(LaunchRequest::new("com.apple.Terminal", "/tmp/a"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionLost);

    helper.await.unwrap();
    assert!(!coordinator.is_connected().await);
    let err = coordinator
        .send(LaunchRequest::new("com.apple.Terminal", "/tmp/a"))
        .await
        .unwrap_err();
    assert!(matches!(err, IpcError::ConnectionLost { .. }));
}

#[tokio::test]
async fn cancellation_abandons_locally() {
    let (_dir, endpoint, helper) = fake_helper(Duration::from_secs(5), |mut framed| async move {
        let _ = framed.next().await;
        tokio::time::sleep(Duration::from_millis(200)).await;
    });

    let coordinator = IpcCoordinator::connect(&endpoint).await.unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = coordinator
        .send_cancellable(LaunchRequest::new("com.apple.Terminal", "/tmp/a"), cancel)
        .await
        .unwrap_err();
    match err {
        IpcError::TimedOut { after } => assert!(after < Duration::from_secs(5)),
        other => panic!("expected local timeout, got {other:?}"),
    }

    helper.await.unwrap();
}

#[tokio::test]
async fn concurrent_requests_get_their_own_responses() {
    let helper = spawn_helper(HelperOptions::default());
    let coordinator = IpcCoordinator::connect(&helper.endpoint).await.unwrap();

    let requests: Vec<_> = (0..8)
        .map(|i| {
            let capability = if i % 2 == 0 {
                "com.apple.Terminal"
            } else {
                "com.unknown.editor"
            };
            LaunchRequest::new(capability, format!("/tmp/{i}"))
        })
        .collect();
    let tokens: Vec<_> = requests.iter().map(|r| r.token).collect();

    let responses = join_all(requests.into_iter().map(|r| coordinator.send(r))).await;
    for (i, (response, token)) in responses.into_iter().zip(tokens).enumerate() {
        let response = response.unwrap();
        assert_eq!(response.token, token);
        assert_eq!(response.is_success(), i % 2 == 0);
    }
    assert_eq!(helper.launches(), 4);

    helper.stop().await;
}

#[tokio::test]
async fn reusing_an_in_flight_token_is_rejected() {
    let (_dir, endpoint, helper) = fake_helper(Duration::from_secs(2), |mut framed| async move {
        let Some(Ok(RequesterFrame::Launch(first))) = framed.next().await else {
            panic!("expected launch");
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        framed
            .send(HelperFrame::Response(LaunchResponse::success(first.token)))
            .await
            .unwrap();
    });

    let coordinator = IpcCoordinator::connect(&endpoint).await.unwrap();
    let request = LaunchRequest::new("com.apple.Terminal", "/tmp/a");
    let duplicate = request.clone();

    let (first, second) = tokio::join!(coordinator.send(request), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        coordinator.send(duplicate).await
    });
    assert!(first.unwrap().is_success());
    assert!(matches!(second, Err(IpcError::DuplicateToken { .. })));

    helper.await.unwrap();
}
