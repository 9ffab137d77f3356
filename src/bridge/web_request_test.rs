use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use mockall::predicate::eq;

use super::*;
use crate::test_utils::completion_config;
use crate::test_utils::enable_logger;
use crate::test_utils::test_pool;
use crate::Error;

fn sequential_manager() -> MockWebRequestManager {
    let next = AtomicI32::new(1);
    let mut manager = MockWebRequestManager::new();
    manager
        .expect_add_web_request()
        .returning(move |_, _, _, _| next.fetch_add(1, Ordering::SeqCst));
    manager
}

fn bridge_over(manager: MockWebRequestManager) -> WebRequestBridge<MockWebRequestManager> {
    WebRequestBridge::new(
        Arc::new(manager),
        test_pool(),
        &completion_config(ReleasePolicy::Batched),
    )
}

#[tokio::test]
async fn test_add_web_request_passes_defaults_to_manager() {
    enable_logger();
    let mut manager = MockWebRequestManager::new();
    manager
        .expect_add_web_request()
        .withf(|uri, post_data, tag, priority| {
            uri.ends_with("/scores")
                && post_data.as_deref() == Some(&b"score=10"[..])
                && tag.is_none()
                && *priority == 0
        })
        .times(1)
        .returning(|_, _, _, _| 42);
    let bridge = bridge_over(manager);

    let future = bridge
        .add_web_request_async("https://game.example/scores", Some(b"score=10".to_vec()), None)
        .unwrap();
    assert_eq!(future.serial_id(), 42);

    assert!(bridge.handle_success(WebRequestSuccessEvent {
        serial_id: 42,
        web_request_uri: "https://game.example/scores".to_string(),
        response_bytes: b"ok".to_vec(),
    }));

    let result = future.await.unwrap();
    assert!(!result.is_error());
    assert_eq!(result.bytes(), Some(&b"ok"[..]));
}

#[tokio::test]
async fn test_failure_event_resolves_with_error_result() {
    let bridge = bridge_over(sequential_manager());
    let future = bridge
        .add_web_request_async("https://game.example/missing", None, Some(Arc::new(7u16)))
        .unwrap();

    assert!(bridge.handle_failure(WebRequestFailureEvent {
        serial_id: future.serial_id(),
        web_request_uri: "https://game.example/missing".to_string(),
        error_message: "HTTP 404".to_string(),
    }));

    let result = future.await.unwrap();
    assert!(result.is_error());
    assert_eq!(result.error_message(), "HTTP 404");
    assert!(result.bytes().is_none());
    assert_eq!(result.user_data_as::<u16>(), Some(&7));
}

#[tokio::test]
async fn test_events_for_other_managers_are_ignored() {
    let bridge = bridge_over(sequential_manager());
    let future = bridge.add_web_request_async("https://a", None, None).unwrap();

    assert!(!bridge.handle_success(WebRequestSuccessEvent {
        serial_id: 1000,
        web_request_uri: "https://elsewhere".to_string(),
        response_bytes: vec![],
    }));
    assert_eq!(bridge.completion().outstanding(), 1);

    bridge.handle_success(WebRequestSuccessEvent {
        serial_id: future.serial_id(),
        web_request_uri: "https://a".to_string(),
        response_bytes: vec![1],
    });
    assert!(future.await.is_ok());
}

#[tokio::test]
async fn test_remove_web_request_abandons_future() {
    let mut manager = sequential_manager();
    manager.expect_remove_web_request().with(eq(1)).times(1).returning(|_| true);
    manager.expect_remove_web_request().with(eq(2)).times(1).returning(|_| false);
    let bridge = bridge_over(manager);

    let removed = bridge.add_web_request_async("https://a", None, None).unwrap();
    let kept = bridge.add_web_request_async("https://b", None, None).unwrap();

    assert!(bridge.remove_web_request(1));
    // the manager no longer knows id 2, the bridge keeps waiting
    assert!(!bridge.remove_web_request(2));

    assert!(matches!(
        removed.await,
        Err(Error::Bridge(BridgeError::Abandoned { serial_id: 1 }))
    ));
    assert!(bridge.completion().is_outstanding(kept.serial_id()));
}

#[tokio::test]
async fn test_remove_all_web_requests_abandons_every_future() {
    let mut manager = sequential_manager();
    manager.expect_remove_all_web_requests().times(1).returning(|| 2);
    let bridge = bridge_over(manager);

    let f1 = bridge.add_web_request_async("https://a", None, None).unwrap();
    let f2 = bridge.add_web_request_async("https://b", None, None).unwrap();

    assert_eq!(bridge.remove_all_web_requests(), 2);
    assert!(f1.await.is_err());
    assert!(f2.await.is_err());
    assert_eq!(bridge.completion().outstanding(), 0);
}

#[test]
fn test_manager_properties_are_forwarded() {
    let mut manager = MockWebRequestManager::new();
    manager.expect_waiting_task_count().returning(|| 3);
    manager.expect_timeout().returning(|| Duration::from_secs(30));
    manager
        .expect_set_timeout()
        .with(eq(Duration::from_secs(5)))
        .times(1)
        .return_const(());
    let bridge = bridge_over(manager);

    assert_eq!(bridge.waiting_task_count(), 3);
    assert_eq!(bridge.timeout(), Duration::from_secs(30));
    bridge.set_timeout(Duration::from_secs(5));
}

#[tokio::test]
async fn test_shutdown_refuses_new_requests() {
    let mut manager = MockWebRequestManager::new();
    manager.expect_add_web_request().times(0);
    let bridge = bridge_over(manager);

    bridge.shutdown();

    assert!(matches!(
        bridge.add_web_request_async("https://a", None, None),
        Err(Error::Bridge(BridgeError::ShutDown))
    ));
}
