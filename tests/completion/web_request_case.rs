use std::sync::Arc;
use std::thread;

use futures::future::join_all;
use ugf_bridge::CompletionConfig;
use ugf_bridge::CompletionResult;
use ugf_bridge::PoolConfig;
use ugf_bridge::ReferencePool;
use ugf_bridge::ReleasePolicy;
use ugf_bridge::WebRequestBridge;
use ugf_bridge::WebRequestFailureEvent;
use ugf_bridge::WebRequestSuccessEvent;
use ugf_bridge::WebResult;

use crate::commons::ScriptedWebRequestManager;
use crate::enable_logger;

/// # Case: manager events arrive from a transport thread, in reverse order
///
/// ## Expected
/// - every future resolves with its own outcome
/// - failures resolve as error results, not as errors
/// - once everything is consumed, no result is left checked out of the pool
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_requests_completed_from_transport_thread() {
    enable_logger();
    let manager = ScriptedWebRequestManager::new();
    let pool = Arc::new(ReferencePool::new(PoolConfig::default()));
    let bridge = Arc::new(WebRequestBridge::new(
        manager.clone(),
        pool.clone(),
        &CompletionConfig {
            release_policy: ReleasePolicy::Batched,
        },
    ));

    let futures: Vec<_> = (0..20)
        .map(|i| {
            bridge
                .add_web_request_async(&format!("https://game.example/item/{i}"), None, Some(Arc::new(i)))
                .unwrap()
        })
        .collect();
    assert_eq!(bridge.waiting_task_count(), 20);

    let serial_ids: Vec<_> = futures.iter().map(|f| f.serial_id()).collect();
    let transport = {
        let bridge = bridge.clone();
        let manager = manager.clone();
        thread::spawn(move || {
            for serial_id in serial_ids.into_iter().rev() {
                let uri = manager.finish(serial_id).unwrap();
                if serial_id % 5 == 0 {
                    bridge.handle_failure(WebRequestFailureEvent {
                        serial_id,
                        web_request_uri: uri,
                        error_message: "HTTP 503".to_string(),
                    });
                } else {
                    let body = uri.into_bytes();
                    bridge.handle_success(WebRequestSuccessEvent {
                        serial_id,
                        web_request_uri: String::new(),
                        response_bytes: body,
                    });
                }
            }
        })
    };
    transport.join().unwrap();

    let results = join_all(futures).await;
    for (i, result) in results.iter().enumerate() {
        let result = result.as_ref().unwrap();
        let index = *result.user_data_as::<i32>().unwrap();
        assert_eq!(index as usize, i);
        if result.is_error() {
            assert_eq!(result.error_message(), "HTTP 503");
        } else {
            let body = String::from_utf8(result.bytes().unwrap().to_vec()).unwrap();
            assert_eq!(body, format!("https://game.example/item/{i}"));
        }
    }
    assert_eq!(results.iter().filter(|r| r.as_ref().unwrap().is_error()).count(), 4);
    assert_eq!(bridge.completion().outstanding(), 0);

    drop(results);
    let info = pool.info_of::<WebResult>().unwrap();
    assert_eq!(info.using_count, 0);
    assert_eq!(info.unused_count, 20);
}

/// # Case: a caller keeps a result across later operations
///
/// ## Expected
/// - the kept result stays intact after the bridge releases its batch
/// - the pool slot is only recycled after the caller lets go
#[tokio::test]
async fn test_kept_result_outlives_batch() {
    enable_logger();
    let manager = ScriptedWebRequestManager::new();
    let pool = Arc::new(ReferencePool::default());
    let bridge = WebRequestBridge::new(manager.clone(), pool.clone(), &CompletionConfig::default());

    let first = bridge.add_web_request_async("https://game.example/a", None, None).unwrap();
    let first_id = first.serial_id();
    assert_eq!(manager.uri_of(first_id).as_deref(), Some("https://game.example/a"));
    bridge.handle_success(WebRequestSuccessEvent {
        serial_id: first_id,
        web_request_uri: "https://game.example/a".to_string(),
        response_bytes: b"alpha".to_vec(),
    });
    let kept = first.await.unwrap();

    for round in 0..3 {
        let next = bridge.add_web_request_async("https://game.example/b", None, None).unwrap();
        bridge.handle_failure(WebRequestFailureEvent {
            serial_id: next.serial_id(),
            web_request_uri: "https://game.example/b".to_string(),
            error_message: format!("round {round}"),
        });
        let result = next.await.unwrap();
        assert!(result.is_error());
        assert_eq!(kept.bytes(), Some(&b"alpha"[..]));
    }

    assert_eq!(pool.info_of::<WebResult>().unwrap().using_count, 1);
    drop(kept);
    assert_eq!(pool.info_of::<WebResult>().unwrap().using_count, 0);
}
