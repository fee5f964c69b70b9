//! Inbound dispatch choreography: sync calls, instance lifecycle, async
//! completions.

use crate::init_tracing;
use interop_dispatch::codec::decode_completion;
use interop_dispatch::{
    CallChannel, ChannelConfig, CorrelationId, ErrorKind, InvocationInfo, InvocationResult,
    MethodDescriptor, MpscTransport, ObjectHandleId, OperationTable, ParamType, TargetError,
    DISPOSE_IDENTIFIER,
};
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

fn fixture_table() -> OperationTable {
    let mut table = OperationTable::new();

    table.register_static(
        "math",
        "Add",
        MethodDescriptor::immediate([ParamType::Integer, ParamType::Integer], |_, args| {
            Ok(Some(json!(
                args[0].as_i64().unwrap() + args[1].as_i64().unwrap()
            )))
        }),
    );

    table.register_static(
        "jobs",
        "Double",
        MethodDescriptor::deferred([ParamType::Integer], |_, args| {
            let n = args[0].as_i64().unwrap();
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(Some(json!(n * 2)))
            })
        }),
    );

    table.register_static(
        "jobs",
        "Explode",
        MethodDescriptor::deferred([] as [ParamType; 0], |_, _| {
            Box::pin(async { Err(TargetError::new("boom")) })
        }),
    );

    table.register_instance(
        "counter",
        "Increment",
        MethodDescriptor::immediate([] as [ParamType; 0], |receiver, _| {
            let counter = receiver.unwrap();
            let counter = counter.downcast_ref::<AtomicI64>().unwrap();
            Ok(Some(json!(counter.fetch_add(1, Ordering::SeqCst) + 1)))
        }),
    );

    table
}

fn channel_with_wire() -> (CallChannel, mpsc::UnboundedReceiver<String>) {
    init_tracing();
    let (transport, rx) = MpscTransport::pair();
    let channel = CallChannel::new(
        ChannelConfig::default(),
        Arc::new(fixture_table()),
        Arc::new(transport),
    )
    .unwrap();
    (channel, rx)
}

#[tokio::test]
async fn sync_add_returns_sum_and_sends_nothing() {
    let (channel, mut wire) = channel_with_wire();

    // No correlation id: the caller wants the result inline, not a
    // completion on the wire.
    let result = channel.invoke_sync(&InvocationInfo::static_call("math", "Add"), "[2, 3]");
    assert_eq!(result, InvocationResult::Success(Some(json!(5))));

    assert!(timeout(Duration::from_millis(50), wire.recv()).await.is_err());
}

#[tokio::test]
async fn instance_lifecycle_register_invoke_dispose() {
    let (channel, _wire) = channel_with_wire();

    let handle = channel.register_object(Arc::new(AtomicI64::new(0)), "counter");

    let result = channel.invoke_sync(&InvocationInfo::instance_call(handle, "Increment"), "[]");
    assert_eq!(result, InvocationResult::Success(Some(json!(1))));
    let result = channel.invoke_sync(&InvocationInfo::instance_call(handle, "Increment"), "[]");
    assert_eq!(result, InvocationResult::Success(Some(json!(2))));

    // Inbound disposal call produces no return value
    let result = channel.invoke_sync(
        &InvocationInfo::instance_call(handle, DISPOSE_IDENTIFIER),
        "[]",
    );
    assert_eq!(result, InvocationResult::Success(None));

    // The handle id is dead from here on
    let result = channel.invoke_sync(&InvocationInfo::instance_call(handle, "Increment"), "[]");
    assert_eq!(
        result.failure().unwrap().kind,
        ErrorKind::UnknownObjectReference
    );
}

#[tokio::test]
async fn unregistered_handle_fails_without_resolution() {
    let (channel, _wire) = channel_with_wire();

    let result = channel.invoke_sync(&InvocationInfo::instance_call(ObjectHandleId(7), "Add"), "[2, 3]");
    assert_eq!(
        result.failure().unwrap().kind,
        ErrorKind::UnknownObjectReference
    );
}

#[tokio::test]
async fn async_success_sends_exactly_one_completion() {
    let (channel, mut wire) = channel_with_wire();

    let info = InvocationInfo::static_call("jobs", "Double")
        .with_correlation(CorrelationId::from("job-1"));
    channel.begin_invoke(&info, "[21]").await;

    let raw = timeout(Duration::from_secs(1), wire.recv())
        .await
        .expect("no completion")
        .unwrap();
    let completion = decode_completion(&raw).unwrap();
    assert_eq!(completion.correlation_id, CorrelationId::from("job-1"));
    assert!(completion.success);
    assert_eq!(completion.payload, json!(42));

    assert!(timeout(Duration::from_millis(50), wire.recv()).await.is_err());
}

#[tokio::test]
async fn async_failure_reports_boom_exactly_once() {
    let (channel, mut wire) = channel_with_wire();

    let info = InvocationInfo::static_call("jobs", "Explode")
        .with_correlation(CorrelationId::from("job-2"));
    channel.begin_invoke(&info, "[]").await;

    let raw = timeout(Duration::from_secs(1), wire.recv())
        .await
        .expect("no completion")
        .unwrap();
    let completion = decode_completion(&raw).unwrap();
    assert_eq!(completion.correlation_id, CorrelationId::from("job-2"));
    assert!(!completion.success);
    assert_eq!(completion.payload["kind"], json!("InvocationFailure"));
    assert_eq!(completion.payload["message"], json!("boom"));

    assert!(timeout(Duration::from_millis(50), wire.recv()).await.is_err());
}

#[tokio::test]
async fn concurrent_async_calls_each_complete_once() {
    let (channel, mut wire) = channel_with_wire();
    let channel = Arc::new(channel);

    for i in 0..8 {
        let info = InvocationInfo::static_call("jobs", "Double")
            .with_correlation(CorrelationId::from(format!("c-{i}").as_str()));
        channel.begin_invoke(&info, &format!("[{i}]")).await;
    }

    let mut seen = std::collections::HashSet::new();
    for _ in 0..8 {
        let raw = timeout(Duration::from_secs(1), wire.recv())
            .await
            .expect("missing completion")
            .unwrap();
        let completion = decode_completion(&raw).unwrap();
        assert!(completion.success);
        // Completions may arrive in any order, but each id exactly once
        assert!(seen.insert(completion.correlation_id.as_str().to_string()));
    }
    assert_eq!(seen.len(), 8);

    assert!(timeout(Duration::from_millis(50), wire.recv()).await.is_err());
}

#[tokio::test]
async fn zero_param_call_accepts_garbage_payload() {
    init_tracing();
    let mut table = OperationTable::new();
    table.register_static(
        "sys",
        "Ping",
        MethodDescriptor::immediate([] as [ParamType; 0], |_, _| Ok(Some(json!("pong")))),
    );
    let (transport, _wire) = MpscTransport::pair();
    let channel = CallChannel::new(
        ChannelConfig::default(),
        Arc::new(table),
        Arc::new(transport),
    )
    .unwrap();

    // Not a well-formed empty array; the zero-parameter fast path must win.
    let result = channel.invoke_sync(&InvocationInfo::static_call("sys", "Ping"), "[");
    assert_eq!(result, InvocationResult::Success(Some(json!("pong"))));
}
