//! Outbound call choreography: two channels wired back-to-back, each side
//! dispatching the other's requests and routing completions home.

use crate::init_tracing;
use interop_dispatch::codec::{encode_failure, encode_success};
use interop_dispatch::{
    CallChannel, ChannelConfig, DispatchError, ErrorKind, InvocationInfo, InvocationResult,
    MethodDescriptor, MpscTransport, OperationTable, ParamType,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

fn empty_channel() -> (CallChannel, mpsc::UnboundedReceiver<String>) {
    init_tracing();
    let (transport, rx) = MpscTransport::pair();
    let channel = CallChannel::new(
        ChannelConfig::default(),
        Arc::new(OperationTable::new()),
        Arc::new(transport),
    )
    .unwrap();
    (channel, rx)
}

/// Split an outbound call request message into its invocation info and the
/// raw argument payload, the way a receiving dispatcher would.
fn split_request(raw: &str) -> (InvocationInfo, String) {
    let envelope: Value = serde_json::from_str(raw).unwrap();
    let info: InvocationInfo = serde_json::from_value(envelope.clone()).unwrap();
    let args = envelope["args"].to_string();
    (info, args)
}

#[tokio::test]
async fn round_trip_between_two_channels() {
    init_tracing();

    // Side B exposes the operation side A will call.
    let mut table_b = OperationTable::new();
    table_b.register_static(
        "text",
        "Upper",
        MethodDescriptor::immediate([ParamType::Text], |_, args| {
            Ok(Some(json!(args[0].as_str().unwrap().to_uppercase())))
        }),
    );

    let (transport_a, mut wire_a) = MpscTransport::pair();
    let channel_a = Arc::new(
        CallChannel::new(
            ChannelConfig::default(),
            Arc::new(OperationTable::new()),
            Arc::new(transport_a),
        )
        .unwrap(),
    );
    let (transport_b, _wire_b) = MpscTransport::pair();
    let channel_b = CallChannel::new(
        ChannelConfig::default(),
        Arc::new(table_b),
        Arc::new(transport_b),
    )
    .unwrap();

    // Pump A's outbound request through B and feed the completion back.
    let pump = {
        let channel_a = Arc::clone(&channel_a);
        tokio::spawn(async move {
            let raw = wire_a.recv().await.unwrap();
            let (mut info, args) = split_request(&raw);
            // B resolves against its own registration scope
            info.caller_context_id = Some("text".into());
            let correlation_id = info.correlation_id.clone().unwrap();

            let completion = match channel_b.invoke_sync(&info, &args) {
                InvocationResult::Success(value) => encode_success(&correlation_id, value),
                InvocationResult::Failure(error) => encode_failure(&correlation_id, &error),
            };
            channel_a.complete_outbound(&completion).unwrap();
        })
    };

    let result = channel_a.call("Upper", &[json!("quiet")], None).await;
    pump.await.unwrap();

    assert_eq!(result, InvocationResult::Success(Some(json!("QUIET"))));
    assert_eq!(channel_a.pending_count(), 0);
}

#[tokio::test]
async fn remote_failure_comes_back_tagged() {
    let (channel, mut wire) = empty_channel();
    let channel = Arc::new(channel);

    let pump = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            let (info, _args) = split_request(&wire.recv().await.unwrap());
            let correlation_id = info.correlation_id.unwrap();
            let error = DispatchError::method_not_found("remote", "Nope");
            channel
                .complete_outbound(&encode_failure(&correlation_id, &error))
                .unwrap();
        })
    };

    let result = channel.call("Nope", &[], None).await;
    pump.await.unwrap();

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::MethodNotFound);
    assert!(failure.message.contains("Nope"));
}

#[tokio::test]
async fn completion_for_unissued_call_is_a_protocol_violation() {
    let (channel, _wire) = empty_channel();

    let err = channel
        .complete_outbound(r#"["ghost", true, null]"#)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownCorrelationId);
}

#[tokio::test]
async fn duplicate_completion_never_overwrites() {
    let (channel, _wire) = empty_channel();

    let (correlation_id, rx) = channel.issue_call("Ask", &[], None).await.unwrap();
    let id = correlation_id.as_str();

    channel
        .complete_outbound(&format!(r#"["{id}", true, "first"]"#))
        .unwrap();
    let err = channel
        .complete_outbound(&format!(r#"["{id}", true, "second"]"#))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownCorrelationId);

    assert_eq!(
        rx.await.unwrap(),
        InvocationResult::Success(Some(json!("first")))
    );
}

#[tokio::test]
async fn integer_correlation_id_matches_string_registration() {
    let (channel, _wire) = empty_channel();

    // A peer that sends numeric ids still routes, via canonicalization,
    // as long as the pending id has the same decimal form.
    let err = channel.complete_outbound(r#"[42, true, null]"#).unwrap_err();
    // Nothing pending under "42": reported, not dropped.
    assert_eq!(err.kind, ErrorKind::UnknownCorrelationId);
    assert!(err.message.contains("42"));
}

#[tokio::test]
async fn unanswered_call_times_out() {
    let (channel, _wire) = empty_channel();

    let result = timeout(
        Duration::from_secs(2),
        channel.call("Ask", &[], Some(Duration::from_millis(20))),
    )
    .await
    .unwrap();

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::InvocationFailure);
    assert!(failure.message.contains("timed out"));
    assert_eq!(channel.pending_count(), 0);
}

#[tokio::test]
async fn sweeper_drops_expired_pending_calls() {
    init_tracing();
    let (transport, _wire) = MpscTransport::pair();
    let config = ChannelConfig {
        call_timeout: Duration::from_millis(10),
        sweep_interval: Duration::from_millis(10),
        ..Default::default()
    };
    let channel = CallChannel::new(config, Arc::new(OperationTable::new()), Arc::new(transport))
        .unwrap();

    let (_id, _rx) = channel.issue_call("Ask", &[], None).await.unwrap();
    assert_eq!(channel.pending_count(), 1);

    let sweeper = channel.spawn_pending_sweeper();
    timeout(Duration::from_secs(2), async {
        while channel.pending_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("sweeper never dropped the expired call");
    sweeper.abort();
}
