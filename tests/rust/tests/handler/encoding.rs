//! Text and JSON output through a fan-out handler

use mlogger::{Attr, Handler, HandlerOptions, JsonHandler, Level, MultiHandler, SharedHandler, TextHandler};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tests::{fixtures, SharedBuffer};

#[test]
fn test_groups_render_per_encoding() {
    let console = SharedBuffer::new();
    let file = SharedBuffer::new();
    let multi = MultiHandler::new(vec![
        Arc::new(TextHandler::new(console.clone(), HandlerOptions::default())) as SharedHandler,
        Arc::new(JsonHandler::new(file.clone(), HandlerOptions::default())) as SharedHandler,
    ]);

    let handler = multi
        .with_attrs(&[Attr::new("service", "billing")])
        .with_group("request")
        .with_attrs(&[Attr::new("id", "r-1")]);
    let record = fixtures::record(Level::Warn, "slow request").with_attrs([
        Attr::new("elapsed", Duration::from_millis(250)),
        Attr::group("client", vec![Attr::new("ip", "10.0.0.1")]),
    ]);

    handler.handle(&record).unwrap();

    assert_eq!(
        console.contents(),
        "time=2024-05-17T08:00:00.000Z level=WARN msg=\"slow request\" service=billing request.id=r-1 request.elapsed=250ms request.client.ip=10.0.0.1\n"
    );
    assert_eq!(
        file.json_lines(),
        vec![json!({
            "time": "2024-05-17T08:00:00.000Z",
            "level": "WARN",
            "msg": "slow request",
            "service": "billing",
            "request": {
                "id": "r-1",
                "elapsed": 250_000_000u64,
                "client": {"ip": "10.0.0.1"},
            },
        })]
    );
}

#[test]
fn test_json_keeps_attribute_order() {
    let file = SharedBuffer::new();
    let handler = JsonHandler::new(file.clone(), HandlerOptions::default());

    handler
        .handle(&fixtures::record(Level::Info, "m").with_attrs([
            Attr::new("zeta", 1),
            Attr::new("alpha", 2),
        ]))
        .unwrap();

    assert_eq!(
        file.contents(),
        "{\"time\":\"2024-05-17T08:00:00.000Z\",\"level\":\"INFO\",\"msg\":\"m\",\"zeta\":1,\"alpha\":2}\n"
    );
}

#[test]
fn test_json_keeps_record_fields_over_colliding_attributes() {
    let file = SharedBuffer::new();
    let handler = JsonHandler::new(file.clone(), HandlerOptions::default());

    handler
        .handle(&fixtures::record(Level::Error, "payment failed").with_attrs([
            Attr::new("msg", "user supplied"),
            Attr::new("level", "debug"),
        ]))
        .unwrap();

    let line = &file.json_lines()[0];
    assert_eq!(line["msg"], "payment failed");
    assert_eq!(line["level"], "ERROR");
    assert_eq!(line["msg#2"], "user supplied");
    assert_eq!(line["level#2"], "debug");
}

#[test]
fn test_group_sharing_a_key_with_an_attribute_loses_nothing() {
    let console = SharedBuffer::new();
    let file = SharedBuffer::new();
    let multi = MultiHandler::new(vec![
        Arc::new(TextHandler::new(console.clone(), HandlerOptions::default())) as SharedHandler,
        Arc::new(JsonHandler::new(file.clone(), HandlerOptions::default())) as SharedHandler,
    ]);

    multi
        .with_attrs(&[Attr::new("req", "r-1")])
        .with_group("req")
        .handle(&fixtures::record(Level::Info, "m").with_attrs([Attr::new("status", 200)]))
        .unwrap();

    assert!(console.contents().contains("req=r-1 req.status=200"));
    assert_eq!(
        file.json_lines(),
        vec![json!({
            "time": "2024-05-17T08:00:00.000Z",
            "level": "INFO",
            "msg": "m",
            "req": "r-1",
            "req#2": {"status": 200},
        })]
    );
}
