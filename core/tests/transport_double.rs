//! Client behavior observed through in-process transport doubles.

use std::cell::RefCell;

use yupdates_core::{
    ApiError, AssociatedFile, HttpMethod, HttpRequest, HttpResponse, InputItem, ReadItemsOptions,
    Transport, TransportError, YupdatesClient,
};

const FEED_ID: &str = "0123456789abcdef0123456789abcdef0123456789abc";

/// Records every request and answers with a canned result.
struct Recording {
    requests: RefCell<Vec<HttpRequest>>,
    reply: Result<HttpResponse, TransportError>,
}

impl Recording {
    fn replying(status: u16, body: &str) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            reply: Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }),
        }
    }

    fn failing(err: TransportError) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            reply: Err(err),
        }
    }

    fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for Recording {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        self.reply.clone()
    }
}

/// Answers 200 with the request body.
struct Echo;

impl Transport for Echo {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: request.body.unwrap_or_default(),
        })
    }
}

fn client<T: Transport>(transport: T) -> YupdatesClient<T> {
    YupdatesClient::with_transport("token-1", "http://feeds.test/api", false, transport)
}

#[test]
fn validation_failures_never_reach_the_transport() {
    let c = client(Recording::replying(200, "{}"));

    let cases = [
        ("short", ReadItemsOptions::default()),
        ("", ReadItemsOptions::default()),
        (FEED_ID, ReadItemsOptions::default().max_items(0)),
        (FEED_ID, ReadItemsOptions::default().max_items(51)),
        (
            FEED_ID,
            ReadItemsOptions::default()
                .include_item_content(true)
                .max_items(20),
        ),
        (
            FEED_ID,
            ReadItemsOptions::default()
                .item_time_after(1661564013555u64)
                .item_time_before("1661564013999"),
        ),
        (FEED_ID, ReadItemsOptions::default().item_time_after(10_000_000_000_000u64)),
        (FEED_ID, ReadItemsOptions::default().item_time_before("5.100000")),
    ];
    for (feed_id, options) in &cases {
        let err = c.read_items(feed_id, options).unwrap_err();
        assert!(err.is_validation(), "{feed_id:?} {options:?}: {err}");
    }

    assert_eq!(c.transport().calls(), 0);
}

#[test]
fn empty_submission_makes_no_call() {
    let c = client(Recording::replying(200, "{}"));
    assert!(c.new_items(&[]).unwrap().is_none());
    assert_eq!(c.transport().calls(), 0);

    let quiet = YupdatesClient::with_transport("t", "http://x", true, Recording::replying(200, "{}"));
    assert!(quiet.new_items(&[]).unwrap().is_none());
    assert_eq!(quiet.transport().calls(), 0);
}

#[test]
fn every_request_carries_the_token() {
    let c = client(Recording::replying(200, r#"{"feed_items":[]}"#));
    c.ping().unwrap();
    c.new_items(&[InputItem::new("t", "c", "u")]).unwrap();
    c.read_items(FEED_ID, &ReadItemsOptions::default()).unwrap();

    let requests = c.transport().requests.borrow();
    assert_eq!(requests.len(), 3);
    for req in requests.iter() {
        assert_eq!(req.header("X-Auth-Token"), Some("token-1"));
    }
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].url, "http://feeds.test/api/ping/");
    assert_eq!(requests[1].method, HttpMethod::Post);
    assert_eq!(requests[1].url, "http://feeds.test/api/items/");
    assert_eq!(
        requests[2].url,
        format!("http://feeds.test/api/feeds/{FEED_ID}/?max_items=10&include_item_content=false")
    );
}

#[test]
fn associated_files_round_trip_through_echo() {
    let items = vec![
        InputItem::new("with file", "content", "https://example.com/post").with_associated_files(
            vec![AssociatedFile {
                url: "https://example.com/episode.mp3".to_string(),
                length: 73_400_320,
                type_str: "audio/mpeg".to_string(),
            }],
        ),
        InputItem::new("plain", "", "https://example.com/plain"),
    ];

    let echoed = client(Echo).new_items(&items).unwrap().unwrap();
    let back: Vec<InputItem> = serde_json::from_value(echoed["items"].clone()).unwrap();
    assert_eq!(back, items);
}

#[test]
fn non_2xx_is_reported_with_status_and_body() {
    let c = client(Recording::replying(429, "throttled"));
    let err = c.new_items(&[InputItem::new("t", "c", "u")]).unwrap_err();
    match err {
        ApiError::Transport(TransportError::Status { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, "throttled");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(c.transport().calls(), 1);
}

#[test]
fn ping_bool_is_false_on_any_failure() {
    let network = client(Recording::failing(TransportError::Network("timed out".to_string())));
    assert!(!network.ping_bool());

    let server_error = client(Recording::replying(500, "boom"));
    assert!(!server_error.ping_bool());

    let not_json = client(Recording::replying(200, "<html>"));
    assert!(!not_json.ping_bool());

    let fine = client(Recording::replying(200, r#"{"message":"pong"}"#));
    assert!(fine.ping_bool());
}

#[test]
fn unexpected_field_in_feed_items_is_rejected() {
    let body = format!(
        r#"{{"feed_items":[{{"feed_id":"{FEED_ID}","item_id":"i","input_id":"n","title":"t",
        "content":"","canonical_url":"u","item_time":"0000000000001.00000","item_time_ms":1,
        "deleted":false,"score":0.5}}]}}"#
    );
    let c = client(Recording::replying(200, &body));
    let err = c
        .read_items(FEED_ID, &ReadItemsOptions::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::Deserialization(_)));
}
