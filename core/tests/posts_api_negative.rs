//! Negative contract tests: validation failures and error statuses.
//!
//! Validation errors must be raised before anything is sent; error statuses
//! from the server are returned as ordinary responses.

mod common;

use api_client::{ApiClient, ApiError};
use common::{api_client, OrFail};
use serde_json::json;

#[test]
fn create_post_negative() {
    let client = api_client();

    let response = client
        .post("/invalid-endpoint", None, Some(&json!({})))
        .or_fail();
    assert_eq!(response.status, 404);

    let err = client
        .request("INVALID_METHOD", "/posts", None, None, Some(&json!({})))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidHttpMethod { .. }));
    assert_eq!(err.to_string(), "Invalid method: INVALID_METHOD");
}

#[test]
fn get_post_negative() {
    let client = api_client();

    let response = client.get("/posts/999", None, None).or_fail();
    assert_eq!(response.status, 404);
    assert_eq!(response.json::<serde_json::Value>().or_fail(), json!({}));

    let response = client.get("/invalid", None, None).or_fail();
    assert_eq!(response.status, 404);
}

#[test]
fn update_post_negative() {
    let client = api_client();
    let payload = json!({"id": 101, "title": "Wallie", "body": "This is not here"});

    let response = client.put("/posts/9990", None, Some(&payload)).or_fail();
    assert_eq!(response.status, 404);

    let response = client.put("/invalid", None, Some(&payload)).or_fail();
    assert_eq!(response.status, 404);

    // The posts item route does not accept POST.
    let response = client.post("/posts/1", None, Some(&payload)).or_fail();
    assert_eq!(response.status, 405);
}

#[test]
fn get_invalid_endpoint() {
    let client = api_client();
    let err = client.get("invalid_endpoint", None, None).unwrap_err();

    assert!(matches!(err, ApiError::InvalidEndpoint { ref endpoint } if endpoint == "invalid_endpoint"));
    assert!(err.to_string().contains("Invalid endpoint"));
}

#[test]
fn get_posts_invalid_parameter() {
    let base_url = api_client().base_url().to_string();
    let client = ApiClient::builder(&base_url)
        .allowed_params(["userId", "id"])
        .build();

    let err = client.get("/posts?invalid_param=1", None, None).unwrap_err();
    assert!(matches!(
        err,
        ApiError::InvalidRequestParameter { ref parameter, .. } if parameter == "invalid_param"
    ));

    let response = client.get("/posts?userId=1", None, None).or_fail();
    assert_eq!(response.status, 200);
}

#[test]
fn bad_post_id_is_400() {
    let client = api_client();
    let response = client.get("/posts/abc", None, None).or_fail();
    assert_eq!(response.status, 400);
}

#[test]
fn malformed_base_url_is_invalid_endpoint() {
    let client = ApiClient::new("not a url");
    let err = client.get("/posts", None, None).unwrap_err();

    assert!(matches!(err, ApiError::InvalidEndpoint { ref endpoint } if endpoint == "not a url/posts"));
}

#[test]
fn unreachable_host_is_connection_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = ApiClient::new(&format!("http://{addr}"));
    let err = client.get("/posts", None, None).unwrap_err();

    assert!(matches!(err, ApiError::Connection(_)), "{err:?}");
}

#[test]
#[should_panic(expected = "Invalid endpoint: posts")]
fn failed_call_reports_error_message() {
    ApiClient::new("http://127.0.0.1:9").get("posts", None, None).or_fail();
}
