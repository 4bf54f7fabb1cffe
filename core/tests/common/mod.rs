//! Shared fixture: a fresh mock posts server per test.

use api_client::{ApiClient, ApiError};

/// Start the mock server on a random port and return a client bound to it.
///
/// The server runs on its own thread with a current-thread runtime and lives
/// until the test process exits. Each call gets an independent, freshly
/// seeded store.
pub fn api_client() -> ApiClient {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    ApiClient::new(&format!("http://{addr}"))
}

/// Unwrap a client result, failing the test with the error's message.
pub trait OrFail<T> {
    fn or_fail(self) -> T;
}

impl<T> OrFail<T> for Result<T, ApiError> {
    #[track_caller]
    fn or_fail(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}
