//! Background dispatch.
//!
//! The synchronous path ([`NetClient::execute`]) blocks the calling task
//! until the response is ready. The dispatchers here return immediately
//! and deliver the response from a spawned task, either through a
//! caller-supplied callback or through a oneshot channel.

use crate::client::NetClient;
use crate::config::RequestConfig;
use crate::response::NetworkResponse;
use reqwest::Method;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

impl NetClient {
    /// Dispatches a call on a background task and invokes `callback`
    /// with the response. The callback is invoked exactly once; the
    /// spawned task owns a clone of the client, so the caller's handle
    /// may be dropped freely.
    ///
    /// The `background` flag on the config is cleared before the inner
    /// call, so a config that requested background dispatch cannot
    /// recurse through this path.
    pub fn execute_callback<F>(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
        config: &RequestConfig,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(NetworkResponse) + Send + 'static,
    {
        let client = self.clone();
        let url = url.to_string();
        let content_type = content_type.map(str::to_string);
        let mut config = config.clone();
        config.background = false;

        debug!(url, "dispatching background request");
        tokio::spawn(async move {
            let response = client
                .execute(method, &url, body, content_type.as_deref(), &config)
                .await;
            callback(response);
        })
    }

    /// Dispatches a call on a background task and returns a receiver
    /// for the response. Dropping the receiver abandons the result but
    /// not the request; the spawned task runs to completion.
    pub fn execute_spawned(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
        config: &RequestConfig,
    ) -> oneshot::Receiver<NetworkResponse> {
        let (tx, rx) = oneshot::channel();
        self.execute_callback(method, url, body, content_type, config, move |response| {
            // Receiver may have been dropped; nothing to do then.
            let _ = tx.send(response);
        });
        rx
    }
}
