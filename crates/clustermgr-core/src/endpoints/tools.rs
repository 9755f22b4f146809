// Diagnostic endpoints: `/tools/echo` and `/tools/echoError`.

use clustermgr_api::Error;

use crate::call::Call;
use crate::endpoints::types::ApiEcho;
use crate::root::ApiRoot;

impl ApiRoot {
    /// Round-trip a message through the server.
    ///
    /// `GET /tools/echo?message=...`
    pub async fn echo(&self, message: &str) -> Result<ApiEcho, Error> {
        Call::get(self.resource(), "tools/echo")
            .param("message", message)
            .one()
            .await
    }

    /// Ask the server to fail with `message`; always yields an HTTP error.
    ///
    /// `GET /tools/echoError?message=...`
    pub async fn echo_error(&self, message: &str) -> Result<ApiEcho, Error> {
        Call::get(self.resource(), "tools/echoError")
            .param("message", message)
            .one()
            .await
    }
}
