//! Convenience constructor for turning an [`X402Client`] into a ready-to-use
//! `reqwest` client.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use r402::scheme::PaymentSelector;

use super::middleware::X402Client;

impl<TSelector> X402Client<TSelector>
where
    TSelector: PaymentSelector + Send + Sync + 'static,
{
    /// Builds a [`ClientWithMiddleware`] wrapping a fresh [`reqwest::Client`]
    /// with this client installed as payment-handling middleware.
    ///
    /// This is the simplest way to get a payment-capable HTTP client:
    ///
    /// ```ignore
    /// use r402_http::client::X402Client;
    ///
    /// let http_client = X402Client::new()
    ///     .register(my_scheme_client)
    ///     .build_reqwest();
    /// ```
    #[must_use]
    pub fn build_reqwest(self) -> ClientWithMiddleware {
        ClientBuilder::new(reqwest::Client::new()).with(self).build()
    }
}
