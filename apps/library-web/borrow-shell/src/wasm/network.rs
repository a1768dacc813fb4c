use super::*;

/// `POST`s the borrow request with same-origin credentials. Only the status is
/// read; the body is left untouched.
pub(crate) struct GlooBorrowTransport;

#[async_trait(?Send)]
impl BorrowTransport for GlooBorrowTransport {
    async fn post_borrow(&self, request: BorrowRequest) -> Result<u16, TransportFault> {
        let mut request_builder =
            Request::post(&request.path).credentials(RequestCredentials::SameOrigin);

        for (header_name, header_value) in &request.headers {
            request_builder = request_builder.header(header_name, header_value);
        }

        let response = request_builder.send().await.map_err(map_network_error)?;
        Ok(response.status())
    }
}

pub(super) fn map_network_error(error: gloo_net::Error) -> TransportFault {
    TransportFault::new(error.to_string())
}
