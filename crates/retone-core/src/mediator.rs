//! Background mediator: the only context that talks to the rewrite service.

use web_time::Instant;

use crate::protocol::{INVALID_REWRITE_PAYLOAD, Request, Response, RewriteReply};
use crate::rewrite::RewriteService;

pub struct Mediator<R> {
    service: R,
}

impl<R: RewriteService> Mediator<R> {
    pub fn new(service: R) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &R {
        &self.service
    }

    /// Whether this mediator answers `request`. Anything else is left for
    /// other listeners and gets no reply from here.
    pub fn accepts(request: &Request) -> bool {
        matches!(request, Request::BubbleRewrite { .. })
    }

    /// Handle one request. The future stays pending until the service call
    /// completes, which is what keeps the reply channel open.
    pub async fn handle(&self, request: Request) -> Option<Response> {
        let Request::BubbleRewrite { text, mode } = request else {
            return None;
        };

        let (text, mode) = match (text, mode) {
            (Some(text), Some(mode)) if !text.is_empty() => (text, mode),
            _ => {
                tracing::debug!(target: "retone::mediator", "rejecting malformed rewrite request");
                return Some(RewriteReply::failed(INVALID_REWRITE_PAYLOAD).into());
            }
        };

        let started = Instant::now();
        let reply = match self.service.rewrite(&text, mode).await {
            Ok(result) => {
                tracing::debug!(
                    target: "retone::mediator",
                    %mode,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "rewrite done"
                );
                RewriteReply::success(result)
            }
            Err(e) => {
                tracing::warn!(
                    target: "retone::mediator",
                    %mode,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "rewrite failed: {e}"
                );
                RewriteReply::failed(e.to_string())
            }
        };
        Some(reply.into())
    }
}
