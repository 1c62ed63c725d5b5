//! REST passthrough.

/// The request-handling kernel registered as `modlr.rest.kernel`.
///
/// Request and response shapes belong to the HTTP layer that hosts it.
pub trait RestKernel {
    type Request;
    type Response;

    fn handle(&self, request: Self::Request) -> Self::Response;
}

/// Routes every REST request straight to the kernel.
#[derive(Debug, Clone)]
pub struct RestController<K> {
    kernel: K,
}

impl<K: RestKernel> RestController<K> {
    pub fn new(kernel: K) -> Self {
        Self { kernel }
    }

    pub fn index(&self, request: K::Request) -> K::Response {
        self.kernel.handle(request)
    }
}
