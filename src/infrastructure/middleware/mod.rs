pub mod quota;
pub mod request_id;

pub use quota::quota_middleware;
pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};
