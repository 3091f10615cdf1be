//! Probe request types

mod body;
mod header;
mod method;
mod spec;

pub use body::RequestBody;
pub use header::{
    API_KEY_HEADER, AUTHORIZATION_HEADER, CONTENT_LENGTH_HEADER, CONTENT_TYPE_HEADER, Header,
    Headers,
};
pub use method::HttpMethod;
pub use spec::{ProbeRequest, ProbeRequestBuilder};
