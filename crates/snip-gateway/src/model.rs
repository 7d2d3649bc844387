mod url;

pub use url::{AddUrlForm, AddUrlResponse, ErrorResponse, HealthResponse, MappingResponse};
