//! API constants

/// API base path prefix
pub const API_BASE: &str = "/api";

pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Byte size of the uploaded image
pub const HEADER_ORIGINAL_SIZE: &str = "x-original-size";

/// Byte size of the returned image
pub const HEADER_NEW_SIZE: &str = "x-new-size";

/// Full JSON response of the remote editor
pub const HEADER_CLAID_RESPONSE: &str = "x-claid-response";

/// Upper bound on files in one batch upload request, used to size the body limit
pub const MAX_FILES_PER_UPLOAD: usize = 50;
