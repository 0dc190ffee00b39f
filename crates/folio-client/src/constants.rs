// Backend path and naming constants

pub mod api_path {
    // Tables
    pub const REST: &str = "/rest/v1";

    // Auth
    pub const AUTH_TOKEN: &str = "/auth/v1/token";
    pub const AUTH_LOGOUT: &str = "/auth/v1/logout";

    // Edge functions
    pub const UPLOAD_FUNCTION: &str = "/functions/v1/upload-chunks";
}

pub mod table {
    pub const SITE_CONTENT: &str = "site_content";
    pub const PROJECTS: &str = "projects";
}

pub mod column {
    pub const KEY: &str = "key";
    pub const ID: &str = "id";
    pub const DISPLAY_ORDER: &str = "display_order";
}

/// Action understood by the upload function to mint a signed URL
pub const UPLOAD_ACTION_GET_URL: &str = "get-upload-url";

/// Storage bucket the upload function writes into
pub const MEDIA_BUCKET: &str = "portfolio-media";

/// Content type sent when a file declares none
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
