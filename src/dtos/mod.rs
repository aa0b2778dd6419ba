pub mod auth;

pub use auth::{
    LicenseSnapshot, LoginRequest, RefreshRequest, SessionUser, TokenPair, UserProfile,
    ValidateRequest, ValidateResponse,
};
