pub mod live_session;
pub mod media_platform;
pub mod session_delegate;
