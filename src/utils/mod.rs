/// App context
pub mod app_context;
/// Database pool
pub mod db_connect;
/// Logger
pub mod logger;
