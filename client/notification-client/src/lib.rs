pub mod alert;
pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod socket;
pub mod store;

pub use alert::{AlertSink, LogAlertSink, SilentAlertSink};
pub use api::{HttpNotificationApi, NotificationApi};
pub use config::Config;
pub use credentials::{CredentialSource, FileCredential, StaticCredential};
pub use error::{ClientError, Result};
pub use models::Notification;
pub use services::NotificationService;
pub use session::NotificationSession;
pub use socket::{ConnectionState, NotificationSocket, SocketDeps, WsTransport};
pub use store::{NotificationState, NotificationStore};
