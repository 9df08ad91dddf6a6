pub mod envelope;
pub mod notification;

pub use envelope::ResultEnvelope;
pub use notification::{Notification, ID_FIELD};
