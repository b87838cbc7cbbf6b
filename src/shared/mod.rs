pub mod errors;
pub mod logging;

pub use errors::ClientError;
pub use logging::{append_client_log, ClientLog};
