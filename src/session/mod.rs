pub mod code;
pub mod registry;
pub mod types;

pub use code::{generate_code, CodeSource, RandomCodes, CODE_LEN};
pub use registry::{SessionRegistry, SharedRegistry, MAX_CODE_ATTEMPTS};
pub use types::{Binding, Endpoint, EndpointId, Session};
