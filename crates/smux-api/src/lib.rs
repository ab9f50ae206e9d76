// smux-api: wire types and transports for the streammux status API

pub mod error;
pub mod http;
pub mod types;
pub mod websocket;

pub use error::Error;
pub use http::{ApiClient, REQUEST_TIMEOUT, endpoints};
pub use types::{
    ApiMessage, CtrlCommand, MuxStatus, ProcessStatus, StatsField, StatsSnapshot, StatusReport,
    StreamStatus, VersionInfo,
};
pub use websocket::{WsEvent, WsSession};
