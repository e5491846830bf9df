//! Web interface module
//!
//! Exposes the client store over HTTP. Handlers only translate between
//! requests/responses and store calls.

mod server;
mod handlers;

pub use server::{router, run_web_server};
pub use handlers::{
    lookup_location, AppState, ClientResponse, ClientSaveRequest, ErrorResponse, CLIENTS_PATH,
};
