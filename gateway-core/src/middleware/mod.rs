pub mod panic_handler;
pub mod raw_body;
pub mod request_id;
