pub mod chat;
pub mod proxy;
pub mod websocket;
