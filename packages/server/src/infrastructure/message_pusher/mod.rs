//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `sse`: Server-Sent Events を使った実装（チャット単位の接続レジストリ）

pub mod sse;

pub use sse::ConnectionRegistry;
