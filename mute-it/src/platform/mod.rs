//! Windows-specific plumbing: the hidden message window, its message loop,
//! the refresh timer and error dialogs.

pub mod window;

pub use window::{show_error, MessageWindow, Waker, WindowTimer};
