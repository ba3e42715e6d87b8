pub mod catalog;
pub mod expand;
pub mod qr;
pub mod resolve;
