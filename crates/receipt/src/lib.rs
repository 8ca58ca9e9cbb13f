//! Two-copy intake receipt: layout, PDF encoding and file output.
//!
//! Rendering is split in two phases. [`layout`] turns a jobsheet into a list
//! of page marks (rectangles, rules, text runs) in millimetres; [`pdf`] turns
//! those marks into a PDF document. Tests can inspect the geometry without
//! parsing PDF.

pub mod error;
pub mod layout;
pub mod metrics;
pub mod output;
pub mod pdf;
pub mod renderer;
pub mod shop;

pub use error::RenderError;
pub use layout::{Mark, PageLayout, ReceiptGeometry, ReceiptLayout};
pub use output::{receipt_file_name, sanitize_customer_name};
pub use renderer::{ReceiptRenderer, RenderedReceipt};
pub use shop::ShopProfile;
