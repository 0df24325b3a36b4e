pub mod config;
pub mod logging;

pub mod client;
pub mod downloader;
pub mod error;
pub mod expiry;
pub mod fetch_head;
pub mod media;
pub mod preflight;
pub mod server;
pub mod service;
pub mod storage;
pub mod url_model;

pub use error::{MdropError, Result};
pub use media::MediaKind;
pub use service::{DownloadRequest, DownloadResponse, MediaService};
