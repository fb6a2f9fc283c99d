pub mod beats;
pub mod export_snapshot;
pub mod info;
pub mod init;
pub mod subtitles;
pub mod validate;
