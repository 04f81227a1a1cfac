pub mod handle_directory;
pub mod handle_media;
