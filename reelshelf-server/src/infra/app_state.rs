use std::{fmt, sync::Arc};

use reelshelf_core::MediaLibrary;

#[derive(Clone)]
pub struct AppState {
    pub library: Arc<MediaLibrary>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("media_root", &self.library.root())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(library: Arc<MediaLibrary>) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }
}
