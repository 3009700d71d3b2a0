use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// Reads a reference image's bytes on a background thread.
///
/// Loading starts on construction. The completion callback runs once, on
/// the loader thread, after the result is available.
#[derive(Debug)]
pub struct ImageLoader {
    path: PathBuf,
    result: Arc<OnceLock<io::Result<Vec<u8>>>>,
    handle: Option<JoinHandle<()>>,
}

impl ImageLoader {
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        Self::spawn_with(path, |_| {})
    }

    pub fn spawn_with<F>(path: impl Into<PathBuf>, on_complete: F) -> Self
    where
        F: FnOnce(&Path) + Send + 'static,
    {
        let path = path.into();
        let result = Arc::new(OnceLock::new());
        let handle = {
            let result = Arc::clone(&result);
            let path = path.clone();
            std::thread::spawn(move || {
                let bytes = std::fs::read(&path);
                match &bytes {
                    Ok(b) => debug!(path = ?path, bytes = b.len(), "image loaded"),
                    Err(err) => warn!(path = ?path, %err, "image load failed"),
                }
                let _ = result.set(bytes);
                on_complete(&path);
            })
        };
        Self {
            path,
            result,
            handle: Some(handle),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.result.get().is_some()
    }

    /// Blocks until the loader thread has finished.
    pub fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Image bytes, or `None` when the file could not be read.
    ///
    /// # Panics
    ///
    /// Panics if loading has not finished; check [`ImageLoader::is_loaded`]
    /// or call [`ImageLoader::wait`] first.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.finished().as_ref().ok().map(Vec::as_slice)
    }

    /// # Panics
    ///
    /// Same as [`ImageLoader::bytes`].
    pub fn error(&self) -> Option<&io::Error> {
        self.finished().as_ref().err()
    }

    fn finished(&self) -> &io::Result<Vec<u8>> {
        match self.result.get() {
            Some(result) => result,
            None => panic!("image {:?} read before loading finished", self.path),
        }
    }
}
