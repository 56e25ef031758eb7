//! Receiving diff buffers over a Unix socket.
//!
//! Each connection carries one complete diff: the peer writes the raw
//! `git diff` bytes and closes its end. The buffer is loaded into the shared
//! view while holding its lock, so renders never see a half-replaced tree.

use crate::view::{self, SharedView};
use error_set::error_set;
use std::io::{self, Read};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;

error_set! {
    /// Errors from the socket transport
    ServerError := {
        #[display("Failed to remove stale socket {path}: {message}")]
        Prepare { path: String, message: String },
        #[display("Failed to bind {path}: {message}")]
        Bind { path: String, message: String },
        #[display("Failed to accept connection: {message}")]
        Accept { message: String },
        #[display("Failed to read diff from connection: {message}")]
        Read { message: String },
    }
}

/// Bind a listener at `path`, replacing a socket left by an earlier run.
///
/// # Errors
///
/// Returns [`ServerError::Prepare`] if an existing file cannot be removed and
/// [`ServerError::Bind`] if the socket cannot be created.
pub fn bind(path: &Path) -> Result<UnixListener, ServerError> {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed stale socket"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(ServerError::Prepare {
                path: path.display().to_string(),
                message: e.to_string(),
            });
        }
    }

    UnixListener::bind(path).map_err(|e| ServerError::Bind {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read one connection to end of stream and load it into `view`.
///
/// Returns what [`DiffView::load`](crate::view::DiffView::load) returned.
///
/// # Errors
///
/// Returns [`ServerError::Read`] if the stream fails before EOF; the view is
/// left untouched in that case.
pub fn handle(mut stream: impl Read, view: &SharedView) -> Result<bool, ServerError> {
    let mut buffer = Vec::new();
    stream
        .read_to_end(&mut buffer)
        .map_err(|e| ServerError::Read {
            message: e.to_string(),
        })?;

    tracing::debug!(bytes = buffer.len(), "received diff buffer");
    Ok(view::lock(view).load(&buffer))
}

/// Accept connections forever, loading each one into `view`.
///
/// A connection that fails is logged and skipped.
pub fn run(listener: &UnixListener, view: &SharedView) {
    for stream in listener.incoming() {
        let result = stream
            .map_err(|e| ServerError::Accept {
                message: e.to_string(),
            })
            .and_then(|stream: UnixStream| handle(stream, view));

        match result {
            Ok(loaded) => tracing::info!(loaded, "connection handled"),
            Err(e) => tracing::warn!(error = %e, "connection dropped"),
        }
    }
}

/// Bind `path` and serve diffs into `view` until the process exits.
///
/// # Errors
///
/// Only binding can fail; errors on individual connections are logged.
pub fn serve(path: &Path, view: &SharedView) -> Result<(), ServerError> {
    let listener = bind(path)?;
    tracing::info!(socket = %path.display(), "listening for diffs");
    run(&listener, view);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::style::Style;
    use crate::view::{DiffView, Viewport, shared};
    use similar_asserts::assert_eq;
    use std::io::Write;

    const DIFF: &[u8] = b"diff --git a/foo.c b/foo.c\n@@ -1 +1 @@\n-old\n+new\n";

    fn empty_view() -> SharedView {
        shared(DiffView::new(Style::default(), Viewport::new(400.0, 800.0)))
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn connection_is_loaded_into_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("touchdiff.sock");
        let listener = bind(&path).unwrap();
        let view = empty_view();

        let client = std::thread::spawn({
            let path = path.clone();
            move || {
                let mut stream = UnixStream::connect(path).unwrap();
                stream.write_all(DIFF).unwrap();
            }
        });

        let (stream, _) = listener.accept().unwrap();
        client.join().unwrap();
        assert!(handle(stream, &view).unwrap());
        assert_eq!(view::lock(&view).stats().files, 1);
    }

    #[test]
    fn empty_connection_clears_view() {
        let view = empty_view();
        assert!(handle(DIFF, &view).unwrap());
        assert!(!handle(&b""[..], &view).unwrap());
        assert!(view::lock(&view).tree().is_none());
    }

    #[test]
    fn read_failure_keeps_current_tree() {
        let view = empty_view();
        handle(DIFF, &view).unwrap();
        let result = handle(FailingReader, &view);
        assert!(matches!(result, Err(ServerError::Read { .. })));
        assert!(view::lock(&view).tree().is_some());
    }

    #[test]
    fn bind_replaces_stale_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("touchdiff.sock");
        drop(bind(&path).unwrap());
        assert!(path.exists());
        bind(&path).unwrap();
    }

    #[test]
    fn bind_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("touchdiff.sock");
        assert!(matches!(bind(&path), Err(ServerError::Bind { .. })));
    }
}
