//! Temp-file staging for action and trigger XML payloads.
//!
//! Action XML is arbitrary plist text; pushing it through AppleScript string
//! escaping would be fragile and size-limited. Instead the payload is written
//! to a scratch file and the generated script reads it back with
//! `read (POSIX file ...)`, so only the file path crosses the escaping
//! boundary. The file is removed when the [`StagedPayload`] guard drops,
//! including on error and panic paths.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

static STAGE_SEQ: AtomicU64 = AtomicU64::new(0);

const PLIST_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
    "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    "<plist version=\"1.0\">"
);

/// A staged payload file, removed from disk on drop.
#[derive(Debug)]
pub struct StagedPayload {
    path: PathBuf,
}

impl StagedPayload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path as a string for interpolation into a `POSIX file` expression.
    pub fn posix_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for StagedPayload {
    fn drop(&mut self) {
        // Best effort; a file left behind in the scratch dir is harmless.
        let _ = fs::remove_file(&self.path);
    }
}

/// Write `xml` to a fresh scratch file, enveloping bare fragments.
///
/// File names carry the process id and a counter so concurrent bridge
/// processes sharing a scratch directory never collide.
pub fn stage(xml: &str, scratch_dir: &Path) -> Result<StagedPayload> {
    fs::create_dir_all(scratch_dir)?;
    let seq = STAGE_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = format!("maestro-action-{}-{}.plist", std::process::id(), seq);
    let path = scratch_dir.join(name);
    fs::write(&path, envelope(xml))?;
    tracing::debug!(path = %path.display(), "staged payload");
    Ok(StagedPayload { path })
}

/// Wrap a bare plist fragment in the document envelope the editor expects.
/// Payloads that already carry a document prolog pass through unchanged.
fn envelope(xml: &str) -> String {
    let head = xml.trim_start();
    if head.starts_with("<?xml") || head.starts_with("<!DOCTYPE") || head.starts_with("<plist") {
        xml.to_string()
    } else {
        format!("{PLIST_HEADER}\n{xml}\n</plist>\n")
    }
}
