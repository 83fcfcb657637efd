//! # Shared test helpers
//!
//! Log capture for asserting on `tracing` diagnostics, fixture paths, and registry builders.

#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use macrodex::config::LoaderConfig;
use macrodex::macros::{FsLoader, Registry};
use macrodex::Environment;
use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

pub struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter(Arc::clone(&self.buf))
    }
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }
}

/// Runs `f` with a debug-level subscriber installed for the current thread and returns its
/// result together with everything that was logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, capture.contents())
}

pub fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(path)
}

/// Loader config over the `testmodule` fixture, with a `staging` override root.
pub fn fixture_loader_config() -> LoaderConfig {
    let mut config = LoaderConfig {
        module_paths: vec![fixture("modules/testmodule")],
        ..LoaderConfig::default()
    };
    config
        .environments
        .insert("staging".to_string(), vec![fixture("environments/staging")]);
    config
}

/// A registry autoloading from the fixture tree, defaulting to `env`.
pub fn fixture_registry(env: &str) -> Registry {
    Registry::builder()
        .loader(FsLoader::new(fixture_loader_config()))
        .default_environment(Environment::new(env))
        .build()
}
