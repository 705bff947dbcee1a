//! Integration tests for `StyledLogger` installed as the global `log` backend.
//!
//! The global logger can be set once per process, so every test shares one
//! logger writing into one buffer and runs serially.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use log::LevelFilter;
use rich_core::color::ColorSystem;
use rich_core::context::RenderContext;
use rich_core::logging::StyledLogger;
use rich_core::sync::lock_recover;
use serial_test::serial;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn take(&self) -> String {
        let bytes = std::mem::take(&mut *lock_recover(&self.0));
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock_recover(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn global_buffer() -> &'static SharedBuffer {
    static BUFFER: OnceLock<SharedBuffer> = OnceLock::new();
    BUFFER.get_or_init(|| {
        let buffer = SharedBuffer::default();
        StyledLogger::new(buffer.clone())
            .context(RenderContext::new().color_system(ColorSystem::Standard))
            .level(LevelFilter::Debug)
            .show_time(false)
            .init()
            .expect("no other logger installed in this test binary");
        buffer
    })
}

#[test]
#[serial]
fn test_records_reach_the_sink() {
    let buffer = global_buffer();
    buffer.take();

    log::info!("server started");
    log::error!("connection lost");

    assert_eq!(
        buffer.take(),
        "\x1b[32mINFO    \x1b[0m server started\n\
         \x1b[1;31mERROR   \x1b[0m connection lost\n"
    );
}

#[test]
#[serial]
fn test_max_level_filters_trace() {
    let buffer = global_buffer();
    buffer.take();

    log::trace!("too chatty");
    log::debug!("just right");

    let output = buffer.take();
    assert!(!output.contains("too chatty"));
    assert!(output.contains("just right"));
}

#[test]
#[serial]
fn test_keywords_are_highlighted() {
    let buffer = global_buffer();
    buffer.take();

    log::warn!("POST /upload rejected");

    assert_eq!(
        buffer.take(),
        "\x1b[33mWARN    \x1b[0m \x1b[1;33mPOST\x1b[0m /upload rejected\n"
    );
}

#[test]
#[serial]
fn test_library_warnings_are_logged() {
    let buffer = global_buffer();
    buffer.take();

    let style = rich_core::Style::parse("bold glittery").unwrap();
    assert_eq!(style, rich_core::Style::new().bold());

    let output = buffer.take();
    assert!(output.contains("WARN"), "{output:?}");
    assert!(output.contains("glittery"), "{output:?}");
}

#[test]
#[serial]
fn test_concurrent_records_stay_whole() {
    let buffer = global_buffer();
    buffer.take();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            std::thread::spawn(move || {
                for i in 0..25 {
                    log::info!("thread {t} record {i}");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let output = buffer.take();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 100);
    assert!(lines.iter().all(|line| line.starts_with("\x1b[32mINFO")));
}
