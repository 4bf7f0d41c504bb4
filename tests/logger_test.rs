use bytes::Bytes;
use chrono::DateTime;
use serde_json::json;
use skylog::adapter::IntervalScheduler;
use skylog::port::ObjectStore;
use skylog::{Level, LevelSet, LocalSink, Logger, LoggerConfig, StoreError};
use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct MemoryStore {
    puts: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MemoryStore {
    fn puts(&self) -> Vec<(String, String, String)> {
        self.puts.lock().unwrap().clone()
    }

    async fn wait_for_puts(&self, count: usize) -> Vec<(String, String, String)> {
        for _ in 0..200 {
            if self.puts.lock().unwrap().len() >= count {
                return self.puts();
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {count} puts within the deadline");
    }
}

impl ObjectStore for MemoryStore {
    fn put(
        &self,
        bucket: String,
        key: String,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let puts = self.puts.clone();
        Box::pin(async move {
            let body = String::from_utf8(body.to_vec()).expect("batch payload is UTF-8");
            puts.lock().unwrap().push((bucket, key, body));
            Ok(())
        })
    }
}

/// Shared in-memory writer standing in for stdout/stderr.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn captured_logger(levels: LevelSet) -> (Logger, Capture, Capture) {
    let out = Capture::default();
    let err = Capture::default();
    let logger = Logger::builder()
        .levels(levels)
        .sink(LocalSink::from_writers(
            Box::new(out.clone()),
            Box::new(err.clone()),
        ))
        .build();
    (logger, out, err)
}

#[tokio::test]
async fn scenario_threshold_three_with_level_filter() {
    let store = MemoryStore::default();
    let scheduler = IntervalScheduler::new();
    let transport = skylog::BufferedTransport::builder("tmp", "web-logs/")
        .threshold(3)
        .levels(LevelSet::from_iter([Level::Log, Level::Error]))
        .build(Arc::new(store.clone()), &scheduler)
        .unwrap();

    let out = Capture::default();
    let err = Capture::default();
    let logger = Logger::builder()
        .levels(LevelSet::from_iter([Level::Log, Level::Error]))
        .sink(LocalSink::from_writers(
            Box::new(out.clone()),
            Box::new(err.clone()),
        ))
        .transport(transport)
        .build();

    logger.log(["hello world", "something else"]);
    logger.error(["hello world"]);
    logger.log(["hello again world"]);

    let puts = store.wait_for_puts(1).await;
    assert_eq!(puts.len(), 1, "exactly one flush");
    assert_eq!(puts[0].0, "tmp");
    assert!(puts[0].1.starts_with("web-logs/"));

    let lines: Vec<&str> = puts[0].2.split('\n').collect();
    assert_eq!(lines.len(), 3);
    let expected = [
        ("LOG", "hello world something else"),
        ("ERROR", "hello world"),
        ("LOG", "hello again world"),
    ];
    for (line, (tag, message)) in lines.iter().zip(expected) {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 3);
        assert!(
            DateTime::parse_from_rfc3339(fields[0]).is_ok(),
            "timestamp prefix: {}",
            fields[0]
        );
        assert_eq!(fields[1], tag);
        assert_eq!(fields[2], message);
    }

    // warn is not enabled: no local output, nothing reaches the transport.
    let err_before = err.contents();
    logger.warn(["x"]);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(err.contents(), err_before);
    assert_eq!(store.puts().len(), 1);
}

#[tokio::test]
async fn disabled_level_has_zero_side_effects() {
    let (logger, out, err) = captured_logger(LevelSet::from_iter([Level::Info]));

    logger.debug(["invisible"]);
    logger.warn(["invisible"]);
    logger.access("1.2.3.4 - - [..] \"GET / HTTP/1.1\" 200 -");

    assert!(out.contents().is_empty());
    assert!(err.contents().is_empty());

    logger.info(["visible"]);
    assert!(out.contents().contains("INFO\tvisible"));
}

#[tokio::test]
async fn warn_and_error_go_to_stderr_the_rest_to_stdout() {
    let (logger, out, err) = captured_logger(LevelSet::all());

    logger.log(["a"]);
    logger.info(["b"]);
    logger.debug(["c"]);
    logger.warn(["d"]);
    logger.error(["e"]);

    let out = out.contents();
    let err = err.contents();
    assert!(out.contains("\tLOG\ta"));
    assert!(out.contains("\tINFO\tb"));
    assert!(out.contains("\tDEBUG\tc"));
    assert!(!out.contains("\tWARN\t"));
    assert!(err.contains("\tWARN\td"));
    assert!(err.contains("\tERROR\te"));
}

#[tokio::test]
async fn structured_values_render_as_pretty_json() {
    let (logger, out, _) = captured_logger(LevelSet::all());

    logger.info([skylog::LogValue::from("ctx"), json!({"code": 7}).into()]);

    let out = out.contents();
    assert!(out.contains("ctx {"));
    assert!(out.contains("\"code\": 7"));
}

#[tokio::test]
async fn access_lines_pass_through_trimmed() {
    let (logger, out, _) = captured_logger(LevelSet::all());

    logger.access("  1.2.3.4 - - [x] \"GET / HTTP/1.1\" 200 512\n");
    logger.access("   \n");

    let out = out.contents();
    assert_eq!(
        out,
        "1.2.3.4 - - [x] \"GET / HTTP/1.1\" 200 512\n",
        "verbatim line, surrounding whitespace trimmed, blank line dropped"
    );
}

#[tokio::test]
async fn transports_see_entries_in_registration_order_with_own_filters() {
    let store = MemoryStore::default();
    let scheduler = IntervalScheduler::new();
    let errors_only = skylog::BufferedTransport::builder("tmp", "errors/")
        .threshold(1)
        .levels(LevelSet::from_iter([Level::Error]))
        .build(Arc::new(store.clone()), &scheduler)
        .unwrap();
    let everything = skylog::BufferedTransport::builder("tmp", "all/")
        .threshold(1)
        .build(Arc::new(store.clone()), &scheduler)
        .unwrap();

    let logger = Logger::builder()
        .levels(LevelSet::all())
        .sink(LocalSink::from_writers(
            Box::new(Capture::default()),
            Box::new(Capture::default()),
        ))
        .transport(errors_only)
        .transport(everything)
        .build();

    logger.info(["only the second transport buffers this"]);
    let puts = store.wait_for_puts(1).await;
    assert!(puts.iter().all(|(_, key, _)| key.starts_with("all/")));

    logger.error(["both transports buffer this"]);
    let puts = store.wait_for_puts(3).await;
    assert_eq!(
        puts.iter().filter(|(_, key, _)| key.starts_with("errors/")).count(),
        1
    );
}

#[tokio::test]
async fn from_config_builds_filters_and_skips_bad_transports() {
    let store = MemoryStore::default();
    let scheduler = IntervalScheduler::new();
    let config: LoggerConfig = serde_json::from_str(
        r#"{
            "levels": ["log", "error"],
            "transports": [
                {"type": "s3", "bucket": "tmp", "keyPrefix": "web/", "capacityThreshold": 2},
                {"type": "s3", "keyPrefix": "no-bucket/"},
                {"type": "syslog", "bucket": "ignored"}
            ]
        }"#,
    )
    .unwrap();

    let logger = Logger::from_config(config, Arc::new(store.clone()), &scheduler);

    assert!(logger.is_enabled(Level::Log));
    assert!(!logger.is_enabled(Level::Info));

    logger.log(["a"]);
    logger.error(["b"]);

    let puts = store.wait_for_puts(1).await;
    assert_eq!(puts.len(), 1, "only the well-formed transport flushes");
    assert!(puts[0].1.starts_with("web/"));
    assert_eq!(puts[0].2.split('\n').count(), 2);
}

#[tokio::test]
async fn shutdown_tears_down_every_transport() {
    let store = MemoryStore::default();
    let scheduler = IntervalScheduler::new();
    let transport = skylog::BufferedTransport::builder("tmp", "web/")
        .build(Arc::new(store.clone()), &scheduler)
        .unwrap();

    let logger = Logger::builder()
        .levels(LevelSet::all())
        .sink(LocalSink::from_writers(
            Box::new(Capture::default()),
            Box::new(Capture::default()),
        ))
        .transport(transport)
        .build();

    logger.info(["residual entry"]);
    logger.shutdown();

    let puts = store.wait_for_puts(1).await;
    assert!(puts[0].2.contains("residual entry"));

    // Local output still works after teardown; remote buffering does not.
    logger.info(["after shutdown"]);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(store.puts().len(), 1);
}
