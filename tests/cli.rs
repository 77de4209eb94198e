use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

fn config_with(yaml: &[u8]) -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(config.path(), yaml).expect("Writing temp config failed");
    config
}

#[test]
fn help_lists_sync_subcommand() {
    let mut cmd = Command::cargo_bin("verilog-mirror").expect("Binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn sync_fails_for_missing_config_file() {
    let mut cmd = Command::cargo_bin("verilog-mirror").expect("Binary exists");
    cmd.arg("sync")
        .arg("--config")
        .arg("/definitely/not/here.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn sync_rejects_invalid_config_before_network() {
    let config = config_with(
        b"destination:\n  owner: me\n  repo: mirror\n  branch: main\npipeline:\n  concurrency: 0\n",
    );
    let mut cmd = Command::cargo_bin("verilog-mirror").expect("Binary exists");
    cmd.arg("sync")
        .arg("--config")
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("concurrency"));
}

#[test]
fn sync_rejects_malformed_repo_argument() {
    let config = config_with(b"destination:\n  owner: me\n  repo: mirror\n  branch: main\n");
    let mut cmd = Command::cargo_bin("verilog-mirror").expect("Binary exists");
    cmd.arg("sync")
        .arg("--config")
        .arg(config.path())
        .arg("--repo")
        .arg("no-slash")
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/name"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use verilog_mirror::cli::{run, Cli, Commands};

    // A missing config makes run() fail early, after the initial event.
    let cli = Cli {
        command: Commands::Sync {
            config: std::path::PathBuf::from("dummy.yaml"),
            repos: Vec::new(),
        },
    };

    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
