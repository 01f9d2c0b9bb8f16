//! A whole session over the JSON-lines transport.

mod common;

use std::sync::Arc;
use std::time::Duration;

use codeframe::assembler::ConfigAssembler;
use codeframe::coordinator::{CaptureCoordinator, SessionState};
use codeframe::host::Selection;
use codeframe::surface::{spawn_reader, spawn_writer};
use common::ScriptedHost;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::test]
async fn test_session_over_json_lines() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("frame.png");
    let host = Arc::new(ScriptedHost::with_editor("/work/lib.rs", vec![Selection::lines(2, 4)]));
    *host.save_to.lock().unwrap() = Some(out.clone());

    let (surface_in, host_out) = tokio::io::duplex(64 * 1024);
    let (surface, writer) = spawn_writer(host_out);

    let input: &'static [u8] = b"{\"type\":\"save\",\"data\":\"iVBORw0KGgo=\"}\n";
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let reader = spawn_reader(BufReader::new(input), events_tx);

    let assembler = ConfigAssembler::with_paths(Some(home.path().to_path_buf()), home.path().to_path_buf());
    let mut coordinator = CaptureCoordinator::new(Arc::clone(&host), assembler, home.path().join("code.png"));
    coordinator.start(surface).unwrap();

    tokio::time::timeout(Duration::from_secs(5), coordinator.run(&mut events_rx))
        .await
        .unwrap();
    coordinator.flush().await;
    assert_eq!(coordinator.state(), SessionState::Idle);
    drop(coordinator);

    reader.await.unwrap().unwrap();
    writer.await.unwrap().unwrap();
    assert_eq!(std::fs::read(&out).unwrap().len(), 8);

    let mut lines = BufReader::new(surface_in).lines();
    let mut kinds = Vec::new();
    while let Some(line) = lines.next_line().await.unwrap() {
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        kinds.push(value["type"].as_str().unwrap().to_string());
    }
    assert!(kinds.contains(&"flash".to_string()));
    assert!(kinds.iter().all(|k| k == "update" || k == "flash"));
}
