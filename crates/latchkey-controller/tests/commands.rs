//! HTTP/MQTT command handling through the command channel.
//!
//! Run with: cargo test --package latchkey-controller --test commands

mod common;

use common::Harness;
use latchkey_controller::{Chime, Command, CommandReply, ControllerError, LoopExit};
use latchkey_core::TriggerSource;
use latchkey_storage::{KeyStore, StorageError};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn commands_round_trip_through_running_loop() {
    let mut h = Harness::with_keys(&[("12345", "Alice")]);
    let token = CancellationToken::new();

    let script = async {
        let added = h.commands.send(Command::AddKey("4242".into())).await;
        let renamed = h
            .commands
            .send(Command::RenameKey {
                id: "4242".into(),
                label: "Bob".into(),
            })
            .await;
        let listed = h.commands.send(Command::ListKeys).await;
        token.cancel();
        (added, renamed, listed)
    };

    let (exit, (added, renamed, listed)) =
        tokio::join!(h.controller.run(token.clone()), script);

    assert_eq!(exit, LoopExit::Shutdown);
    assert_eq!(added.unwrap(), CommandReply::Done);
    assert_eq!(renamed.unwrap(), CommandReply::Done);
    assert_eq!(
        listed.unwrap(),
        CommandReply::Keys(vec![
            ("12345".into(), "Alice".into()),
            ("4242".into(), "Bob".into()),
        ])
    );
    assert!(h.sink.contains("Key 4242 added"));
    assert!(h.sink.contains("Key 4242 renamed to Bob"));
}

#[tokio::test(start_paused = true)]
async fn parsed_http_unlock_uses_http_duration() {
    let mut h = Harness::new();

    let command = Command::from_http_path("/unlock").unwrap();
    let start = Instant::now();
    h.controller.execute(command).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_millis(10_250));
    assert_eq!(h.relay.activations(), 1);
}

#[tokio::test(start_paused = true)]
async fn parsed_mqtt_unlock_uses_mqtt_duration() {
    let mut h = Harness::new();

    let command = Command::from_mqtt_payload("unlock").unwrap();
    assert_eq!(command, Command::Unlock(TriggerSource::Mqtt));

    let start = Instant::now();
    h.controller.execute(command).await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(10_250));
}

#[tokio::test(start_paused = true)]
async fn rename_to_empty_label_fails_without_change() {
    let mut h = Harness::with_keys(&[("12345", "Alice")]);

    let result = h
        .controller
        .execute(Command::RenameKey {
            id: "12345".into(),
            label: String::new(),
        })
        .await;

    assert!(matches!(result, Err(ControllerError::Storage(StorageError::Validation(_)))));
    assert_eq!(h.controller.store().label("12345").unwrap().as_str(), "Alice");
    assert!(
        h.sink
            .messages()
            .iter()
            .any(|m| m.starts_with("rename_key failed"))
    );
}

#[tokio::test(start_paused = true)]
async fn remove_and_purge() {
    let mut h = Harness::with_keys(&[("12345", "Alice"), ("4242", "Bob")]);

    h.controller
        .execute(Command::RemoveKey("12345".into()))
        .await
        .unwrap();
    assert!(!h.controller.store().is_authorized("12345"));

    let missing = h.controller.execute(Command::RemoveKey("12345".into())).await;
    assert!(matches!(
        missing,
        Err(ControllerError::Storage(StorageError::KeyNotFound(_)))
    ));

    h.controller.execute(Command::PurgeKeys).await.unwrap();
    h.controller.execute(Command::PurgeKeys).await.unwrap();
    assert!(h.controller.store().is_empty());

    let (reloaded, err) = KeyStore::open(h.data_path("keys.cfg"));
    assert!(err.is_none());
    assert!(reloaded.is_empty());
}

#[tokio::test(start_paused = true)]
async fn add_key_rejects_bad_id() {
    let mut h = Harness::new();

    let result = h.controller.execute(Command::AddKey("1".into())).await;

    assert!(result.is_err());
    assert!(h.controller.store().is_empty());
}

#[tokio::test(start_paused = true)]
async fn set_chime() {
    let mut h = Harness::new();

    h.controller
        .execute(Command::SetChime("ding_dong".into()))
        .await
        .unwrap();
    assert_eq!(h.controller.context().chime(), Chime::DING_DONG);
    assert!(h.sink.contains("Chime set to ding_dong"));

    let result = h
        .controller
        .execute(Command::SetChime("foghorn".into()))
        .await;
    assert!(matches!(result, Err(ControllerError::UnknownChime(_))));
    assert_eq!(h.controller.context().chime(), Chime::DING_DONG);
}

#[tokio::test(start_paused = true)]
async fn stop_bell_command() {
    let mut h = Harness::new();

    h.controller.execute(Command::RingBell).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    h.controller.execute(Command::StopBell).await.unwrap();

    assert!(!h.controller.is_chime_playing());
    assert!(h.sink.contains("Bell stopped"));
}

#[tokio::test(start_paused = true)]
async fn export_writes_media_copy() {
    let mut h = Harness::with_keys(&[("12345", "Alice")]);

    h.controller.execute(Command::ExportToMedia).await.unwrap();
    h.controller.execute(Command::ExportToMedia).await.unwrap();

    let (exported, err) = KeyStore::open(h.sd.path().join("keys.cfg"));
    assert!(err.is_none());
    assert!(exported.is_authorized("12345"));
    assert_eq!(std::fs::read_dir(h.sd.path()).unwrap().count(), 2);
    assert!(h.sink.contains("Exported 1 keys to SD"));
}

#[tokio::test(start_paused = true)]
async fn import_command_replies_restarting() {
    let mut h = Harness::new();
    std::fs::write(h.sd.path().join("keys.cfg"), br#"{"4242": "Bob"}"#).unwrap();

    let reply = h.controller.execute(Command::ImportFromMedia).await.unwrap();

    assert_eq!(reply, CommandReply::Restarting);
    assert!(h.controller.store().is_authorized("4242"));
}

#[tokio::test(start_paused = true)]
async fn import_command_without_media_fails() {
    let mut h = Harness::new();
    let sd = h.sd.path().to_path_buf();
    drop(std::fs::remove_dir_all(&sd));

    let result = h.controller.execute(Command::ImportFromMedia).await;

    assert!(matches!(
        result,
        Err(ControllerError::Storage(StorageError::MediaAbsent))
    ));
}

#[tokio::test(start_paused = true)]
async fn reset_restarts_loop() {
    let mut h = Harness::new();
    let token = CancellationToken::new();

    let script = async {
        let reply = h.commands.send(Command::Reset).await;
        sleep(Duration::from_secs(1)).await;
        token.cancel();
        reply
    };

    let (exit, reply) = tokio::join!(h.controller.run(token.clone()), script);

    assert_eq!(exit, LoopExit::Restart);
    assert_eq!(reply.unwrap(), CommandReply::Restarting);
    assert!(h.sink.contains("Restarting"));
}

#[tokio::test(start_paused = true)]
async fn commands_after_loop_stopped_fail() {
    let h = Harness::new();
    let commands = h.commands.clone();
    drop(h);

    let result = commands.send(Command::RingBell).await;
    assert!(matches!(result, Err(ControllerError::ChannelClosed)));
}

#[tokio::test(start_paused = true)]
async fn commands_queued_behind_reset_do_not_run() {
    let mut h = Harness::with_keys(&[("12345", "Alice")]);
    h.commands.try_submit(Command::Reset).unwrap();
    h.commands.try_submit(Command::AddKey("4242".into())).unwrap();
    h.commands.try_submit(Command::PurgeKeys).unwrap();

    let exit = h.controller.run(CancellationToken::new()).await;

    assert_eq!(exit, LoopExit::Restart);
    assert_eq!(h.sink.messages().last().map(String::as_str), Some("Restarting"));
    assert!(!h.sink.contains("Key 4242 added"));
    assert!(!h.sink.contains("All keys purged"));

    let (reloaded, err) = KeyStore::open(h.data_path("keys.cfg"));
    assert!(err.is_none());
    assert!(reloaded.is_authorized("12345"));
    assert!(!reloaded.is_authorized("4242"));
}

#[tokio::test(start_paused = true)]
async fn every_bell_command_is_reported() {
    let mut h = Harness::new();

    h.controller.execute(Command::RingBell).await.unwrap();
    h.controller.execute(Command::RingBell).await.unwrap();
    h.controller.execute(Command::StopBell).await.unwrap();
    h.controller.execute(Command::StopBell).await.unwrap();

    assert_eq!(
        h.sink.messages(),
        vec![
            "Ringing bell",
            "Bell already ringing",
            "Bell stopped",
            "Bell not ringing"
        ]
    );
}
