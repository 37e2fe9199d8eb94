//! Credential scans: grant, deny and add-mode enrollment.
//!
//! Run with: cargo test --package latchkey-controller --test scan_handling

mod common;

use common::Harness;
use latchkey_controller::{Command, ControllerError};
use latchkey_core::{Credential, FacilityCode};
use latchkey_hardware::LedColor;
use latchkey_storage::ControllerConfig;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn card(number: &str) -> Credential {
    Credential::new(number, FacilityCode(13))
}

#[tokio::test(start_paused = true)]
async fn authorized_scan_unlocks_for_credential_duration() {
    let mut h = Harness::with_keys(&[("12345", "Alice")]);

    let start = Instant::now();
    h.controller.handle_scan(card("12345")).await;

    // Granted pattern, then the 5 s credential hold
    assert_eq!(start.elapsed(), Duration::from_millis(5_250));
    assert_eq!(h.relay.activations(), 1);
    assert!(!h.relay.is_high());
    assert_eq!(
        h.sink.messages(),
        vec!["Authorized key 12345 (Alice) scanned", "Unlocked", "Locked"]
    );
    assert_eq!(h.controller.store().len(), 1);
    assert_eq!(
        h.controller.store().label("12345").unwrap().as_str(),
        "Alice"
    );
}

#[tokio::test(start_paused = true)]
async fn unauthorized_scan_is_denied() {
    let mut h = Harness::with_keys(&[("12345", "Alice")]);

    let start = Instant::now();
    h.controller.handle_scan(card("999")).await;

    assert_eq!(start.elapsed(), Duration::from_millis(2_100));
    assert_eq!(h.relay.activations(), 0);
    assert_eq!(h.buzzer.tone_count(), 2);
    assert_eq!(h.sink.messages(), vec!["Unauthorized key 999 scanned"]);
}

#[tokio::test(start_paused = true)]
async fn unknown_scan_in_add_mode_is_enrolled() {
    let config = ControllerConfig::default().add_mode(7_500, 5);
    let mut h = Harness::with(config, &[]);

    h.controller.execute(Command::EnterAddMode).await.unwrap();
    assert_eq!(h.controller.add_mode().remaining(), Some(5));
    assert_eq!(h.led.current(), LedColor::Blue);

    h.controller.handle_scan(card("12345")).await;

    assert!(!h.controller.add_mode().is_active());
    assert!(h.controller.store().is_authorized("12345"));
    let label = h.controller.store().label("12345").unwrap().as_str().to_string();
    assert_eq!(label.len(), 15);
    assert!(label.chars().enumerate().all(|(i, c)| if i == 8 {
        c == '_'
    } else {
        c.is_ascii_digit()
    }));
    assert!(h.sink.contains("Key 12345 added"));
    assert_eq!(h.relay.activations(), 0);
    assert_eq!(h.led.current(), LedColor::Red);

    // Persisted immediately
    let (reloaded, err) = latchkey_storage::KeyStore::open(h.data_path("keys.cfg"));
    assert!(err.is_none());
    assert!(reloaded.is_authorized("12345"));
}

#[tokio::test(start_paused = true)]
async fn known_scan_in_add_mode_ends_window() {
    let mut h = Harness::with_keys(&[("12345", "Alice")]);

    h.controller.execute(Command::EnterAddMode).await.unwrap();
    h.controller.handle_scan(card("12345")).await;

    assert!(!h.controller.add_mode().is_active());
    assert_eq!(h.relay.activations(), 0);
    assert_eq!(h.controller.store().len(), 1);
    assert!(h.sink.contains("Key 12345 is already authorized"));
}

#[tokio::test(start_paused = true)]
async fn malformed_scan_in_add_mode_is_not_enrolled() {
    let mut h = Harness::new();

    h.controller.execute(Command::EnterAddMode).await.unwrap();
    h.controller.handle_scan(card("1234567")).await;

    assert!(!h.controller.add_mode().is_active());
    assert!(h.controller.store().is_empty());
    assert!(
        h.sink
            .messages()
            .iter()
            .any(|m| m.starts_with("Unable to add key 1234567"))
    );
}

#[tokio::test(start_paused = true)]
async fn add_mode_reentry_is_rejected() {
    let mut h = Harness::new();

    h.controller.execute(Command::EnterAddMode).await.unwrap();
    let result = h.controller.execute(Command::EnterAddMode).await;

    assert!(matches!(result, Err(ControllerError::AddModeActive)));
    assert!(h.controller.add_mode().is_active());
}

#[tokio::test(start_paused = true)]
async fn scan_is_handled_between_ticks() {
    let mut h = Harness::with_keys(&[("12345", "Alice")]);
    let token = CancellationToken::new();

    let script = async {
        tokio::time::sleep(Duration::from_millis(120)).await;
        h.reader.present("12345").unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let unlocked_promptly = h.relay.is_high();
        tokio::time::sleep(Duration::from_secs(6)).await;
        token.cancel();
        unlocked_promptly
    };

    let (_, unlocked_promptly) = tokio::join!(h.controller.run(token.clone()), script);

    assert!(unlocked_promptly);
    assert_eq!(h.relay.activations(), 1);
    assert!(h.sink.contains("Authorized key 12345 (Alice) scanned"));
}

#[tokio::test(start_paused = true)]
async fn garage_mode_shortens_unlock() {
    let config = ControllerConfig::default().garage_mode(true);
    let mut h = Harness::with(config, &[("12345", "Gate opener")]);

    let start = Instant::now();
    h.controller.handle_scan(card("12345")).await;

    assert_eq!(start.elapsed(), Duration::from_millis(750));
}
