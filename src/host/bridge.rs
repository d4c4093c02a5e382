//! Development bridge: host events as JSON lines on stdin, gestures as JSON lines on stdout.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use once_cell::sync::Lazy;

use super::{HostEvent, SlotGesture};
use crate::config::HudConfig;
use crate::inventory::InventoryStore;

static HOST_LINES: Lazy<Arc<Mutex<VecDeque<String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(VecDeque::new())));

pub struct BridgePlugin;

impl Plugin for BridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_stdin_reader)
            .add_systems(
                Update,
                (read_host_lines, dev_shortcuts, write_gestures),
            );
    }
}

fn spawn_stdin_reader(config: Res<HudConfig>) {
    if !config.stdin_bridge {
        return;
    }
    let buffer = HOST_LINES.clone();
    std::thread::spawn(move || {
        use std::io::{self, BufRead};
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match buffer.lock() {
                Ok(mut buf) => buf.push_back(line.to_string()),
                Err(_) => break,
            }
        }
    });
    info!("Host bridge listening on stdin");
}

/// Parse one host line. Malformed lines are logged and dropped.
pub fn parse_host_line(line: &str) -> Option<HostEvent> {
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Ignoring malformed host event: {}", e);
            None
        }
    }
}

fn read_host_lines(mut writer: MessageWriter<HostEvent>) {
    let Ok(mut buffer) = HOST_LINES.lock() else {
        return;
    };
    while let Some(line) = buffer.pop_front() {
        if let Some(event) = parse_host_line(&line) {
            writer.write(event);
        }
    }
}

/// Keyboard stand-ins for host events while running standalone.
fn dev_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    store: Res<InventoryStore>,
    mut writer: MessageWriter<HostEvent>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        writer.write(HostEvent::ToggleHotbar);
    }
    if keys.just_pressed(KeyCode::F2) {
        writer.write(HostEvent::SetBusy(!store.busy));
    }
}

fn write_gestures(config: Res<HudConfig>, mut gestures: MessageReader<SlotGesture>) {
    for gesture in gestures.read() {
        debug!("Gesture: {:?}", gesture);
        if !config.stdin_bridge {
            continue;
        }
        match serde_json::to_string(gesture) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to encode gesture: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_lines_are_dropped() {
        assert_eq!(parse_host_line("not json"), None);
        assert_eq!(parse_host_line(r#"{ "action": "explode" }"#), None);
        assert_eq!(
            parse_host_line(r#"{ "action": "toggleHotbar" }"#),
            Some(HostEvent::ToggleHotbar)
        );
    }
}
