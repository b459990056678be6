//! Concurrent callers sharing one client.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{Behavior, FakeServer};
use rcon_session::{RconClient, ReassemblyMode};
use tokio::task::JoinSet;

async fn run_concurrent(reassembly: ReassemblyMode, callers: usize) {
    let server = FakeServer::start(Behavior {
        reply_delay: Duration::from_millis(2),
        ..Behavior::default()
    })
    .await;
    let client = RconClient::new(server.config_with(common::PASSWORD, reassembly));

    let mut tasks = JoinSet::new();
    for i in 0..callers {
        let client = client.clone();
        tasks.spawn(async move {
            let command = format!("cmd-{i}");
            let reply = client.send(&command).await.unwrap();
            (command, reply)
        });
    }

    let mut replies = Vec::with_capacity(callers);
    while let Some(res) = tasks.join_next().await {
        replies.push(res.unwrap());
    }

    // The id the server saw for each command must be the id echoed back to
    // the caller that sent it
    let seen: HashMap<String, i32> = server
        .stats
        .commands
        .lock()
        .unwrap()
        .iter()
        .map(|(id, cmd)| (cmd.clone(), *id))
        .collect();
    assert_eq!(seen.len(), callers);

    for (command, reply) in replies {
        let id = seen[&command];
        assert_eq!(reply, format!("echo:{id}:{command}"));
    }

    assert_eq!(server.stats.max_outstanding.load(Ordering::SeqCst), 1);
    assert_eq!(server.stats.connections(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_sends_are_serialized_trailer_mode() {
    run_concurrent(ReassemblyMode::Trailer, 32).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_sends_are_serialized_single_mode() {
    run_concurrent(ReassemblyMode::Single, 32).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_share_one_reconnect() {
    let server = FakeServer::start(Behavior {
        close_after_commands: Some(3),
        ..Behavior::default()
    })
    .await;
    let client = RconClient::new(server.config());

    let mut tasks = JoinSet::new();
    for i in 0..8 {
        let client = client.clone();
        tasks.spawn(async move { client.send(&format!("say {i}")).await });
    }

    let mut ok = 0;
    while let Some(res) = tasks.join_next().await {
        if res.unwrap().is_ok() {
            ok += 1;
        }
    }

    // Each dropped connection costs one retry, never a failed caller
    assert_eq!(ok, 8);
    assert_eq!(server.stats.max_outstanding.load(Ordering::SeqCst), 1);
    assert_eq!(server.stats.connections(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failure_is_delivered_to_its_own_caller() {
    let server = FakeServer::start(Behavior::default()).await;
    let client = RconClient::new(server.config());

    let mut tasks = JoinSet::new();
    for i in 0..10 {
        let client = client.clone();
        tasks.spawn(async move {
            let command = if i == 4 {
                "bad\0command".to_string()
            } else {
                format!("ok-{i}")
            };
            (i, client.send(&command).await)
        });
    }

    while let Some(res) = tasks.join_next().await {
        let (i, result) = res.unwrap();
        if i == 4 {
            assert!(result.is_err());
        } else {
            assert!(result.unwrap().ends_with(&format!(":ok-{i}")));
        }
    }
    assert_eq!(server.stats.connections(), 1);
}
