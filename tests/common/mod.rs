//! Scripted RCON server for integration tests.
//!
//! Speaks the Minecraft flavour of the protocol on `127.0.0.1:0`: replies to
//! LOGIN with an `AUTH_RESPONSE`, to COMMAND with the output of a reply
//! function, and to anything else with `"Unknown request <type>"`.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use rcon_session::{Packet, PacketType, RconCodec, RconConfig, ReassemblyMode};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};

pub const PASSWORD: &str = "secret";

type ReplyFn = Arc<dyn Fn(i32, &str) -> String + Send + Sync>;

#[derive(Clone)]
pub struct Behavior {
    pub password: String,
    /// Answer every login with -1
    pub reject_all: bool,
    /// Drop the socket right after accepting it
    pub close_on_connect: bool,
    /// Shut the connection down instead of answering the command that
    /// follows this many replies
    pub close_after_commands: Option<usize>,
    /// Like `close_after_commands`, but counted across all connections
    pub total_reply_budget: Option<usize>,
    /// Split command output into packets of at most this many bytes
    pub fragment_size: Option<usize>,
    /// Answer the first command ever received with a foreign request id
    pub desync_first_command: bool,
    /// Never answer commands
    pub hang_on_command: bool,
    /// Answer trailers the way Source engine servers do (two packets)
    pub source_trailer: bool,
    /// Delay before each command reply
    pub reply_delay: Duration,
    pub reply: ReplyFn,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            password: PASSWORD.to_string(),
            reject_all: false,
            close_on_connect: false,
            close_after_commands: None,
            total_reply_budget: None,
            fragment_size: None,
            desync_first_command: false,
            hang_on_command: false,
            source_trailer: false,
            reply_delay: Duration::ZERO,
            reply: Arc::new(|id, cmd| format!("echo:{id}:{cmd}")),
        }
    }
}

impl Behavior {
    pub fn replying(reply: impl Fn(i32, &str) -> String + Send + Sync + 'static) -> Self {
        Self {
            reply: Arc::new(reply),
            ..Self::default()
        }
    }
}

#[derive(Default)]
pub struct Stats {
    pub connections: AtomicUsize,
    pub logins: AtomicUsize,
    /// Every packet type received, in order, across connections
    pub packet_types: Mutex<Vec<i32>>,
    /// (request id, command) for every COMMAND received
    pub commands: Mutex<Vec<(i32, String)>>,
    outstanding: AtomicUsize,
    replied_total: AtomicUsize,
    pub max_outstanding: AtomicUsize,
    desynced: AtomicBool,
}

impl Stats {
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn command_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    pub fn saw_command_packet(&self) -> bool {
        self.packet_types
            .lock()
            .unwrap()
            .contains(&PacketType::COMMAND.0)
    }
}

pub struct FakeServer {
    pub addr: SocketAddr,
    pub stats: Arc<Stats>,
}

impl FakeServer {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stats = Arc::new(Stats::default());

        let accept_stats = stats.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accept_stats.connections.fetch_add(1, Ordering::SeqCst);
                if behavior.close_on_connect {
                    drop(stream);
                    continue;
                }
                tokio::spawn(serve(stream, behavior.clone(), accept_stats.clone()));
            }
        });

        Self { addr, stats }
    }

    pub fn config(&self) -> RconConfig {
        RconConfig::new("127.0.0.1", self.addr.port(), PASSWORD)
            .with_timeouts(Duration::from_secs(2), Duration::from_secs(2))
    }

    pub fn config_with(&self, password: &str, reassembly: ReassemblyMode) -> RconConfig {
        RconConfig::new("127.0.0.1", self.addr.port(), password)
            .with_timeouts(Duration::from_secs(2), Duration::from_secs(2))
            .with_reassembly(reassembly)
    }
}

enum Job {
    Immediate(Vec<Packet>),
    Command(Vec<Packet>),
}

async fn serve(stream: TcpStream, behavior: Behavior, stats: Arc<Stats>) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, RconCodec);
    let mut writer = FramedWrite::new(write_half, RconCodec);
    let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

    // Replies are written by a separate task so the reader can observe a
    // client that pipelines requests instead of waiting for replies
    let writer_behavior = behavior.clone();
    let writer_stats = stats.clone();
    let writer_task = tokio::spawn(async move {
        let mut replied = 0usize;
        while let Some(job) = rx.recv().await {
            let packets = match job {
                Job::Immediate(packets) => packets,
                Job::Command(packets) => {
                    let exhausted = writer_behavior.total_reply_budget
                        == Some(writer_stats.replied_total.load(Ordering::SeqCst));
                    if exhausted || Some(replied) == writer_behavior.close_after_commands {
                        writer_stats.outstanding.fetch_sub(1, Ordering::SeqCst);
                        // Dropping the write half sends FIN
                        return;
                    }
                    if !writer_behavior.reply_delay.is_zero() {
                        tokio::time::sleep(writer_behavior.reply_delay).await;
                    }
                    writer_stats.outstanding.fetch_sub(1, Ordering::SeqCst);
                    replied += 1;
                    writer_stats.replied_total.fetch_add(1, Ordering::SeqCst);
                    packets
                }
            };
            for packet in packets {
                if writer.feed(packet).await.is_err() {
                    return;
                }
            }
            if writer.flush().await.is_err() {
                return;
            }
        }
    });

    while let Some(Ok(packet)) = reader.next().await {
        stats.packet_types.lock().unwrap().push(packet.packet_type.0);

        let job = match packet.packet_type {
            PacketType::LOGIN => {
                stats.logins.fetch_add(1, Ordering::SeqCst);
                let accepted = !behavior.reject_all && packet.body == behavior.password.as_bytes();
                let id = if accepted { packet.request_id } else { -1 };
                Job::Immediate(vec![Packet::new(id, PacketType::AUTH_RESPONSE, "")])
            }
            PacketType::COMMAND => {
                let command = packet.body_str().into_owned();
                stats
                    .commands
                    .lock()
                    .unwrap()
                    .push((packet.request_id, command.clone()));

                let now = stats.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
                stats.max_outstanding.fetch_max(now, Ordering::SeqCst);

                if behavior.hang_on_command {
                    continue;
                }

                let mut id = packet.request_id;
                if behavior.desync_first_command && !stats.desynced.swap(true, Ordering::SeqCst) {
                    id += 1000;
                }

                let output = (behavior.reply)(packet.request_id, &command);
                Job::Command(fragment(id, &output, behavior.fragment_size))
            }
            PacketType::RESPONSE if behavior.source_trailer => Job::Immediate(vec![
                Packet::new(packet.request_id, PacketType::RESPONSE, ""),
                Packet::new(packet.request_id, PacketType::RESPONSE, vec![0u8, 1, 0, 0]),
            ]),
            other => Job::Immediate(vec![Packet::new(
                packet.request_id,
                PacketType::RESPONSE,
                format!("Unknown request {:x}", other.0),
            )]),
        };

        if tx.send(job).is_err() {
            break;
        }
    }

    drop(tx);
    let _ = writer_task.await;
}

fn fragment(id: i32, output: &str, size: Option<usize>) -> Vec<Packet> {
    match size {
        Some(size) if !output.is_empty() => output
            .as_bytes()
            .chunks(size)
            .map(|chunk| Packet::new(id, PacketType::RESPONSE, chunk.to_vec()))
            .collect(),
        _ => vec![Packet::new(id, PacketType::RESPONSE, output)],
    }
}
