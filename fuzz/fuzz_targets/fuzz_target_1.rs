#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use rcon_session::{Packet, RconCodec};
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    // Whole-frame parsing must never panic
    let _ = Packet::from_bytes(data);

    // Nor may streaming decode, whatever the length prefixes claim
    let mut codec = RconCodec;
    let mut buf = BytesMut::from(data);
    while let Ok(Some(packet)) = codec.decode(&mut buf) {
        let _ = packet.body_str();
    }
});
