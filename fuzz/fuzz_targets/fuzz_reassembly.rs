#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use rcon_session::protocol::reassembly::{Progress, Reassembler};
use rcon_session::RconCodec;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let request_id = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let trailer_id = i32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if request_id == trailer_id {
        return;
    }

    let mut reassembler = Reassembler::with_trailer(request_id, trailer_id).skip_stale(Some(-7));
    let mut codec = RconCodec;
    let mut buf = BytesMut::from(&data[8..]);

    while let Ok(Some(packet)) = codec.decode(&mut buf) {
        match reassembler.push(packet) {
            Ok(Progress::Pending) => continue,
            Ok(Progress::Complete(_)) | Err(_) => break,
        }
    }
});
