
use std::collections::BTreeMap;
use std::net;

fn main() {
    let config = fountain_tx::Config::default();

    // Data arrives on port 9901; rank reports go back to the sender's feedback port
    let socket = net::UdpSocket::bind("127.0.0.1:9901").unwrap();
    let feedback_addr = net::SocketAddr::from(([127, 0, 0, 1], config.feedback_bind.port()));

    let mut decoders = BTreeMap::new();
    let mut buf = [0u8; fountain_tx::MAX_DATAGRAM_SIZE];
    let mut next_block_id = 0;

    loop {
        let size = match socket.recv(&mut buf) {
            Ok(size) => size,
            Err(err) => {
                println!("receive error: {}", err);
                continue;
            }
        };

        let packet = match fountain_tx::wire::DataPacket::read(&buf[..size]) {
            Some(packet) => packet,
            None => continue,
        };

        let rank = if packet.block_id < next_block_id {
            // Delivered already; the last ack must have been lost
            config.generation_size
        } else {
            let decoder = decoders
                .entry(packet.block_id)
                .or_insert_with(|| fountain_tx::coding::RlncDecoder::new(config.generation_size, config.symbol_size));

            decoder.receive(packet.payload);
            decoder.rank()
        };

        if rank > 0 {
            let ack = fountain_tx::wire::Feedback { block_id: packet.block_id, rank: rank as u32 };
            let _ = socket.send_to(&ack.write(), feedback_addr);
        }

        // Deliver every fully decoded block at the head, in order
        while let Some(decoder) = decoders.get(&next_block_id) {
            if decoder.rank() < config.generation_size {
                break;
            }

            for symbol in decoder.symbols().unwrap() {
                if let Some((seq, timestamp_ms)) = fountain_tx::driver::decode_record(symbol) {
                    println!("record {} (produced at {}ms)", seq, timestamp_ms);
                }
            }

            decoders.remove(&next_block_id);
            next_block_id += 1;
        }
    }
}
