
use fountain_tx::coding::RlncDecoder;
use fountain_tx::wire;

use std::collections::BTreeMap;
use std::net;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time;

pub struct ReceiverReport {
    pub records: Vec<Box<[u8]>>,
    pub packets_received: u32,
    pub packets_dropped: u32,
}

// Decodes data packets arriving on `socket` and reports the collected rank of each block to
// `feedback_addr` after every packet. If `drop_every` is nonzero, every n-th packet is discarded
// unread. Runs until `stop` is set.
pub fn receiver_thread(
    socket: net::UdpSocket,
    feedback_addr: net::SocketAddr,
    generation_size: usize,
    symbol_size: usize,
    drop_every: u32,
    stop: Arc<AtomicBool>,
) -> ReceiverReport {
    socket.set_read_timeout(Some(time::Duration::from_millis(5))).unwrap();

    let mut decoders: BTreeMap<u32, RlncDecoder> = BTreeMap::new();
    let mut buf = [0u8; fountain_tx::MAX_DATAGRAM_SIZE];

    let mut packets_received = 0;
    let mut packets_dropped = 0;

    while !stop.load(Ordering::Relaxed) {
        let size = match socket.recv(&mut buf) {
            Ok(size) => size,
            Err(_) => continue,
        };

        packets_received += 1;

        if drop_every != 0 && packets_received % drop_every == 0 {
            packets_dropped += 1;
            continue;
        }

        let packet = wire::DataPacket::read(&buf[..size]).expect("malformed data packet");

        let decoder = decoders
            .entry(packet.block_id)
            .or_insert_with(|| RlncDecoder::new(generation_size, symbol_size));

        decoder.receive(packet.payload);

        if decoder.rank() > 0 {
            let ack = wire::Feedback { block_id: packet.block_id, rank: decoder.rank() as u32 };
            let _ = socket.send_to(&ack.write(), feedback_addr);
        }
    }

    let mut records = Vec::new();

    for (block_id, decoder) in decoders.iter() {
        let symbols = decoder.symbols().unwrap_or_else(|| panic!("block {} incomplete", block_id));
        records.extend(symbols.into_iter().map(Box::<[u8]>::from));
    }

    ReceiverReport {
        records,
        packets_received,
        packets_dropped,
    }
}

pub struct Receiver {
    socket: net::UdpSocket,
    generation_size: usize,
    symbol_size: usize,
    drop_every: u32,
}

impl Receiver {
    pub fn bind(generation_size: usize, symbol_size: usize, drop_every: u32) -> Self {
        let socket = net::UdpSocket::bind((net::Ipv4Addr::LOCALHOST, 0)).unwrap();

        Self {
            socket,
            generation_size,
            symbol_size,
            drop_every,
        }
    }

    pub fn data_addr(&self) -> net::SocketAddr {
        self.socket.local_addr().unwrap()
    }

    pub fn start(self, feedback_addr: net::SocketAddr) -> RunningReceiver {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_thread = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            receiver_thread(self.socket, feedback_addr, self.generation_size, self.symbol_size, self.drop_every, stop_thread)
        });

        RunningReceiver { stop, handle }
    }
}

pub struct RunningReceiver {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<ReceiverReport>,
}

impl RunningReceiver {
    pub fn finish(self) -> ReceiverReport {
        self.stop.store(true, Ordering::Relaxed);
        self.handle.join().unwrap()
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
