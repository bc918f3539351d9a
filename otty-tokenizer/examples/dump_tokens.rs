//! Feed a byte stream to the decoders in small chunks and print every token
//! as JSON. Run with `RUST_LOG=debug` to see why sequences were rejected.
use env_logger::Env;
use memchr::memchr;
use otty_tokenizer::{
    Cursor, Decoded, Encoding, Incidentals, SessionState, Token,
    decode_device_control_string, decode_xterm_sequence, is_dcs, is_xterm,
};

const CHUNK: usize = 7;
const ESC: u8 = 0x1B;

#[derive(Default)]
struct Dispatcher {
    buffer: Vec<u8>,
    session: SessionState,
    seq: usize,
}

impl Dispatcher {
    fn feed(&mut self, bytes: &[u8]) -> serde_json::Result<()> {
        self.buffer.extend_from_slice(bytes);

        let mut offset = 0;
        while let Some(start) = memchr(ESC, &self.buffer[offset..]) {
            let pending = &self.buffer[offset + start..];
            let mut incidentals = Incidentals::new();

            let decoded = if is_dcs(pending) {
                decode_device_control_string(pending, Encoding::Utf8)
            } else if is_xterm(pending) {
                let mut cursor = Cursor::new(pending, Encoding::Utf8);
                decode_xterm_sequence(&mut cursor, &mut incidentals, &mut self.session)
            } else if pending.len() < 2 {
                Decoded::Incomplete
            } else {
                // Some other escape sequence, not ours to decode.
                offset += start + 1;
                continue;
            };

            for token in incidentals.drain() {
                self.print("incidental", &token)?;
            }

            match decoded {
                Decoded::Complete(token) => {
                    offset += start + token.consumed();
                    self.print("token", &token)?;
                },
                Decoded::Incomplete => {
                    offset += start;
                    break;
                },
            }
        }

        self.buffer.drain(..offset);
        Ok(())
    }

    fn print(&mut self, label: &str, token: &Token) -> serde_json::Result<()> {
        self.seq += 1;
        println!("{:02}: {label} {}", self.seq, serde_json::to_string(token)?);
        Ok(())
    }
}

fn main() -> serde_json::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let stream: &[u8] = b"\x1b]2;otty\x07\
        \x1bP+q7465726d;544e\x1b\\\
        \x1b]8;id=docs;https://otty.sh\x1b\\click me\x1b]8;;\x07\
        \x1b]1337;File=name=YQ==;inline=1:QUJDREVGR0g=\x07\
        \x1b]1337;MultipartFile=name=Yg==\x07\
        \x1b]1337;FilePart=QU\x07JD\x1b\\\
        \x1b]1337;FileEnd\x07\
        \x1b]777;unknown\x07";

    let mut dispatcher = Dispatcher::default();
    for chunk in stream.chunks(CHUNK) {
        dispatcher.feed(chunk)?;
    }

    Ok(())
}
