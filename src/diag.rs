/// Opt-in diagnostics sink for the `--debug` flag.
///
/// Nothing is written unless the sink is enabled, so byte previews of
/// protected content never reach the console in normal operation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Diag {
    enabled: bool,
}

impl Diag {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn log(&self, msg: &str) {
        if self.enabled {
            eprintln!("[lockrun] {msg}");
        }
    }
}

pub fn hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

/// Hex of at most the first 16 bytes, for debug output.
pub fn hex_preview(bytes: &[u8]) -> String {
    hex(&bytes[..bytes.len().min(16)])
}
