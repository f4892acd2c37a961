/// How a byte is shown to the user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ByteFormat {
    /// `0x0f`
    #[default]
    Hex,
    /// `0b00001111`
    Bin,
    /// `017`
    Oct,
    /// `15`
    Dec,
}

impl ByteFormat {
    pub fn format(self, value: u8) -> String {
        match self {
            ByteFormat::Hex => format!("0x{:02x}", value),
            ByteFormat::Bin => format!("0b{:08b}", value),
            ByteFormat::Oct => format!("0{:o}", value),
            ByteFormat::Dec => format!("{}", value),
        }
    }
}

/// Format a byte written by `OUT`, e.g. `0x0a (0b00001010, 10)`
pub fn format_output(value: u8) -> String {
    format!("0x{:02x} (0b{:08b}, {})", value, value, value)
}

/// Renders memory as rows of bytes prefixed with the address of the first one.
///
/// E.g. `10: 00 01 02 03` for a stride of 4.
pub fn hexdump(data: &[u8], addr_width: usize, stride: usize) -> String {
    let mut str = String::new();

    for (line, bytes) in data.chunks(stride.max(1)).enumerate() {
        if line != 0 {
            str.push('\n');
        }
        // TODO: Collapse runs of identical lines into `*` like Linux `hexdump`
        str.push_str(format!("{:0width$x}:", line * stride, width = addr_width).as_str());
        for byte in bytes {
            str.push(' ');
            str.push_str(format!("{:02x}", byte).as_str());
        }
    }

    str
}
