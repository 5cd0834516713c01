use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use log::{debug, trace};

use crate::bitio::{read_byte, BitReader, BitWriter};
use crate::error::{LzssError, Result};
use crate::token::{Reference, Token, LENGTH_BITS, MATCH_FLAG, POSITION_BITS};
use crate::window::{Window, MAX_MATCH_SIZE};

/// References must be longer than this to be worth encoding
pub const MIN_MATCH_SIZE: usize = 2;

/// Counters for one encode or decode run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub literals: u64,
    pub matches: u64,
}

/// Token stream produced from raw input.
///
/// Owns the history and lookahead windows for the whole run. The lookahead is
/// primed with up to `MAX_MATCH_SIZE` bytes; shorter inputs simply start with
/// a partly filled lookahead.
pub struct Tokens<R: Read> {
    input: R,
    history: Window,
    lookahead: Window,
    bytes_read: u64,
}

impl<R: Read> Tokens<R> {
    pub fn new(mut input: R) -> io::Result<Self> {
        let mut lookahead = Window::lookahead();
        let mut bytes_read = 0;
        while lookahead.len() < MAX_MATCH_SIZE {
            match read_byte(&mut input)? {
                Some(byte) => {
                    lookahead.push(byte);
                    bytes_read += 1;
                }
                None => break,
            }
        }
        Ok(Self { input, history: Window::history(), lookahead, bytes_read })
    }

    /// Move the front of the lookahead into history and refill from input.
    /// Returns false once both input and lookahead are drained.
    fn advance(&mut self) -> io::Result<bool> {
        if let Some(byte) = self.lookahead.pop_front() {
            self.history.push(byte);
        }
        if let Some(next) = read_byte(&mut self.input)? {
            self.lookahead.push(next);
            self.bytes_read += 1;
            return Ok(true);
        }
        Ok(!self.lookahead.is_empty())
    }

    fn next_token(&mut self) -> io::Result<Option<Token>> {
        let first = match self.lookahead.byte_at(0) {
            Some(byte) => byte,
            None => return Ok(None),
        };

        let reference = self.history.longest_match(&self.lookahead);
        if reference.length as usize > MIN_MATCH_SIZE {
            for _ in 0..reference.length {
                if !self.advance()? {
                    break;
                }
            }
            Ok(Some(Token::Match(reference)))
        } else {
            self.advance()?;
            Ok(Some(Token::Literal(first)))
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    #[cfg(test)]
    fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl<R: Read> Iterator for Tokens<R> {
    type Item = io::Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Compresses raw bytes from `reader` into an LZSS bitstream on `writer`
pub fn encode(reader: &mut impl Read, writer: &mut impl Write) -> Result<Summary> {
    let mut tokens = Tokens::new(reader)?;
    let mut bits = BitWriter::new(&mut *writer);
    let mut summary = Summary::default();

    for token in tokens.by_ref() {
        let token = token?;
        trace!("emit {:?} ({} bits)", token, token.bit_len());
        match token {
            Token::Literal(_) => summary.literals += 1,
            Token::Match(_) => summary.matches += 1,
        }
        token.write_to(&mut bits)?;
    }
    bits.finish()?;

    summary.bytes_in = tokens.bytes_read();
    summary.bytes_out = bits.bits_written().div_ceil(8);
    debug!(
        "encoded {} bytes into {} bytes ({} literals, {} matches)",
        summary.bytes_in, summary.bytes_out, summary.literals, summary.matches
    );
    Ok(summary)
}

/// Reconstructs raw bytes from an LZSS bitstream.
///
/// There is no length field: decoding stops when the bit reader runs out of
/// source bytes. A literal whose bits ran past the end is padding and is dropped.
pub fn decode(reader: &mut impl Read, writer: &mut impl Write) -> Result<Summary> {
    let mut bits = BitReader::new(reader);
    let mut history = Window::history();
    let mut summary = Summary::default();

    loop {
        if bits.read_bits(1)? == MATCH_FLAG {
            let Reference { position, length } =
                Reference::unpack(bits.read_bits(POSITION_BITS + LENGTH_BITS)? as u16);
            if length as usize <= MIN_MATCH_SIZE {
                return Err(LzssError::InvalidReference {
                    position,
                    length,
                    offset: bits.bytes_read(),
                });
            }

            let available = history.len();
            let copied = history
                .copy_range(position as usize, length as usize)
                .ok_or_else(|| LzssError::ReferenceOutOfWindow {
                    position,
                    length,
                    available,
                    offset: bits.bytes_read(),
                })?;
            writer.write_all(&copied)?;
            summary.matches += 1;
            summary.bytes_out += copied.len() as u64;

            if bits.exhausted() {
                break;
            }
        } else {
            let byte = bits.read_bits(8)? as u8;
            if bits.exhausted() {
                break;
            }
            history.push(byte);
            writer.write_all(&[byte])?;
            summary.literals += 1;
            summary.bytes_out += 1;
        }
    }
    writer.flush()?;

    summary.bytes_in = bits.bytes_read();
    debug!(
        "decoded {} bytes into {} bytes ({} literals, {} matches)",
        summary.bytes_in, summary.bytes_out, summary.literals, summary.matches
    );
    Ok(summary)
}

// Helper to open input (file or stdin)
fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let file = File::open(path).map_err(|source| LzssError::OpenInput { path: path.to_string(), source })?;
        Ok(Box::new(BufReader::new(file)))
    }
}

// Helper to open output (file or stdout)
fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        let file = File::create(path).map_err(|source| LzssError::CreateOutput { path: path.to_string(), source })?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Compresses the file at `input` into `output`; `-` means stdin/stdout
pub fn encode_file(input: &str, output: &str) -> Result<Summary> {
    let mut reader = open_input(input)?;
    let mut writer = open_output(output)?;
    let summary = encode(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(summary)
}

/// Decompresses the file at `input` into `output`; `-` means stdin/stdout
pub fn decode_file(input: &str, output: &str) -> Result<Summary> {
    let mut reader = open_input(input)?;
    let mut writer = open_output(output)?;
    decode(&mut reader, &mut writer)
}
