//! # Frames WebSocket (RFC 6455)
//! src/websocket/frame.rs
//!
//! Codificación y decodificación de frames.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |     Masking key (si M=1)      |          Payload data         |
//! +-------------------------------+-------------------------------+
//! ```
//!
//! Los bits RSV se aceptan pero se ignoran, y cada frame se trata como un
//! mensaje completo: no hay reensamblado de fragmentos.

use std::io::{self, Read, Write};

/// Opcodes de frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,

    /// Opcode reservado; se ignora al despachar
    Reserved(u8),
}

impl OpCode {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x0F {
            0x0 => OpCode::Continuation,
            0x1 => OpCode::Text,
            0x2 => OpCode::Binary,
            0x8 => OpCode::Close,
            0x9 => OpCode::Ping,
            0xA => OpCode::Pong,
            other => OpCode::Reserved(other),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            OpCode::Continuation => 0x0,
            OpCode::Text => 0x1,
            OpCode::Binary => 0x2,
            OpCode::Close => 0x8,
            OpCode::Ping => 0x9,
            OpCode::Pong => 0xA,
            OpCode::Reserved(v) => *v & 0x0F,
        }
    }
}

/// Errores al leer un frame
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Longitud declarada mayor al límite (o con los 32 bits altos en uso)
    #[error("frame payload of {len} bytes exceeds limit of {max}")]
    PayloadTooLarge { len: u64, max: u64 },

    #[error("frame io error: {0}")]
    Io(#[from] io::Error),
}

/// Un frame WebSocket decodificado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub fin: bool,
    pub opcode: OpCode,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(opcode: OpCode, payload: Vec<u8>) -> Self {
        Self {
            fin: true,
            opcode,
            payload,
        }
    }

    pub fn text(message: &str) -> Self {
        Self::new(OpCode::Text, message.as_bytes().to_vec())
    }

    pub fn pong(payload: Vec<u8>) -> Self {
        Self::new(OpCode::Pong, payload)
    }

    pub fn close(payload: Vec<u8>) -> Self {
        Self::new(OpCode::Close, payload)
    }

    /// Lee un frame completo del stream
    ///
    /// Retorna `Ok(None)` si el stream termina, aunque sea a mitad del
    /// frame. El payload se desenmascara si el bit MASK está activo.
    ///
    /// Con longitud de 64 bits, un valor cuyos 32 bits altos no sean cero
    /// se rechaza igual que uno mayor a `max_payload`.
    ///
    /// # Ejemplo
    /// ```
    /// use std::io::Cursor;
    /// use wsgate::websocket::{Frame, OpCode};
    ///
    /// // "Hello" enmascarado (RFC 6455, sección 5.7)
    /// let raw = [0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58];
    /// let frame = Frame::read_from(&mut Cursor::new(raw), 1024).unwrap().unwrap();
    ///
    /// assert_eq!(frame.opcode, OpCode::Text);
    /// assert_eq!(frame.payload, b"Hello");
    /// ```
    pub fn read_from<R: Read>(reader: &mut R, max_payload: u64) -> Result<Option<Self>, FrameError> {
        let mut head = [0u8; 2];
        if !read_full(reader, &mut head)? {
            return Ok(None);
        }

        let fin = head[0] & 0x80 != 0;
        let opcode = OpCode::from_u8(head[0]);
        let masked = head[1] & 0x80 != 0;

        let len = match head[1] & 0x7F {
            126 => {
                let mut ext = [0u8; 2];
                if !read_full(reader, &mut ext)? {
                    return Ok(None);
                }
                u16::from_be_bytes(ext) as u64
            }
            127 => {
                let mut ext = [0u8; 8];
                if !read_full(reader, &mut ext)? {
                    return Ok(None);
                }
                let len = u64::from_be_bytes(ext);
                if len > u32::MAX as u64 {
                    return Err(FrameError::PayloadTooLarge {
                        len,
                        max: max_payload.min(u32::MAX as u64),
                    });
                }
                len
            }
            n => n as u64,
        };

        if len > max_payload {
            return Err(FrameError::PayloadTooLarge {
                len,
                max: max_payload,
            });
        }

        let mask = if masked {
            let mut key = [0u8; 4];
            if !read_full(reader, &mut key)? {
                return Ok(None);
            }
            Some(key)
        } else {
            None
        };

        let mut payload = vec![0u8; len as usize];
        if !read_full(reader, &mut payload)? {
            return Ok(None);
        }

        if let Some(key) = mask {
            for (i, byte) in payload.iter_mut().enumerate() {
                *byte ^= key[i % 4];
            }
        }

        Ok(Some(Frame {
            fin,
            opcode,
            payload,
        }))
    }

    /// Serializa el frame en la forma que envía el servidor
    ///
    /// FIN siempre en 1 y sin máscara. La longitud usa la codificación de
    /// tres niveles: directa (< 126), 126 + u16, o 127 + u64.
    pub fn encode(&self) -> Vec<u8> {
        let len = self.payload.len();
        let mut out = Vec::with_capacity(len + 10);

        out.push(0x80 | self.opcode.as_u8());

        if len < 126 {
            out.push(len as u8);
        } else if len < 65536 {
            out.push(126);
            out.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            out.push(127);
            out.extend_from_slice(&(len as u64).to_be_bytes());
        }

        out.extend_from_slice(&self.payload);
        out
    }

    /// Escribe el frame codificado y hace flush
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.encode())?;
        writer.flush()
    }
}

/// Llena `buf` por completo; `false` si el stream terminó antes
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
