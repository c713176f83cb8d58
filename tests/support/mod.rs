#![allow(dead_code)]

use stdfrec::{avec::DecodeOptions, sans::field::ByteOrder};

/// Little-endian options, matching the buffers built here.
pub fn options() -> DecodeOptions {
    DecodeOptions::default().byte_order(ByteOrder::Little)
}

/// A little-endian record payload.
#[derive(Default)]
pub struct Body(pub Vec<u8>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn raw(mut self, v: &[u8]) -> Self {
        self.0.extend_from_slice(v);
        self
    }

    /// A `C*n` field: a length byte, then the text.
    pub fn cn(mut self, s: &str) -> Self {
        self.0.push(s.len() as u8);
        self.0.extend_from_slice(s.as_bytes());
        self
    }
}

/// A little-endian record stream.
#[derive(Default)]
pub struct Stream(pub Vec<u8>);

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(self, type_code: u8, subtype_code: u8, body: Body) -> Self {
        let length = body.0.len() as u16;
        self.frame(length, type_code, subtype_code, body)
    }

    /// A record whose declared length may disagree with its body.
    pub fn frame(mut self, length: u16, type_code: u8, subtype_code: u8, body: Body) -> Self {
        self.0.extend_from_slice(&length.to_le_bytes());
        self.0.push(type_code);
        self.0.push(subtype_code);
        self.0.extend_from_slice(&body.0);
        self
    }

    pub fn raw(mut self, v: &[u8]) -> Self {
        self.0.extend_from_slice(v);
        self
    }

    pub fn far(self, cpu_type: u8, stdf_ver: u8) -> Self {
        self.record(0, 10, Body::new().u8(cpu_type).u8(stdf_ver))
    }

    pub fn pir(self) -> Self {
        self.record(5, 10, Body::new().u8(1).u8(0))
    }

    pub fn prr(self, x: i16, y: i16, part_id: &str) -> Self {
        let body = Body::new()
            .u8(1)
            .u8(0)
            .u8(0)
            .u16(10)
            .u16(1)
            .u16(1)
            .i16(x)
            .i16(y)
            .u32(500)
            .cn(part_id)
            .cn("")
            .cn("");
        self.record(5, 20, body)
    }

    pub fn bytes(self) -> Vec<u8> {
        self.0
    }
}
