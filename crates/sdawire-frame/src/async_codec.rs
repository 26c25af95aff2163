//! `tokio_util::codec` adapter for async serial streams.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::codec::{decode_frame, resync_to_preamble, Frame, FrameConfig};
use crate::encoder::FrameEncoder;
use crate::error::{FrameError, Result};

/// Frame codec for use with `tokio_util::codec::Framed`.
#[derive(Debug, Clone)]
pub struct SerialCodec {
    max_payload_size: usize,
    resync: bool,
    encoder: FrameEncoder,
}

impl SerialCodec {
    /// Codec with the default 16 MiB limit and resync off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec using the payload limit and resync setting of `config`.
    pub fn with_config(config: &FrameConfig) -> Self {
        Self {
            max_payload_size: config.max_payload_size,
            resync: config.resync,
            encoder: FrameEncoder::new(),
        }
    }

    /// Largest payload accepted in either direction.
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    fn encode_payload(&self, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
        if payload.len() > self.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload_size,
            });
        }
        self.encoder.encode_into(payload, dst)
    }
}

impl Default for SerialCodec {
    fn default() -> Self {
        Self::with_config(&FrameConfig::default())
    }
}

impl Decoder for SerialCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        loop {
            match decode_frame(src, self.max_payload_size) {
                Err(FrameError::InvalidPreamble) if self.resync => {
                    let skipped = resync_to_preamble(src);
                    warn!(skipped, "discarded bytes before frame preamble");
                }
                other => return other,
            }
        }
    }
}

impl Encoder<Frame> for SerialCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        self.encode_payload(&item.payload, dst)
    }
}

impl Encoder<Bytes> for SerialCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        self.encode_payload(&item, dst)
    }
}

impl Encoder<&[u8]> for SerialCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<()> {
        self.encode_payload(item, dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::codec::{FRAME_OVERHEAD, PREAMBLE};
    use crate::encoder::encode_frame;

    #[test]
    fn decodes_incrementally() {
        let mut wire = BytesMut::new();
        encode_frame(b"incremental", &mut wire).unwrap();

        let mut codec = SerialCodec::new();
        let mut src = BytesMut::new();
        for (i, byte) in wire.iter().enumerate() {
            src.extend_from_slice(&[*byte]);
            let decoded = codec.decode(&mut src).unwrap();
            if i + 1 < wire.len() {
                assert!(decoded.is_none());
            } else {
                assert_eq!(decoded.unwrap().payload.as_ref(), b"incremental");
            }
        }
        assert!(src.is_empty());
    }

    #[test]
    fn encodes_all_item_types_identically() {
        let mut codec = SerialCodec::new();
        let mut a = BytesMut::new();
        let mut b = BytesMut::new();
        let mut c = BytesMut::new();

        codec.encode(Frame::new("same"), &mut a).unwrap();
        codec.encode(Bytes::from_static(b"same"), &mut b).unwrap();
        codec.encode(&b"same"[..], &mut c).unwrap();

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.len(), FRAME_OVERHEAD + 4);
    }

    #[test]
    fn encoder_enforces_max_payload() {
        let cfg = FrameConfig {
            max_payload_size: 2,
            ..FrameConfig::default()
        };
        let mut codec = SerialCodec::with_config(&cfg);
        let mut dst = BytesMut::new();

        let err = codec.encode(&b"abc"[..], &mut dst).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 3, max: 2 }));
        assert!(dst.is_empty());
    }

    #[test]
    fn decoder_resyncs_when_enabled() {
        let mut src = BytesMut::from(&b"garbage-bytes"[..]);
        encode_frame(b"found", &mut src).unwrap();

        let mut strict = SerialCodec::new();
        assert!(matches!(
            strict.decode(&mut src.clone()),
            Err(FrameError::InvalidPreamble)
        ));

        let cfg = FrameConfig {
            resync: true,
            ..FrameConfig::default()
        };
        let mut lenient = SerialCodec::with_config(&cfg);
        let frame = lenient.decode(&mut src).unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"found");
    }

    #[test]
    fn decoder_waits_on_partial_preamble_after_resync() {
        let cfg = FrameConfig {
            resync: true,
            ..FrameConfig::default()
        };
        let mut codec = SerialCodec::with_config(&cfg);
        let mut src = BytesMut::from(&b"0123456789ab"[..]);
        src.extend_from_slice(&PREAMBLE[..3]);

        assert!(codec.decode(&mut src).unwrap().is_none());
        assert_eq!(src.as_ref(), &PREAMBLE[..3]);
    }

    #[tokio::test]
    async fn framed_roundtrip_over_duplex() {
        let (client, server) = tokio::io::duplex(256);
        let mut sink = FramedWrite::new(client, SerialCodec::new());
        let mut stream = FramedRead::new(server, SerialCodec::new());

        let payloads: Vec<Bytes> = vec![
            Bytes::from_static(b""),
            Bytes::from_static(b"op-1"),
            Bytes::from(vec![0x5A; 1000]),
        ];

        let to_send = payloads.clone();
        let writer = tokio::spawn(async move {
            for payload in to_send {
                sink.send(payload).await.unwrap();
            }
        });

        for expected in &payloads {
            let frame = stream.next().await.unwrap().unwrap();
            assert_eq!(&frame.payload, expected);
            assert!(frame.is_valid());
        }

        writer.await.unwrap();
    }
}
