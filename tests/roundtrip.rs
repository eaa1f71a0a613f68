//! Container-level tests: every format goes through real encode/decode of
//! its image bytes.

use stegano::{Carrier, Charset, Codec, Error, Extracted, Format};

/// Smooth mid-range RGB(A) content, away from the clamping limits
fn cover(width: u32, height: u32, channels: usize) -> Carrier {
    let pixels = (0..width * height)
        .flat_map(|i| {
            let (x, y) = (i % width, i / width);
            let px = [
                (64 + (x * 2 + y) % 128) as u8,
                (96 + (x + y * 3) % 64) as u8,
                (80 + (x * y) % 96) as u8,
                (30 + (x + y) % 200) as u8,
            ];
            px.into_iter().take(channels)
        })
        .collect();
    Carrier::new(width, height, channels, pixels).unwrap()
}

fn cover_bytes(width: u32, height: u32, channels: usize, format: Format) -> Vec<u8> {
    cover(width, height, channels).encode(format).unwrap()
}

/// Reproducible text of exactly `len` bytes
fn message(len: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789 ";
    (0..len).map(|i| CHARS[i % CHARS.len()] as char).collect()
}

/// A carrier whose LSBs spell out `bytes`, MSB first
fn lsb_carrier(width: u32, height: u32, bytes: &[u8]) -> Carrier {
    let bits: Vec<u8> = bytes
        .iter()
        .flat_map(|&b| (0..8).rev().map(move |i| (b >> i) & 1))
        .collect();
    let len = (width * height * 3) as usize;
    assert!(bits.len() <= len);
    let pixels = (0..len)
        .map(|i| 100 | bits.get(i).copied().unwrap_or(0))
        .collect();
    Carrier::new(width, height, 3, pixels).unwrap()
}

#[test]
fn single_char_in_flat_8x8() {
    let carrier = Carrier::new(8, 8, 3, vec![128; 192]).unwrap();
    let bytes = carrier.encode(Format::Png).unwrap();
    assert_eq!(stegano::capacity(&bytes, Format::Png).unwrap().bits(), 192);
    let stego = stegano::hide(&bytes, Format::Png, "A").unwrap();
    assert_eq!(stegano::reveal(&stego, Format::Png).unwrap().text(), "A");
}

#[test]
fn roundtrip_every_format() {
    let text = "Hello, steganography! Привет 🦀";
    for format in Format::ALL {
        for channels in [3, 4] {
            let bytes = cover_bytes(128, 96, channels, format);
            let stego = stegano::hide(&bytes, format, text).unwrap();
            let extracted = stegano::reveal(&stego, format).unwrap();
            assert_eq!(
                extracted,
                Extracted::Text {
                    text: text.to_owned(),
                    charset: Charset::Utf8
                },
                "{format} with {channels} channels"
            );
        }
    }
}

#[test]
fn lossless_capacity_boundary() {
    for format in [Format::Png, Format::Bmp, Format::WebP] {
        // 8x8 RGB = 192 bits = 24 bytes, one of them the marker
        let bytes = cover_bytes(8, 8, 3, format);
        let fits = message(23);
        let stego = stegano::hide(&bytes, format, &fits).unwrap();
        assert_eq!(stegano::reveal(&stego, format).unwrap().text(), fits);

        match stegano::hide(&bytes, format, &message(24)) {
            Err(Error::CapacityExceeded {
                required_bits,
                capacity_bits,
                max_payload_bytes,
            }) => {
                assert_eq!(required_bits, 200);
                assert_eq!(capacity_bits, 192);
                assert_eq!(max_payload_bytes, 23);
            }
            other => panic!("{format}: expected CapacityExceeded, got {other:?}"),
        }
    }
}

#[test]
fn jpeg_capacity_boundary() {
    // 8x8 blocks * 3 channels = 192 bits, two marker bytes
    let bytes = cover_bytes(64, 64, 3, Format::Jpeg);
    let capacity = stegano::capacity(&bytes, Format::Jpeg).unwrap();
    assert_eq!(capacity.bits(), 192);
    assert_eq!(capacity.max_payload_bytes(), 22);

    let fits = message(22);
    let stego = stegano::hide(&bytes, Format::Jpeg, &fits).unwrap();
    assert_eq!(stegano::reveal(&stego, Format::Jpeg).unwrap().text(), fits);

    let err = stegano::hide(&bytes, Format::Jpeg, &message(23)).unwrap_err();
    assert!(matches!(
        err,
        Error::CapacityExceeded {
            required_bits: 200,
            capacity_bits: 192,
            max_payload_bytes: 22
        }
    ));
}

#[test]
fn overflow_leaves_input_untouched() {
    let carrier = cover(4, 4, 4);
    let before = carrier.clone();
    let codec = stegano::codec::for_format(Format::Png);
    assert!(codec.encode(&carrier, &message(100)).is_err());
    assert_eq!(carrier, before);
}

#[test]
fn untouched_bits_are_preserved() {
    let bytes = cover_bytes(32, 16, 4, Format::Png);
    let original = Carrier::decode(&bytes, Format::Png).unwrap();
    let text = "keep the rest";
    let stego = stegano::hide(&bytes, Format::Png, text).unwrap();
    let stego = Carrier::decode(&stego, Format::Png).unwrap();
    assert_eq!(stego.channels(), 4);

    let used = (text.len() + 1) * 8;
    let slots = original
        .pixels()
        .chunks(4)
        .zip(stego.pixels().chunks(4))
        .flat_map(|(a, b)| (0..4).map(move |c| (c, a[c], b[c])));
    let mut color_slot = 0;
    for (channel, before, after) in slots {
        if channel == 3 {
            assert_eq!(before, after, "alpha changed");
            continue;
        }
        if color_slot < used {
            assert_eq!(before & !1, after & !1);
        } else {
            assert_eq!(before, after, "color slot {color_slot} changed");
        }
        color_slot += 1;
    }
}

#[test]
fn encoding_is_deterministic() {
    for format in Format::ALL {
        let bytes = cover_bytes(64, 64, 3, format);
        let first = stegano::hide(&bytes, format, "same in, same out").unwrap();
        let second = stegano::hide(&bytes, format, "same in, same out").unwrap();
        assert_eq!(first, second, "{format}");
    }
}

#[test]
fn jpeg_survives_resave() {
    let bytes = cover_bytes(128, 96, 3, Format::Jpeg);
    let capacity = stegano::capacity(&bytes, Format::Jpeg).unwrap();
    let text = message(capacity.max_payload_bytes() / 2);
    let stego = stegano::hide(&bytes, Format::Jpeg, &text).unwrap();

    let resaved = Carrier::decode(&stego, Format::Jpeg)
        .unwrap()
        .encode(Format::Jpeg)
        .unwrap();
    assert_ne!(resaved, bytes);
    assert_eq!(stegano::reveal(&resaved, Format::Jpeg).unwrap().text(), text);
}

#[test]
fn saturated_covers_roundtrip() {
    for value in [0, 255] {
        for format in Format::ALL {
            let carrier = Carrier::new(128, 96, 3, vec![value; 128 * 96 * 3]).unwrap();
            let bytes = carrier.encode(format).unwrap();
            let capacity = stegano::capacity(&bytes, format).unwrap();
            let text = message(capacity.max_payload_bytes().min(64) / 2);
            let stego = stegano::hide(&bytes, format, &text).unwrap();
            assert_eq!(
                stegano::reveal(&stego, format).unwrap().text(),
                text,
                "{format} flat {value}"
            );
        }
    }
}

#[test]
fn legacy_code_page_fallback() {
    // "Привет" in windows-1251, not valid UTF-8
    let payload = [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2, 0x00];
    let bytes = lsb_carrier(8, 8, &payload).encode(Format::Png).unwrap();
    let extracted = stegano::reveal(&bytes, Format::Png).unwrap();
    assert_eq!(
        extracted,
        Extracted::Text {
            text: "Привет".to_owned(),
            charset: Charset::Windows1251
        }
    );

    // 0x98 is unassigned in windows-1251
    let payload = [0x98, 0xCF, 0x00];
    let bytes = lsb_carrier(4, 4, &payload).encode(Format::Png).unwrap();
    let extracted = stegano::reveal(&bytes, Format::Png).unwrap();
    assert_eq!(
        extracted,
        Extracted::Text {
            text: "\u{98}\u{cf}".to_owned(),
            charset: Charset::Latin1
        }
    );
}

#[test]
fn missing_marker_is_not_an_error() {
    let carrier = lsb_carrier(4, 4, &[0xFF; 6]);
    let bytes = carrier.encode(Format::Bmp).unwrap();
    let extracted = stegano::reveal(&bytes, Format::Bmp).unwrap();
    assert!(!extracted.is_terminated());
    assert_eq!(extracted.text().chars().count(), 6);

    let blank = Carrier::new(8, 8, 3, vec![200; 192]).unwrap();
    let bytes = blank.encode(Format::WebP).unwrap();
    assert_eq!(stegano::reveal(&bytes, Format::WebP).unwrap(), Extracted::Empty);
}

#[test]
fn nul_in_text_is_rejected() {
    let bytes = cover_bytes(16, 16, 3, Format::Png);
    let err = stegano::hide(&bytes, Format::Png, "a\0b").unwrap_err();
    assert!(matches!(err, Error::MarkerInPayload { offset: 1 }));
}

#[test]
fn malformed_container_is_propagated() {
    let png = cover_bytes(8, 8, 3, Format::Png);
    let err = stegano::reveal(&png[..20], Format::Png).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedCarrier {
            format: Format::Png,
            ..
        }
    ));
    let err = stegano::hide(&png, Format::Jpeg, "wrong container").unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedCarrier {
            format: Format::Jpeg,
            ..
        }
    ));
}
