//! Byte-level media fixtures shared by unit tests.

use chrono::{DateTime, Local};

/// Minimal JPEG whose APP1 segment holds a big-endian TIFF block with a
/// single `DateTime` (0x0132) entry. `trailer` is appended after EOI so
/// tests can vary the content without touching the metadata.
pub fn jpeg_with_exif(datetime: &str, trailer: &[u8]) -> Vec<u8> {
    assert_eq!(datetime.len(), 19, "EXIF timestamps are 19 characters");

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes()); // IFD0 offset
    tiff.extend_from_slice(&1u16.to_be_bytes()); // entry count
    tiff.extend_from_slice(&0x0132u16.to_be_bytes()); // DateTime
    tiff.extend_from_slice(&2u16.to_be_bytes()); // ASCII
    tiff.extend_from_slice(&20u32.to_be_bytes()); // count incl. NUL
    tiff.extend_from_slice(&26u32.to_be_bytes()); // value offset
    tiff.extend_from_slice(&0u32.to_be_bytes()); // next IFD
    tiff.extend_from_slice(datetime.as_bytes());
    tiff.push(0);

    let mut app1 = Vec::new();
    app1.extend_from_slice(b"Exif\x00\x00");
    app1.extend_from_slice(&tiff);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(&app1);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg.extend_from_slice(trailer);
    jpeg
}

/// JFIF-only JPEG with no EXIF segment
pub fn jpeg_without_exif() -> Vec<u8> {
    vec![
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00,
        0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
    ]
}

/// RAF file whose preview JPEG carries `datetime`
pub fn raf_with_exif(datetime: &str) -> Vec<u8> {
    raf_containing(&jpeg_with_exif(datetime, b"raf-preview"))
}

/// RAF header pointing at `preview`, which directly follows the header
pub fn raf_containing(preview: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"FUJIFILMCCD-RAW ");
    bytes.extend_from_slice(b"0201");
    bytes.extend_from_slice(b"FF129502");
    let mut camera = [0u8; 32];
    camera[..4].copy_from_slice(b"X-T5");
    bytes.extend_from_slice(&camera);
    bytes.extend_from_slice(b"0100");
    bytes.extend_from_slice(&[0u8; 20]);
    bytes.extend_from_slice(&108i32.to_be_bytes());
    bytes.extend_from_slice(&(preview.len() as i32).to_be_bytes());
    bytes.extend_from_slice(&[0u8; 16]); // CFA header + CFA regions
    bytes.extend_from_slice(preview);
    bytes
}

fn atom(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

fn movie(moov_payload: &[u8]) -> Vec<u8> {
    let mut bytes = atom(b"ftyp", b"qt  \x00\x00\x00\x00qt  ");
    bytes.extend(atom(b"wide", b""));
    bytes.extend(atom(b"mdat", &[0xAB; 64]));
    bytes.extend(atom(b"moov", moov_payload));
    bytes
}

/// QuickTime file with a version 0 `mvhd` holding `apple_seconds`
pub fn mov_with_creation_time(apple_seconds: u32) -> Vec<u8> {
    let mut mvhd = vec![0u8, 0, 0, 0];
    mvhd.extend_from_slice(&apple_seconds.to_be_bytes());
    mvhd.extend_from_slice(&apple_seconds.to_be_bytes()); // modification time
    mvhd.extend_from_slice(&600u32.to_be_bytes()); // time scale
    mvhd.extend_from_slice(&[0u8; 84]);
    movie(&atom(b"mvhd", &mvhd))
}

/// QuickTime file with a version 1 (64-bit) `mvhd`
pub fn mov_v1_with_creation_time(apple_seconds: u32) -> Vec<u8> {
    let mut mvhd = vec![1u8, 0, 0, 0];
    mvhd.extend_from_slice(&u64::from(apple_seconds).to_be_bytes());
    mvhd.extend_from_slice(&u64::from(apple_seconds).to_be_bytes());
    mvhd.extend_from_slice(&600u32.to_be_bytes());
    mvhd.extend_from_slice(&[0u8; 96]);
    movie(&atom(b"mvhd", &mvhd))
}

/// QuickTime file whose `moov` starts with an atom of type `kind`
pub fn mov_with_first_child(kind: &[u8; 4]) -> Vec<u8> {
    movie(&atom(kind, &[0u8; 16]))
}

pub fn to_apple_epoch(unix: i64) -> u32 {
    (unix + 2_082_844_800) as u32
}

/// `YYYY-MM-DD` of a unix timestamp in the local time zone
pub fn local_date(unix: i64) -> String {
    DateTime::from_timestamp(unix, 0)
        .unwrap()
        .with_timezone(&Local)
        .format("%Y-%m-%d")
        .to_string()
}
