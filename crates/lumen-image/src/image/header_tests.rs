//! Tests for the image header.

use super::header::Header;
use super::{HEADER_SIZE, ISA_VERSION};

#[test]
fn default_header_is_valid() {
    let h = Header::default();
    assert!(h.validate_file_magic());
    assert!(h.validate_program_magic());
    assert!(h.validate_version());
    assert_eq!(h.isa_version, ISA_VERSION);
}

#[test]
fn roundtrip() {
    let h = Header {
        code_length: 64,
        data_length: 16,
        read_keys_length: 8,
        write_keys_length: 16,
        publish_length: 8,
        pixel_objects_length: 24,
        init_entry: 0,
        loop_entry: 12,
        ..Header::default()
    };

    let decoded = Header::from_bytes(&h.to_bytes());
    assert_eq!(decoded, h);
}

#[test]
fn encoded_size() {
    assert_eq!(Header::default().to_bytes().len(), HEADER_SIZE);
}

#[test]
fn offsets_are_contiguous() {
    let h = Header {
        code_length: 64,
        data_length: 16,
        read_keys_length: 8,
        write_keys_length: 16,
        publish_length: 8,
        pixel_objects_length: 24,
        ..Header::default()
    };

    let o = h.compute_offsets();
    assert_eq!(o.code, HEADER_SIZE as u32);
    assert_eq!(o.data, o.code + 64);
    assert_eq!(o.read_keys, o.data + 16);
    assert_eq!(o.write_keys, o.read_keys + 8);
    assert_eq!(o.publish, o.write_keys + 16);
    assert_eq!(o.pixel_objects, o.publish + 8);
    assert_eq!(o.end, o.pixel_objects + 24);
}

#[test]
fn data_count_is_words() {
    let h = Header {
        data_length: 20,
        ..Header::default()
    };
    assert_eq!(h.data_count(), 5);
}

#[test]
fn wrong_magic_fails_validation() {
    let mut h = Header::default();
    h.file_magic = *b"NOPE";
    assert!(!h.validate_file_magic());

    let mut h = Header::default();
    h.program_magic = *b"NOPE";
    assert!(!h.validate_program_magic());
}
