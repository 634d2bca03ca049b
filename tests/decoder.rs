use lazycbor::{
    CborError, DecodeLimits, Decoder, ErrorCode, ErrorKind, Integer, MajorType, Number, ValueType,
};

fn int(bytes: &[u8]) -> Integer {
    Decoder::new(&bytes).read_int(0).unwrap().unwrap()
}

fn float(bytes: &[u8]) -> f64 {
    Decoder::new(&bytes).read_float(0).unwrap().unwrap()
}

fn err_code(res: Result<impl core::fmt::Debug, CborError>) -> ErrorCode {
    res.unwrap_err().code
}

#[test]
fn fixed_width_reads_are_big_endian() {
    let bytes = [0x12u8, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0];
    let d = Decoder::new(&bytes);
    assert_eq!(d.read_uint8(1).unwrap(), 0x34);
    assert_eq!(d.read_uint16(0).unwrap(), 0x1234);
    assert_eq!(d.read_uint32(2).unwrap(), 0x5678_9abc);
    assert_eq!(d.read_uint64(0).unwrap(), 0x1234_5678_9abc_def0);
    assert_eq!(err_code(d.read_uint32(6)), ErrorCode::UnexpectedEof);
}

#[test]
fn unsigned_integers_across_width_boundaries() {
    assert_eq!(int(&[0x17]), Integer::Small(23));
    assert_eq!(int(&[0x18, 0x18]), Integer::Small(24));
    assert_eq!(int(&[0x18, 0xff]), Integer::Small(255));
    assert_eq!(int(&[0x19, 0x01, 0x00]), Integer::Small(256));
    assert_eq!(int(&[0x19, 0xff, 0xff]), Integer::Small(65_535));
    assert_eq!(int(&[0x1a, 0x00, 0x01, 0x00, 0x00]), Integer::Small(65_536));
    assert_eq!(
        int(&[0x1a, 0xff, 0xff, 0xff, 0xff]),
        Integer::Small(4_294_967_295)
    );

    let two_32 = int(&[0x1b, 0, 0, 0, 0x01, 0, 0, 0, 0]);
    assert!(two_32.is_big());
    assert_eq!(two_32.as_u64(), Some(1 << 32));

    let max = int(&[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    assert_eq!(max.as_u64(), Some(u64::MAX));
    assert_eq!(max.as_i64(), None);
}

#[test]
fn negative_integers_use_the_sign_mask() {
    assert_eq!(int(&[0x20]), Integer::Small(-1));
    assert_eq!(int(&[0x37]), Integer::Small(-24));
    assert_eq!(int(&[0x38, 0x18]), Integer::Small(-25));
    assert_eq!(int(&[0x39, 0x01, 0x00]), Integer::Small(-257));

    let min = int(&[0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    assert_eq!(min.as_i128(), -(1i128 << 64));
    assert!(min.is_big());
}

#[test]
fn read_uint_keeps_the_raw_argument() {
    // -1
    let bytes = [0x20u8];
    let v = Decoder::new(&bytes).read_uint(0).unwrap().unwrap();
    assert_eq!(v, Integer::Small(0));
}

#[test]
fn null_reads_as_none() {
    let bytes = [0xf6u8];
    let d = Decoder::new(&bytes);
    assert_eq!(d.read_int(0).unwrap(), None);
    assert_eq!(d.read_float(0).unwrap(), None);
    assert_eq!(d.read_string(0).unwrap(), None);
    assert!(Decoder::is_null(0xf6));
    assert!(!Decoder::is_null(0xf7));
}

#[test]
fn integer_on_text_is_type_mismatch() {
    let bytes = [0x61u8, b'a'];
    let err = Decoder::new(&bytes).read_int(0).unwrap_err();
    assert_eq!(err.code, ErrorCode::TypeMismatch);
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.offset, 0);
}

#[test]
fn half_precision_special_values() {
    assert_eq!(float(&[0xf9, 0x3c, 0x00]), 1.0);
    assert_eq!(float(&[0xf9, 0xc4, 0x00]), -4.0);
    assert_eq!(float(&[0xf9, 0x7b, 0xff]), 65_504.0);
    assert_eq!(float(&[0xf9, 0x7c, 0x00]), f64::INFINITY);
    assert_eq!(float(&[0xf9, 0xfc, 0x00]), f64::NEG_INFINITY);
    assert!(float(&[0xf9, 0x7e, 0x00]).is_nan());
    // smallest positive subnormal: 2^-24
    assert_eq!(float(&[0xf9, 0x00, 0x01]), 5.960_464_477_539_063e-8);
    assert_eq!(float(&[0xf9, 0x04, 0x00]), 6.103_515_625e-5);
    assert_eq!(float(&[0xf9, 0x80, 0x00]).to_bits(), (-0.0f64).to_bits());
}

#[test]
fn single_and_double_precision() {
    assert_eq!(float(&[0xfa, 0x47, 0xc3, 0x50, 0x00]), 100_000.0);
    assert_eq!(float(&[0xfa, 0x7f, 0x80, 0x00, 0x00]), f64::INFINITY);
    assert_eq!(
        float(&[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]),
        1.1
    );
    assert!(float(&[0xfb, 0x7f, 0xf8, 0, 0, 0, 0, 0, 0]).is_nan());
}

#[test]
fn float_on_simple_value_is_invalid_encoding() {
    let bytes = [0xf4u8];
    let err = Decoder::new(&bytes).read_float(0).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidFloatEncoding);
    assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
    assert_eq!(
        err.to_string(),
        "cbor decode failed at 0: invalid floating-point encoding"
    );

    let bytes = [0x01u8];
    assert_eq!(
        err_code(Decoder::new(&bytes).read_float(0)),
        ErrorCode::TypeMismatch
    );
}

#[test]
fn read_number_dispatches_on_value_type() {
    // [1.5, -3]
    let bytes = [0x82u8, 0xf9, 0x3e, 0x00, 0x22];
    let d = Decoder::new(&bytes);
    let vt = d.value_type(1).unwrap();
    assert_eq!(vt, ValueType::Float);
    assert_eq!(d.read_number(vt, 1).unwrap(), Some(Number::Float(1.5)));
    let vt = d.value_type(4).unwrap();
    assert_eq!(vt, ValueType::NInt);
    assert_eq!(
        d.read_number(vt, 4).unwrap(),
        Some(Number::Int(Integer::Small(-3)))
    );
}

#[test]
fn chunked_text_string_is_concatenated() {
    // (_ "ab", "cd", "ef")
    let bytes = [
        0x7fu8, 0x62, b'a', b'b', 0x62, b'c', b'd', 0x62, b'e', b'f', 0xff,
    ];
    let d = Decoder::new(&bytes);
    assert_eq!(d.read_string(0).unwrap().as_deref(), Some("abcdef"));
    assert_eq!(d.skip(0).unwrap(), bytes.len() as u64);
}

#[test]
fn chunked_byte_string_payload() {
    // (_ h'0102', h'03')
    let bytes = [0x5fu8, 0x42, 0x01, 0x02, 0x41, 0x03, 0xff];
    let d = Decoder::new(&bytes);
    assert_eq!(d.read_bytes(0).unwrap(), Some(vec![1, 2, 3]));
}

#[test]
fn byte_strings_decode_as_ascii() {
    let bytes = [0x42u8, b'A', 0xff];
    let s = Decoder::new(&bytes).read_string(0).unwrap().unwrap();
    assert_eq!(s, "A\u{fffd}");
}

#[test]
fn mixed_chunk_types_are_rejected() {
    // (_ text chunk, byte chunk)
    let bytes = [0x7fu8, 0x61, b'a', 0x41, b'b', 0xff];
    let err = Decoder::new(&bytes).read_string(0).unwrap_err();
    assert_eq!(err.code, ErrorCode::MalformedIndefiniteString);
    assert_eq!(err.offset, 3);
}

#[test]
fn invalid_utf8_text_is_rejected() {
    let bytes = [0x62u8, 0xff, 0xfe];
    assert_eq!(
        err_code(Decoder::new(&bytes).read_string(0)),
        ErrorCode::Utf8Invalid
    );
}

#[test]
fn boolean_values() {
    let bytes = [0xf4u8, 0xf5, 0xf6];
    let d = Decoder::new(&bytes);
    assert!(!d.boolean_value(0).unwrap());
    assert!(d.boolean_value(1).unwrap());
    let err = d.boolean_value(2).unwrap_err();
    assert_eq!(err.code, ErrorCode::IllegalBooleanEncoding);
    assert_eq!(err.offset, 2);
}

#[test]
fn reserved_additional_info_is_invalid_encoding() {
    for head in [0x1cu8, 0x1d, 0x1e, 0x3c, 0x5c, 0x9d, 0xdc, 0xfc] {
        let bytes = [head, 0, 0, 0, 0, 0, 0, 0, 0];
        let d = Decoder::new(&bytes);
        let err = d.skip(0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservedAdditionalInfo, "head {head:#x}");
    }
    let bytes = [0xfcu8];
    assert_eq!(
        err_code(Decoder::new(&bytes).value_type(0)),
        ErrorCode::ReservedAdditionalInfo
    );
}

#[test]
fn indefinite_integer_is_rejected() {
    let bytes = [0x1fu8];
    assert_eq!(
        err_code(Decoder::new(&bytes).read_int(0)),
        ErrorCode::InvalidIndefiniteLength
    );
}

#[test]
fn truncated_argument_is_eof() {
    let bytes = [0x19u8, 0x01];
    let err = Decoder::new(&bytes).read_int(0).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnexpectedEof);
    assert_eq!(err.kind(), ErrorKind::Source);
}

#[test]
fn extraction_limit_is_enforced() {
    let bytes = [0x43u8, 1, 2, 3];
    let d = Decoder::with_limits(&bytes, DecodeLimits::for_extraction(2));
    assert_eq!(err_code(d.read_raw(0, 3)), ErrorCode::UnsupportedExtractionSize);
    let err = d.read_bytes(0).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedExtractionSize);
    assert_eq!(err.kind(), ErrorKind::UnsupportedSize);
    assert_eq!(d.read_raw(0, 2).unwrap(), vec![0x43, 1]);
}

#[test]
fn extraction_limit_covers_chunked_strings() {
    // (_ "ab", "cd", "ef")
    let bytes = [0x7fu8, 0x62, b'a', b'b', 0x62, b'c', b'd', 0x62, b'e', b'f', 0xff];
    let tight = Decoder::with_limits(&bytes, DecodeLimits::for_extraction(2));
    let err = tight.read_string(0).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedExtractionSize);
    assert_eq!(err.offset, 0);
    assert_eq!(err_code(tight.read_bytes(0)), ErrorCode::UnsupportedExtractionSize);

    let exact = Decoder::with_limits(&bytes, DecodeLimits::for_extraction(6));
    assert_eq!(exact.read_string(0).unwrap().as_deref(), Some("abcdef"));
    assert_eq!(exact.read_bytes(0).unwrap().map(|b| b.len()), Some(6));
}

#[test]
fn tag_number_and_classification() {
    // 1(1363896240)
    let bytes = [0xc1u8, 0x1a, 0x51, 0x4b, 0x67, 0xb0];
    let d = Decoder::new(&bytes);
    assert_eq!(d.major_type(0).unwrap(), MajorType::SemanticTag);
    assert_eq!(d.value_type(0).unwrap(), ValueType::Tag);
    assert_eq!(d.tag_number(0).unwrap(), 1);
    assert_eq!(d.head_byte_size(0).unwrap(), 1);
    assert_eq!(d.head_byte_size(1).unwrap(), 5);
    assert_eq!(err_code(d.tag_number(1)), ErrorCode::TypeMismatch);
}

#[test]
fn value_types_of_simple_values() {
    let bytes = [0xf4u8, 0xf6, 0xf7, 0xe0, 0xf8, 0x20];
    let d = Decoder::new(&bytes);
    assert_eq!(d.value_type(0).unwrap(), ValueType::Bool);
    assert_eq!(d.value_type(1).unwrap(), ValueType::Null);
    assert_eq!(d.value_type(2).unwrap(), ValueType::Undefined);
    assert_eq!(d.value_type(3).unwrap(), ValueType::Simple);
    assert_eq!(d.value_type(4).unwrap(), ValueType::Simple);
    assert_eq!(d.skip(4).unwrap(), 6);
}
