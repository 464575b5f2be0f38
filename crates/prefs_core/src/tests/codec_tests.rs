use serde::Deserialize;

use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Columns {
    widths: Vec<u32>,
    visible: bool,
}

#[test]
fn json_codec_round_trips_structs() {
    let codec = JsonCodec::<Columns>::new();
    let value = Columns {
        widths: vec![120, 80, 200],
        visible: true,
    };
    let blob = codec.encode(&value).expect("encode");
    assert_eq!(codec.decode(&blob).expect("decode"), value);
}

#[test]
fn json_codec_ignores_unknown_fields() {
    let codec = JsonCodec::<Columns>::new();
    let decoded = codec
        .decode(r#"{"widths":[1],"visible":false,"added_later":"x"}"#)
        .expect("decode");
    assert_eq!(
        decoded,
        Columns {
            widths: vec![1],
            visible: false
        }
    );
}

#[test]
fn json_codec_reports_decode_failure() {
    let codec = JsonCodec::<i64>::new();
    let err = codec.decode("\"not a number\"").expect_err("wrong shape");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn builtin_codecs_cover_common_widget_types() {
    let codecs = CodecRegistry::with_builtin_codecs();
    assert!(codecs.contains::<String>());
    assert!(codecs.contains::<bool>());
    assert!(codecs.contains::<i64>());
    assert!(codecs.contains::<Vec<String>>());
    assert!(!codecs.contains::<Columns>());

    let strings = codecs.resolve::<String>().expect("string codec");
    assert_eq!(strings.encode(&"dark".to_string()).expect("encode"), "\"dark\"");
}

#[test]
fn registered_codec_replaces_earlier_one() {
    struct Upper;
    impl Codec<String> for Upper {
        fn encode(&self, value: &String) -> Result<String, CodecError> {
            Ok(value.to_uppercase())
        }
        fn decode(&self, blob: &str) -> Result<String, CodecError> {
            Ok(blob.to_lowercase())
        }
    }

    let codecs = CodecRegistry::with_builtin_codecs();
    codecs.register::<String>(Arc::new(Upper));
    let codec = codecs.resolve::<String>().expect("codec");
    assert_eq!(codec.encode(&"abc".to_string()).expect("encode"), "ABC");
}

#[test]
fn resolve_unknown_type_is_none() {
    let codecs = CodecRegistry::new();
    assert!(codecs.resolve::<Columns>().is_none());
    codecs.register_json::<Columns>();
    assert!(codecs.resolve::<Columns>().is_some());
}
