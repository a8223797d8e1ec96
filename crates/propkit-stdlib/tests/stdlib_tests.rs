use propkit_stdlib::{codec::Codec, duration, random};
use std::time::Duration;

#[test]
fn test_random_bytes_survive_every_codec() {
    let data = random::alphanumeric(37).into_bytes();
    for codec in [
        Codec::Base32,
        Codec::Base32Hex,
        Codec::Base64,
        Codec::Base64Url,
        Codec::Hex,
        Codec::HexUpper,
    ] {
        let text = codec.encode(&data);
        assert_eq!(codec.decode(&text).unwrap(), data, "{}", codec.name());
    }
}

#[test]
fn test_random_hex_decodes() {
    let text = random::hex(32);
    assert_eq!(Codec::Hex.decode(&text).unwrap().len(), 16);
}

#[test]
fn test_duration_from_config_style_strings() {
    let timeouts = ["30s", "5m", "1h 15m", "750"];
    let parsed: Vec<Duration> = timeouts
        .iter()
        .map(|t| duration::parse_duration(t).unwrap())
        .collect();
    assert_eq!(
        parsed,
        vec![
            Duration::from_secs(30),
            Duration::from_secs(300),
            Duration::from_secs(4500),
            Duration::from_millis(750),
        ]
    );
    assert_eq!(duration::format_duration(parsed[2]), "1h15m");
}
