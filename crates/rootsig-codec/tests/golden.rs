use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey};
use rootsig_codec::{
    compact_to_der, der_to_compact, to_base64, ChainedSignature, ClientData, CodecError,
    CompactSignature, CEREMONY_GET,
};

fn fixed_key() -> SigningKey {
    SigningKey::from_slice(&[7u8; 32]).unwrap()
}

#[test]
fn der_and_compact_forms_verify_identically() {
    let key = fixed_key();
    let verifying = key.verifying_key();

    for i in 0..8u8 {
        let message = [i; 48];
        let sig: Signature = key.sign(&message);
        let der = sig.to_der();

        let compact = der_to_compact(der.as_bytes()).unwrap();
        assert_eq!(compact.len(), 64);

        let from_compact = Signature::from_slice(&compact).unwrap();
        assert!(verifying.verify(&message, &from_compact).is_ok());

        let reencoded = compact_to_der(&compact).unwrap();
        assert_eq!(reencoded, der.as_bytes());
        let from_der = Signature::from_der(&reencoded).unwrap();
        assert!(verifying.verify(&message, &from_der).is_ok());

        // A different message must fail under both forms.
        assert!(verifying.verify(b"other", &from_compact).is_err());
    }
}

#[test]
fn compact_string_is_byte_identical_after_round_trip() {
    let client_data = ClientData::new(CEREMONY_GET, &[5u8; 64], "rootsig://test")
        .to_json()
        .unwrap();
    let original = CompactSignature {
        authenticator_data: vec![0x49; 37],
        client_data_json: client_data,
        signature: vec![0xab; 64],
    };
    let encoded = original.encode();
    let decoded = CompactSignature::decode(&encoded).unwrap();
    assert_eq!(decoded, original);
    assert_eq!(decoded.encode(), encoded);
}

#[test]
fn compact_golden_string() {
    let sig = CompactSignature {
        authenticator_data: b"auth".to_vec(),
        client_data_json: b"{}".to_vec(),
        signature: hex::decode("00ff").unwrap(),
    };
    assert_eq!(sig.encode(), "YXV0aA==.e30=.AP8=");
}

#[test]
fn chained_signature_wire_form() {
    let chained = ChainedSignature {
        temp_public_key: b"spki".to_vec(),
        endorsement: "YQ==.e30=.AP8=".to_string(),
        message_signature: "c2lnbmF0dXJl".to_string(),
    };
    let expected = format!("c3BraQ==.{}.c2lnbmF0dXJl", to_base64(b"YQ==.e30=.AP8="));
    assert_eq!(chained.encode(), expected);
    assert_eq!(ChainedSignature::decode(&expected).unwrap(), chained);
}

#[test]
fn malformed_compact_fields_are_format_errors() {
    assert!(matches!(
        CompactSignature::decode("YXV0aA==.!!!.AP8="),
        Err(CodecError::Base64 {
            field: "clientDataJSON",
            ..
        })
    ));
    assert!(matches!(
        CompactSignature::decode(""),
        Err(CodecError::WrongPartCount { found: 1, .. })
    ));
}

#[test]
fn compact_accepts_only_the_canonical_spelling() {
    let canonical = "YXV0aA==.e30=.AP8=";
    assert_eq!(
        CompactSignature::decode(canonical).unwrap().encode(),
        canonical
    );

    for variant in ["YXV0aA.e30.AP8", "YXV0aA==.e30=.AP-_", "YXV0aA==.e30=.AP8"] {
        assert!(
            matches!(
                CompactSignature::decode(variant),
                Err(CodecError::Base64 { .. })
            ),
            "accepted {variant}"
        );
    }
}

#[test]
fn chained_rejects_unpadded_fields() {
    let endorsement = to_base64(b"YQ==.e30=.AP8=");
    let unpadded = format!("c3BraQ.{}.c2ln", endorsement);
    assert!(matches!(
        ChainedSignature::decode(&unpadded),
        Err(CodecError::Base64 {
            field: "tempPublicKey",
            ..
        })
    ));
}
