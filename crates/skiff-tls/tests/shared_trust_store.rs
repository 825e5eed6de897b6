//! Several brokers and a client sharing one trust store bundle.

use std::fs;
use std::path::PathBuf;

use skiff_tls::{keys, MaterialRequest, PemMaterialGenerator, SecurityMaterialGenerator};

#[test]
fn brokers_accumulate_certificates_in_shared_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let trust_store = dir.path().join("truststore.pem");
    let generator = PemMaterialGenerator::new();

    let mut keystores = Vec::new();
    for alias in ["server1", "server2", "server3"] {
        let request = MaterialRequest::server(alias).with_trust_store(Some(trust_store.clone()));
        let config = generator.generate(&request).unwrap();
        keystores.push(PathBuf::from(&config[keys::KEYSTORE_LOCATION]));
    }

    let bundle = fs::read_to_string(&trust_store).unwrap();
    assert_eq!(bundle.matches("-----BEGIN CERTIFICATE-----").count(), 3);

    keystores.sort();
    keystores.dedup();
    assert_eq!(keystores.len(), 3, "aliases must map to distinct keystores");

    let client = generator
        .generate(&MaterialRequest::client("client", &trust_store))
        .unwrap();
    assert_eq!(
        client[keys::TRUSTSTORE_LOCATION],
        trust_store.display().to_string()
    );
    let after_client = fs::read_to_string(&trust_store).unwrap();
    assert_eq!(after_client, bundle, "plain client must not touch the bundle");
}

#[test]
fn unwritable_trust_store_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let trust_store = dir.path().join("missing").join("truststore.pem");

    let err = PemMaterialGenerator::new()
        .generate(&MaterialRequest::server("server9").with_trust_store(Some(trust_store)))
        .unwrap_err();

    assert!(err.to_string().contains("missing"));
}
