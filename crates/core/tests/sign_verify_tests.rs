use shig_core::{
    BufferedOutput, FileError, FixedKeySet, GitHubSettings, NO_VALIDATOR_WARNING, SetupError,
    SignSettings, Signer, ThumbprintValidator, TrustOptions, Validator, VerifySettings, Verifier,
    run_batch, sign_files, verify_files,
};
use shig_signer::{
    HashAlgorithm, PrivateKeyMaterial, PublicKey, Signature, SignatureService, SignerError,
    SignerResult,
};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ED25519_FINGERPRINT: &str = "SHA256:7PCQIE0KJiXaDJTZwuGEDVEVB7FgGuRR3iZ3NvhVa/c";
const RSA_FINGERPRINT: &str = "SHA256:k2pJM956g9HJ6lYWA/ANhHGrWU25oPz3XU3lfKL+xaQ";
const OTHER_FINGERPRINT: &str = "SHA256:HvGCPS+JgCr+L5Aea/+OVfXS1Ci+KP8jkd5FXAdOdkk";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_str(name: &str) -> String {
    fixture(name).display().to_string()
}

fn sign_settings(key: &str) -> SignSettings {
    SignSettings {
        key: fixture_str(key),
        ..SignSettings::default()
    }
}

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

fn public_key(name: &str) -> PublicKey {
    PublicKey::from_openssh(&fs::read_to_string(fixture(name)).unwrap()).unwrap()
}

#[test]
fn sign_then_verify_round_trip() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "release.tar", b"release contents");

    let signer = Signer::new(&sign_settings("id_ed25519")).unwrap();
    signer.sign(&file).unwrap();

    let verifier = Verifier::new(&VerifySettings::default(), None).unwrap();
    let verified = verifier.verify(&file).unwrap();
    assert_eq!(verified.fingerprint, ED25519_FINGERPRINT);
    assert_eq!(
        verified.to_string(),
        format!("'{file}' is signed by '{ED25519_FINGERPRINT}'")
    );
}

#[test]
fn rsa_2048_sign_and_verify() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "test.txt", b"Hello, World!");

    let mut output = BufferedOutput::new();
    let result = sign_files(&sign_settings("id_rsa_pkcs1.pem"), &[&file], &mut output).unwrap();
    assert!(result.all_passed());
    assert_eq!(output.lines(), [format!("PASS: '{file}' has been signed.")]);

    let validator: Box<dyn Validator> = Box::new(FixedKeySet::new(vec![public_key("id_rsa.pub")]));
    let verifier = Verifier::new(&VerifySettings::default(), Some(validator)).unwrap();

    let mut output = BufferedOutput::new();
    let result = run_batch(&verifier, &[&file], &mut output);
    assert!(result.all_passed());
    assert_eq!(
        output.lines(),
        [format!("PASS: '{file}' is signed by '{RSA_FINGERPRINT}'")]
    );
}

#[test]
fn appending_a_byte_breaks_verification() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "test.txt", b"Hello, World!");

    Signer::new(&sign_settings("id_rsa")).unwrap().sign(&file).unwrap();

    let mut contents = fs::read(&file).unwrap();
    contents.push(b'!');
    fs::write(&file, contents).unwrap();

    let verifier = Verifier::new(&VerifySettings::default(), None).unwrap();
    let err = verifier.verify(&file).unwrap_err();
    assert!(matches!(
        err,
        FileError::SignatureMismatch {
            source: SignerError::VerificationFailed(_),
            ..
        }
    ));
    assert!(err.to_string().starts_with(&format!(
        "'{file}' does not match the signature file '{file}.sig'"
    )));
}

#[test]
fn flipping_a_byte_mid_file_breaks_verification() {
    let temp = TempDir::new().unwrap();
    let contents: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let file = write_file(&temp, "image.bin", &contents);

    Signer::new(&sign_settings("id_ed25519")).unwrap().sign(&file).unwrap();

    let mut tampered = contents.clone();
    tampered[contents.len() / 2] ^= 0x01;
    fs::write(&file, &tampered).unwrap();

    let verifier = Verifier::new(&VerifySettings::default(), None).unwrap();
    let err = verifier.verify(&file).unwrap_err();
    assert!(matches!(
        err,
        FileError::SignatureMismatch {
            source: SignerError::VerificationFailed(_),
            ..
        }
    ));

    fs::write(&file, &contents).unwrap();
    assert!(verifier.verify(&file).is_ok());
}

#[test]
fn round_trip_over_empty_binary_and_large_files() {
    let temp = TempDir::new().unwrap();
    let binary: Vec<u8> = (0..=255u8).rev().chain(0..=255u8).collect();
    let large: Vec<u8> = (0..5 * 1024 * 1024u32)
        .map(|i| (i.wrapping_mul(2654435761) >> 24) as u8)
        .collect();
    let cases: [(&str, &[u8]); 3] = [
        ("empty.txt", b""),
        ("binary.bin", &binary),
        ("large.bin", &large),
    ];

    for key in ["id_ed25519", "id_rsa"] {
        let signer = Signer::new(&sign_settings(key)).unwrap();
        let verifier = Verifier::new(&VerifySettings::default(), None).unwrap();

        for (name, contents) in cases {
            let file = write_file(&temp, name, contents);
            signer.sign(&file).unwrap();
            assert!(verifier.verify(&file).is_ok(), "{key} failed on {name}");
        }
    }
}

#[test]
fn namespace_and_hash_are_bound_into_the_signature() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "data.bin", b"\x00\x01\x02");

    let settings = SignSettings {
        namespace: "release".to_string(),
        hash: "sha256".to_string(),
        ..sign_settings("id_ed25519")
    };
    Signer::new(&settings).unwrap().sign(&file).unwrap();

    let matching = VerifySettings {
        namespace: "release".to_string(),
        hash: "sha256".to_string(),
        ..VerifySettings::default()
    };
    assert!(Verifier::new(&matching, None).unwrap().verify(&file).is_ok());

    let wrong_namespace = VerifySettings {
        namespace: "file".to_string(),
        ..matching.clone()
    };
    let err = Verifier::new(&wrong_namespace, None)
        .unwrap()
        .verify(&file)
        .unwrap_err();
    assert!(matches!(
        err,
        FileError::SignatureMismatch {
            source: SignerError::NamespaceMismatch { .. },
            ..
        }
    ));

    let wrong_hash = VerifySettings {
        hash: "sha512".to_string(),
        ..matching
    };
    let err = Verifier::new(&wrong_hash, None)
        .unwrap()
        .verify(&file)
        .unwrap_err();
    assert!(matches!(
        err,
        FileError::SignatureMismatch {
            source: SignerError::HashMismatch { .. },
            ..
        }
    ));
}

#[test]
fn custom_signature_template() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", b"a");

    let settings = SignSettings {
        signature_file: "%f.asc".to_string(),
        ..sign_settings("id_ed25519")
    };
    let signed = Signer::new(&settings).unwrap().sign(&file).unwrap();
    assert_eq!(signed.signature, format!("{file}.asc"));
    assert!(Path::new(&signed.signature).exists());
    assert!(!Path::new(&format!("{file}.sig")).exists());

    let default_template = Verifier::new(&VerifySettings::default(), None).unwrap();
    assert!(matches!(
        default_template.verify(&file),
        Err(FileError::MissingSignature { .. })
    ));

    let asc = VerifySettings {
        signature_file: "%f.asc".to_string(),
        ..VerifySettings::default()
    };
    assert!(Verifier::new(&asc, None).unwrap().verify(&file).is_ok());
}

#[test]
fn mismatched_thumbprint_reports_actual_fingerprint() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", b"a");
    Signer::new(&sign_settings("id_ed25519")).unwrap().sign(&file).unwrap();

    let validator: Box<dyn Validator> = Box::new(ThumbprintValidator::new(OTHER_FINGERPRINT));
    let verifier = Verifier::new(&VerifySettings::default(), Some(validator)).unwrap();

    let mut output = BufferedOutput::new();
    let result = run_batch(&verifier, &[&file], &mut output);
    assert!(!result.all_passed());
    assert_eq!(
        output.lines(),
        [
            format!("FAIL: '{file}' is signed by an untrusted key: {ED25519_FINGERPRINT}"),
            "FAIL: One or more files failed verification".to_string(),
        ]
    );
}

#[test]
fn matching_thumbprint_passes() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", b"a");
    Signer::new(&sign_settings("id_ed25519")).unwrap().sign(&file).unwrap();

    let validator: Box<dyn Validator> = Box::new(ThumbprintValidator::new(ED25519_FINGERPRINT));
    let verifier = Verifier::new(&VerifySettings::default(), Some(validator)).unwrap();
    assert!(verifier.verify(&file).is_ok());
}

#[test]
fn verify_failure_kinds() {
    let temp = TempDir::new().unwrap();
    let verifier = Verifier::new(&VerifySettings::default(), None).unwrap();

    let missing = temp.path().join("missing.txt").display().to_string();
    assert!(matches!(verifier.verify(&missing), Err(FileError::Open { .. })));

    let unsigned = write_file(&temp, "unsigned.txt", b"x");
    assert!(matches!(
        verifier.verify(&unsigned),
        Err(FileError::MissingSignature { .. })
    ));

    let garbled = write_file(&temp, "garbled.txt", b"x");
    write_file(&temp, "garbled.txt.sig", b"this is not a signature\n");
    let err = verifier.verify(&garbled).unwrap_err();
    assert!(matches!(err, FileError::MalformedSignature { .. }));
    assert_eq!(err.file(), garbled);
}

#[test]
fn batch_reports_every_file_in_order() {
    let temp = TempDir::new().unwrap();
    let signed_a = write_file(&temp, "a.txt", b"a");
    let unsigned = write_file(&temp, "b.txt", b"b");
    let signed_c = write_file(&temp, "c.txt", b"c");

    let signer = Signer::new(&sign_settings("id_ed25519")).unwrap();
    signer.sign(&signed_a).unwrap();
    signer.sign(&signed_c).unwrap();

    let mut output = BufferedOutput::new();
    let result = verify_files_blocking(&[&signed_a, &unsigned, &signed_c], &mut output);

    assert_eq!(result.reports.len(), 3);
    assert_eq!(result.passed(), 2);
    assert!(!result.all_passed());

    let lines = output.lines();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], NO_VALIDATOR_WARNING);
    assert!(lines[1].starts_with(&format!("PASS: '{signed_a}'")));
    assert!(lines[2].starts_with(&format!(
        "FAIL: '{unsigned}' does not have a corresponding signature file '{unsigned}.sig'"
    )));
    assert!(lines[3].starts_with(&format!("PASS: '{signed_c}'")));
    assert_eq!(lines[4], "FAIL: One or more files failed verification");
}

fn verify_files_blocking(files: &[&String], output: &mut BufferedOutput) -> shig_core::BatchResult {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(verify_files(
            &VerifySettings::default(),
            &TrustOptions::default(),
            &GitHubSettings::default(),
            files,
            output,
        ))
        .unwrap()
}

#[test]
fn sign_batch_continues_past_missing_files() {
    let temp = TempDir::new().unwrap();
    let present = write_file(&temp, "present.txt", b"p");
    let missing = temp.path().join("missing.txt").display().to_string();

    let mut output = BufferedOutput::new();
    let result = sign_files(
        &sign_settings("id_ed25519"),
        &[&missing, &present],
        &mut output,
    )
    .unwrap();

    assert_eq!(result.passed(), 1);
    assert!(!Path::new(&format!("{missing}.sig")).exists());
    assert!(Path::new(&format!("{present}.sig")).exists());

    let lines = output.lines();
    assert!(lines[0].starts_with(&format!("FAIL: '{missing}' could not be opened")));
    assert_eq!(lines[1], format!("PASS: '{present}' has been signed."));
    assert_eq!(lines[2], "FAIL: One or more files could not be signed");
}

#[test]
fn sign_setup_error_touches_no_files() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", b"a");

    let mut output = BufferedOutput::new();
    let err = sign_files(&sign_settings("does_not_exist"), &[&file], &mut output).unwrap_err();
    assert!(matches!(err, SetupError::KeyRead { .. }));
    assert!(output.lines().is_empty());
    assert!(!Path::new(&format!("{file}.sig")).exists());
}

#[test]
fn verifies_signature_made_by_ssh_keygen() {
    let file = fixture_str("hello.txt");

    let validator: Box<dyn Validator> =
        Box::new(FixedKeySet::new(vec![public_key("id_ed25519.pub")]));
    let verifier = Verifier::new(&VerifySettings::default(), Some(validator)).unwrap();
    let verified = verifier.verify(&file).unwrap();
    assert_eq!(verified.fingerprint, ED25519_FINGERPRINT);
}

#[test]
fn type_mismatch_is_untrusted() {
    let file = fixture_str("hello.txt");

    let validator: Box<dyn Validator> = Box::new(FixedKeySet::new(vec![
        public_key("id_rsa.pub"),
        public_key("id_ecdsa.pub"),
        public_key("other_ed25519.pub"),
    ]));
    let verifier = Verifier::new(&VerifySettings::default(), Some(validator)).unwrap();
    assert!(matches!(
        verifier.verify(&file),
        Err(FileError::UntrustedKey { .. })
    ));
}

#[test]
fn signature_file_with_trailing_data_still_verifies() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", b"a");
    let signed = Signer::new(&sign_settings("id_ed25519")).unwrap().sign(&file).unwrap();

    let mut sig = fs::read(&signed.signature).unwrap();
    sig.extend_from_slice(b"trailing notes\n");
    fs::write(&signed.signature, sig).unwrap();

    let verifier = Verifier::new(&VerifySettings::default(), None).unwrap();
    assert!(verifier.verify(&file).is_ok());
}

/// Accepts every signature without looking at the data.
struct AcceptAll;

impl SignatureService for AcceptAll {
    fn sign(
        &self,
        _namespace: &str,
        _hash: HashAlgorithm,
        _key: &PrivateKeyMaterial,
        _data: &mut dyn Read,
    ) -> SignerResult<Signature> {
        Err(SignerError::Signing("signing disabled".to_string()))
    }

    fn verify(
        &self,
        _namespace: &str,
        _hash: HashAlgorithm,
        _data: &mut dyn Read,
        _signature: &Signature,
    ) -> SignerResult<()> {
        Ok(())
    }
}

#[test]
fn trust_check_runs_after_signature_service() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "hello.txt", b"not what ssh-keygen signed");
    fs::copy(fixture("hello.txt.sig"), format!("{file}.sig")).unwrap();

    let untrusted: Box<dyn Validator> = Box::new(ThumbprintValidator::new(OTHER_FINGERPRINT));
    let verifier =
        Verifier::with_service(AcceptAll, &VerifySettings::default(), Some(untrusted)).unwrap();

    match verifier.verify(&file) {
        Err(FileError::UntrustedKey { fingerprint, .. }) => {
            assert_eq!(fingerprint, ED25519_FINGERPRINT)
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn failed_signing_writes_no_signature_file() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", b"a");

    let signer = Signer::with_service(AcceptAll, &sign_settings("id_ed25519")).unwrap();
    let err = signer.sign(&file).unwrap_err();
    assert!(matches!(err, FileError::Signing { .. }));
    assert!(!Path::new(&format!("{file}.sig")).exists());
}
