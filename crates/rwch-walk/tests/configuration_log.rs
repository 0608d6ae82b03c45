use rwch_core::RngHandle;
use rwch_hull::HullOptions;
use rwch_walk::{read_configurations, Walk, WalkKind, WalkParams};
use tempfile::tempdir;

#[test]
fn appends_records_and_restores_the_last_one() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("confs").join("walk.bin");
    let params = WalkParams::new(WalkKind::Real, 3, 16);
    let mut walk = Walk::new(&params, HullOptions::default(), 7).unwrap();
    let mut rng = RngHandle::from_seed(8);

    walk.save_configuration(&path).unwrap();
    for _ in 0..10 {
        walk.change(&mut rng);
    }
    walk.save_configuration(&path).unwrap();

    let records = read_configurations(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].steps, 16);
    assert_eq!(records[1].dimension, 3);
    assert_eq!(records[1].latent, walk.latent());
    assert_ne!(records[0].latent, records[1].latent);

    let mut restored = Walk::new(&params, HullOptions::default(), 99).unwrap();
    restored.load_configuration(&path).unwrap();
    assert_eq!(restored.trace(), walk.trace());
    assert_eq!(restored.a().to_bits(), walk.a().to_bits());
}

#[test]
fn record_layout_is_length_prefixed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("walk.bin");
    let walk = Walk::new(&WalkParams::new(WalkKind::Lattice, 2, 4), HullOptions::default(), 1).unwrap();
    walk.save_configuration(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let payload = u64::from_le_bytes(bytes[..8].try_into().unwrap());
    // steps, dimension, vector length, four values
    assert_eq!(payload, 8 + 8 + 8 + 4 * 8);
    assert_eq!(bytes.len() as u64, 8 + payload);
    assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 4);
    assert_eq!(u64::from_le_bytes(bytes[16..24].try_into().unwrap()), 2);
}

#[test]
fn loop_erased_walks_restore_their_grown_latent_vector() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lerw.bin");
    let params = WalkParams::new(WalkKind::LoopErased, 2, 30);
    let walk = Walk::new(&params, HullOptions::default(), 12).unwrap();
    walk.save_configuration(&path).unwrap();

    let mut restored = Walk::new(&params, HullOptions::default(), 13).unwrap();
    restored.load_configuration(&path).unwrap();
    assert_eq!(restored.trace(), walk.trace());
}

#[test]
fn mismatched_shape_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("walk.bin");
    let walk = Walk::new(&WalkParams::new(WalkKind::Lattice, 2, 10), HullOptions::default(), 1).unwrap();
    walk.save_configuration(&path).unwrap();

    let mut other = Walk::new(&WalkParams::new(WalkKind::Lattice, 2, 11), HullOptions::default(), 1).unwrap();
    let err = other.load_configuration(&path).unwrap_err();
    assert_eq!(err.info().code, "configuration-mismatch");
}

#[test]
fn missing_and_truncated_logs_are_errors() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.bin");
    assert_eq!(read_configurations(&missing).unwrap_err().info().code, "configuration-read");

    let truncated = dir.path().join("cut.bin");
    std::fs::write(&truncated, [40u8, 0, 0, 0, 0, 0, 0, 0, 1, 2]).unwrap();
    assert_eq!(
        read_configurations(&truncated).unwrap_err().info().code,
        "configuration-truncated"
    );
}

#[test]
fn oversized_length_header_is_reported_as_truncated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.bin");
    let mut bytes = u64::MAX.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[1, 2, 3, 4]);
    std::fs::write(&path, &bytes).unwrap();
    let err = read_configurations(&path).unwrap_err();
    assert_eq!(err.info().code, "configuration-truncated");
    assert!(err.to_string().contains("offset"), "{err}");
}

#[test]
fn corrupt_record_after_a_valid_one_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("walk.bin");
    let walk = Walk::new(&WalkParams::new(WalkKind::Lattice, 2, 4), HullOptions::default(), 1).unwrap();
    walk.save_configuration(&path).unwrap();
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.extend_from_slice(&(u64::MAX - 3).to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();
    assert_eq!(read_configurations(&path).unwrap_err().info().code, "configuration-truncated");
}
