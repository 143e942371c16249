use super::*;

#[test]
fn over_endpoints() {
    let dst = [10, 20, 30, 255];
    assert_eq!(over(dst, [0, 0, 0, 0]), dst);
    assert_eq!(over(dst, [1, 2, 3, 255]), [1, 2, 3, 255]);
}

#[test]
fn over_half_alpha_blends() {
    let out = over([0, 0, 200, 255], [128, 0, 0, 128]);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
    assert_eq!(out[2], 100);
}

#[test]
fn over_in_place_rejects_length_mismatch() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
    over_in_place(&mut dst, &[255u8; 8]).unwrap();
    assert_eq!(dst, vec![255u8; 8]);
}

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let mut px = vec![200u8, 100, 50, 128, 9, 9, 9, 0];
    premultiply_in_place(&mut px);
    assert_eq!(&px[..4], &[100, 50, 25, 128]);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
    unpremultiply_in_place(&mut px);
    for (got, want) in px[..3].iter().zip([200u8, 100, 50]) {
        assert!((i16::from(*got) - i16::from(want)).abs() <= 2);
    }
}
