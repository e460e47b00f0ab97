pub(crate) use super::*;

#[test]
fn test_from_vec() {
    let m = Matrix::<f64>::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    assert_eq!(m.shape(), (2, 3));
    assert!((m.get(0, 0) - 1.0).abs() < 1e-12);
    assert!((m.get(1, 2) - 6.0).abs() < 1e-12);
}

#[test]
fn test_from_vec_error() {
    let result = Matrix::<f64>::from_vec(2, 3, vec![1.0, 2.0, 3.0]);
    assert!(result.is_err());
}

#[test]
fn test_zeros() {
    let m = Matrix::zeros(2, 3);
    assert_eq!(m.shape(), (2, 3));
    assert!(m.as_slice().iter().all(|&x| x == 0.0));
}

#[test]
fn test_row_and_row_mut() {
    let mut m = Matrix::<f64>::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).expect("2x2");
    assert_eq!(m.row(1), &[3.0, 4.0]);
    m.row_mut(0)[1] = 9.0;
    assert!((m.get(0, 1) - 9.0).abs() < 1e-12);
}

#[test]
fn test_rows_iterates_in_order() {
    let m = Matrix::<f64>::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("3x2");
    let firsts: Vec<f64> = m.rows().map(|r| r[0]).collect();
    assert_eq!(firsts, vec![1.0, 3.0, 5.0]);
}

#[test]
fn test_rows_with_zero_columns() {
    let m = Matrix::<f64>::zeros(3, 0);
    assert_eq!(m.rows().count(), 3);
    assert_eq!(m.row_sums(), vec![0.0, 0.0, 0.0]);
}

#[test]
fn test_select_columns_with_repeats() {
    let m = Matrix::<f64>::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("2x3");
    let s = m.select_columns(&[2, 0, 2]);
    assert_eq!(s.shape(), (2, 3));
    assert_eq!(s.row(0), &[3.0, 1.0, 3.0]);
    assert_eq!(s.row(1), &[6.0, 4.0, 6.0]);
}

#[test]
fn test_select_no_columns() {
    let m = Matrix::<f64>::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("2x3");
    let s = m.select_columns(&[]);
    assert_eq!(s.shape(), (2, 0));
}

#[test]
fn test_scatter_add_accumulates_repeats() {
    let mut target = Matrix::zeros(2, 4);
    let stats = Matrix::<f64>::from_vec(2, 3, vec![0.5, 0.25, 1.0, 2.0, 3.0, 4.0]).expect("2x3");
    target
        .scatter_add_columns(&[1, 3, 1], &stats)
        .expect("shapes agree");

    assert!((target.get(0, 1) - 1.5).abs() < 1e-12);
    assert!((target.get(0, 3) - 0.25).abs() < 1e-12);
    assert!((target.get(1, 1) - 6.0).abs() < 1e-12);
    assert!((target.get(1, 0)).abs() < 1e-12);
}

#[test]
fn test_scatter_add_rejects_bad_shapes() {
    let mut target = Matrix::zeros(2, 4);
    let stats = Matrix::zeros(2, 2);
    assert!(target.scatter_add_columns(&[0], &stats).is_err());
    assert!(target.scatter_add_columns(&[0, 4], &stats).is_err());
    let wrong_rows = Matrix::zeros(3, 1);
    assert!(target.scatter_add_columns(&[0], &wrong_rows).is_err());
}

#[test]
fn test_lerp() {
    let a = Matrix::<f64>::filled(1, 2, 2.0);
    let b = Matrix::<f64>::filled(1, 2, 4.0);
    let mid = a.lerp(&b, 0.25).expect("same shape");
    assert!((mid.get(0, 0) - 2.5).abs() < 1e-12);
    assert!(a.lerp(&Matrix::zeros(2, 2), 0.5).is_err());
}

#[test]
fn test_normalize_rows() {
    let m = Matrix::<f64>::from_vec(2, 2, vec![1.0, 3.0, 0.0, 0.0]).expect("2x2");
    let n = m.normalize_rows();
    assert!((n.get(0, 0) - 0.25).abs() < 1e-12);
    assert!((n.get(0, 1) - 0.75).abs() < 1e-12);
    // zero rows are left untouched rather than divided by zero
    assert_eq!(n.row(1), &[0.0, 0.0]);
}

#[test]
fn test_row_sums_and_sum() {
    let m = Matrix::<f64>::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).expect("2x2");
    assert_eq!(m.row_sums(), vec![3.0, 7.0]);
    assert!((m.sum() - 10.0).abs() < 1e-12);
}

#[test]
fn test_serde_roundtrip_preserves_shape() {
    let m = Matrix::<f64>::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).expect("2x2");
    let json = serde_json::to_string(&m).expect("serialize");
    let back: Matrix<f64> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, m);
}
