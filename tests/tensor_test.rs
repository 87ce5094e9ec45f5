use convunroll::tensor::{Matrix, Tensor3, Tensor4};

#[test]
fn tensor3_layout_is_hwc() {
    let t = Tensor3::from_vec(2, 2, 3, (0..12).collect::<Vec<i32>>());
    assert_eq!(t.get(0, 0, 2), 2);
    assert_eq!(t.get(0, 1, 0), 3);
    assert_eq!(t.get(1, 0, 0), 6);
    assert_eq!(t.to_string(), "2x2x3");
}

#[test]
fn padding_adds_zero_border() {
    let mut t = Tensor3::<i32>::new(2, 3, 1);
    for h in 0..2 {
        for w in 0..3 {
            t.set(h, w, 0, (h * 3 + w + 1) as i32);
        }
    }
    let p = t.padded(1);
    assert_eq!((p.h, p.w, p.c), (4, 5, 1));
    assert_eq!(
        p.data,
        vec![
            0, 0, 0, 0, 0, //
            0, 1, 2, 3, 0, //
            0, 4, 5, 6, 0, //
            0, 0, 0, 0, 0,
        ]
    );
    assert_eq!(t.padded(0), t);
}

#[test]
fn tensor4_indexes_filters_first() {
    let mut k = Tensor4::<f32>::new(2, 3, 3, 4);
    k.set(1, 2, 0, 3, 0.5);
    assert_eq!(k.get(1, 2, 0, 3), 0.5);
    assert_eq!(k.data[36 + 2 * 12 + 3], 0.5);
    assert_eq!(k.to_string(), "2x3x3x4");
}

#[test]
fn matrix_resize_discards_contents() {
    let mut m = Matrix::<i64>::new(2, 2);
    m.set(1, 1, 9);
    assert_eq!(m.row(1), &[0, 9]);
    m.resize(3, 4);
    assert_eq!((m.rows, m.cols, m.data.len()), (3, 4, 12));
    assert!(m.data.iter().all(|&v| v == 0));
    assert_eq!(m.to_string(), "3x4");
}
