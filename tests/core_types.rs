use colorseg::{ColorSegError, ImageView, LabelGrid, OwnedImage, Rgb};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [[0u8; 3]; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        ColorSegError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        ColorSegError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        ColorSegError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data: [Rgb; 3] = [[0, 0, 0]; 3];

    let err = ImageView::new(&data, 2, 2, 2).err().unwrap();
    assert_eq!(err, ColorSegError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn strided_view_skips_padding() {
    let data: Vec<u8> = (0u8..16).collect();
    let view = ImageView::new(&data, 3, 3, 5).unwrap();
    assert_eq!(view.stride(), 5);
    assert_eq!(view.row(1).unwrap(), &[5u8, 6, 7]);
    assert_eq!(view.get(2, 2).copied(), Some(12u8));
    assert!(view.get(3, 0).is_none());
    assert!(view.row(3).is_none());
}

#[test]
fn owned_image_compacts_strided_view() {
    let data: Vec<Rgb> = (0u8..12).map(|v| [v, v, v]).collect();
    let view = ImageView::new(&data, 2, 3, 4).unwrap();
    let owned = OwnedImage::from_view(view).unwrap();
    assert_eq!(owned.width(), 2);
    assert_eq!(owned.height(), 3);
    assert_eq!(
        owned.data(),
        &[[0, 0, 0], [1, 1, 1], [4, 4, 4], [5, 5, 5], [8, 8, 8], [9, 9, 9]]
    );
}

#[test]
fn label_grid_validates_dimensions() {
    assert!(LabelGrid::from_vec(vec![0; 5], 2, 2).is_err());
    let grid = LabelGrid::from_vec(vec![0, 1, 2, 3, 0, 1], 3, 2).unwrap();
    assert_eq!(grid.get(2, 1), Some(1));
    assert_eq!(grid.get(3, 0), None);
    assert_eq!(grid.view().row(1).unwrap(), &[3, 0, 1]);
}
