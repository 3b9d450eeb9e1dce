mod common;

use common::*;
use image_fingerprint_core::codec::{decode, encode};
use image_fingerprint_core::{
    detect_and_crop, detect_and_crop_with, BoundingBox, CropOptions, ImageFormat,
};

#[test]
fn test_known_geometry_crop() {
    // 50x50 black square covering (75,75)-(125,125) on a 200x200 white canvas
    for channels in [3, 4] {
        let img = square_on_white(200, 75, 75, 50, channels);

        let result = detect_and_crop(&img, 0, 250, 10).unwrap();
        assert_eq!(
            result.bounds,
            BoundingBox {
                min_x: 75,
                min_y: 75,
                max_x: 125,
                max_y: 125
            }
        );
        assert_eq!((result.cropped.width(), result.cropped.height()), (50, 50));
        assert_eq!(result.cropped.channels(), channels);
        assert!(result
            .cropped
            .pixels()
            .chunks_exact(channels as usize)
            .all(|p| p[..3] == BLACK));
        assert_eq!((result.original_width, result.original_height), (200, 200));
    }
}

#[test]
fn test_default_padding() {
    let img = square_on_white(200, 75, 75, 50, 3);

    let result = detect_and_crop_with(&img, &CropOptions::default()).unwrap();
    assert_eq!(
        result.bounds,
        BoundingBox {
            min_x: 55,
            min_y: 55,
            max_x: 145,
            max_y: 145
        }
    );
    assert_eq!(result.cropped.width(), 90);
}

#[test]
fn test_blank_image_fallback() {
    let rgb = solid(64, 48, 3, [255, 255, 255, 255]);
    let rgba = solid(64, 48, 4, [255, 255, 255, 255]);

    for img in [rgb, rgba] {
        let result = detect_and_crop(&img, 20, 250, 10).unwrap();
        assert!(result.is_fallback());
        assert_eq!((result.cropped.width(), result.cropped.height()), (64, 48));
        assert_eq!(result.cropped, img);
    }
}

#[test]
fn test_fully_transparent_image_fallback() {
    // Black colour values, but every pixel is transparent
    let img = solid(10, 10, 4, [0, 0, 0, 0]);

    let result = detect_and_crop(&img, 0, 250, 10).unwrap();
    assert_eq!(result.bounds, BoundingBox::full(10, 10));
}

#[test]
fn test_near_white_counts_as_background() {
    // Off-white noise at 250+ is ignored; the square is still found exactly
    let img = render(100, 100, 3, |x, y| {
        if (40..60).contains(&x) && (30..50).contains(&y) {
            [120, 120, 120, 255]
        } else {
            [250 + (x % 6) as u8, 255, 250 + (y % 6) as u8, 255]
        }
    });

    let result = detect_and_crop(&img, 0, 250, 10).unwrap();
    assert_eq!(
        result.bounds,
        BoundingBox {
            min_x: 40,
            min_y: 30,
            max_x: 60,
            max_y: 50
        }
    );
}

#[test]
fn test_crop_containment() {
    let placements = [(0, 0, 10), (190, 190, 10), (0, 150, 50), (99, 3, 1), (0, 0, 200)];
    let paddings = [0, 1, 20, 500, u32::MAX];

    for &(x0, y0, side) in &placements {
        for &padding in &paddings {
            let img = square_on_white(200, x0, y0, side, 4);
            let result = detect_and_crop(&img, padding, 250, 10).unwrap();
            let b = result.bounds;

            assert!(b.min_x <= b.max_x && b.max_x <= 200, "{:?}", b);
            assert!(b.min_y <= b.max_y && b.max_y <= 200, "{:?}", b);
            assert_eq!(result.cropped.width(), b.width());
            assert_eq!(result.cropped.height(), b.height());
        }
    }
}

#[test]
fn test_source_is_untouched_and_crop_encodes() {
    let img = square_on_white(120, 10, 20, 30, 4);
    let before = img.clone();

    let result = detect_and_crop(&img, 5, 250, 10).unwrap();
    assert_eq!(img, before);

    // The crop is an independent buffer the codec can round-trip
    let bytes = encode(&result.cropped, ImageFormat::Png, None).unwrap();
    assert_eq!(decode(&bytes).unwrap(), result.cropped);
}
