use character_checker::analysis::average_similarity;
use character_checker::media::preprocess::{cap_dimension, decode_rgb, encode_png};
use character_checker::palette::{PaletteOptions, compare, extract_palette, rgb_to_hex};
use image::{Rgb, RgbImage};

/// Smooth gradient with a bright blob; plenty of distinct colors.
fn gradient(width: u32, height: u32, tint: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let dx = f64::from(x) - f64::from(width) / 2.0;
        let dy = f64::from(y) - f64::from(height) / 2.0;
        if dx.hypot(dy) < f64::from(width.min(height)) / 6.0 {
            Rgb([250, 250, tint])
        } else {
            Rgb([
                (x * 255 / width) as u8,
                (y * 255 / height) as u8,
                tint,
            ])
        }
    })
}

#[test]
fn palette_has_requested_size_sorted_and_summing_to_100() {
    let options = PaletteOptions::default();
    let palette = extract_palette(&gradient(320, 240, 40), &options).expect("palette");

    assert_eq!(palette.len(), options.n_colors);
    let shares: Vec<f64> = palette.iter().map(|e| e.percentage).collect();
    assert!(shares.windows(2).all(|w| w[0] >= w[1]), "not sorted: {shares:?}");
    assert!((palette.total_percentage() - 100.0).abs() <= 0.1);
    for entry in &palette {
        assert_eq!(entry.hex, rgb_to_hex(entry.rgb));
        assert_eq!(entry.hex.len(), 7);
    }
}

#[test]
fn extraction_is_deterministic_for_a_fixed_seed() {
    let image = gradient(200, 200, 90);
    let options = PaletteOptions::default();

    let first = extract_palette(&image, &options).expect("palette");
    let second = extract_palette(&image, &options).expect("palette");

    assert_eq!(first, second);
    assert!((compare(&first, &second) - 100.0).abs() < f64::EPSILON);
}

#[test]
fn png_roundtrip_through_preprocessing_keeps_palette() {
    let image = gradient(3000, 1500, 10);
    let capped = cap_dimension(image, 2048);
    assert_eq!(capped.dimensions(), (2048, 1024));

    let decoded = decode_rgb(&encode_png(&capped).expect("encode")).expect("decode");
    let options = PaletteOptions::default();
    assert_eq!(
        extract_palette(&capped, &options).expect("palette"),
        extract_palette(&decoded, &options).expect("palette")
    );
}

#[test]
fn unrelated_images_score_below_identical_ones() {
    let options = PaletteOptions::default();
    let warm = extract_palette(&gradient(200, 200, 20), &options).expect("palette");
    let flat_blue = RgbImage::from_fn(200, 200, |x, _| {
        Rgb([0, 0, if x < 100 { 120 } else { 200 }])
    });
    let mut blue_options = options.clone();
    blue_options.n_colors = 2;
    let cool = extract_palette(&flat_blue, &blue_options).expect("palette");

    let same = average_similarity(&[warm.clone(), warm.clone()]);
    let mixed = average_similarity(&[warm, cool]);

    assert!((same - 100.0).abs() < f64::EPSILON);
    assert!(mixed.abs() < f64::EPSILON);
}
