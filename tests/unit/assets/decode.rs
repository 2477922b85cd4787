use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not a png").is_err());
}

#[test]
fn prepare_rgba_image_keeps_dimensions() {
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
    let prepared = prepare_rgba_image(img);
    assert_eq!((prepared.width, prepared.height), (3, 2));
    assert_eq!(prepared.rgba8_premul.len(), 3 * 2 * 4);
    assert_eq!(&prepared.rgba8_premul[..4], &[10, 20, 30, 255]);
}
