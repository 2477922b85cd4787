use super::*;

fn solid(width: u32, height: u32) -> PreparedImage {
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(vec![255; (width * height * 4) as usize]),
    }
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 0, 255]));
    img.save(dir.join(name)).unwrap();
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "sunflower_store_{tag}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a/./b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("../up.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn from_fn_visits_every_kind_in_order() {
    let mut seen = Vec::new();
    let set = AssetSet::from_fn(|kind| {
        seen.push(kind);
        Ok(solid(2 + seen.len() as u32, 3))
    })
    .unwrap();
    assert_eq!(seen, AssetKind::ALL.to_vec());
    assert_eq!(set.get(AssetKind::Circle).width, 3);
    assert_eq!(set.get(AssetKind::Photo).width, 9);
    assert_eq!(set.size(AssetKind::Stem), Vec2::new(6.0, 3.0));
}

#[test]
fn zero_sized_asset_is_fatal() {
    let err = AssetSet::from_fn(|kind| {
        if kind == AssetKind::LeftLeaf {
            Ok(solid(0, 4))
        } else {
            Ok(solid(4, 4))
        }
    })
    .unwrap_err();
    assert!(matches!(err, SunflowerError::Asset(_)));
    assert!(err.to_string().contains("left_leaf"));
}

#[test]
fn mismatched_pixel_buffer_is_fatal() {
    let err = AssetSet::from_fn(|_| {
        Ok(PreparedImage {
            width: 2,
            height: 2,
            rgba8_premul: Arc::new(vec![0; 3]),
        })
    })
    .unwrap_err();
    assert!(matches!(err, SunflowerError::Asset(_)));
}

#[test]
fn load_decodes_files_from_root() {
    let dir = temp_dir("load");
    let paths = AssetPaths::default();
    for (i, (_, file)) in paths.entries().iter().enumerate() {
        write_png(&dir, file, 4 + i as u32, 8);
    }
    let set = AssetSet::load(&paths, &dir).unwrap();
    assert_eq!(set.get(AssetKind::Circle).width, 4);
    assert_eq!(set.get(AssetKind::Photo).width, 10);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn load_reports_missing_asset_by_name() {
    let dir = temp_dir("missing");
    let paths = AssetPaths::default();
    for (_, file) in paths.entries().iter().filter(|(name, _)| *name != "photo") {
        write_png(&dir, file, 4, 4);
    }
    let err = AssetSet::load(&paths, &dir).unwrap_err();
    assert!(matches!(err, SunflowerError::Asset(_)));
    assert!(err.to_string().contains("photo"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn from_images_keeps_kind_order() {
    let set = AssetSet::from_images(std::array::from_fn(|i| solid(i as u32 + 1, 2))).unwrap();
    for (i, kind) in AssetKind::ALL.into_iter().enumerate() {
        assert_eq!(set.get(kind).width, i as u32 + 1);
    }
    assert_eq!(set.size(AssetKind::Photo), Vec2::new(7.0, 2.0));
}
