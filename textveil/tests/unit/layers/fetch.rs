use super::*;

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn fs_fetcher_reads_relative_and_file_urls() {
    let root = std::env::temp_dir().join(format!("textveil-fetch-{}", std::process::id()));
    std::fs::create_dir_all(root.join("img")).unwrap();
    std::fs::write(root.join("img/a.bin"), b"abc").unwrap();

    let fetcher = FsImageFetcher::new(&root);
    assert_eq!(fetcher.fetch("img/a.bin").unwrap(), b"abc");
    assert_eq!(fetcher.fetch("file://img/a.bin").unwrap(), b"abc");
    assert!(matches!(
        fetcher.fetch("img/missing.bin"),
        Err(LayerLoadError::NotFound(_))
    ));
    assert!(matches!(
        fetcher.fetch("../etc/passwd"),
        Err(LayerLoadError::Rejected(_))
    ));
    assert!(matches!(
        fetcher.fetch("https://cdn.example/a.png"),
        Err(LayerLoadError::Rejected(_))
    ));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn closures_are_fetchers() {
    let f = |s: &str| -> Result<Vec<u8>, LayerLoadError> { Ok(s.as_bytes().to_vec()) };
    assert_eq!(ImageFetcher::fetch(&f, "xy").unwrap(), b"xy");
}
