//! Integration tests for path resolution and rejection.

use std::path::PathBuf;

use configurate::location::{DirectoryRoots, PathResolver};
use configurate::{BaseDirectory, ConfigurateError};

fn resolver() -> PathResolver {
    PathResolver::new("com.example.app", DirectoryRoots::Fixed(PathBuf::from("/root-dir")))
}

const BAD: &[&str] = &[
    "", ".", "..", "a/b", "a\\b", "a:b", "a*b", "a?b", "a\"b", "a<b", "a>b", "a|b", "a\0b",
];

#[test]
fn bad_filenames_are_rejected() {
    for bad in BAD {
        let result = resolver().resolve(BaseDirectory::AppConfig, None, None, bad);
        assert!(
            matches!(result, Err(ConfigurateError::InvalidPath(_))),
            "filename {bad:?} was accepted"
        );
    }
}

#[test]
fn bad_dir_name_segments_are_rejected() {
    // `/` and `\` split dirName, so they only fail when they leave an empty or dot segment.
    for bad in ["", ".", "..", "a:b", "a*b", "a?b", "a\"b", "a<b", "a>b", "a|b", "a\0b", "ok/..", "ok\\.", "a//b"] {
        let result = resolver().resolve(BaseDirectory::AppConfig, Some(bad), None, "app.json");
        assert!(
            matches!(result, Err(ConfigurateError::InvalidPath(_))),
            "dirName {bad:?} was accepted"
        );
    }
}

#[test]
fn bad_sub_path_segments_are_rejected() {
    for bad in ["", ".", "..", "a\\b", "a:b", "a*b", "a?b", "a\"b", "a<b", "a>b", "a|b", "a\0b", "ok/..", "a//b"] {
        let result = resolver().resolve(BaseDirectory::Config, None, Some(bad), "app.json");
        assert!(
            matches!(result, Err(ConfigurateError::InvalidPath(_))),
            "path {bad:?} was accepted"
        );
    }
}

#[test]
fn dir_name_replaces_identifier_for_app_dirs() {
    let path = resolver()
        .resolve(BaseDirectory::AppData, Some("other/nested"), Some("v1/x"), "app.yaml")
        .unwrap();
    assert_eq!(
        path,
        PathBuf::from("/root-dir/app-data/other/nested/v1/x/app.yaml")
    );
}

#[test]
fn dir_name_is_appended_for_shared_dirs() {
    let path = resolver()
        .resolve(BaseDirectory::Config, Some("vendor\\tool"), None, "app.json")
        .unwrap();
    assert_eq!(path, PathBuf::from("/root-dir/config/vendor/tool/app.json"));
}

#[test]
fn no_extension_is_added() {
    let path = resolver()
        .resolve(BaseDirectory::AppConfig, None, None, "settings")
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "settings");
    assert!(path.starts_with("/root-dir/app-config/com.example.app"));
}
