//! Image assets
//!
//! Assets are referred to by logical file name and looked up in an ordered
//! list of directories. A missing asset is never fatal: callers log the
//! error and draw a placeholder instead.

use std::fmt;

/// Directories searched (in order) after the name itself
pub const IMAGE_DIRS: [&str; 3] = ["assets/imgs", "assets/img", "assets"];

/// Images the game draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageAsset {
    /// Full-screen backdrop, stretched to the logical screen
    Background,
    /// Player sprite
    Player,
}

impl ImageAsset {
    pub const ALL: [ImageAsset; 2] = [ImageAsset::Background, ImageAsset::Player];

    pub fn logical_name(self) -> &'static str {
        match self {
            ImageAsset::Background => "capy back.png",
            ImageAsset::Player => "flappy capy.png",
        }
    }
}

/// Asset lookup failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Empty or directory-only name
    InvalidName(String),
    /// No candidate path exists
    NotFound { name: String, searched: Vec<String> },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::InvalidName(name) => write!(f, "invalid asset name {:?}", name),
            AssetError::NotFound { name, searched } => {
                write!(f, "asset not found: {} (searched: {})", name, searched.join(", "))
            }
        }
    }
}

impl std::error::Error for AssetError {}

/// Final path component of `name`
fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Candidate paths for `name`, most specific first: the name as given,
/// then its file name inside each search directory
pub fn candidates(name: &str) -> Result<Vec<String>, AssetError> {
    let file = basename(name);
    if file.is_empty() {
        return Err(AssetError::InvalidName(name.to_string()));
    }
    let mut paths = Vec::with_capacity(IMAGE_DIRS.len() + 1);
    paths.push(name.to_string());
    for dir in IMAGE_DIRS {
        let path = format!("{}/{}", dir, file);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// First candidate for which `exists` holds
pub fn resolve(name: &str, exists: impl Fn(&str) -> bool) -> Result<String, AssetError> {
    let searched = candidates(name)?;
    match searched.iter().find(|p| exists(p)) {
        Some(path) => Ok(path.clone()),
        None => Err(AssetError::NotFound {
            name: name.to_string(),
            searched,
        }),
    }
}

/// Resolve against the filesystem, relative to `root`
#[cfg(not(target_arch = "wasm32"))]
pub fn resolve_in(root: &std::path::Path, name: &str) -> Result<std::path::PathBuf, AssetError> {
    if std::path::Path::new(name).is_absolute() && std::path::Path::new(name).exists() {
        return Ok(name.into());
    }
    resolve(name, |p| root.join(p).exists()).map(|p| root.join(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_order() {
        let c = candidates("flappy capy.png").unwrap();
        assert_eq!(
            c,
            vec![
                "flappy capy.png",
                "assets/imgs/flappy capy.png",
                "assets/img/flappy capy.png",
                "assets/flappy capy.png",
            ]
        );
    }

    #[test]
    fn test_nested_name_searches_by_file_name() {
        let c = candidates("old/art/capy back.png").unwrap();
        assert_eq!(c[0], "old/art/capy back.png");
        assert_eq!(c[1], "assets/imgs/capy back.png");
    }

    #[test]
    fn test_resolve_prefers_earlier_dirs() {
        let found = resolve("capy back.png", |p| p.starts_with("assets/")).unwrap();
        assert_eq!(found, "assets/imgs/capy back.png");
        let found = resolve("capy back.png", |p| p == "assets/capy back.png").unwrap();
        assert_eq!(found, "assets/capy back.png");
    }

    #[test]
    fn test_missing_asset_reports_search() {
        let err = resolve("nope.png", |_| false).unwrap_err();
        match &err {
            AssetError::NotFound { searched, .. } => assert_eq!(searched.len(), 4),
            other => panic!("unexpected {:?}", other),
        }
        assert!(err.to_string().contains("nope.png"));
        assert!(matches!(resolve("assets/", |_| true), Err(AssetError::InvalidName(_))));
    }

    #[test]
    fn test_resolve_in_missing_root() {
        let root = std::path::Path::new("/definitely/not/here");
        assert!(resolve_in(root, ImageAsset::Player.logical_name()).is_err());
    }
}
