use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Extensions accepted when a report is given a photo.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// What can be shown for an item's photo right now.
///
/// The stored path is only a reference to a file the poster picked; the file
/// may have moved or been deleted since. That degrades to `Missing` instead
/// of failing whatever is rendering the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImagePreview {
    Available(PathBuf),
    Missing(PathBuf),
    NoImage,
}

impl ImagePreview {
    pub fn resolve(path: Option<&str>) -> Self {
        match path {
            None | Some("") => ImagePreview::NoImage,
            Some(p) => {
                let path = PathBuf::from(p);
                if path.exists() {
                    ImagePreview::Available(path)
                } else {
                    ImagePreview::Missing(path)
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ImagePreview::Available(_))
    }
}

impl fmt::Display for ImagePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImagePreview::Available(path) => write!(f, "{}", path.display()),
            ImagePreview::Missing(_) => f.write_str("No Image Available"),
            ImagePreview::NoImage => f.write_str("No Image Selected"),
        }
    }
}

/// True if the path ends in one of [`IMAGE_EXTENSIONS`], ignoring case.
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}
