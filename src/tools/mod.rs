use crate::DEFAULT_THRESHOLD;
use crate::models::BitMatrix;
use image::GenericImageView;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn max_dim_from_env() -> Option<u32> {
    match env::var("LOCATE_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image as grayscale bytes along with its dimensions.
///
/// Images larger than `LOCATE_MAX_DIM` on their longest side are scaled
/// down first.
pub fn load_luma<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize, usize), image::ImageError> {
    let img = image::open(path)?;
    let luma = match max_dim_from_env() {
        Some(max_dim) if img.dimensions().0.max(img.dimensions().1) > max_dim => img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_luma8(),
        _ => img.to_luma8(),
    };
    let (width, height) = luma.dimensions();
    Ok((luma.into_raw(), width as usize, height as usize))
}

/// Load an image straight into a bit matrix (luma below 128 is dark).
pub fn load_bit_matrix<P: AsRef<Path>>(path: P) -> Result<BitMatrix, image::ImageError> {
    let (luma, width, height) = load_luma(path)?;
    Ok(BitMatrix::from_luma(&luma, width, height, DEFAULT_THRESHOLD))
}

/// Summary statistics for a binary matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryStats {
    /// Count of dark pixels.
    pub dark_pixels: usize,
    /// Total pixels in the matrix.
    pub total_pixels: usize,
    /// Ratio of dark pixels to total pixels.
    pub dark_ratio: f64,
    /// Rows holding at least one dark pixel.
    pub dark_rows: usize,
}

/// Compute dark pixel stats for a binary matrix.
pub fn binary_stats(binary: &BitMatrix) -> BinaryStats {
    let dark = binary.count_dark();
    let dark_rows = (0..binary.height())
        .filter(|&y| (0..binary.width()).any(|x| binary.get(x, y)))
        .count();
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        dark as f64 / total as f64
    };
    BinaryStats {
        dark_pixels: dark,
        total_pixels: total,
        dark_ratio: ratio,
        dark_rows,
    }
}

/// Default dataset root from environment variables.
pub fn dataset_root_from_env() -> PathBuf {
    env::var("LOCATE_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("benches/images"))
}

/// Default bench limit from environment variables.
///
/// Returns `None` (full dataset) when `LOCATE_BENCH_LIMIT` is unset or `0`.
pub fn bench_limit_from_env() -> Option<usize> {
    match env::var("LOCATE_BENCH_LIMIT") {
        Ok(value) => value.parse::<usize>().ok().filter(|&v| v != 0),
        Err(_) => None,
    }
}

/// Iterate dataset image paths in sorted order, up to `limit`.
pub fn dataset_iter<P: AsRef<Path>>(root: P, limit: Option<usize>) -> impl Iterator<Item = PathBuf> {
    let mut images = collect_images(root.as_ref());
    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if ext == "png" || ext == "jpg" || ext == "jpeg" || ext == "gif" || ext == "bmp" {
                    images.push(path);
                }
            }
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("rust_locator_tools_{nanos}_{sequence}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn load_bit_matrix_thresholds_luma() {
        let dir = temp_dir();
        let path = dir.join("square.png");
        let img = image::GrayImage::from_fn(20, 10, |x, _| {
            image::Luma([if (5..15).contains(&x) { 20 } else { 230 }])
        });
        img.save(&path).expect("failed to write test image");

        let matrix = load_bit_matrix(&path).unwrap();
        assert_eq!((matrix.width(), matrix.height()), (20, 10));
        assert!(matrix.get(5, 0) && matrix.get(14, 9));
        assert!(!matrix.get(4, 0) && !matrix.get(15, 9));

        let stats = binary_stats(&matrix);
        assert_eq!(stats.dark_pixels, 100);
        assert_eq!(stats.total_pixels, 200);
        assert_eq!(stats.dark_rows, 10);
        assert!((stats.dark_ratio - 0.5).abs() < 1e-9);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_missing_image_fails() {
        assert!(load_bit_matrix("/nonexistent/locate.png").is_err());
    }

    #[test]
    fn dataset_iter_finds_images_sorted() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("nested")).unwrap();
        for name in ["b.png", "a.jpg", "notes.txt", "nested/c.bmp"] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let found: Vec<PathBuf> = dataset_iter(&dir, None).collect();
        assert_eq!(found.len(), 3);
        assert!(found.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(dataset_iter(&dir, Some(1)).count(), 1);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn empty_matrix_stats() {
        let stats = binary_stats(&BitMatrix::default());
        assert_eq!(stats.total_pixels, 0);
        assert_eq!(stats.dark_ratio, 0.0);
    }
}
