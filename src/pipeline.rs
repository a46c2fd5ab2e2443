use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::info;

use crate::config::ProcessorConfig;
use crate::error::{LetterboxError, LetterboxResult};
use crate::layout::compute_layout;

/// What [`convert_image`] did for one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The output was (re)produced.
    Processed,
    /// The existing output was newer than the source.
    Skipped,
}

/// True when `dst` already holds an up-to-date output for `src`.
///
/// Skips iff `force` is false, `dst` exists, and `dst` was modified strictly
/// after `src`. Any failure probing either side counts as "do not skip", so
/// work is redone rather than output silently dropped. This is a staleness
/// check on mtimes, not a content hash.
pub fn should_skip(src: &Path, dst: &Path, force: bool) -> bool {
    if force {
        return false;
    }
    let Ok(dst_meta) = fs::metadata(dst) else {
        return false;
    };
    let Ok(src_meta) = fs::metadata(src) else {
        return false;
    };
    match (dst_meta.modified(), src_meta.modified()) {
        (Ok(dst_time), Ok(src_time)) => dst_time > src_time,
        _ => false,
    }
}

/// Destination path for `source` under `output_dir`.
///
/// Relative sources keep their directory structure below `output_dir`;
/// absolute sources keep only their file name. Callers must keep destination
/// paths unique per item, or concurrent items race on the same output.
pub fn destination_for(output_dir: &Path, source: &Path) -> PathBuf {
    if source.is_absolute() {
        let name = source.file_name().map(Path::new).unwrap_or(source);
        output_dir.join(name)
    } else {
        output_dir.join(source)
    }
}

/// Letterbox a single source image into `config.output_dir`.
///
/// The per-item transform: skip predicate, then decode, layout, background
/// fill, composite, JPEG encode at the configured quality, and write
/// (creating any needed parent directories). The output keeps the source
/// file name.
pub fn convert_image(source: &Path, config: &ProcessorConfig) -> LetterboxResult<ItemOutcome> {
    let dest = destination_for(&config.output_dir, source);

    if should_skip(source, &dest, config.force) {
        info!(path = %source.display(), "unchanged, skipping");
        return Ok(ItemOutcome::Skipped);
    }

    info!(path = %source.display(), "processing");

    let bytes = fs::read(source).map_err(|err| LetterboxError::source_read(source, err))?;
    let decoded =
        image::load_from_memory(&bytes).map_err(|err| LetterboxError::decode(source, err))?;
    let src_rgb = decoded.to_rgb8();

    let layout = compute_layout(
        src_rgb.width(),
        src_rgb.height(),
        config.aspect,
        config.padding_fraction(),
    )?;

    // Fill, then composite the source over the placement rectangle.
    let [r, g, b] = config.background.rgb();
    let mut canvas = RgbImage::from_pixel(
        layout.canvas_width,
        layout.canvas_height,
        image::Rgb([r, g, b]),
    );
    image::imageops::replace(
        &mut canvas,
        &src_rgb,
        i64::from(layout.placement.x),
        i64::from(layout.placement.y),
    );

    let mut encoded = Vec::new();
    canvas
        .write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, config.quality))
        .map_err(|err| LetterboxError::encode(source, err))?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            LetterboxError::destination_write(
                source,
                anyhow::Error::new(err)
                    .context(format!("creating output directory '{}'", parent.display())),
            )
        })?;
    }
    fs::write(&dest, &encoded).map_err(|err| {
        LetterboxError::destination_write(
            source,
            anyhow::Error::new(err).context(format!("writing '{}'", dest.display())),
        )
    })?;

    Ok(ItemOutcome::Processed)
}

#[cfg(test)]
mod tests {
    use filetime::{FileTime, set_file_mtime};

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from("target").join("pipeline-tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path, unix_seconds: i64) {
        fs::write(path, b"x").unwrap();
        set_file_mtime(path, FileTime::from_unix_time(unix_seconds, 0)).unwrap();
    }

    #[test]
    fn skip_only_when_destination_is_strictly_newer() {
        let dir = scratch_dir("should_skip");
        let src = dir.join("src.jpg");
        let dst = dir.join("dst.jpg");

        touch(&src, 1_000);
        touch(&dst, 2_000);
        assert!(should_skip(&src, &dst, false));

        // Destination older than the source.
        set_file_mtime(&dst, FileTime::from_unix_time(500, 0)).unwrap();
        assert!(!should_skip(&src, &dst, false));

        // Equal mtimes are not "strictly after".
        set_file_mtime(&dst, FileTime::from_unix_time(1_000, 0)).unwrap();
        assert!(!should_skip(&src, &dst, false));

        // Force wins regardless of timestamps.
        set_file_mtime(&dst, FileTime::from_unix_time(2_000, 0)).unwrap();
        assert!(!should_skip(&src, &dst, true));
    }

    #[test]
    fn missing_or_unreadable_paths_mean_do_not_skip() {
        let dir = scratch_dir("skip_missing");
        let src = dir.join("src.jpg");
        touch(&src, 1_000);

        assert!(!should_skip(&src, &dir.join("absent.jpg"), false));
        // Missing source fails open toward reprocessing too.
        assert!(!should_skip(&dir.join("absent.jpg"), &src, false));
    }

    #[test]
    fn destination_keeps_relative_structure() {
        assert_eq!(
            destination_for(Path::new("out"), Path::new("shoot/a.jpg")),
            PathBuf::from("out/shoot/a.jpg")
        );
        assert_eq!(
            destination_for(Path::new("out"), Path::new("/abs/shoot/a.jpg")),
            PathBuf::from("out/a.jpg")
        );
    }

    #[test]
    fn missing_source_is_a_read_error() {
        let dir = scratch_dir("read_error");
        let config = ProcessorConfig::new(dir.join("out"));
        let err = convert_image(&dir.join("absent.jpg"), &config).unwrap_err();
        assert!(matches!(err, LetterboxError::SourceRead { .. }));
        assert_eq!(err.item(), Some(dir.join("absent.jpg").as_path()));
    }

    #[test]
    fn undecodable_source_is_a_decode_error() {
        let dir = scratch_dir("decode_error");
        let src = dir.join("garbage.jpg");
        fs::write(&src, b"not an image at all").unwrap();

        let config = ProcessorConfig::new(dir.join("out"));
        let err = convert_image(&src, &config).unwrap_err();
        assert!(matches!(err, LetterboxError::Decode { .. }));
    }

    #[test]
    fn convert_writes_a_letterboxed_jpeg() {
        let dir = scratch_dir("convert");
        let src = dir.join("red.jpg");
        let source = RgbImage::from_pixel(40, 20, image::Rgb([255, 0, 0]));
        source.save(&src).unwrap();

        let mut config = ProcessorConfig::new(dir.join("out"));
        config.aspect = crate::config::AspectRatio::parse("1:1").unwrap();
        config.quality = 100;

        assert_eq!(
            convert_image(&src, &config).unwrap(),
            ItemOutcome::Processed
        );

        let dest = destination_for(&config.output_dir, &src);
        let out = image::open(&dest).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (40, 40));

        // Background outside the composited region stays near black, the
        // composited region stays near red (JPEG is lossy even at 100).
        let corner = out.get_pixel(1, 1);
        assert!(corner.0.iter().all(|&c| c < 16), "corner {corner:?}");
        let center = out.get_pixel(20, 20);
        assert!(center[0] > 230 && center[1] < 32 && center[2] < 32);
    }
}
