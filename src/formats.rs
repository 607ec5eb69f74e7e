/// Image output format handling
///
/// Encoding only distinguishes two codecs: lossy JPEG, chosen when the output
/// path ends in a JPEG extension, and lossless PNG for everything else.
/// `ImageFormatChoice` is what a caller asks for before an output path exists.
use crate::error::{CompressionError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Codec used to write a compressed image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCodec {
    /// JPEG, honours the quality setting
    Jpeg,
    /// PNG, quality is ignored
    Png,
}

impl OutputCodec {
    /// Pick the codec from the output file extension
    pub fn from_output_path(output_path: &Path) -> Self {
        match output_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") | Some("jpe") | Some("jfif") => OutputCodec::Jpeg,
            _ => OutputCodec::Png,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputCodec::Jpeg => "jpg",
            OutputCodec::Png => "png",
        }
    }

    pub fn uses_quality(&self) -> bool {
        matches!(self, OutputCodec::Jpeg)
    }
}

impl fmt::Display for OutputCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputCodec::Jpeg => "JPEG",
            OutputCodec::Png => "PNG",
        };
        write!(f, "{}", name)
    }
}

/// Requested output format for an image job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormatChoice {
    /// Smaller files
    #[default]
    Jpeg,
    /// Lossless
    Png,
    /// Same extension as the input
    KeepOriginal,
}

impl ImageFormatChoice {
    /// Extension for the derived output path, without the dot
    pub fn output_extension(&self, input_path: &Path) -> Option<String> {
        match self {
            ImageFormatChoice::Jpeg => Some(OutputCodec::Jpeg.extension().to_string()),
            ImageFormatChoice::Png => Some(OutputCodec::Png.extension().to_string()),
            ImageFormatChoice::KeepOriginal => input_path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_string()),
        }
    }

    pub fn format_names() -> Vec<&'static str> {
        vec!["jpeg", "png", "keep"]
    }
}

impl FromStr for ImageFormatChoice {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageFormatChoice::Jpeg),
            "png" => Ok(ImageFormatChoice::Png),
            "keep" | "original" => Ok(ImageFormatChoice::KeepOriginal),
            _ => Err(CompressionError::UnsupportedFormat(format!(
                "{} (expected one of: {})",
                s,
                ImageFormatChoice::format_names().join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_codec_from_output_path() {
        assert_eq!(OutputCodec::from_output_path(Path::new("a.jpg")), OutputCodec::Jpeg);
        assert_eq!(OutputCodec::from_output_path(Path::new("a.JPEG")), OutputCodec::Jpeg);
        assert_eq!(OutputCodec::from_output_path(Path::new("a.png")), OutputCodec::Png);
        assert_eq!(OutputCodec::from_output_path(Path::new("a.bmp")), OutputCodec::Png);
        assert_eq!(OutputCodec::from_output_path(Path::new("a")), OutputCodec::Png);
    }

    #[test]
    fn test_only_jpeg_uses_quality() {
        assert!(OutputCodec::Jpeg.uses_quality());
        assert!(!OutputCodec::Png.uses_quality());
    }

    #[test]
    fn test_format_choice_from_str() {
        assert_eq!("jpg".parse::<ImageFormatChoice>().unwrap(), ImageFormatChoice::Jpeg);
        assert_eq!("PNG".parse::<ImageFormatChoice>().unwrap(), ImageFormatChoice::Png);
        assert_eq!(
            "keep".parse::<ImageFormatChoice>().unwrap(),
            ImageFormatChoice::KeepOriginal
        );
        assert!(matches!(
            "webp".parse::<ImageFormatChoice>(),
            Err(CompressionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_choice_output_extension() {
        let input = Path::new("photo.bmp");
        assert_eq!(ImageFormatChoice::Jpeg.output_extension(input).as_deref(), Some("jpg"));
        assert_eq!(ImageFormatChoice::Png.output_extension(input).as_deref(), Some("png"));
        assert_eq!(
            ImageFormatChoice::KeepOriginal.output_extension(input).as_deref(),
            Some("bmp")
        );
        assert_eq!(
            ImageFormatChoice::KeepOriginal.output_extension(Path::new("noext")),
            None
        );
    }

    #[test]
    fn test_output_codec_display() {
        assert_eq!(format!("{}", OutputCodec::Jpeg), "JPEG");
        assert_eq!(format!("{}", OutputCodec::Png), "PNG");
    }
}
