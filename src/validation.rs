use crate::error::{CompressionError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Validate input file path for accessibility
pub fn validate_input_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(CompressionError::UnsupportedFormat(format!(
            "Input path is not a file: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Refuse to write the output over the input.
///
/// The encoder is run with overwrite enabled and failed runs delete their
/// output, so either would destroy the source file.
pub fn ensure_distinct_output(input: &Path, output: &Path) -> Result<()> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        // Output does not exist yet: compare what we can.
        _ => input == output,
    };
    if same {
        return Err(CompressionError::InvalidOutputPath {
            path: output.to_path_buf(),
            reason: "output would overwrite the input file".to_string(),
        });
    }
    Ok(())
}

/// Create the output's parent directory if it doesn't exist
pub fn prepare_output_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| CompressionError::InvalidOutputPath {
        path: path.to_path_buf(),
        reason: "missing file name".to_string(),
    })?;

    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| CompressionError::InvalidOutputPath {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
            Ok(parent.join(file_name))
        }
        None => Ok(PathBuf::from(file_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_validate_input_path_not_found() {
        let path = Path::new("nonexistent.mp4");
        let result = validate_input_path(path);
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_input_path_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_input_path(temp_dir.path());
        assert!(matches!(result, Err(CompressionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validate_input_path_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.mp4");
        let mut file = File::create(&test_file).unwrap();
        file.write_all(b"fake video data").unwrap();

        assert!(validate_input_path(&test_file).is_ok());
    }

    #[test]
    fn test_ensure_distinct_output() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("clip.mp4");
        File::create(&input).unwrap();

        let result = ensure_distinct_output(&input, &input);
        assert!(matches!(
            result,
            Err(CompressionError::InvalidOutputPath { .. })
        ));

        // Same file reached through a different spelling.
        let dotted = temp_dir.path().join(".").join("clip.mp4");
        assert!(ensure_distinct_output(&input, &dotted).is_err());

        let output = temp_dir.path().join("clip_compressed.mp4");
        assert!(ensure_distinct_output(&input, &output).is_ok());
    }

    #[test]
    fn test_prepare_output_path_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("nested").join("deeper").join("out.jpg");

        let prepared = prepare_output_path(&output).unwrap();
        assert_eq!(prepared, output);
        assert!(temp_dir.path().join("nested").join("deeper").is_dir());
    }

    #[test]
    fn test_prepare_output_path_bare_file_name() {
        assert_eq!(
            prepare_output_path(Path::new("out.png")).unwrap(),
            PathBuf::from("out.png")
        );
    }
}
