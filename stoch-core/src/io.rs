use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads training data from a file, or from every file of a directory.
///
/// - A file is returned as one chunk
/// - A directory yields one chunk per regular file, sorted by file name,
///   optionally keeping only files with `extension`
/// - Subdirectories are ignored
pub fn read_training_chunks<P: AsRef<Path>>(path: P, extension: Option<&str>) -> io::Result<Vec<Vec<u8>>> {
	let path = path.as_ref();
	if path.is_file() {
		return Ok(vec![fs::read(path)?]);
	}

	let folder = normalize_folder(path);
	if !folder.is_dir() {
		return Err(io::Error::new(
			io::ErrorKind::NotFound,
			format!("Expected a file or directory, got: {}", folder.display()),
		));
	}

	list_files(&folder, extension)?
		.into_iter()
		.map(|file| fs::read(folder.join(file)))
		.collect()
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &Path) -> PathBuf {
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists regular files of a directory, sorted, optionally filtered by extension.
///
/// Returns file names only (no paths).
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, extension: Option<&str>) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() {
			continue;
		}
		let wanted = match extension {
			Some(ext) => path.extension() == Some(std::ffi::OsStr::new(ext)),
			None => true,
		};
		if wanted {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}
